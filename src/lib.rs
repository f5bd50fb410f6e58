#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Emits a `tracing` event when the `tracing` feature is enabled; expands to
/// nothing otherwise.
macro_rules! debug_event {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            tracing::$level!($($arg)+);
        }
    };
}

/// Index-based positions into a table that survive mutation and are checked
/// on every use.
pub mod cursor;

/// A HashMap implementation over the open-addressing [`HashTable`].
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers and probing.
pub mod hash_map;

pub mod hash_table;

/// A hash set implementation over the open-addressing [`HashTable`].
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers and probing.
pub mod hash_set;

pub mod probing;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`HashMap::new`] and [`HashSet::new`]
        /// when no hasher is named.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`HashMap::new`] and [`HashSet::new`]
        /// when no hasher is named.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}

pub use cursor::Cursor;
pub use cursor::CursorError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
pub use probing::LinearProbing;
pub use probing::Probe;
pub use probing::QuadraticProbing;
