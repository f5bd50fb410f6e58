use core::fmt;

/// A position in a [`HashTable`](crate::HashTable) that outlives borrows.
///
/// Unlike [`Iter`](crate::hash_table::Iter), a cursor does not borrow the
/// table, so it can be held across mutations. Every use is checked against the
/// table it came from: a rehash, clear, shrink or drain invalidates all cursors
/// issued before it, and using one afterwards returns
/// [`CursorError::Invalidated`] instead of reading a relocated entry.
///
/// Two cursors are equal when they point at the same slot of the same table.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub(crate) table: usize,
    pub(crate) index: usize,
    pub(crate) version: u64,
}

impl Cursor {
    /// The slot index this cursor points at. Equal to the table's physical
    /// length for the end cursor.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.index == other.index
    }
}

impl Eq for Cursor {}

/// Reasons a [`Cursor`] cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    /// The cursor was issued by a different table.
    ForeignTable,
    /// The table was restructured after the cursor was issued.
    Invalidated {
        /// Table version captured by the cursor.
        issued: u64,
        /// Current table version.
        current: u64,
    },
    /// The cursor is at the end of the table.
    AtEnd,
    /// The slot under the cursor no longer holds an entry.
    Vacant {
        /// Slot index of the cursor.
        index: usize,
    },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorError::ForeignTable => f.write_str("cursor belongs to a different table"),
            CursorError::Invalidated { issued, current } => write!(
                f,
                "cursor issued at table version {issued} used at version {current}"
            ),
            CursorError::AtEnd => f.write_str("cursor is at the end of the table"),
            CursorError::Vacant { index } => write!(f, "slot {index} holds no entry"),
        }
    }
}

impl core::error::Error for CursorError {}
