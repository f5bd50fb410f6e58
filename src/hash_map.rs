use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::ops::Index;

use crate::cursor::Cursor;
use crate::cursor::CursorError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::probing::LinearProbing;
use crate::probing::Probe;

/// A hash map implemented using the open-addressing [`HashTable`] as the
/// underlying storage.
///
/// `HashMap<K, V, S, P>` stores key-value pairs where keys implement
/// `Hash + Eq`, uses a configurable hasher builder `S` to hash keys, and
/// resolves collisions with the probing policy `P` (linear unless named).
///
/// Removing a key leaves a tombstone that is reclaimed by a later insert or
/// the next rebuild. The map grows before its load factor would exceed 0.5.
///
/// # Performance Characteristics
///
/// - **Memory**: two slots per unit of capacity, each holding a tag, a u64
///   hash, and `(K, V)`
pub struct HashMap<K, V, S, P = LinearProbing> {
    table: HashTable<(K, V), P>,
    hash_builder: S,
}

impl<K, V, S, P> Clone for HashMap<K, V, S, P>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<K, V, S, P> Debug for HashMap<K, V, S, P>
where
    K: Debug + Hash + Eq,
    V: Debug,
    S: BuildHasher,
    P: Probe,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S, P> PartialEq for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    P: Probe,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S, P> Eq for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    P: Probe,
{
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new, linearly probed hash map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_hasher_and_probing(0, hash_builder)
    }

    /// Creates a new, linearly probed hash map able to hold `capacity`
    /// entries without growing.
    ///
    /// The capacity is rounded up to a power of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert_eq!(map.capacity(), 128);
    /// assert_eq!(map.physical_len(), 256);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_hasher_and_probing(capacity, hash_builder)
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new, linearly probed hash map using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashMap;
    ///
    /// let mut map: HashMap<&str, i32, DefaultHashBuilder> = HashMap::new();
    /// map.insert("a", 1);
    /// assert_eq!(map["a"], 1);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new, linearly probed hash map with the specified capacity
    /// using the default hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S, P> HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    /// Creates a new hash map probed with `P`, using the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// # use probe_hash::QuadraticProbing;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map: HashMap<u32, &str, _, QuadraticProbing> =
    ///     HashMap::with_hasher_and_probing(SimpleHasher);
    /// map.insert(1, "one");
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// ```
    pub fn with_hasher_and_probing(hash_builder: S) -> Self {
        Self::with_capacity_hasher_and_probing(0, hash_builder)
    }

    /// Creates a new hash map probed with `P`, able to hold `capacity` entries
    /// without growing.
    pub fn with_capacity_hasher_and_probing(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity_and_probing(capacity),
            hash_builder,
        }
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the map can hold before it grows.
    ///
    /// Removed keys keep counting against this until their tombstones are
    /// reclaimed.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of physical slots, twice the capacity.
    pub fn physical_len(&self) -> usize {
        self.table.physical_len()
    }

    /// Returns the ratio of live entries to physical slots.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Returns the load factor the map never exceeds.
    pub fn max_load_factor(&self) -> f64 {
        HashTable::<(K, V), P>::MAX_LOAD_FACTOR
    }

    /// Removes all elements from the map.
    ///
    /// This operation preserves the map's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// map.insert(1, "a");
    /// assert!(!map.is_empty());
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the capacity of the map as much as possible.
    ///
    /// The resulting capacity is the smallest power of two that is at least
    /// twice the number of elements. An empty map releases its storage.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// map.insert(1, "one");
    /// map.insert(2, "two");
    ///
    /// // The map has a large capacity but only 2 elements
    /// assert!(map.capacity() >= 100);
    ///
    /// map.shrink_to_fit();
    /// assert_eq!(map.capacity(), 4);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Reserves capacity for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Rebuilds the map with room for at least `capacity` elements, never
    /// fewer than twice the current length.
    ///
    /// All tombstones are discarded and every outstanding [`Cursor`] is
    /// invalidated.
    pub fn rehash(&mut self, capacity: usize) {
        self.table.rehash(capacity);
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key itself is not replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(mut entry) => {
                let old_value = core::mem::replace(&mut entry.get_mut().1, value);
                Some(old_value)
            }
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                None
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// map.insert("apple".to_string(), 3);
    /// assert_eq!(map.get("apple"), Some(&3));
    /// assert_eq!(map.get("pear"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| key.eq(k.borrow()))
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| key.eq(k.borrow()))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.contains(hash, |(k, _)| key.eq(k.borrow()))
    }

    /// Removes a key from the map, returning the value if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| key.eq(k.borrow()))
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    ///
    /// for word in ["a", "b", "a"] {
    ///     *map.entry(word).or_insert(0) += 1;
    /// }
    ///
    /// assert_eq!(map.get("a"), Some(&2));
    /// assert_eq!(map.get("b"), Some(&1));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, P> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// Pairs come out in slot order, which is unspecified but stable until the
    /// map is rebuilt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("Key: {}, Value: {}", key, value);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the pairs of the map with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes all pairs from the map and returns them as an iterator.
    ///
    /// Invalidates every outstanding [`Cursor`].
    pub fn drain(&mut self) -> Drain<'_, K, V, P> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Retains only the pairs for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// for i in 0..8 {
    ///     map.insert(i, i * 10);
    /// }
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(|(k, v)| f(&*k, v));
    }

    /// Returns a cursor at the first pair in slot order.
    pub fn cursor(&self) -> Cursor {
        self.table.cursor()
    }

    /// Returns the end cursor.
    pub fn end_cursor(&self) -> Cursor {
        self.table.end_cursor()
    }

    /// Returns a cursor at `key`, or the end cursor if the key is absent.
    pub fn find_cursor<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_cursor(hash, |(k, _)| key.eq(k.borrow()))
    }

    /// Returns the pair under `cursor`.
    pub fn entry_at(&self, cursor: &Cursor) -> Result<(&K, &V), CursorError> {
        self.table.get_at(cursor).map(|(k, v)| (k, v))
    }

    /// Returns the value under `cursor` for modification.
    pub fn value_at_mut(&mut self, cursor: &Cursor) -> Result<&mut V, CursorError> {
        self.table.get_at_mut(cursor).map(|(_, v)| v)
    }

    /// Moves `cursor` to the next pair in slot order, or to the end.
    pub fn advance(&self, cursor: &mut Cursor) -> Result<(), CursorError> {
        self.table.advance(cursor)
    }

    /// Removes the pair under `cursor`, returning it and a cursor at the next
    /// pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map = HashMap::with_hasher(SimpleHasher);
    /// for i in 0..5 {
    ///     map.insert(i, i);
    /// }
    ///
    /// // Remove the odd keys while walking the map.
    /// let mut cursor = map.cursor();
    /// while cursor != map.end_cursor() {
    ///     let (&key, _) = map.entry_at(&cursor).unwrap();
    ///     if key % 2 == 1 {
    ///         cursor = map.remove_at(cursor).unwrap().1;
    ///     } else {
    ///         map.advance(&mut cursor).unwrap();
    ///     }
    /// }
    /// assert_eq!(map.len(), 3);
    /// ```
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<((K, V), Cursor), CursorError> {
        self.table.remove_at(cursor)
    }

    /// Removes every pair from `first` up to, but not including, `last` in
    /// slot order, returning how many were removed.
    ///
    /// Cursors stay valid; `last` may be the end cursor.
    pub fn remove_range(&mut self, first: Cursor, last: Cursor) -> Result<usize, CursorError> {
        self.table.remove_range(first, last)
    }
}

impl<K, V, S, P> Default for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
    P: Probe,
{
    fn default() -> Self {
        Self::with_hasher_and_probing(S::default())
    }
}

impl<K, Q, V, S, P> Index<&Q> for HashMap<K, V, S, P>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
    P: Probe,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry for key")
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, P = LinearProbing> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, P>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, P>),
}

impl<'a, K, V, P: Probe> Entry<'a, K, V, P> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, P> Entry<'a, K, V, P>
where
    V: Default,
    P: Probe,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, P = LinearProbing> {
    entry: crate::hash_table::VacantEntry<'a, (K, V), P>,
    key: K,
}

impl<'a, K, V, P: Probe> VacantEntry<'a, K, V, P> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, P = LinearProbing> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V), P>,
}

impl<'a, K, V, P: Probe> OccupiedEntry<'a, K, V, P> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Inserts a value into the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }

    /// Returns a cursor at this entry.
    pub fn cursor(&self) -> Cursor {
        self.entry.cursor()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
///
/// Keys are yielded by shared reference only.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V, P = LinearProbing> {
    inner: crate::hash_table::Drain<'a, (K, V), P>,
}

impl<K, V, P> Iterator for Drain<'_, K, V, P> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A consuming iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S, P> IntoIterator for HashMap<K, V, S, P> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S, P> IntoIterator for &'a HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, P> IntoIterator for &'a mut HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S, P> FromIterator<(K, V)> for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
    P: Probe,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S, P> Extend<(K, V)> for HashMap<K, V, S, P>
where
    K: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        // Keys already present may repeat, so only plan for half of them.
        let additional = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(additional);
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
