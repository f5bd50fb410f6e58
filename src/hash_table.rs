use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;
use core::sync::atomic::AtomicUsize;
use core::sync::atomic::Ordering;

use crate::cursor::Cursor;
use crate::cursor::CursorError;
use crate::probing::LinearProbing;
use crate::probing::Probe;

/// Smallest non-zero capacity hint. A table that grows from nothing gets
/// `2 * MIN_CAPACITY_HINT` slots.
const MIN_CAPACITY_HINT: usize = 2;

static NEXT_TABLE_ID: AtomicUsize = AtomicUsize::new(0);

#[inline(always)]
fn capacity_hint_for(requested: usize) -> usize {
    if requested == 0 {
        return 0;
    }
    // Power-of-two hints keep the physical length a power of two, which the
    // quadratic probe needs to reach every slot.
    requested
        .max(MIN_CAPACITY_HINT)
        .checked_next_power_of_two()
        .expect("capacity overflow")
}

#[inline(always)]
fn physical_len_for(capacity_hint: usize) -> usize {
    capacity_hint.checked_mul(2).expect("capacity overflow")
}

#[cold]
#[inline(never)]
fn probe_exhausted(physical_len: usize, live: usize, tombstones: usize) -> ! {
    panic!(
        "probe sequence exhausted: {physical_len} slots, {live} live, {tombstones} tombstones"
    )
}

/// State of a single slot.
///
/// Deletion always goes `Live -> Tombstone`; a tombstone only turns back into
/// `Empty` when the whole table is rebuilt or cleared.
#[derive(Clone)]
enum Slot<V> {
    Empty,
    Live { hash: u64, value: V },
    Tombstone,
}

impl<V> Slot<V> {
    #[inline(always)]
    fn is_live(&self) -> bool {
        matches!(self, Slot::Live { .. })
    }

    #[inline(always)]
    fn value(&self) -> Option<&V> {
        match self {
            Slot::Live { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline(always)]
    fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Slot::Live { value, .. } => Some(value),
            _ => None,
        }
    }
}

fn next_live<V>(slots: &[Slot<V>], start: usize) -> usize {
    slots[start..]
        .iter()
        .position(Slot::is_live)
        .map_or(slots.len(), |offset| start + offset)
}

fn empty_slots<V>(len: usize) -> Vec<Slot<V>> {
    let mut slots = Vec::with_capacity(len);
    slots.resize_with(len, || Slot::Empty);
    slots
}

/// Outcome of walking a probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    /// A live slot holding the key.
    Found(usize),
    /// Where the key should be installed (insertion walks only).
    Vacant(usize),
    /// The key is not present (lookup walks, or an unallocated table).
    Absent,
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries
    pub populated: usize,
    /// Number of tombstoned slots
    pub tombstones: usize,
    /// Live entries that fit before the load factor reaches 0.5
    pub capacity: usize,
    /// Physical number of slots
    pub total_slots: usize,
    /// Slots that were never occupied since the last rebuild
    pub empty_slots: usize,
    /// Live entries over total slots
    pub load_factor: f64,
    /// Live and tombstoned slots over total slots
    pub occupancy: f64,
    /// Longest probe sequence needed to reach a live entry
    pub max_probe_length: usize,
    /// Average probe sequence length over live entries
    pub mean_probe_length: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Occupancy: {} live + {} tombstones ({:.2}% of slots, {} never used)",
            self.populated,
            self.tombstones,
            self.occupancy * 100.0,
            self.empty_slots
        );
        println!("Capacity before growth: {}", self.capacity);
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
    }
}

/// An open-addressing hash table with tombstone deletion.
///
/// `HashTable<V, P>` stores values of type `V` in a single slot array and
/// resolves collisions with the probing policy `P` (linear by default). Like a
/// raw table, it does not hash anything itself: every operation takes the
/// value's hash and an equality predicate. The hash is kept alongside the
/// value, so growing the table never needs the caller's hasher.
///
/// Removal leaves a tombstone so other keys' probe sequences stay intact.
/// Tombstones are discarded the next time the table is rebuilt.
///
/// The table keeps at least half of its slots never-occupied, which bounds
/// every probe walk.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use probe_hash::hash_table::Entry;
/// # use probe_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table: HashTable<Person> = HashTable::with_capacity(100);
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.find(hash, |p| p.id == 123).map(|p| p.name.as_str()), Some("Alice"));
/// ```
pub struct HashTable<V, P = LinearProbing> {
    slots: Vec<Slot<V>>,

    live: usize,
    tombstones: usize,
    capacity_hint: usize,
    first_live: usize,

    id: usize,
    version: u64,

    _probe: PhantomData<fn() -> P>,
}

impl<V, P> Debug for HashTable<V, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::string::String;

        f.debug_struct("HashTable")
            .field("populated", &self.live)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.capacity_hint)
            .field("first_live", &self.first_live)
            .field("version", &self.version)
            .field(
                "slots",
                &self
                    .slots
                    .chunks(32)
                    .map(|row| {
                        row.iter()
                            .map(|slot| match slot {
                                Slot::Empty => '.',
                                Slot::Live { .. } => '#',
                                Slot::Tombstone => 'x',
                            })
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V, P> Clone for HashTable<V, P>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            live: self.live,
            tombstones: self.tombstones,
            capacity_hint: self.capacity_hint,
            first_live: self.first_live,
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            version: self.version,
            _probe: PhantomData,
        }
    }
}

impl<V, P: Probe> Default for HashTable<V, P> {
    fn default() -> Self {
        Self::with_probing()
    }
}

impl<V> HashTable<V, LinearProbing> {
    /// Creates an empty, linearly probed table that allocates nothing until
    /// the first insert.
    pub fn new() -> Self {
        Self::with_capacity_and_probing(0)
    }

    /// Creates a linearly probed table able to hold `capacity` entries
    /// without growing.
    ///
    /// The capacity is rounded up to a power of two and the table allocates
    /// twice that many slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// assert_eq!(table.physical_len(), 256);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_probing(capacity)
    }
}

impl<V, P: Probe> HashTable<V, P> {
    /// Live entries over physical slots at which the table grows.
    pub const MAX_LOAD_FACTOR: f64 = 0.5;

    /// Creates an empty table using the probing policy `P`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// # use probe_hash::probing::QuadraticProbing;
    /// #
    /// let mut table = HashTable::<u64, QuadraticProbing>::with_probing();
    /// table.entry(0, |&v| v == 1).or_insert(1);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn with_probing() -> Self {
        Self::with_capacity_and_probing(0)
    }

    /// Creates a table using the probing policy `P`, able to hold `capacity`
    /// entries without growing.
    pub fn with_capacity_and_probing(capacity: usize) -> Self {
        let capacity_hint = capacity_hint_for(capacity);
        let len = physical_len_for(capacity_hint);

        Self {
            slots: empty_slots(len),
            live: 0,
            tombstones: 0,
            capacity_hint,
            first_live: len,
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            version: 0,
            _probe: PhantomData,
        }
    }

    /// Returns the number of live entries in the table.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the table contains no live entries.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns the number of entries the table can hold before it grows.
    ///
    /// Tombstones count against this limit until the next rebuild.
    pub fn capacity(&self) -> usize {
        self.capacity_hint
    }

    /// Returns the number of physical slots, always `2 * capacity()`.
    pub fn physical_len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstoned slots.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns live entries over physical slots, or `0.0` for an unallocated
    /// table.
    pub fn load_factor(&self) -> f64 {
        if self.slots.is_empty() {
            0.0
        } else {
            self.live as f64 / self.slots.len() as f64
        }
    }

    /// Returns the slot where the probe sequence for `hash` starts, or `None`
    /// if the table has no slots.
    pub fn home_slot(&self, hash: u64) -> Option<usize> {
        if self.slots.is_empty() {
            None
        } else {
            Some((hash % self.slots.len() as u64) as usize)
        }
    }

    /// Removes all entries, keeping the allocated slots.
    ///
    /// Invalidates every outstanding [`Cursor`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2).or_insert(2);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn clear(&mut self) {
        debug_event!(
            trace,
            live = self.live,
            tombstones = self.tombstones,
            "clearing slot table"
        );

        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.live = 0;
        self.tombstones = 0;
        self.first_live = self.slots.len();
        self.bump_version();
    }

    /// Shrinks the table as much as possible while keeping the load factor
    /// at or below one quarter.
    ///
    /// An empty table releases its slots entirely.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_hash::HashTable;
    ///
    /// let mut table: HashTable<i32> = HashTable::with_capacity(1000);
    /// table.entry(42, |&v| v == 5).or_insert(5);
    /// table.entry(123, |&v| v == 10).or_insert(10);
    ///
    /// table.shrink_to_fit();
    /// assert_eq!(table.capacity(), 4);
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if self.live == 0 {
            if !self.slots.is_empty() {
                debug_event!(trace, old_len = self.slots.len(), "releasing slot table");
                self.slots = Vec::new();
                self.capacity_hint = 0;
                self.tombstones = 0;
                self.first_live = 0;
                self.bump_version();
            }
            return;
        }

        let capacity_hint = capacity_hint_for(self.live.saturating_mul(2));
        if capacity_hint < self.capacity_hint {
            self.do_rehash(capacity_hint);
        }
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// Rebuilds the table up front, instead of through repeated growth, when
    /// the current capacity is not enough.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<i32> = HashTable::with_capacity(15);
    /// for i in 0..15 {
    ///     table.entry(i as u64, |&n: &i32| n == i).or_insert(i);
    /// }
    ///
    /// table.reserve(50);
    /// assert!(table.capacity() >= 65);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let required = self.live.saturating_add(additional);
        if required > self.capacity_hint {
            self.do_rehash(capacity_hint_for(required));
        }
    }

    /// Rebuilds the table with capacity for at least `capacity` entries,
    /// discarding all tombstones.
    ///
    /// The new capacity is never below twice the current length, and is at
    /// least the minimal non-zero size even for `rehash(0)` on an empty table.
    /// Invalidates every outstanding [`Cursor`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.physical_len(), 0);
    ///
    /// table.rehash(0);
    /// assert_eq!(table.physical_len(), 4);
    /// ```
    pub fn rehash(&mut self, capacity: usize) {
        let requested = capacity
            .max(self.live.saturating_mul(2))
            .max(MIN_CAPACITY_HINT);
        self.do_rehash(capacity_hint_for(requested));
    }

    /// Removes and returns a value from the table.
    ///
    /// The slot is tombstoned rather than emptied so lookups for other keys
    /// that probed past it still find them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use probe_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(hash_u64(42), |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(hash_u64(42), |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.tombstones(), 1);
    ///
    /// assert_eq!(table.remove(hash_u64(99), |&n| n == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        match self.resolve(hash, eq, false) {
            Resolved::Found(index) => Some(self.mark_tombstone(index)),
            Resolved::Vacant(_) | Resolved::Absent => None,
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// If the key is absent and installing it would push the table past its
    /// load factor, the table grows first. That rebuild invalidates every
    /// outstanding [`Cursor`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use probe_hash::hash_table::Entry;
    /// # use probe_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// let hash = hash_str("hello");
    ///
    /// match table.entry(hash, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         entry.get_mut().push('!');
    ///     }
    /// }
    ///
    /// table
    ///     .entry(hash, |s: &String| s == "hello")
    ///     .and_modify(|s| s.push('!'))
    ///     .or_insert_with(|| unreachable!());
    /// assert_eq!(table.find(hash, |s| s == "hello!"), Some(&"hello!".to_string()));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V, P> {
        let index = match self.resolve(hash, &eq, true) {
            Resolved::Found(index) => {
                return Entry::Occupied(OccupiedEntry { table: self, index });
            }
            Resolved::Vacant(index) if !self.needs_growth(index) => index,
            Resolved::Vacant(_) | Resolved::Absent => {
                self.resize_rehash();
                match self.resolve(hash, &eq, true) {
                    Resolved::Vacant(index) => index,
                    Resolved::Found(_) | Resolved::Absent => {
                        unreachable!("rebuilt table must have a vacant slot for a new key")
                    }
                }
            }
        };

        Entry::Vacant(VacantEntry {
            table: self,
            index,
            hash,
        })
    }

    /// Returns a reference to the value matching `hash` and `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(7, |&(k, _): &(u64, &str)| k == 7).or_insert((7, "seven"));
    ///
    /// assert_eq!(table.find(7, |&(k, _)| k == 7), Some(&(7, "seven")));
    /// assert_eq!(table.find(8, |&(k, _)| k == 8), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        match self.resolve(hash, eq, false) {
            Resolved::Found(index) => self.slots[index].value(),
            Resolved::Vacant(_) | Resolved::Absent => None,
        }
    }

    /// Returns a mutable reference to the value matching `hash` and `eq`.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        match self.resolve(hash, eq, false) {
            Resolved::Found(index) => self.slots[index].value_mut(),
            Resolved::Vacant(_) | Resolved::Absent => None,
        }
    }

    /// Returns `true` if a value matches `hash` and `eq`.
    pub fn contains(&self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        matches!(self.resolve(hash, eq, false), Resolved::Found(_))
    }

    /// Returns an iterator over all values in slot order.
    ///
    /// The order is stable for as long as the table is not rebuilt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// for n in 0..5u64 {
    ///     table.entry(n, |&v: &u64| v == n).or_insert(n);
    /// }
    ///
    /// let mut values: Vec<u64> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [0, 1, 2, 3, 4]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots[self.first_live..].iter(),
            remaining: self.live,
        }
    }

    /// Returns an iterator over mutable references to all values in slot
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots[self.first_live..].iter_mut(),
            remaining: self.live,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The slots are kept; tombstones are cleared along with the values.
    /// Invalidates every outstanding [`Cursor`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(1, |s: &String| s == "a").or_insert("a".to_string());
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, ["a"]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V, P> {
        self.bump_version();
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        for index in self.first_live..self.slots.len() {
            let keep = match &mut self.slots[index] {
                Slot::Live { value, .. } => f(value),
                Slot::Empty | Slot::Tombstone => continue,
            };
            if !keep {
                self.mark_tombstone(index);
            }
        }
    }

    /// Returns an iterator that removes and yields the values for which
    /// `pred` returns `true`.
    ///
    /// Values the iterator does not reach stay in the table.
    pub fn extract_if<F>(&mut self, pred: F) -> ExtractIf<'_, V, P, F>
    where
        F: FnMut(&mut V) -> bool,
    {
        let index = self.first_live;
        ExtractIf {
            table: self,
            index,
            pred,
        }
    }

    /// Returns a cursor at the first live slot, or the end cursor if the table
    /// is empty.
    pub fn cursor(&self) -> Cursor {
        self.cursor_at(self.first_live)
    }

    /// Returns the end cursor, positioned one past the last slot.
    pub fn end_cursor(&self) -> Cursor {
        self.cursor_at(self.slots.len())
    }

    /// Returns a cursor at the value matching `hash` and `eq`, or the end
    /// cursor if there is none.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(4);
    /// table.entry(3, |&v: &u64| v == 3).or_insert(3);
    ///
    /// let cursor = table.find_cursor(3, |&v| v == 3);
    /// assert_eq!(table.get_at(&cursor), Ok(&3));
    /// assert_eq!(table.find_cursor(4, |&v| v == 4), table.end_cursor());
    /// ```
    pub fn find_cursor(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Cursor {
        match self.resolve(hash, eq, false) {
            Resolved::Found(index) => self.cursor_at(index),
            Resolved::Vacant(_) | Resolved::Absent => self.end_cursor(),
        }
    }

    /// Returns the value under `cursor`.
    pub fn get_at(&self, cursor: &Cursor) -> Result<&V, CursorError> {
        let index = self.checked_slot(cursor)?;
        self.slots[index].value().ok_or(CursorError::Vacant { index })
    }

    /// Returns a mutable reference to the value under `cursor`.
    pub fn get_at_mut(&mut self, cursor: &Cursor) -> Result<&mut V, CursorError> {
        let index = self.checked_slot(cursor)?;
        self.slots[index]
            .value_mut()
            .ok_or(CursorError::Vacant { index })
    }

    /// Moves `cursor` to the next live slot, or to the end.
    ///
    /// A cursor whose slot was removed through another path can still be
    /// advanced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// for n in 0..3u64 {
    ///     table.entry(n, |&v: &u64| v == n).or_insert(n);
    /// }
    ///
    /// let mut cursor = table.cursor();
    /// let mut seen = Vec::new();
    /// while cursor != table.end_cursor() {
    ///     seen.push(*table.get_at(&cursor).unwrap());
    ///     table.advance(&mut cursor).unwrap();
    /// }
    /// assert_eq!(seen, [0, 1, 2]);
    /// ```
    pub fn advance(&self, cursor: &mut Cursor) -> Result<(), CursorError> {
        let index = self.checked_slot(cursor)?;
        cursor.index = self.next_live_from(index + 1);
        Ok(())
    }

    /// Removes the value under `cursor`, returning it together with a cursor
    /// at the next live slot.
    ///
    /// Other outstanding cursors stay valid.
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(V, Cursor), CursorError> {
        let index = self.checked_slot(&cursor)?;
        if !self.slots[index].is_live() {
            return Err(CursorError::Vacant { index });
        }

        let value = self.mark_tombstone(index);
        Ok((value, self.cursor_at(self.next_live_from(index + 1))))
    }

    /// Removes every live value from `first` up to, but not including,
    /// `last`, returning how many were removed.
    pub fn remove_range(&mut self, first: Cursor, last: Cursor) -> Result<usize, CursorError> {
        let start = self.checked_position(&first)?;
        let end = self.checked_position(&last)?;

        let mut removed = 0;
        for index in start..end {
            if self.slots[index].is_live() {
                self.mark_tombstone(index);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Walks the probe sequence for `hash`.
    ///
    /// A lookup stops at an empty slot or a live match. An insertion walk
    /// also remembers the first tombstone it passes and returns it as the
    /// install target, unless the key turns up live further along.
    fn resolve(&self, hash: u64, eq: impl Fn(&V) -> bool, for_insertion: bool) -> Resolved {
        let Some(start) = self.home_slot(hash) else {
            return Resolved::Absent;
        };

        let mut probe = P::start(start, self.slots.len());
        let mut index = start;
        let mut reusable = None;
        for _ in 0..=P::probe_limit(self.slots.len()) {
            match &self.slots[index] {
                Slot::Empty => {
                    return match (for_insertion, reusable) {
                        (false, _) => Resolved::Absent,
                        (true, Some(tombstone)) => Resolved::Vacant(tombstone),
                        (true, None) => Resolved::Vacant(index),
                    };
                }
                Slot::Tombstone => {
                    if for_insertion && reusable.is_none() {
                        reusable = Some(index);
                    }
                }
                Slot::Live {
                    hash: stored,
                    value,
                } => {
                    if *stored == hash && eq(value) {
                        return Resolved::Found(index);
                    }
                }
            }
            index = probe.advance();
        }

        probe_exhausted(self.slots.len(), self.live, self.tombstones)
    }

    /// Whether installing into `target` would break the load-factor bound.
    ///
    /// Reusing a tombstone does not change how many slots are occupied, so
    /// only the live count matters there.
    #[inline]
    fn needs_growth(&self, target: usize) -> bool {
        match self.slots[target] {
            Slot::Tombstone => self.live >= self.capacity_hint,
            Slot::Empty | Slot::Live { .. } => {
                self.live + self.tombstones >= self.capacity_hint
            }
        }
    }

    fn install(&mut self, index: usize, hash: u64, value: V) -> &mut V {
        match core::mem::replace(&mut self.slots[index], Slot::Live { hash, value }) {
            Slot::Empty => {}
            Slot::Tombstone => self.tombstones -= 1,
            Slot::Live { .. } => unreachable!("installing over a live slot"),
        }

        self.first_live = if self.live == 0 {
            index
        } else {
            self.first_live.min(index)
        };
        self.live += 1;

        self.live_mut(index)
    }

    fn mark_tombstone(&mut self, index: usize) -> V {
        let Slot::Live { value, .. } = core::mem::replace(&mut self.slots[index], Slot::Tombstone)
        else {
            unreachable!("tombstoning a slot that is not live")
        };

        self.live -= 1;
        self.tombstones += 1;
        if index == self.first_live {
            self.first_live = self.next_live_from(index + 1);
        }

        value
    }

    #[inline]
    fn live_ref(&self, index: usize) -> &V {
        match &self.slots[index] {
            Slot::Live { value, .. } => value,
            Slot::Empty | Slot::Tombstone => unreachable!("slot {index} is not live"),
        }
    }

    #[inline]
    fn live_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Slot::Live { value, .. } => value,
            Slot::Empty | Slot::Tombstone => unreachable!("slot {index} is not live"),
        }
    }

    fn next_live_from(&self, start: usize) -> usize {
        next_live(&self.slots, start)
    }

    #[cold]
    fn resize_rehash(&mut self) {
        // A table dominated by tombstones is rebuilt at its current size.
        let wanted = capacity_hint_for(self.live.saturating_mul(2).max(MIN_CAPACITY_HINT));
        self.do_rehash(wanted.max(self.capacity_hint));
    }

    fn do_rehash(&mut self, capacity_hint: usize) {
        debug_assert!(self.live <= capacity_hint);

        let len = physical_len_for(capacity_hint);
        debug_event!(
            debug,
            old_len = self.slots.len(),
            new_len = len,
            live = self.live,
            tombstones = self.tombstones,
            "rehashing slot table"
        );

        let old_slots = core::mem::replace(&mut self.slots, empty_slots(len));
        self.capacity_hint = capacity_hint;
        self.live = 0;
        self.tombstones = 0;
        self.first_live = len;
        self.bump_version();

        for slot in old_slots {
            if let Slot::Live { hash, value } = slot {
                // Keys are unique, so the walk only has to find free space.
                match self.resolve(hash, |_| false, true) {
                    Resolved::Vacant(index) => {
                        self.install(index, hash, value);
                    }
                    Resolved::Found(_) | Resolved::Absent => {
                        unreachable!("migration target must be vacant")
                    }
                }
            }
        }
    }

    #[inline]
    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn cursor_at(&self, index: usize) -> Cursor {
        Cursor {
            table: self.id,
            index,
            version: self.version,
        }
    }

    /// Validates that `cursor` belongs to this table and is current, allowing
    /// the end position.
    fn checked_position(&self, cursor: &Cursor) -> Result<usize, CursorError> {
        if cursor.table != self.id {
            return Err(CursorError::ForeignTable);
        }
        if cursor.version != self.version {
            return Err(CursorError::Invalidated {
                issued: cursor.version,
                current: self.version,
            });
        }
        debug_assert!(cursor.index <= self.slots.len());
        Ok(cursor.index.min(self.slots.len()))
    }

    /// Like [`checked_position`](Self::checked_position), rejecting the end.
    fn checked_slot(&self, cursor: &Cursor) -> Result<usize, CursorError> {
        let index = self.checked_position(cursor)?;
        if index == self.slots.len() {
            return Err(CursorError::AtEnd);
        }
        Ok(index)
    }

    /// Number of probe steps between the home slot of the entry at `index`
    /// and `index` itself.
    #[cfg(any(test, feature = "stats"))]
    fn probe_length(&self, index: usize) -> usize {
        let Slot::Live { hash, .. } = &self.slots[index] else {
            return 0;
        };
        let start = (*hash % self.slots.len() as u64) as usize;
        let mut probe = P::start(start, self.slots.len());
        let mut at = start;
        let mut steps = 0;
        while at != index {
            at = probe.advance();
            steps += 1;
        }
        steps
    }

    /// Computes a histogram of probe lengths over live entries.
    ///
    /// Index `n` of the returned vector counts entries found `n` probe steps
    /// after their home slot. The vector is empty for an empty table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for index in self.first_live..self.slots.len() {
            if !self.slots[index].is_live() {
                continue;
            }
            let steps = self.probe_length(index);
            if hist.len() <= steps {
                hist.resize(steps + 1, 0);
            }
            hist[steps] += 1;
        }
        hist
    }

    /// Returns occupancy and probe-length statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = self.slots.len();
        let hist = self.probe_histogram();
        let total_steps: usize = hist.iter().enumerate().map(|(n, c)| n * c).sum();

        DebugStats {
            populated: self.live,
            tombstones: self.tombstones,
            capacity: self.capacity_hint,
            total_slots,
            empty_slots: total_slots - self.live - self.tombstones,
            load_factor: self.load_factor(),
            occupancy: if total_slots == 0 {
                0.0
            } else {
                (self.live + self.tombstones) as f64 / total_slots as f64
            },
            max_probe_length: hist.len().saturating_sub(1),
            mean_probe_length: if self.live == 0 {
                0.0
            } else {
                total_steps as f64 / self.live as f64
            },
        }
    }

    /// Pretty-prints the probe-length histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.live);
        for (steps, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", steps, "█".repeat(width), count);
        }
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V, P = LinearProbing> {
    /// A vacant entry - the key is not present in the table
    Vacant(VacantEntry<'a, V, P>),
    /// An occupied entry - the key is present in the table
    Occupied(OccupiedEntry<'a, V, P>),
}

impl<'a, V, P: Probe> Entry<'a, V, P> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Slot index the entry resolved to.
    pub fn index(&self) -> usize {
        match self {
            Entry::Occupied(entry) => entry.index,
            Entry::Vacant(entry) => entry.index,
        }
    }
}

impl<'a, V, P> Entry<'a, V, P>
where
    V: Default,
    P: Probe,
{
    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the hash table.
///
/// The table has already grown if needed, so inserting never rebuilds it.
pub struct VacantEntry<'a, V, P = LinearProbing> {
    table: &'a mut HashTable<V, P>,
    index: usize,
    hash: u64,
}

impl<'a, V, P: Probe> VacantEntry<'a, V, P> {
    /// Installs `value` in the resolved slot and returns a mutable reference
    /// to it.
    pub fn insert(self, value: V) -> &'a mut V {
        self.table.install(self.index, self.hash, value)
    }

    /// Slot index the value will be installed at.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A view into an occupied entry in the hash table.
pub struct OccupiedEntry<'a, V, P = LinearProbing> {
    table: &'a mut HashTable<V, P>,
    index: usize,
}

impl<'a, V, P: Probe> OccupiedEntry<'a, V, P> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.table.live_ref(self.index)
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.live_mut(self.index)
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut V {
        let OccupiedEntry { table, index } = self;
        table.live_mut(index)
    }

    /// Removes the value, leaving a tombstone in its slot.
    pub fn remove(self) -> V {
        self.table.mark_tombstone(self.index)
    }

    /// Slot index of the value.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cursor at this entry's slot.
    pub fn cursor(&self) -> Cursor {
        self.table.cursor_at(self.index)
    }
}

/// An iterator over the values in a [`HashTable`], in slot order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Live { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> core::iter::FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`], in slot order.
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Live { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`]. Dropping
/// it removes whatever was not yet yielded. The table's counters are updated
/// slot by slot, so leaking the iterator leaves the rest of the values in
/// place.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V, P = LinearProbing> {
    table: &'a mut HashTable<V, P>,
    index: usize,
}

impl<V, P> Drop for Drain<'_, V, P> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<V, P> Iterator for Drain<'_, V, P> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let table = &mut *self.table;
        // Keep walking past the last value so tombstones get cleared too.
        while self.index < table.slots.len() {
            let index = self.index;
            self.index += 1;

            match core::mem::replace(&mut table.slots[index], Slot::Empty) {
                Slot::Live { value, .. } => {
                    table.live -= 1;
                    if index == table.first_live {
                        table.first_live = next_live(&table.slots, index + 1);
                    }
                    return Some(value);
                }
                Slot::Tombstone => table.tombstones -= 1,
                Slot::Empty => {}
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.live, Some(self.table.live))
    }
}

impl<V, P> ExactSizeIterator for Drain<'_, V, P> {}

/// An owning iterator over the values of a [`HashTable`], in slot order.
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Live { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V, P> IntoIterator for HashTable<V, P> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            slots: self.slots.into_iter(),
            remaining: self.live,
        }
    }
}

impl<'a, V, P: Probe> IntoIterator for &'a HashTable<V, P> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator that removes and yields the values matching a predicate.
///
/// This struct is created by the [`extract_if`] method on [`HashTable`].
///
/// [`extract_if`]: HashTable::extract_if
pub struct ExtractIf<'a, V, P, F> {
    table: &'a mut HashTable<V, P>,
    index: usize,
    pred: F,
}

impl<V, P, F> Iterator for ExtractIf<'_, V, P, F>
where
    P: Probe,
    F: FnMut(&mut V) -> bool,
{
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.table.slots.len() {
            let index = self.index;
            self.index += 1;

            if let Slot::Live { value, .. } = &mut self.table.slots[index] {
                if (self.pred)(value) {
                    return Some(self.table.mark_tombstone(index));
                }
            }
        }

        None
    }
}
