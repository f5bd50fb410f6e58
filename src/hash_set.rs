use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::cursor::Cursor;
use crate::cursor::CursorError;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::probing::LinearProbing;
use crate::probing::Probe;

/// A hash set implemented using the open-addressing [`HashTable`] as the
/// underlying storage.
///
/// `HashSet<T, S, P>` stores values of type `T` where `T` implements
/// `Hash + Eq`, uses a configurable hasher builder `S` to hash values, and
/// resolves collisions with the probing policy `P` (linear unless named).
///
/// # Performance Characteristics
///
/// - **Memory**: two slots per unit of capacity, each holding a tag, a u64
///   hash, and `T`
pub struct HashSet<T, S, P = LinearProbing> {
    table: HashTable<T, P>,
    hash_builder: S,
}

impl<T, S, P> Clone for HashSet<T, S, P>
where
    T: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<T, S, P> PartialEq for HashSet<T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S, P> Eq for HashSet<T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
}

impl<T, S, P> Debug for HashSet<T, S, P>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new, linearly probed hash set with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use probe_hash::hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_hasher_and_probing(0, hash_builder)
    }

    /// Creates a new, linearly probed hash set able to hold `capacity` values
    /// without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use probe_hash::hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_capacity_and_hasher(100, RandomState::new());
    /// assert_eq!(set.capacity(), 128);
    /// # }
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_hasher_and_probing(capacity, hash_builder)
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new, linearly probed hash set using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    ///
    /// let set: HashSet<i32, DefaultHashBuilder> = HashSet::new();
    /// assert!(set.is_empty());
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new, linearly probed hash set with the specified capacity
    /// using the default hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S, P> HashSet<T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    /// Creates a new hash set probed with `P`, using the given hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    /// use probe_hash::QuadraticProbing;
    ///
    /// let mut set: HashSet<u8, _, QuadraticProbing> =
    ///     HashSet::with_hasher_and_probing(DefaultHashBuilder::default());
    /// assert!(set.insert(3));
    /// assert!(set.contains(&3));
    /// # }
    /// ```
    pub fn with_hasher_and_probing(hash_builder: S) -> Self {
        Self::with_capacity_hasher_and_probing(0, hash_builder)
    }

    /// Creates a new hash set probed with `P`, able to hold `capacity` values
    /// without growing.
    pub fn with_capacity_hasher_and_probing(capacity: usize, hash_builder: S) -> Self {
        Self {
            table: HashTable::with_capacity_and_probing(capacity),
            hash_builder,
        }
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of elements the set can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of physical slots, twice the capacity.
    pub fn physical_len(&self) -> usize {
        self.table.physical_len()
    }

    /// Returns the ratio of live elements to physical slots.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Removes all elements from the set, keeping its capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32, DefaultHashBuilder> = HashSet::new();
    /// set.insert(1);
    /// set.insert(2);
    ///
    /// let capacity = set.capacity();
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), capacity);
    /// # }
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the capacity of the set as much as possible.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Reserves capacity for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Rebuilds the set with room for at least `capacity` elements, never
    /// fewer than twice the current length.
    pub fn rehash(&mut self, capacity: usize) {
        self.table.rehash(capacity);
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. An equal value already
    /// in the set is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32, DefaultHashBuilder> = HashSet::new();
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Adds a value to the set, replacing and returning an equal value that
    /// was already present.
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            TableEntry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Returns `true` if the set contains the value.
    ///
    /// The value may be any borrowed form of the set's value type.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.contains(hash, |v| value.eq(v.borrow()))
    }

    /// Returns a reference to the stored value equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| value.eq(v.borrow()))
    }

    /// Removes a value from the set. Returns whether it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<String, DefaultHashBuilder> = HashSet::new();
    /// set.insert("x".to_string());
    /// assert!(set.remove("x"));
    /// assert!(!set.remove("x"));
    /// # }
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| value.eq(v.borrow()))
    }

    /// Returns an iterator over the values of the set, in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes all values from the set and returns them as an iterator.
    ///
    /// Invalidates every outstanding [`Cursor`].
    pub fn drain(&mut self) -> Drain<'_, T, P> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    ///
    /// let a: HashSet<_, DefaultHashBuilder> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<_, DefaultHashBuilder> = [4, 5].into_iter().collect();
    /// assert!(a.is_disjoint(&b));
    /// # }
    /// ```
    pub fn is_disjoint(&self, other: &HashSet<T, S, P>) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|v| !large.contains(v))
    }

    /// Returns `true` if every element of `self` is in `other`.
    pub fn is_subset(&self, other: &HashSet<T, S, P>) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every element of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<T, S, P>) -> bool {
        other.is_subset(self)
    }

    /// Visits the values in `self` or `other`, without duplicates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    ///
    /// let a: HashSet<_, DefaultHashBuilder> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<_, DefaultHashBuilder> = [3, 4].into_iter().collect();
    ///
    /// let mut union: Vec<_> = a.union(&b).copied().collect();
    /// union.sort();
    /// assert_eq!(union, [1, 2, 3, 4]);
    /// # }
    /// ```
    pub fn union<'a>(&'a self, other: &'a HashSet<T, S, P>) -> Union<'a, T, S, P> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            set: self,
        }
    }

    /// Visits the values in both `self` and `other`.
    pub fn intersection<'a>(&'a self, other: &'a HashSet<T, S, P>) -> Intersection<'a, T, S, P> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: small.iter(),
            other: large,
        }
    }

    /// Visits the values in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<T, S, P>) -> Difference<'a, T, S, P> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Visits the values in exactly one of `self` and `other`.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<T, S, P>,
    ) -> SymmetricDifference<'a, T, S, P> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Retains only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.table.retain(|v| f(&*v));
    }

    /// Returns an iterator that removes and yields the values for which `f`
    /// returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_hash::DefaultHashBuilder;
    /// use probe_hash::HashSet;
    ///
    /// let mut set: HashSet<i32, DefaultHashBuilder> = (0..10).collect();
    /// let mut evens: Vec<i32> = set.extract_if(|v| v % 2 == 0).collect();
    /// evens.sort();
    /// assert_eq!(evens, [0, 2, 4, 6, 8]);
    /// assert_eq!(set.len(), 5);
    /// # }
    /// ```
    pub fn extract_if<F>(&mut self, mut f: F) -> ExtractIf<'_, T, P, impl FnMut(&mut T) -> bool>
    where
        F: FnMut(&T) -> bool,
    {
        ExtractIf {
            inner: self.table.extract_if(move |v| f(&*v)),
        }
    }

    /// Returns a cursor at the first value in slot order.
    pub fn cursor(&self) -> Cursor {
        self.table.cursor()
    }

    /// Returns the end cursor.
    pub fn end_cursor(&self) -> Cursor {
        self.table.end_cursor()
    }

    /// Returns a cursor at `value`, or the end cursor if it is absent.
    pub fn find_cursor<Q>(&self, value: &Q) -> Cursor
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find_cursor(hash, |v| value.eq(v.borrow()))
    }

    /// Returns the value under `cursor`.
    pub fn get_at(&self, cursor: &Cursor) -> Result<&T, CursorError> {
        self.table.get_at(cursor)
    }

    /// Moves `cursor` to the next value in slot order, or to the end.
    pub fn advance(&self, cursor: &mut Cursor) -> Result<(), CursorError> {
        self.table.advance(cursor)
    }

    /// Removes the value under `cursor`, returning it and a cursor at the
    /// next value.
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(T, Cursor), CursorError> {
        self.table.remove_at(cursor)
    }

    /// Removes every value from `first` up to, but not including, `last` in
    /// slot order, returning how many were removed.
    pub fn remove_range(&mut self, first: Cursor, last: Cursor) -> Result<usize, CursorError> {
        self.table.remove_range(first, last)
    }
}

impl<T, S, P> Default for HashSet<T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
    P: Probe,
{
    fn default() -> Self {
        Self::with_hasher_and_probing(S::default())
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T, P = LinearProbing> {
    inner: crate::hash_table::Drain<'a, T, P>,
}

impl<T, P> Iterator for Drain<'_, T, P> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A consuming iterator over the values of a `HashSet`.
pub struct IntoIter<T> {
    inner: crate::hash_table::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, S, P> IntoIterator for HashSet<T, S, P> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S, P> IntoIterator for &'a HashSet<T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S, P> FromIterator<T> for HashSet<T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
    P: Probe,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, S, P> Extend<T> for HashSet<T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let additional = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(additional);
        for value in iter {
            self.insert(value);
        }
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S, P = LinearProbing> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    set: &'a HashSet<T, S, P>,
}

impl<'a, T, S, P> Iterator for Union<'a, T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        self.other_iter.by_ref().find(|v| !self.set.contains(*v))
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S, P = LinearProbing> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, P>,
}

impl<'a, T, S, P> Iterator for Intersection<'a, T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let other = self.other;
        self.iter.by_ref().find(|v| other.contains(*v))
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S, P = LinearProbing> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, P>,
}

impl<'a, T, S, P> Iterator for Difference<'a, T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let other = self.other;
        self.iter.by_ref().find(|v| !other.contains(*v))
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S, P = LinearProbing> {
    iter: core::iter::Chain<Difference<'a, T, S, P>, Difference<'a, T, S, P>>,
}

impl<'a, T, S, P> Iterator for SymmetricDifference<'a, T, S, P>
where
    T: Hash + Eq,
    S: BuildHasher,
    P: Probe,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator that removes and yields all values from the set that satisfy
/// a given predicate.
pub struct ExtractIf<'a, T, P, F> {
    inner: crate::hash_table::ExtractIf<'a, T, P, F>,
}

impl<T, P, F> Iterator for ExtractIf<'_, T, P, F>
where
    P: Probe,
    F: FnMut(&mut T) -> bool,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::probing::QuadraticProbing;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Uses an integer key as its own hash.
    #[derive(Clone, Default)]
    struct IdentityHashBuilder;

    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
    }

    impl BuildHasher for IdentityHashBuilder {
        type Hasher = IdentityHasher;

        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher::default()
        }
    }

    fn sip_set<T: Hash + Eq>(values: impl IntoIterator<Item = T>) -> HashSet<T, SipHashBuilder> {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.extend(values);
        set
    }

    #[test]
    fn test_new_and_with_capacity() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.physical_len(), 0);

        let set: HashSet<i32, SipHashBuilder> = HashSet::with_capacity(100);
        assert_eq!(set.capacity(), 128);
        assert_eq!(set.physical_len(), 256);

        let set = HashSet::<i32, _>::with_capacity_and_hasher(0, SipHashBuilder::default());
        assert_eq!(set.capacity(), 0);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert!(!set.insert(1));
        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_remove_take_get() {
        let mut set = sip_set([1, 2, 3]);

        assert!(set.remove(&2));
        assert!(!set.remove(&2));
        assert!(!set.remove(&4));
        assert_eq!(set.take(&1), Some(1));
        assert_eq!(set.take(&1), None);
        assert_eq!(set.get(&3), Some(&3));
        assert_eq!(set.get(&1), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_replace_keeps_one_copy() {
        #[derive(Debug)]
        struct Tagged(u32, &'static str);

        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl Eq for Tagged {}

        impl Hash for Tagged {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        assert!(set.replace(Tagged(1, "first")).is_none());
        let old = set.replace(Tagged(1, "second")).unwrap();
        assert_eq!(old.1, "first");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&Tagged(1, "")).map(|t| t.1), Some("second"));
    }

    #[test]
    fn test_clear_and_reserve() {
        let mut set = sip_set(0..10);
        let capacity = set.capacity();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), capacity);
        assert!(!set.contains(&3));

        set.reserve(1000);
        assert!(set.capacity() >= 1000);
        set.shrink_to_fit();
        assert_eq!(set.physical_len(), 0);
    }

    #[test]
    fn test_iter_into_iter_and_drain() {
        let mut set = sip_set([1, 2, 3]);

        let mut values: Vec<i32> = set.iter().copied().collect();
        values.sort();
        assert_eq!(values, [1, 2, 3]);
        assert_eq!((&set).into_iter().len(), 3);

        let mut drained: Vec<i32> = set.drain().collect();
        drained.sort();
        assert_eq!(drained, [1, 2, 3]);
        assert!(set.is_empty());

        set.extend([7, 8]);
        let mut owned: Vec<i32> = set.into_iter().collect();
        owned.sort();
        assert_eq!(owned, [7, 8]);
    }

    #[test]
    fn test_insert_remove_cycle() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        for _ in 0..10 {
            for i in 0..50 {
                assert!(set.insert(i));
            }
            assert_eq!(set.len(), 50);

            for i in 0..50 {
                assert!(set.remove(&i));
            }
            assert!(set.is_empty());
        }
        assert_eq!(set.capacity(), 64);
    }

    #[test]
    fn test_string_values() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        for word in ["hello", "world", "rust"] {
            assert!(set.insert(word.to_string()));
        }
        assert!(set.contains("hello"));
        assert!(set.contains(&"world".to_string()));
        assert!(!set.contains("missing"));
        assert!(!set.insert("hello".to_string()));
        assert_eq!(set.len(), 3);

        for i in 0..100 {
            let large_string = "x".repeat(1000) + &i.to_string();
            assert!(set.insert(large_string.clone()));
            assert!(set.contains(&large_string));
        }
        assert_eq!(set.len(), 103);
    }

    #[test]
    fn test_adjacent_keys_probe_past_each_other() {
        let mut set = HashSet::with_capacity_and_hasher(8, IdentityHashBuilder);
        for k in [3u64, 19, 35] {
            assert!(set.insert(k));
        }
        // 3, 19 and 35 share home slot 3 of 16; 4 is displaced by them.
        assert!(set.insert(4u64));
        assert_eq!(set.find_cursor(&4).index(), 6);

        assert!(set.remove(&19));
        assert!(set.contains(&35));
        assert!(set.contains(&4));
        assert!(set.insert(20));
        assert_eq!(set.find_cursor(&20).index(), 4);
    }

    #[test]
    fn test_set_relations() {
        let a = sip_set([1, 2, 3]);
        let b = sip_set([4, 5, 6]);
        let c = sip_set([1, 2]);

        assert!(a.is_disjoint(&b));
        assert!(!a.is_disjoint(&c));
        assert!(c.is_subset(&a));
        assert!(!a.is_subset(&c));
        assert!(a.is_subset(&a));
        assert!(a.is_superset(&c));
        assert!(!c.is_superset(&a));
    }

    #[test]
    fn test_set_operations() {
        let hasher = SipHashBuilder::default();
        let mut a = HashSet::with_hasher(hasher.clone());
        a.extend([1, 2, 3]);
        let mut b = HashSet::with_hasher(hasher);
        b.extend([3, 4, 5]);

        fn sorted<'a>(iter: impl Iterator<Item = &'a i32>) -> Vec<i32> {
            let mut v: Vec<i32> = iter.copied().collect();
            v.sort();
            v
        }

        assert_eq!(sorted(a.union(&b)), [1, 2, 3, 4, 5]);
        assert_eq!(sorted(a.intersection(&b)), [3]);
        assert_eq!(sorted(a.difference(&b)), [1, 2]);
        assert_eq!(sorted(b.difference(&a)), [4, 5]);
        assert_eq!(sorted(a.symmetric_difference(&b)), [1, 2, 4, 5]);
    }

    #[test]
    fn test_retain_and_extract_if() {
        let mut set = sip_set(0..20);
        set.retain(|v| v % 2 == 0);
        assert_eq!(set.len(), 10);

        let mut taken: Vec<i32> = set.extract_if(|v| *v >= 10).collect();
        taken.sort();
        assert_eq!(taken, [10, 12, 14, 16, 18]);
        assert_eq!(set.len(), 5);
        assert!(set.iter().all(|v| *v < 10));
    }

    #[test]
    fn test_equality_clone_and_debug() {
        let a: HashSet<i32, SipHashBuilder> = (0..5).collect();
        let b: HashSet<i32, SipHashBuilder> = (0..5).rev().collect();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.remove(&0);
        assert_ne!(a, c);
        c.insert(9);
        assert_ne!(a, c);

        let single = sip_set([42]);
        assert_eq!(format!("{single:?}"), "{42}");
    }

    #[test]
    fn test_cursor_walk_and_remove() {
        let mut set = HashSet::with_capacity_and_hasher(8, IdentityHashBuilder);
        for k in [2u64, 5, 11] {
            set.insert(k);
        }

        let mut cursor = set.cursor();
        let mut seen = Vec::new();
        while cursor != set.end_cursor() {
            seen.push(*set.get_at(&cursor).unwrap());
            set.advance(&mut cursor).unwrap();
        }
        assert_eq!(seen, [2, 5, 11]);

        let at_five = set.find_cursor(&5);
        let (value, next) = set.remove_at(at_five).unwrap();
        assert_eq!(value, 5);
        assert_eq!(set.get_at(&next), Ok(&11));
        assert_eq!(set.get_at(&at_five), Err(CursorError::Vacant { index: 5 }));

        let other = set.clone();
        assert_eq!(other.get_at(&next), Err(CursorError::ForeignTable));

        set.rehash(64);
        assert!(matches!(
            set.get_at(&next),
            Err(CursorError::Invalidated { .. })
        ));
    }

    #[test]
    fn test_remove_range() {
        let mut set = HashSet::with_capacity_and_hasher(8, IdentityHashBuilder);
        for k in [2u64, 5, 11] {
            set.insert(k);
        }

        let first = set.find_cursor(&5);
        assert_eq!(set.remove_range(first, set.end_cursor()), Ok(2));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [2]);
        assert_eq!(set.remove_range(first, first), Ok(0));
    }

    #[test]
    fn test_extend_reserves_for_new_values() {
        let mut set = HashSet::with_capacity_and_hasher(32, IdentityHashBuilder);
        set.extend(0..20u64);
        assert_eq!(set.capacity(), 32);

        set.extend(0..20u64);
        assert_eq!(set.capacity(), 32);
        assert_eq!(set.len(), 20);

        set.extend(10..40u64);
        assert_eq!(set.capacity(), 64);
        assert_eq!(set.len(), 40);
    }

    #[test]
    fn test_leaked_drain_keeps_set_usable() {
        let mut set = sip_set([1, 2, 3]);
        core::mem::forget(set.drain());
        assert_eq!(set.len(), 3);
        assert!(set.remove(&2));
        assert!(set.insert(2));
        assert!(!set.insert(3));
        assert_eq!(set.iter().count(), 3);
    }

    #[test]
    fn test_quadratic_set() {
        let mut set: HashSet<u64, IdentityHashBuilder, QuadraticProbing> =
            HashSet::with_hasher_and_probing(IdentityHashBuilder);
        for i in 0..500u64 {
            assert!(set.insert(i * 64));
        }
        for i in (0..500u64).step_by(3) {
            assert!(set.remove(&(i * 64)));
        }
        for i in 0..500u64 {
            assert_eq!(set.contains(&(i * 64)), i % 3 != 0);
        }
        assert!(set.load_factor() <= 0.5);
    }

    #[test]
    fn test_numeric_types() {
        let u8_set = sip_set(0u8..=255u8);
        assert_eq!(u8_set.len(), 256);

        let u64_set = sip_set((0u64..100u64).map(|i| i * 1_000_000_000));
        assert_eq!(u64_set.len(), 100);

        let i32_set = sip_set(-50i32..50i32);
        assert_eq!(i32_set.len(), 100);
    }
}
