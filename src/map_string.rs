use crate::LockCell;
use foldhash::fast::RandomState;
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

/// The map type stored inside a [`SafeStringMap`].
pub type StringMap = HashMap<String, String, RandomState>;

/// A thread-safe `String` to `String` map guarded by a single reader/writer lock.
///
/// Point reads share the lock, point writes take it exclusively. Every
/// compound operation (`set_default_r`, `delete_r_ok`, `set_func`, ...) runs
/// under one lock acquisition, so its result always matches what was stored.
///
/// [`range`](Self::range) and [`range_b`](Self::range_b) copy the entries
/// under the read lock and call the callback after releasing it. The callback
/// may therefore call back into the same map.
///
/// Methods ending in `_unsync` take `&mut self` and skip the lock entirely.
/// They are meant for building up a map before it is shared.
///
/// # Examples
/// ```
/// use safecell::SafeStringMap;
///
/// let map = SafeStringMap::new();
/// map.set("foo", "bar");
/// assert_eq!(map.get("foo"), "bar");
/// assert_eq!(map.set_default_r("foo", "baz"), ("bar".to_string(), true));
///
/// map.range(|k, v| {
///     // Re-entering the map from the callback is fine.
///     map.set(format!("{k}2"), v);
/// });
/// assert_eq!(map.len(), 2);
/// ```
pub struct SafeStringMap {
    value: LockCell<StringMap>,
}

impl Default for SafeStringMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SafeStringMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map with room for at least `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            value: LockCell::new(HashMap::with_capacity_and_hasher(
                capacity,
                RandomState::default(),
            )),
        }
    }

    /// Creates a map holding a copy of every entry of `initial`.
    ///
    /// The new map is allocated with room for `max(initial.len(), size_hint)`
    /// entries. It never shares storage with `initial`.
    ///
    /// # Arguments
    ///
    /// * `initial` - The entries to copy.
    /// * `size_hint` - The expected number of entries.
    pub fn from_map<S>(initial: &HashMap<String, String, S>, size_hint: usize) -> Self {
        let mut map = Self::with_capacity(initial.len().max(size_hint));
        map.value
            .get_mut()
            .extend(initial.iter().map(|(k, v)| (k.clone(), v.clone())));
        map
    }

    /// Returns the value of `k`, or an empty string if absent.
    pub fn get(&self, k: &str) -> String {
        self.value.read().get(k).cloned().unwrap_or_default()
    }

    /// Returns the value of `k`, or `None` if absent.
    ///
    /// Unlike [`get`](Self::get) this tells an absent key apart from an empty
    /// value.
    pub fn get_ok(&self, k: &str) -> Option<String> {
        self.value.read().get(k).cloned()
    }

    /// Returns `true` if `k` is present, even with an empty value.
    pub fn has(&self, k: &str) -> bool {
        self.value.read().contains_key(k)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.value.read().len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.value.read().is_empty()
    }

    /// Inserts or overwrites the value of `k`.
    pub fn set(&self, k: impl Into<String>, v: impl Into<String>) {
        let (k, v) = (k.into(), v.into());
        self.value.write().insert(k, v);
    }

    /// Inserts `v` under `k` only if `k` is absent.
    pub fn set_default(&self, k: &str, v: impl Into<String>) {
        let mut value = self.value.write();
        if !value.contains_key(k) {
            value.insert(k.to_owned(), v.into());
        }
    }

    /// Inserts `v` under `k` only if `k` is absent.
    ///
    /// # Returns
    ///
    /// The value now stored under `k`, and `true` if the key already existed
    /// (in which case the stored value was left untouched).
    pub fn set_default_r(&self, k: &str, v: impl Into<String>) -> (String, bool) {
        let mut value = self.value.write();
        if let Some(existing) = value.get(k) {
            return (existing.clone(), true);
        }
        let v = v.into();
        value.insert(k.to_owned(), v.clone());
        (v, false)
    }

    /// Removes `k`. Does nothing if absent.
    pub fn delete(&self, k: &str) {
        self.value.write().remove(k);
    }

    /// Removes `k` and returns its value, or an empty string if absent.
    pub fn delete_r(&self, k: &str) -> String {
        self.value.write().remove(k).unwrap_or_default()
    }

    /// Removes `k` and returns its value, or `None` if nothing was removed.
    pub fn delete_r_ok(&self, k: &str) -> Option<String> {
        self.value.write().remove(k)
    }

    /// Stores `f(current)` under `k` while holding the write lock.
    ///
    /// `f` receives `None` if `k` is absent, so an absent key and an empty
    /// value can be told apart. The result is inserted if `k` was absent.
    ///
    /// **Locking behaviour:** Deadlock if `f` calls back into this map.
    ///
    /// # Examples
    /// ```
    /// use safecell::SafeStringMap;
    ///
    /// let map = SafeStringMap::new();
    /// let append = |v: Option<&str>| format!("{}x", v.unwrap_or("<"));
    /// map.set_func("k", append);
    /// map.set_func("k", append);
    /// assert_eq!(map.get("k"), "<xx");
    /// ```
    pub fn set_func<F>(&self, k: &str, f: F)
    where
        F: FnOnce(Option<&str>) -> String,
    {
        let mut value = self.value.write();
        update_entry(&mut value, k, f);
    }

    /// Calls `f` once per entry of a snapshot of the map.
    ///
    /// The snapshot is taken under the read lock, and `f` runs without any
    /// lock held. Writes made by `f` or by other threads during the traversal
    /// are not observed by it. The order is unspecified.
    pub fn range<F>(&self, mut f: F)
    where
        F: FnMut(&str, &str),
    {
        for (k, v) in self.snapshot() {
            f(&k, &v);
        }
    }

    /// Like [`range`](Self::range), but stops the first time `f` returns `false`.
    pub fn range_b<F>(&self, mut f: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for (k, v) in self.snapshot() {
            if !f(&k, &v) {
                break;
            }
        }
    }

    /// Returns a new map holding a copy of every entry.
    pub fn copy(&self) -> SafeStringMap {
        SafeStringMap::from(clone_map(&self.value.read()))
    }

    /// Copies every entry into `target`, overwriting existing keys.
    pub fn copy_data<S: BuildHasher>(&self, target: &mut HashMap<String, String, S>) {
        let value = self.value.read();
        target.extend(value.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Copies every entry into another `SafeStringMap`, overwriting existing
    /// keys.
    ///
    /// The two locks are never held together, so `map.copy_to(&map)` and two
    /// maps copying into each other concurrently do not deadlock.
    pub fn copy_to(&self, target: &SafeStringMap) {
        let snapshot = self.snapshot();
        target.value.write().extend(snapshot);
    }

    #[cfg(feature = "serde")]
    pub(crate) fn with_read<R>(&self, f: impl FnOnce(&StringMap) -> R) -> R {
        f(&self.value.read())
    }

    fn snapshot(&self) -> Vec<(String, String)> {
        let value = self.value.read();
        value.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn get_unsync(&mut self, k: &str) -> &str {
        self.value.get_mut().get(k).map_or("", String::as_str)
    }

    pub fn get_ok_unsync(&mut self, k: &str) -> Option<&str> {
        self.value.get_mut().get(k).map(String::as_str)
    }

    pub fn has_unsync(&mut self, k: &str) -> bool {
        self.value.get_mut().contains_key(k)
    }

    pub fn len_unsync(&mut self) -> usize {
        self.value.get_mut().len()
    }

    pub fn is_empty_unsync(&mut self) -> bool {
        self.value.get_mut().is_empty()
    }

    pub fn set_unsync(&mut self, k: impl Into<String>, v: impl Into<String>) {
        self.value.get_mut().insert(k.into(), v.into());
    }

    pub fn set_default_unsync(&mut self, k: &str, v: impl Into<String>) {
        let value = self.value.get_mut();
        if !value.contains_key(k) {
            value.insert(k.to_owned(), v.into());
        }
    }

    pub fn set_default_r_unsync(&mut self, k: &str, v: impl Into<String>) -> (&str, bool) {
        let value = self.value.get_mut();
        let existed = value.contains_key(k);
        if !existed {
            value.insert(k.to_owned(), v.into());
        }
        (value[k].as_str(), existed)
    }

    pub fn delete_unsync(&mut self, k: &str) {
        self.value.get_mut().remove(k);
    }

    pub fn delete_r_unsync(&mut self, k: &str) -> String {
        self.value.get_mut().remove(k).unwrap_or_default()
    }

    pub fn delete_r_ok_unsync(&mut self, k: &str) -> Option<String> {
        self.value.get_mut().remove(k)
    }

    pub fn set_func_unsync<F>(&mut self, k: &str, f: F)
    where
        F: FnOnce(Option<&str>) -> String,
    {
        update_entry(self.value.get_mut(), k, f);
    }

    /// Calls `f` once per entry of the live map, without taking a snapshot.
    pub fn range_unsync<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &str),
    {
        for (k, v) in self.value.get_mut().iter() {
            f(k, v);
        }
    }

    /// Like [`range_unsync`](Self::range_unsync), but stops the first time
    /// `f` returns `false`.
    pub fn range_b_unsync<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for (k, v) in self.value.get_mut().iter() {
            if !f(k, v) {
                break;
            }
        }
    }

    pub fn copy_unsync(&mut self) -> SafeStringMap {
        SafeStringMap::from(clone_map(self.value.get_mut()))
    }

    pub fn copy_data_unsync<S: BuildHasher>(&mut self, target: &mut HashMap<String, String, S>) {
        let value = self.value.get_mut();
        target.extend(value.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Copies every entry into `target` without locking `self`.
    ///
    /// `target` is a different map by construction, and its write lock is
    /// still taken.
    pub fn copy_to_unsync(&mut self, target: &SafeStringMap) {
        let value = self.value.get_mut();
        target
            .value
            .write()
            .extend(value.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Consumes the map and returns the inner `HashMap` without locking.
    pub fn into_inner(self) -> StringMap {
        self.value.into_inner()
    }
}

fn clone_map(map: &StringMap) -> StringMap {
    let mut copied = HashMap::with_capacity_and_hasher(map.len(), RandomState::default());
    copied.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
    copied
}

fn update_entry<F>(map: &mut StringMap, k: &str, f: F)
where
    F: FnOnce(Option<&str>) -> String,
{
    match map.get_mut(k) {
        Some(v) => {
            *v = f(Some(v.as_str()));
        }
        None => {
            let v = f(None);
            map.insert(k.to_owned(), v);
        }
    }
}

impl Clone for SafeStringMap {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<K, V> FromIterator<(K, V)> for SafeStringMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        let value = map.value.get_mut();
        value.extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
        map
    }
}

impl From<StringMap> for SafeStringMap {
    /// Takes ownership of `map`, so no copy is needed to avoid aliasing.
    fn from(map: StringMap) -> Self {
        Self {
            value: LockCell::new(map),
        }
    }
}

impl<S> From<&HashMap<String, String, S>> for SafeStringMap {
    fn from(initial: &HashMap<String, String, S>) -> Self {
        Self::from_map(initial, 0)
    }
}

impl fmt::Display for SafeStringMap {
    /// Prints `MapString{map[k1:v1 k2:v2]}` with keys in sorted order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = self.snapshot();
        entries.sort_unstable();
        f.write_str("MapString{map[")?;
        for (i, (k, v)) in entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}:{v}")?;
        }
        f.write_str("]}")
    }
}

impl fmt::Debug for SafeStringMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeStringMap")
            .field("value", &*self.value.read())
            .finish()
    }
}
