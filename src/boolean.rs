use crate::LockCell;
use std::fmt;

/// A thread-safe `bool`.
///
/// # Examples
/// ```
/// use safecell::SafeBool;
///
/// let flag = SafeBool::default();
/// flag.set(true);
/// assert!(!flag.invert_r());
/// ```
#[derive(Default)]
pub struct SafeBool {
    value: LockCell<bool>,
}

impl SafeBool {
    pub const fn new(value: bool) -> Self {
        Self {
            value: LockCell::new(value),
        }
    }

    /// Returns the current value under the read lock.
    pub fn get(&self) -> bool {
        *self.value.read()
    }

    /// Overwrites the value under the write lock.
    pub fn set(&self, v: bool) {
        *self.value.write() = v;
    }

    /// Replaces the value with `f(current)` while holding the write lock.
    ///
    /// **Locking behaviour:** Deadlock if `f` calls back into this cell.
    pub fn set_func<F>(&self, f: F)
    where
        F: FnOnce(bool) -> bool,
    {
        let mut value = self.value.write();
        *value = f(*value);
    }

    pub fn invert(&self) {
        let mut value = self.value.write();
        *value = !*value;
    }

    /// Inverts the value and returns the new one.
    pub fn invert_r(&self) -> bool {
        let mut value = self.value.write();
        *value = !*value;
        *value
    }

    pub fn get_unsync(&mut self) -> bool {
        *self.value.get_mut()
    }

    pub fn set_unsync(&mut self, v: bool) {
        *self.value.get_mut() = v;
    }

    pub fn set_func_unsync<F>(&mut self, f: F)
    where
        F: FnOnce(bool) -> bool,
    {
        let value = self.value.get_mut();
        *value = f(*value);
    }

    pub fn invert_unsync(&mut self) {
        let value = self.value.get_mut();
        *value = !*value;
    }

    pub fn invert_r_unsync(&mut self) -> bool {
        let value = self.value.get_mut();
        *value = !*value;
        *value
    }

    pub fn into_inner(self) -> bool {
        self.value.into_inner()
    }
}

impl From<bool> for SafeBool {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SafeBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bool{{{}}}", self.get())
    }
}

impl fmt::Debug for SafeBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeBool")
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_bool_basic() {
        let flag = SafeBool::default();
        assert!(!flag.get());
        flag.set(true);
        assert!(flag.get());
        flag.invert();
        assert!(!flag.get());
        assert!(flag.invert_r());
        flag.set_func(|v| !v);
        assert!(!flag.get());
        assert_eq!(flag.to_string(), "Bool{false}");
        assert_eq!(format!("{:?}", flag), "SafeBool { value: false }");
    }

    #[test]
    fn test_bool_unsync() {
        let mut flag = SafeBool::new(true);
        flag.invert_unsync();
        assert!(!flag.get_unsync());
        assert!(flag.invert_r_unsync());
        assert!(!flag.invert_r_unsync());
        flag.set_unsync(true);
        flag.set_func_unsync(|_| false);
        assert!(!flag.get_unsync());
        flag.set_unsync(true);
        assert!(flag.into_inner());
    }

    #[test]
    fn test_bool_concurrent_invert() {
        let flag = Arc::new(SafeBool::new(false));
        const N: usize = 1 << 12;
        const M: usize = 8;

        let threads = (0..M)
            .map(|_| {
                let flag = flag.clone();
                std::thread::spawn(move || {
                    for _ in 0..N {
                        flag.invert();
                    }
                })
            })
            .collect::<Vec<_>>();
        threads.into_iter().for_each(|t| t.join().unwrap());

        // An even number of inversions lands back on the start value.
        assert!(!flag.get());
    }
}
