use crate::LockCell;
use std::fmt;

/// A thread-safe `String`.
///
/// # Examples
/// ```
/// use safecell::SafeString;
///
/// let s = SafeString::new("hello");
/// assert_eq!(s.add_r(" world"), "hello world");
/// ```
#[derive(Default)]
pub struct SafeString {
    value: LockCell<String>,
}

impl SafeString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: LockCell::new(value.into()),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> String {
        self.value.read().clone()
    }

    /// Overwrites the value under the write lock.
    pub fn set(&self, v: impl Into<String>) {
        *self.value.write() = v.into();
    }

    /// Replaces the value with `f(current)` while holding the write lock.
    ///
    /// **Locking behaviour:** Deadlock if `f` calls back into this cell.
    pub fn set_func<F>(&self, f: F)
    where
        F: FnOnce(&str) -> String,
    {
        let mut value = self.value.write();
        *value = f(&value);
    }

    /// Appends `v` to the value.
    pub fn add(&self, v: &str) {
        self.value.write().push_str(v);
    }

    /// Appends `v` to the value and returns a copy of the result.
    pub fn add_r(&self, v: &str) -> String {
        let mut value = self.value.write();
        value.push_str(v);
        value.clone()
    }

    pub fn get_unsync(&mut self) -> &str {
        self.value.get_mut()
    }

    pub fn set_unsync(&mut self, v: impl Into<String>) {
        *self.value.get_mut() = v.into();
    }

    pub fn set_func_unsync<F>(&mut self, f: F)
    where
        F: FnOnce(&str) -> String,
    {
        let value = self.value.get_mut();
        *value = f(value.as_str());
    }

    pub fn add_unsync(&mut self, v: &str) {
        self.value.get_mut().push_str(v);
    }

    /// Appends `v` to the value and returns the result.
    pub fn add_r_unsync(&mut self, v: &str) -> &str {
        let value = self.value.get_mut();
        value.push_str(v);
        value
    }

    pub fn into_inner(self) -> String {
        self.value.into_inner()
    }
}

impl From<String> for SafeString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SafeString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "String{{{}}}", &*self.value.read())
    }
}

impl fmt::Debug for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeString")
            .field("value", &&*self.value.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_string_basic() {
        let s = SafeString::default();
        assert_eq!(s.get(), "");
        s.set("foo");
        s.add("bar");
        assert_eq!(s.get(), "foobar");
        assert_eq!(s.add_r("!"), "foobar!");
        s.set_func(|v| v.to_uppercase());
        assert_eq!(s.get(), "FOOBAR!");
        assert_eq!(s.to_string(), "String{FOOBAR!}");
        assert_eq!(format!("{:?}", s), r#"SafeString { value: "FOOBAR!" }"#);
    }

    #[test]
    fn test_string_unsync() {
        let mut s = SafeString::from("hello");
        s.add_unsync(" world");
        assert_eq!(s.get_unsync(), "hello world");
        s.set_func_unsync(|v| v.replace("world", "there"));
        assert_eq!(s.get_unsync(), "hello there");
        s.set_unsync("bye");
        assert_eq!(s.add_r_unsync("!"), "bye!");
        assert_eq!(s.into_inner(), "bye!");
    }

    #[test]
    fn test_string_concurrent_add() {
        let s = Arc::new(SafeString::default());
        const N: usize = 1 << 10;
        const M: usize = 8;

        let threads = (0..M)
            .map(|i| {
                let s = s.clone();
                std::thread::spawn(move || {
                    let c = char::from(b'a' + i as u8).to_string();
                    for _ in 0..N {
                        s.add(&c);
                    }
                })
            })
            .collect::<Vec<_>>();
        threads.into_iter().for_each(|t| t.join().unwrap());

        let value = s.get();
        assert_eq!(value.len(), N * M);
        for i in 0..M {
            let c = char::from(b'a' + i as u8);
            assert_eq!(value.chars().filter(|&x| x == c).count(), N);
        }
    }

    #[test]
    fn test_string_concurrent_set_get() {
        let s = Arc::new(SafeString::new("init"));
        const N: usize = 1 << 12;

        let setter = {
            let s = s.clone();
            std::thread::spawn(move || {
                for i in 0..N {
                    s.set(if i % 2 == 0 { "even" } else { "odd" });
                }
            })
        };
        let getter = {
            let s = s.clone();
            std::thread::spawn(move || {
                for _ in 0..N {
                    let v = s.get();
                    assert!(v == "init" || v == "even" || v == "odd");
                }
            })
        };
        setter.join().unwrap();
        getter.join().unwrap();
        assert_eq!(s.get(), "odd");
    }
}
