use crate::LockCell;
use std::fmt;

/// A thread-safe `i64`.
///
/// Arithmetic wraps around on overflow. Division by zero panics; the lock is
/// released and the value is left unchanged.
///
/// # Examples
/// ```
/// use safecell::SafeInt;
///
/// let counter = SafeInt::new(5);
/// counter.add(1);
/// assert_eq!(counter.mul_r(2), 12);
/// ```
#[derive(Default)]
pub struct SafeInt {
    value: LockCell<i64>,
}

/// Generates the locked operation, the locked operation returning the new
/// value, and the unsynchronized twins of both for one arithmetic operator.
macro_rules! arith_ops {
    ($(#[$doc:meta] $op:ident, $op_r:ident, $op_unsync:ident, $op_r_unsync:ident => $f:ident;)*) => {
        $(
            #[$doc]
            pub fn $op(&self, v: i64) {
                let mut value = self.value.write();
                *value = value.$f(v);
            }

            #[$doc]
            ///
            /// Returns the value after the operation, read under the same lock.
            pub fn $op_r(&self, v: i64) -> i64 {
                let mut value = self.value.write();
                *value = value.$f(v);
                *value
            }

            #[$doc]
            pub fn $op_unsync(&mut self, v: i64) {
                let value = self.value.get_mut();
                *value = value.$f(v);
            }

            #[$doc]
            ///
            /// Returns the value after the operation.
            pub fn $op_r_unsync(&mut self, v: i64) -> i64 {
                let value = self.value.get_mut();
                *value = value.$f(v);
                *value
            }
        )*
    };
}

impl SafeInt {
    pub const fn new(value: i64) -> Self {
        Self {
            value: LockCell::new(value),
        }
    }

    /// Returns the current value under the read lock.
    pub fn get(&self) -> i64 {
        *self.value.read()
    }

    /// Overwrites the value under the write lock.
    pub fn set(&self, v: i64) {
        *self.value.write() = v;
    }

    /// Replaces the value with `f(current)` while holding the write lock.
    ///
    /// **Locking behaviour:** Deadlock if `f` calls back into this cell.
    pub fn set_func<F>(&self, f: F)
    where
        F: FnOnce(i64) -> i64,
    {
        let mut value = self.value.write();
        *value = f(*value);
    }

    arith_ops! {
        /// Adds `v` to the value.
        add, add_r, add_unsync, add_r_unsync => wrapping_add;
        /// Subtracts `v` from the value.
        sub, sub_r, sub_unsync, sub_r_unsync => wrapping_sub;
        /// Multiplies the value by `v`.
        mul, mul_r, mul_unsync, mul_r_unsync => wrapping_mul;
        /// Divides the value by `v`, rounding toward zero. Panics if `v` is zero.
        div, div_r, div_unsync, div_r_unsync => wrapping_div;
    }

    pub fn get_unsync(&mut self) -> i64 {
        *self.value.get_mut()
    }

    pub fn set_unsync(&mut self, v: i64) {
        *self.value.get_mut() = v;
    }

    pub fn set_func_unsync<F>(&mut self, f: F)
    where
        F: FnOnce(i64) -> i64,
    {
        let value = self.value.get_mut();
        *value = f(*value);
    }

    pub fn into_inner(self) -> i64 {
        self.value.into_inner()
    }
}

impl From<i64> for SafeInt {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for SafeInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Int{{{}}}", self.get())
    }
}

impl fmt::Debug for SafeInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeInt")
            .field("value", &self.get())
            .finish()
    }
}
