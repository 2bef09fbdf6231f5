use crate::RwLock;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

/// A value guarded by a [`RwLock`].
///
/// This is the storage shared by every wrapper in this crate. Readers get a
/// [`ReadGuard`], writers get a [`WriteGuard`], and the lock is released when
/// the guard is dropped, including during unwinding. There is no poisoning.
///
/// `LockCell` is neither `Clone` nor `Copy`, so the lock state can never be
/// duplicated. Share it by reference or through an `Arc`.
pub struct LockCell<T: ?Sized> {
    lock: RwLock,
    value: UnsafeCell<T>,
}

// Safety: the value is only reached through the lock, or through `&mut self`.
unsafe impl<T: ?Sized + Send> Send for LockCell<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for LockCell<T> {}

impl<T> LockCell<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            lock: RwLock::new(),
            value: UnsafeCell::new(value),
        }
    }

    /// Consumes the cell and returns the value without locking.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: ?Sized> LockCell<T> {
    /// Acquires shared access.
    ///
    /// **Locking behaviour:** Deadlock if called while the same thread holds a
    /// [`WriteGuard`] of this cell.
    #[inline]
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.lock.read();
        ReadGuard { cell: self }
    }

    /// Acquires exclusive access.
    ///
    /// **Locking behaviour:** Deadlock if called while the same thread holds
    /// any guard of this cell.
    #[inline]
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.lock.write();
        WriteGuard { cell: self }
    }

    /// Returns a mutable reference to the value without locking.
    ///
    /// The exclusive borrow guarantees that no guard is alive.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }
}

impl<T: Default> Default for LockCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// An RAII guard providing shared access to the value of a [`LockCell`].
pub struct ReadGuard<'a, T: ?Sized> {
    cell: &'a LockCell<T>,
}

impl<T: ?Sized> Deref for ReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: the shared lock is held for the lifetime of the guard.
        unsafe { &*self.cell.value.get() }
    }
}

impl<T: ?Sized> Drop for ReadGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        unsafe { self.cell.lock.read_unlock() };
    }
}

/// An RAII guard providing exclusive access to the value of a [`LockCell`].
pub struct WriteGuard<'a, T: ?Sized> {
    cell: &'a LockCell<T>,
}

impl<T: ?Sized> Deref for WriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: the exclusive lock is held for the lifetime of the guard.
        unsafe { &*self.cell.value.get() }
    }
}

impl<T: ?Sized> DerefMut for WriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // Safety: the exclusive lock is held for the lifetime of the guard.
        unsafe { &mut *self.cell.value.get() }
    }
}

impl<T: ?Sized> Drop for WriteGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        unsafe { self.cell.lock.write_unlock() };
    }
}
