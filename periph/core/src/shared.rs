//! Driver cell shared between thread and interrupt context

use core::cell::RefCell;
use critical_section::Mutex;

/// Slot holding a value reachable from interrupt handlers
///
/// Drivers are created at start-up and installed here so that the vendor
/// interrupt callback can forward completion events with [`Shared::with`].
pub struct Shared<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> Shared<T> {
    /// Create an empty cell
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install a value, returning the previously installed one
    pub fn install(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(value))
    }

    /// Remove the installed value
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Check whether a value is installed
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Run `f` on the installed value inside a critical section
    ///
    /// Returns `None` when nothing is installed or when called re-entrantly
    /// from within another `with` on the same cell.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow(cs).try_borrow_mut().ok()?;
            guard.as_mut().map(f)
        })
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::new()
    }
}
