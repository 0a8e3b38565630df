//! Synchronized state abstraction traits for platform-agnostic state access.
//!
//! The configuration store requires a single writer at a time. Sharing one
//! store between tasks, threads or interrupt handlers goes through the
//! `SharedState` trait, which serializes every access.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Platform-agnostic synchronized state access.
///
/// This trait abstracts over different synchronization mechanisms:
/// - `BlockingState<M, T>` using an embassy-sync blocking mutex
/// - `MockState<T>` for host testing using RefCell (single-threaded)
///
/// # Example
///
/// ```
/// use nvconfig::core::traits::{MockState, SharedState};
///
/// fn increment<S: SharedState<u32>>(state: &S) -> u32 {
///     state.with_mut(|value| {
///         *value += 1;
///         *value
///     })
/// }
///
/// let state = MockState::new(41u32);
/// assert_eq!(increment(&state), 42);
/// ```
pub trait SharedState<T> {
    /// Access state immutably.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Access state mutably.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

// ============================================================================
// Blocking Mutex Implementation
// ============================================================================

/// Synchronized state guarded by an embassy-sync blocking mutex.
///
/// With `CriticalSectionRawMutex` the state can be shared between async
/// tasks, interrupt handlers and (on the host) threads. The closure runs with
/// the lock held, so it must not block.
pub struct BlockingState<M: RawMutex, T> {
    inner: Mutex<M, RefCell<T>>,
}

impl<M: RawMutex, T> BlockingState<M, T> {
    /// Creates a new `BlockingState` wrapping the given value.
    ///
    /// This is a const fn, allowing static initialization.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Consumes the wrapper, returning the inner value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

impl<M: RawMutex, T> SharedState<T> for BlockingState<M, T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock synchronized state using RefCell for single-threaded testing.
///
/// # Panics
///
/// Panics if borrowing rules are violated (e.g., calling `with_mut` while
/// `with` is active). This indicates a bug in the test code.
pub struct MockState<T> {
    inner: RefCell<T>,
}

impl<T> MockState<T> {
    /// Creates a new `MockState` wrapping the given value.
    pub fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }
}

impl<T> SharedState<T> for MockState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }
}
