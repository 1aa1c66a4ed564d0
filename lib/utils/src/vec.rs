use alloc::{collections::TryReserveError, vec, vec::Vec};
use core::fmt::Debug;
use spin::RwLock;

/// A vector behind a single reader/writer spin lock.
///
/// Every method takes the lock for its own duration only; no reference into the
/// vector ever escapes a call, so values are handed out by clone.
pub struct LockedVec<T> {
    inner: RwLock<Vec<T>>,
}

impl<T> LockedVec<T> {
    pub const fn new() -> LockedVec<T> {
        LockedVec {
            inner: RwLock::new(vec![]),
        }
    }

    pub fn push(&self, value: T) -> usize {
        let mut vec = self.inner.write();
        let index = vec.len();
        vec.push(value);
        index
    }

    /// Push without aborting on allocation failure.
    ///
    /// The value is handed back on failure so the caller decides what to do with it.
    pub fn try_push(&self, value: T) -> Result<usize, (T, TryReserveError)> {
        let mut vec = self.inner.write();
        if let Err(err) = vec.try_reserve(1) {
            return Err((value, err));
        }
        let index = vec.len();
        vec.push(value);
        Ok(index)
    }

    /// Push `value` unless an element already satisfies `pred`.
    ///
    /// The check and the insertion happen under one write lock. Returns `Ok(true)` when
    /// inserted and `Ok(false)` when a match was already present.
    pub fn try_push_unless(
        &self,
        value: T,
        pred: impl Fn(&T) -> bool,
    ) -> Result<bool, (T, TryReserveError)> {
        let mut vec = self.inner.write();
        if vec.iter().any(pred) {
            return Ok(false);
        }
        if let Err(err) = vec.try_reserve(1) {
            return Err((value, err));
        }
        vec.push(value);
        Ok(true)
    }

    /// Remove and return the first element matching `pred`.
    pub fn remove_first(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let mut vec = self.inner.write();
        let index = vec.iter().position(pred)?;
        Some(vec.swap_remove(index))
    }

    pub fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.inner.read().iter().any(pred)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<T: Clone> LockedVec<T> {
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.inner.read().iter().find(|x| pred(*x)).cloned()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.inner.read().clone()
    }
}

impl<T> Default for LockedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for LockedVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{:?}", &*self.inner.read()))
    }
}
