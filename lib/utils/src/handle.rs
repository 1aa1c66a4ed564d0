//! Lightweight handle types for shared ownership and weak back references.
//!
//! Provide two complementary handle types:
//! - [Handle<T>] owns a strong reference to an object using [alloc::sync::Arc]. The bus keeps
//!   the one long-lived [Handle<T>] of every client; other copies should be temporary.
//! - [HandleRef<T>] stores a weak reference ([alloc::sync::Weak]) for records that refer to a
//!   client without owning it.
//!
//! Key guarantees and semantics:
//! - Call [Handle::create_ref] to derive a [HandleRef] from an existing strong [Handle].
//! - Call [HandleRef::get_handle] to attempt an upgrade; it returns [None] once the owner
//!   has dropped the object. **Consumers must handle the [None] case explicitly.**
//! - Identity is pointer identity: two handles are the same object iff
//!   [Handle::ptr_eq] / [HandleRef::refers_to] say so, regardless of `T: PartialEq`.
use alloc::sync::{Arc, Weak};
use core::ops::Deref;

#[derive(Debug)]
/// Strong owning handle backed by [Arc<T>].
pub struct Handle<T> {
    inner: Arc<T>,
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> From<T> for Handle<T> {
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Handle<T> {
    /// Create a non-owning [HandleRef<T>] to the same object.
    pub fn create_ref(&self) -> HandleRef<T> {
        HandleRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[derive(Debug)]
/// Weak (non-owning) handle backed by [Weak<T>].
pub struct HandleRef<T> {
    inner: Weak<T>,
}

impl<T> Clone for HandleRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> HandleRef<T> {
    /// Attempt to upgrade the weak reference into a strong [Handle<T>].
    ///
    /// Return `Some(Handle<T>)` if the target is still alive, otherwise `None`.
    pub fn get_handle(&self) -> Option<Handle<T>> {
        Weak::upgrade(&self.inner).map(|arc| Handle { inner: arc })
    }

    /// Whether this reference was created from `handle` (or a clone of it).
    ///
    /// Still answers correctly after the target is dropped; a dangling reference never
    /// matches a live handle.
    pub fn refers_to(&self, handle: &Handle<T>) -> bool {
        core::ptr::eq(self.inner.as_ptr(), Arc::as_ptr(&handle.inner))
    }
}
