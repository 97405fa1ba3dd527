//! Externalizing and re-internalizing shared-ownership state.
//!
//! [`detach`] moves ownership out of an `Arc` handle into a bare
//! pointer without perturbing the strong count; [`reattach`] re-derives
//! a handle from that pointer later. Both operations are guarded by the
//! pointee's self-awareness capability ([`SelfAware`]): an object built
//! with [`Arc::new_cyclic`] can re-derive a handle sharing its original
//! control block, which lets the guards reject handles constructed over
//! an unrelated block.
//!
//! Between detach and reattach the control block records one fewer live
//! handle object than its strong count suggests. Reattach must run
//! before any other release drops the count to zero, or it will observe
//! a released control block; racing a detach/reattach pair against
//! sibling handle operations on the same block is likewise a caller
//! contract violation. The guarded checks cover control-block identity
//! and liveness only.

use std::ptr::NonNull;
use std::sync::{Arc, Weak};
use thiserror::Error;

/// Failure conditions of the ownership-transfer operations.
///
/// Always surfaced to the caller; never retried internally.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipError {
    /// The handle and the pointee's self-awareness reference different
    /// control blocks (the handle was built over a sub-object or
    /// externally owned memory).
    #[error("handle does not share the pointee's control block")]
    ForeignControlBlock,

    /// The pointee has no live shared-ownership state: it was fully
    /// released, or never had a live shared handle.
    #[error("pointee has no live shared-ownership state")]
    NotShared,
}

/// The self-awareness capability: an object's ability to re-derive a
/// handle referencing itself and its original control block.
///
/// Implement by storing the `Weak` handed out by [`Arc::new_cyclic`]:
///
/// ```ignore
/// struct Node { me: Weak<Node> }
///
/// impl SelfAware for Node {
///     fn weak_self(&self) -> Weak<Self> {
///         self.me.clone()
///     }
/// }
///
/// let node = Arc::new_cyclic(|me| Node { me: me.clone() });
/// ```
///
/// An object constructed outside any `Arc` should return `Weak::new()`,
/// which [`reattach`] reports as [`OwnershipError::NotShared`] and
/// [`detach`] rejects as [`OwnershipError::ForeignControlBlock`].
pub trait SelfAware: Sized {
    /// A weak handle over this object's original control block.
    fn weak_self(&self) -> Weak<Self>;
}

/// Move ownership out of `handle` into a bare pointer, leaving the
/// strong count untouched.
///
/// The pointee's self-awareness is queried for a second handle over the
/// same object; if its control block differs from `handle`'s, the
/// operation fails with [`OwnershipError::ForeignControlBlock`] and
/// `handle` is released normally. On success the handle is consumed
/// without a count decrement and the raw pointer is returned; the
/// caller now holds the count that `handle` held.
pub fn detach<T: SelfAware>(handle: Arc<T>) -> Result<NonNull<T>, OwnershipError> {
    let ours = Arc::downgrade(&handle);
    let theirs = handle.weak_self();
    if !Weak::ptr_eq(&ours, &theirs) {
        return Err(OwnershipError::ForeignControlBlock);
    }
    let raw = Arc::into_raw(handle);
    // Arc::into_raw never yields null.
    Ok(unsafe { NonNull::new_unchecked(raw.cast_mut()) })
}

/// Re-internalize a pointer previously produced by [`detach`] into a
/// fresh handle over the original control block.
///
/// Self-awareness is queried through the pointee: if no live
/// shared-ownership state remains, the operation fails with
/// [`OwnershipError::NotShared`]; if the state resolves to a different
/// object, with [`OwnershipError::ForeignControlBlock`]. On success the
/// detached count is folded back into the returned handle, so a
/// detach/reattach pair on the unique strong holder reproduces a handle
/// with strong count 1 and the same object identity.
///
/// # Safety
///
/// `ptr` must come from a successful [`detach`] whose count has not
/// already been re-internalized, and the pointee must still be live
/// (no other release may have dropped the strong count to zero in the
/// meantime).
pub unsafe fn reattach<T: SelfAware>(ptr: NonNull<T>) -> Result<Arc<T>, OwnershipError> {
    let theirs = ptr.as_ref().weak_self();
    let probe = theirs.upgrade().ok_or(OwnershipError::NotShared)?;
    if !std::ptr::eq(Arc::as_ptr(&probe), ptr.as_ptr()) {
        return Err(OwnershipError::ForeignControlBlock);
    }
    // `probe` releases its own increment when it drops; the returned
    // handle carries the count that detach externalized.
    Ok(Arc::from_raw(ptr.as_ptr()))
}
