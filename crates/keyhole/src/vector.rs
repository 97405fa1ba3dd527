//! Raw layouts of growable array containers.
//!
//! Three concrete layouts are recognized, one per runtime family:
//!
//! - [`GnuVec`]: the triple-pointer layout with named `start` /
//!   `finish` / `end_of_storage` fields;
//! - [`LlvmVec`]: the same triple, stored as a bare pointer array;
//! - [`MsvcVec`]: the triple wrapped in a compressed allocator+value
//!   pair, with the value member reached through the binder.
//!
//! The build-target family selects the [`CxxVec`] alias; targets
//! outside the recognized families get no alias, so using one is a
//! build-time failure rather than a silent wrong-offset aliasing.
//! Arrays have no small-buffer optimization, so construction is always
//! zero-copy. `Vec<T>` itself participates through its own sanctioned
//! raw-parts API.

use crate::bind;
use crate::layout::{CompressedPair, RawContainer, RawParts, StdAllocator, PAIR_VALUE};

/// Triple-pointer array layout with named fields.
///
/// # Memory layout
///
/// ```text
/// ┌────────────────┬────────────────┬────────────────┐
/// │ start          │ finish         │ end_of_storage │
/// └────────────────┴────────────────┴────────────────┘
///   len = finish - start,  cap = end_of_storage - start
/// ```
#[derive(Debug)]
#[repr(C)]
pub struct GnuVec<T> {
    start: *mut T,
    finish: *mut T,
    end_of_storage: *mut T,
}

impl<T> GnuVec<T> {
    /// First element.
    #[inline]
    pub fn start(&self) -> *mut T {
        self.start
    }

    /// One past the last live element.
    #[inline]
    pub fn finish(&self) -> *mut T {
        self.finish
    }

    /// One past the end of the allocated storage.
    #[inline]
    pub fn end_of_storage(&self) -> *mut T {
        self.end_of_storage
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        unsafe { self.finish.offset_from(self.start) as usize }
    }

    /// Whether the container holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.finish == self.start
    }

    /// Allocated element capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        unsafe { self.end_of_storage.offset_from(self.start) as usize }
    }
}

impl<T> Default for GnuVec<T> {
    fn default() -> Self {
        Self {
            start: std::ptr::null_mut(),
            finish: std::ptr::null_mut(),
            end_of_storage: std::ptr::null_mut(),
        }
    }
}

unsafe impl<T> RawContainer for GnuVec<T> {
    type Elem = T;

    #[inline]
    fn raw_parts(&self) -> RawParts<T> {
        RawParts::new(self.start, self.len(), self.capacity())
    }

    #[inline]
    unsafe fn from_raw_parts(ptr: *mut T, len: usize, cap: usize) -> Self {
        Self {
            start: ptr,
            finish: ptr.add(len),
            end_of_storage: ptr.add(cap.max(len)),
        }
    }
}

/// Triple-pointer array layout stored as a bare pointer array
/// (begin, end, end-of-capacity).
#[derive(Debug)]
#[repr(C)]
pub struct LlvmVec<T> {
    ptrs: [*mut T; 3],
}

impl<T> LlvmVec<T> {
    /// First element.
    #[inline]
    pub fn start(&self) -> *mut T {
        self.ptrs[0]
    }

    /// One past the last live element.
    #[inline]
    pub fn finish(&self) -> *mut T {
        self.ptrs[1]
    }

    /// One past the end of the allocated storage.
    #[inline]
    pub fn end_of_storage(&self) -> *mut T {
        self.ptrs[2]
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        unsafe { self.ptrs[1].offset_from(self.ptrs[0]) as usize }
    }

    /// Whether the container holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ptrs[1] == self.ptrs[0]
    }

    /// Allocated element capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        unsafe { self.ptrs[2].offset_from(self.ptrs[0]) as usize }
    }
}

impl<T> Default for LlvmVec<T> {
    fn default() -> Self {
        Self {
            ptrs: [std::ptr::null_mut(); 3],
        }
    }
}

unsafe impl<T> RawContainer for LlvmVec<T> {
    type Elem = T;

    #[inline]
    fn raw_parts(&self) -> RawParts<T> {
        RawParts::new(self.ptrs[0], self.len(), self.capacity())
    }

    #[inline]
    unsafe fn from_raw_parts(ptr: *mut T, len: usize, cap: usize) -> Self {
        Self {
            ptrs: [ptr, ptr.add(len), ptr.add(cap.max(len))],
        }
    }
}

/// Scalar field set wrapped by [`MsvcVec`]'s compressed pair.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct MsvcVecVal<T> {
    /// First element.
    pub first: *mut T,
    /// One past the last live element.
    pub last: *mut T,
    /// One past the end of the allocated storage.
    pub end: *mut T,
}

/// Triple-pointer array layout behind a compressed allocator+value
/// pair.
///
/// The pair's value member is private; this layout reaches it through
/// the binder path registered under [`PAIR_VALUE`], the one place the
/// raw layouts reuse the binder.
#[derive(Debug)]
#[repr(C)]
pub struct MsvcVec<T> {
    pair: CompressedPair<StdAllocator, MsvcVecVal<T>>,
}

impl<T> MsvcVec<T> {
    #[inline]
    fn val(&self) -> &MsvcVecVal<T> {
        bind::get::<{ PAIR_VALUE }, _>(&self.pair)
    }

    /// First element.
    #[inline]
    pub fn start(&self) -> *mut T {
        self.val().first
    }

    /// One past the last live element.
    #[inline]
    pub fn finish(&self) -> *mut T {
        self.val().last
    }

    /// One past the end of the allocated storage.
    #[inline]
    pub fn end_of_storage(&self) -> *mut T {
        self.val().end
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        unsafe { self.val().last.offset_from(self.val().first) as usize }
    }

    /// Whether the container holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.val().last == self.val().first
    }

    /// Allocated element capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        unsafe { self.val().end.offset_from(self.val().first) as usize }
    }
}

impl<T> Default for MsvcVec<T> {
    fn default() -> Self {
        Self {
            pair: CompressedPair::new(MsvcVecVal {
                first: std::ptr::null_mut(),
                last: std::ptr::null_mut(),
                end: std::ptr::null_mut(),
            }),
        }
    }
}

unsafe impl<T> RawContainer for MsvcVec<T> {
    type Elem = T;

    #[inline]
    fn raw_parts(&self) -> RawParts<T> {
        RawParts::new(self.val().first, self.len(), self.capacity())
    }

    #[inline]
    unsafe fn from_raw_parts(ptr: *mut T, len: usize, cap: usize) -> Self {
        Self {
            pair: CompressedPair::new(MsvcVecVal {
                first: ptr,
                last: ptr.add(len),
                end: ptr.add(cap.max(len)),
            }),
        }
    }
}

/// `Vec<T>` participates through its own raw-parts API; this is the
/// sanctioned zero-copy exchange endpoint on the native side.
unsafe impl<T> RawContainer for Vec<T> {
    type Elem = T;

    #[inline]
    fn raw_parts(&self) -> RawParts<T> {
        RawParts::new(self.as_ptr() as *mut T, self.len(), self.capacity())
    }

    #[inline]
    unsafe fn from_raw_parts(ptr: *mut T, len: usize, cap: usize) -> Self {
        Vec::from_raw_parts(ptr, len, cap.max(len))
    }
}

// Every recognized layout must match the documented ABI size before it
// may alias a native container.
const _: () = {
    use std::mem::{align_of, size_of};
    assert!(size_of::<GnuVec<u64>>() == 3 * size_of::<usize>());
    assert!(size_of::<LlvmVec<u64>>() == 3 * size_of::<usize>());
    assert!(size_of::<MsvcVec<u64>>() == 3 * size_of::<usize>());
    assert!(align_of::<GnuVec<u64>>() == align_of::<usize>());
    assert!(align_of::<LlvmVec<u64>>() == align_of::<usize>());
    assert!(align_of::<MsvcVec<u64>>() == align_of::<usize>());
};

/// Array layout of the active runtime family.
#[cfg(all(target_env = "gnu", not(target_vendor = "apple")))]
pub type CxxVec<T> = GnuVec<T>;

/// Array layout of the active runtime family.
#[cfg(target_vendor = "apple")]
pub type CxxVec<T> = LlvmVec<T>;

/// Array layout of the active runtime family.
#[cfg(target_env = "msvc")]
pub type CxxVec<T> = MsvcVec<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gnu_layout_round_trips_raw_parts() {
        let mut arr = [1i32, 2, 3, 0, 0, 0, 0, 0, 0, 0];
        let v = unsafe { GnuVec::from_raw_parts(arr.as_mut_ptr(), 3, 10) };
        assert_eq!(v.start(), arr.as_mut_ptr());
        assert_eq!(v.finish(), unsafe { arr.as_mut_ptr().add(3) });
        assert_eq!(v.end_of_storage(), unsafe { arr.as_mut_ptr().add(10) });
        let parts = v.raw_parts();
        assert_eq!(parts.ptr, arr.as_mut_ptr());
        assert_eq!(parts.len, 3);
        assert_eq!(parts.cap, 10);
        assert_eq!(unsafe { parts.elements() }, &[1, 2, 3]);
    }

    #[test]
    fn llvm_layout_round_trips_raw_parts() {
        let mut arr = [7i64, 8, 9, 0];
        let v = unsafe { LlvmVec::from_raw_parts(arr.as_mut_ptr(), 3, 4) };
        assert_eq!(v.len(), 3);
        assert_eq!(v.capacity(), 4);
        assert_eq!(v.raw_parts().ptr, arr.as_mut_ptr());
    }

    #[test]
    fn msvc_layout_round_trips_raw_parts() {
        let mut arr = [5u8, 6, 7, 8];
        let v = unsafe { MsvcVec::from_raw_parts(arr.as_mut_ptr(), 2, 4) };
        assert_eq!(v.start(), arr.as_mut_ptr());
        assert_eq!(v.len(), 2);
        assert_eq!(v.capacity(), 4);
        assert_eq!(unsafe { v.raw_parts().elements() }, &[5, 6]);
    }

    #[test]
    fn capacity_clamps_to_len() {
        let mut arr = [1u8, 2, 3, 4];
        let v = unsafe { GnuVec::from_raw_parts(arr.as_mut_ptr(), 4, 1) };
        assert_eq!(v.capacity(), 4);
    }

    #[test]
    fn default_is_empty() {
        let v: GnuVec<u32> = GnuVec::default();
        assert!(v.is_empty());
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 0);
        let v: LlvmVec<u32> = LlvmVec::default();
        assert!(v.is_empty());
        let v: MsvcVec<u32> = MsvcVec::default();
        assert!(v.is_empty());
    }

    #[test]
    fn views_do_not_own_the_buffer() {
        let mut arr = [1u16, 2, 3];
        {
            let v = unsafe { GnuVec::from_raw_parts(arr.as_mut_ptr(), 3, 3) };
            let _ = v.raw_parts();
        }
        // The layout value and its views are gone; the buffer is not.
        assert_eq!(arr, [1, 2, 3]);
    }
}
