//! Raw layouts of growable string containers.
//!
//! Two string layouts are recognized:
//!
//! - [`GnuString`]: pointer + size + a union of inline buffer and
//!   allocated capacity. Inline mode is discriminated by the pointer
//!   aiming into the object's own buffer, so a value built over an
//!   external buffer reads back as heap-backed and construction is
//!   always zero-copy; [`GnuString::promote_inline`] performs the
//!   inline copy as an explicit in-place step.
//! - [`MsvcString`]: the scalar fields behind a compressed
//!   allocator+value pair, with a union of inline buffer and heap
//!   pointer. Inline mode is discriminated by `capacity <= threshold`,
//!   so construction at or below the threshold must copy into the
//!   inline buffer, the one place this crate copies.
//!
//! Every layout stores 16 bytes of inline storage regardless of code
//! unit width; only the unit threshold changes. String buffers carry a
//! terminator unit after the logical contents, and the inline copy
//! moves `len + 1` units.
//!
//! The third recognized runtime family's string layout is not
//! supported: no alias is defined for it, and using one is a build-time
//! failure. `String` itself participates through its sanctioned
//! raw-parts API.

use crate::bind;
use crate::layout::{CompressedPair, RawContainer, RawParts, StdAllocator, Unit, PAIR_VALUE};
use std::mem::size_of;

/// Bytes of inline storage shared by every recognized string layout.
pub const INLINE_BYTES: usize = 16;

#[derive(Clone, Copy)]
#[repr(C)]
union GnuRepr {
    local: [u8; INLINE_BYTES],
    capacity: usize,
}

/// Pointer + size + capacity string layout with a pointer-discriminated
/// inline buffer.
///
/// # Memory layout
///
/// ```text
/// ┌────────────┬────────────┬──────────────────────────────┐
/// │ ptr        │ size       │ local buf (16B) ∪ capacity   │
/// └────────────┴────────────┴──────────────────────────────┘
///   inline mode ⇔ ptr points at the local buffer
/// ```
#[repr(C)]
pub struct GnuString<C: Unit> {
    ptr: *mut C,
    size: usize,
    repr: GnuRepr,
}

impl<C: Unit> GnuString<C> {
    /// Inline threshold in code units (excluding the terminator).
    pub const fn inline_capacity() -> usize {
        (INLINE_BYTES - 1) / size_of::<C>()
    }

    /// Start of the logical contents.
    #[inline]
    pub fn data(&self) -> *mut C {
        self.ptr
    }

    /// Logical length in code units.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the string holds no units.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether the contents live in the inline buffer.
    #[inline]
    pub fn is_inline(&self) -> bool {
        std::ptr::eq(self.ptr.cast::<u8>().cast_const(), self.local_ptr())
    }

    /// Capacity in code units: the inline threshold in inline mode,
    /// the stored allocated capacity otherwise.
    #[inline]
    pub fn capacity(&self) -> usize {
        if self.is_inline() {
            Self::inline_capacity()
        } else {
            // Heap mode: the union holds the allocated capacity.
            unsafe { self.repr.capacity }
        }
    }

    /// Copy the contents into the inline buffer and repoint at it.
    ///
    /// On this layout inline mode is discriminated by the pointer, so
    /// the inline copy cannot happen inside a constructor that returns
    /// by value (the buffer address is not final until the value has a
    /// resting place). Call this after placement; returns `false`
    /// without touching anything when the contents exceed the inline
    /// threshold, and `true` with no copy when the contents are
    /// already inline. Once promoted, moving the value leaves the
    /// pointer dangling, as it does for the native container; a moved
    /// value is invalid and must not be used further.
    pub fn promote_inline(&mut self) -> bool {
        if self.size > Self::inline_capacity() {
            return false;
        }
        if self.is_inline() {
            return true;
        }
        let src = self.ptr;
        self.repr = GnuRepr {
            local: [0; INLINE_BYTES],
        };
        let dst = std::ptr::addr_of_mut!(self.repr) as *mut C;
        if !src.is_null() {
            // Contents plus terminator, per the construction contract.
            unsafe { std::ptr::copy_nonoverlapping(src, dst, self.size + 1) };
        }
        self.ptr = dst;
        true
    }

    #[inline]
    fn local_ptr(&self) -> *const u8 {
        // The inline buffer sits at offset 0 of the union.
        std::ptr::addr_of!(self.repr) as *const u8
    }
}

impl<C: Unit> Default for GnuString<C> {
    fn default() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            size: 0,
            repr: GnuRepr { capacity: 0 },
        }
    }
}

unsafe impl<C: Unit> RawContainer for GnuString<C> {
    type Elem = C;

    #[inline]
    fn raw_parts(&self) -> RawParts<C> {
        RawParts::new(self.data(), self.len(), self.capacity())
    }

    /// Always zero-copy on this layout; see [`GnuString::promote_inline`]
    /// for the inline step.
    #[inline]
    unsafe fn from_raw_parts(ptr: *mut C, len: usize, cap: usize) -> Self {
        Self {
            ptr,
            size: len,
            repr: GnuRepr {
                capacity: cap.max(len),
            },
        }
    }
}

#[derive(Clone, Copy)]
#[repr(C)]
union MsvcBx<C: Unit> {
    buf: [u8; INLINE_BYTES],
    ptr: *mut C,
}

/// Scalar field set wrapped by [`MsvcString`]'s compressed pair.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct MsvcStringVal<C: Unit> {
    bx: MsvcBx<C>,
    size: usize,
    res: usize,
}

/// Capacity-discriminated string layout behind a compressed
/// allocator+value pair.
///
/// # Memory layout
///
/// ```text
/// ┌──────────────────────────────┬────────────┬────────────┐
/// │ buf (16B) ∪ heap ptr         │ size       │ res        │
/// └──────────────────────────────┴────────────┴────────────┘
///   inline mode ⇔ res <= inline threshold
/// ```
#[repr(C)]
pub struct MsvcString<C: Unit> {
    pair: CompressedPair<StdAllocator, MsvcStringVal<C>>,
}

impl<C: Unit> MsvcString<C> {
    /// Inline threshold in code units (excluding the terminator).
    pub const fn inline_capacity() -> usize {
        INLINE_BYTES / size_of::<C>() - 1
    }

    #[inline]
    fn val(&self) -> &MsvcStringVal<C> {
        bind::get::<{ PAIR_VALUE }, _>(&self.pair)
    }

    /// Whether the contents live in the inline buffer.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.val().res <= Self::inline_capacity()
    }

    /// Start of the logical contents.
    ///
    /// In inline mode this points into the object itself; moving the
    /// value invalidates previously returned pointers, as it does for
    /// the native container.
    #[inline]
    pub fn data(&self) -> *mut C {
        let val = self.val();
        if self.is_inline() {
            std::ptr::addr_of!(val.bx) as *mut C
        } else {
            unsafe { val.bx.ptr }
        }
    }

    /// Logical length in code units.
    #[inline]
    pub fn len(&self) -> usize {
        self.val().size
    }

    /// Whether the string holds no units.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.val().size == 0
    }

    /// Capacity in code units.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.val().res
    }
}

impl<C: Unit> Default for MsvcString<C> {
    fn default() -> Self {
        Self {
            pair: CompressedPair::new(MsvcStringVal {
                bx: MsvcBx {
                    buf: [0; INLINE_BYTES],
                },
                size: 0,
                res: Self::inline_capacity(),
            }),
        }
    }
}

unsafe impl<C: Unit> RawContainer for MsvcString<C> {
    type Elem = C;

    #[inline]
    fn raw_parts(&self) -> RawParts<C> {
        RawParts::new(self.data(), self.len(), self.capacity())
    }

    /// At or below the inline threshold the threshold is substituted as
    /// capacity and `len + 1` units are copied into the inline buffer;
    /// above it the buffer pointer becomes exactly `ptr`.
    unsafe fn from_raw_parts(ptr: *mut C, len: usize, cap: usize) -> Self {
        let mut val = MsvcStringVal {
            bx: MsvcBx { ptr },
            size: len,
            res: cap.max(len),
        };
        if val.res <= Self::inline_capacity() {
            val.res = Self::inline_capacity();
            let mut buf = [0u8; INLINE_BYTES];
            std::ptr::copy_nonoverlapping(
                ptr.cast::<u8>().cast_const(),
                buf.as_mut_ptr(),
                (len + 1) * size_of::<C>(),
            );
            val.bx = MsvcBx { buf };
        }
        Self {
            pair: CompressedPair::new(val),
        }
    }
}

/// `String` participates through its own raw-parts API; no inline
/// buffer, so exchange is always zero-copy.
unsafe impl RawContainer for String {
    type Elem = u8;

    #[inline]
    fn raw_parts(&self) -> RawParts<u8> {
        RawParts::new(self.as_ptr() as *mut u8, self.len(), self.capacity())
    }

    #[inline]
    unsafe fn from_raw_parts(ptr: *mut u8, len: usize, cap: usize) -> Self {
        String::from_raw_parts(ptr, len, cap.max(len))
    }
}

const _: () = {
    use std::mem::{align_of, size_of};
    assert!(size_of::<GnuString<u8>>() == 2 * size_of::<usize>() + INLINE_BYTES);
    assert!(size_of::<MsvcString<u8>>() == 2 * size_of::<usize>() + INLINE_BYTES);
    assert!(size_of::<GnuString<u32>>() == size_of::<GnuString<u8>>());
    assert!(size_of::<MsvcString<u16>>() == size_of::<MsvcString<u8>>());
    assert!(align_of::<GnuString<u8>>() == align_of::<usize>());
    assert!(align_of::<MsvcString<u8>>() == align_of::<usize>());
};

/// Narrow string layout of the active runtime family.
#[cfg(all(target_env = "gnu", not(target_vendor = "apple")))]
pub type CxxString = GnuString<u8>;

/// Wide string layout of the active runtime family.
#[cfg(all(target_env = "gnu", not(target_vendor = "apple")))]
pub type CxxWString = GnuString<u32>;

/// Narrow string layout of the active runtime family.
#[cfg(target_env = "msvc")]
pub type CxxString = MsvcString<u8>;

/// Wide string layout of the active runtime family.
#[cfg(target_env = "msvc")]
pub type CxxWString = MsvcString<u16>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_thresholds_follow_unit_width() {
        assert_eq!(GnuString::<u8>::inline_capacity(), 15);
        assert_eq!(GnuString::<u16>::inline_capacity(), 7);
        assert_eq!(GnuString::<u32>::inline_capacity(), 3);
        assert_eq!(MsvcString::<u8>::inline_capacity(), 15);
        assert_eq!(MsvcString::<u16>::inline_capacity(), 7);
        assert_eq!(MsvcString::<u32>::inline_capacity(), 3);
    }

    #[test]
    fn gnu_construction_is_zero_copy() {
        let mut buf = *b"x\0";
        let s = unsafe { GnuString::from_raw_parts(buf.as_mut_ptr(), 1, 0) };
        assert_eq!(s.data(), buf.as_mut_ptr());
        assert_eq!(s.len(), 1);
        assert_eq!(s.capacity(), 1);
        assert!(!s.is_inline());
    }

    #[test]
    fn gnu_promote_inline_copies_and_repoints() {
        let mut buf = *b"hello\0";
        let mut s = unsafe { GnuString::from_raw_parts(buf.as_mut_ptr(), 5, 0) };
        assert!(s.promote_inline());
        assert!(s.is_inline());
        assert_ne!(s.data(), buf.as_mut_ptr());
        assert_eq!(s.capacity(), GnuString::<u8>::inline_capacity());
        assert_eq!(unsafe { s.raw_parts().elements() }, b"hello");
    }

    #[test]
    fn gnu_promote_inline_is_idempotent() {
        let mut buf = *b"hello\0";
        let mut s = unsafe { GnuString::from_raw_parts(buf.as_mut_ptr(), 5, 0) };
        assert!(s.promote_inline());
        let data = s.data();
        // A second promotion is a no-op, not a re-copy.
        assert!(s.promote_inline());
        assert!(s.is_inline());
        assert_eq!(s.data(), data);
        assert_eq!(unsafe { s.raw_parts().elements() }, b"hello");
    }

    #[test]
    fn gnu_promote_refuses_long_contents() {
        let mut buf = *b"sixteen chars!!!\0";
        let mut s = unsafe { GnuString::from_raw_parts(buf.as_mut_ptr(), 16, 64) };
        assert!(!s.promote_inline());
        assert_eq!(s.data(), buf.as_mut_ptr());
        assert_eq!(s.capacity(), 64);
    }

    #[test]
    fn msvc_small_construction_copies_into_inline_buffer() {
        let mut buf = [0u8; 512];
        buf[0] = b'x';
        let s = unsafe { MsvcString::from_raw_parts(buf.as_mut_ptr(), 1, 0) };
        assert!(s.is_inline());
        assert_ne!(s.data(), buf.as_mut_ptr());
        assert_eq!(s.len(), 1);
        assert_eq!(s.capacity(), MsvcString::<u8>::inline_capacity());
        assert_eq!(unsafe { s.raw_parts().elements() }, b"x");
    }

    #[test]
    fn msvc_large_construction_aliases_exactly() {
        let mut buf = [0u8; 512];
        buf[0] = b'x';
        let s = unsafe { MsvcString::from_raw_parts(buf.as_mut_ptr(), 1, 511) };
        assert!(!s.is_inline());
        assert_eq!(s.data(), buf.as_mut_ptr());
        assert_eq!(s.len(), 1);
        assert_eq!(s.capacity(), 511);
    }

    #[test]
    fn msvc_threshold_boundary() {
        let mut buf = [0u8; 32];
        buf[..3].copy_from_slice(b"abc");
        let at = unsafe { MsvcString::from_raw_parts(buf.as_mut_ptr(), 3, 15) };
        assert!(at.is_inline());
        let above = unsafe { MsvcString::from_raw_parts(buf.as_mut_ptr(), 3, 16) };
        assert!(!above.is_inline());
        assert_eq!(above.capacity(), 16);
    }

    #[test]
    fn msvc_wide_units_copy_whole_units() {
        let mut buf: [u16; 8] = [0x2603, 0x2604, 0, 0, 0, 0, 0, 0];
        let s = unsafe { MsvcString::from_raw_parts(buf.as_mut_ptr(), 2, 0) };
        assert!(s.is_inline());
        assert_eq!(unsafe { s.raw_parts().elements() }, &[0x2603, 0x2604]);
    }

    #[test]
    fn msvc_default_is_empty_inline() {
        let s: MsvcString<u8> = MsvcString::default();
        assert!(s.is_inline());
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 15);
    }

    #[test]
    fn gnu_capacity_clamps_to_len() {
        let mut buf = *b"abcdefgh\0";
        let s = unsafe { GnuString::from_raw_parts(buf.as_mut_ptr(), 8, 2) };
        assert_eq!(s.capacity(), 8);
    }
}
