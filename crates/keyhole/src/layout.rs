//! Shared vocabulary for the raw container layouts.
//!
//! The concrete layouts in [`crate::string`] and [`crate::vector`] are
//! version-pinned binary knowledge: each is a `#[repr(C)]` rendition of
//! one recognized runtime family's container, validated by `const`
//! assertions against the documented ABI sizes. An unrecognized family
//! has no type at all, so misuse fails at build time rather than
//! silently aliasing the wrong offsets.

use crate::bind::FieldBind;
use std::marker::PhantomData;

/// Non-owning structural view of a growable container's internals.
///
/// Plain data: copying or dropping a view never affects the aliased
/// container. The view is a point-in-time snapshot; it is the caller's
/// contract that the container is not resized (or concurrently
/// mutated) while the view is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawParts<T> {
    /// Start of the element buffer.
    pub ptr: *mut T,
    /// Number of live elements.
    pub len: usize,
    /// Allocated element capacity, `>= len`.
    pub cap: usize,
}

impl<T> RawParts<T> {
    /// Assemble a view from its fields. `cap` is clamped to `len`.
    #[inline]
    pub fn new(ptr: *mut T, len: usize, cap: usize) -> Self {
        Self {
            ptr,
            len,
            cap: cap.max(len),
        }
    }

    /// The live elements as a slice.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len` initialized elements for
    /// the duration of the returned borrow, and the aliased container
    /// must not be mutated while the slice is live.
    #[inline]
    pub unsafe fn elements(&self) -> &[T] {
        if self.len == 0 {
            &[]
        } else {
            std::slice::from_raw_parts(self.ptr, self.len)
        }
    }
}

/// A container whose internal buffer pointer, length, and capacity are
/// readable and writable through a recognized concrete layout.
///
/// # Safety
///
/// Implementations must read and write the container's real fields:
/// a value produced by [`RawContainer::from_raw_parts`] must be
/// bit-compatible with the container's native type, so that reading it
/// through the native API (or vice versa) is defined. That
/// bit-compatibility, not mere field access, is the contract.
pub unsafe trait RawContainer: Sized {
    /// Element type of the container.
    type Elem;

    /// Read pointer, length, and capacity via the concrete layout.
    fn raw_parts(&self) -> RawParts<Self::Elem>;

    /// Construct a container logically holding `len` elements starting
    /// at `ptr`, with effective capacity `max(len, cap)`.
    ///
    /// Zero-copy: the container's buffer pointer becomes exactly `ptr`,
    /// with no bounds validation of the caller-supplied capacity beyond
    /// the max-with-length clamp. Layouts with a small-buffer
    /// optimization whose discrimination demands it substitute the
    /// inline threshold as capacity and copy `len + 1` units into the
    /// inline storage instead (the one copying case; see the concrete
    /// types for which layouts do this).
    ///
    /// # Safety
    ///
    /// `ptr` must point to at least `max(len, cap)` elements (plus the
    /// terminator unit for string layouts) that stay valid for the
    /// container's lifetime, and the caller must not let the native
    /// type's destructor run over memory it does not own.
    unsafe fn from_raw_parts(ptr: *mut Self::Elem, len: usize, cap: usize) -> Self;
}

/// Plain code-unit types usable as string elements.
///
/// # Safety
///
/// Implementors must be plain scalars with no padding, no drop glue,
/// and size dividing 16 (the inline storage width shared by every
/// recognized string layout).
pub unsafe trait Unit: Copy + 'static {}

unsafe impl Unit for u8 {}
unsafe impl Unit for u16 {}
unsafe impl Unit for u32 {}

/// Marker for allocator types that occupy no storage.
///
/// # Safety
///
/// The type must be a ZST; [`CompressedPair`] relies on it vanishing
/// from the layout entirely.
pub unsafe trait ZeroSized {}

/// The stateless standard allocator, compressed to zero size.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdAllocator;

unsafe impl ZeroSized for StdAllocator {}

/// Tag under which [`CompressedPair`] exposes its private value field
/// through the binder.
pub const PAIR_VALUE: i32 = -1;

/// A compressed allocator+value pair: the empty-base trick rendered as
/// a layout, wrapping one of the scalar field sets.
///
/// The value member is deliberately private; the recognized layouts
/// that wrap their fields in this pair reach it through the binder path
/// declared under [`PAIR_VALUE`], the same mechanism callers use for
/// any other unexported member.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct CompressedPair<A: ZeroSized, V> {
    alloc: PhantomData<A>,
    value: V,
}

impl<A: ZeroSized, V> CompressedPair<A, V> {
    /// Wrap a value with a compressed-away allocator.
    #[inline]
    pub const fn new(value: V) -> Self {
        Self {
            alloc: PhantomData,
            value,
        }
    }
}

unsafe impl<A: ZeroSized, V> FieldBind<{ PAIR_VALUE }> for CompressedPair<A, V> {
    type Field = V;
    // The allocator occupies no storage, so the value sits at offset 0.
    const OFFSET: usize = 0;
}

const _: () = {
    assert!(
        std::mem::size_of::<CompressedPair<StdAllocator, [usize; 3]>>()
            == 3 * std::mem::size_of::<usize>(),
        "compressed pair must add no storage over its value"
    );
    assert!(
        std::mem::align_of::<CompressedPair<StdAllocator, [usize; 3]>>()
            == std::mem::align_of::<usize>()
    );
};
