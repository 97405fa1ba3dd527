//! Tagged member accessors bound at build time.
//!
//! A member access path is declared once, at build time, with the
//! [`bind_field!`] or [`bind_method!`] macro: it names a host type, an
//! integer tag, and the member's exact shape. The macros register the
//! path as a trait impl keyed by the tag; the free functions in this
//! module ([`get`], [`get_mut`], [`take`], [`bound`], [`bound_mut`],
//! [`bound_once`]) then dispatch on the caller's self form. Tags are
//! scoped per host type, so the same tag on two types names two
//! unrelated paths.
//!
//! There is no runtime registry and no runtime failure mode: a path
//! whose declared shape does not match the member is a compile error,
//! and an undeclared `(type, tag)` pair simply has no impl to resolve.

use std::mem::ManuallyDrop;

/// Zero-sized routing token for a declared member access path.
///
/// Exists purely as documentation of the dispatch scheme: accessors are
/// selected by the `I` const parameter, never by a runtime value.
pub struct Tag<const I: i32>;

/// A build-time-declared path to a data member of `Self`.
///
/// Implemented by [`bind_field!`]; the three accessor functions mirror
/// the caller's self form exactly (`&self` yields a shared reference,
/// `&mut self` an exclusive one, by-value self moves the member out).
///
/// # Safety
///
/// `OFFSET` must be the byte offset of a field of type `Field` inside
/// `Self`, valid for the whole size of `Field`. The macro enforces
/// alignment and in-bounds checks at build time; hand-written impls
/// carry the same obligation.
pub unsafe trait FieldBind<const I: i32> {
    /// The member's type.
    type Field;
    /// Byte offset of the member inside the host type.
    const OFFSET: usize;
}

/// A build-time-declared path to a method taking `&self`.
pub trait MethodBindRef<const I: i32> {
    /// Forwarded argument tuple.
    type Args;
    /// The method's return type.
    type Output;
    /// Invoke the bound member with `self` as receiver.
    fn invoke(&self, args: Self::Args) -> Self::Output;
}

/// A build-time-declared path to a method taking `&mut self`.
pub trait MethodBindMut<const I: i32> {
    /// Forwarded argument tuple.
    type Args;
    /// The method's return type.
    type Output;
    /// Invoke the bound member with `self` as receiver.
    fn invoke_mut(&mut self, args: Self::Args) -> Self::Output;
}

/// A build-time-declared path to a method consuming `self`.
pub trait MethodBindOnce<const I: i32>: Sized {
    /// Forwarded argument tuple.
    type Args;
    /// The method's return type.
    type Output;
    /// Invoke the bound member, consuming the receiver.
    fn invoke_once(self, args: Self::Args) -> Self::Output;
}

/// Shared access to the field bound under tag `I`.
#[inline]
pub fn get<const I: i32, T: FieldBind<I>>(host: &T) -> &T::Field {
    // In bounds and aligned per the FieldBind contract.
    unsafe { &*(host as *const T).cast::<u8>().add(T::OFFSET).cast::<T::Field>() }
}

/// Exclusive access to the field bound under tag `I`.
#[inline]
pub fn get_mut<const I: i32, T: FieldBind<I>>(host: &mut T) -> &mut T::Field {
    unsafe { &mut *(host as *mut T).cast::<u8>().add(T::OFFSET).cast::<T::Field>() }
}

/// Move the field bound under tag `I` out of a by-value host.
///
/// The remainder of the host is forgotten, not dropped. Intended for
/// plain-data layouts where the sibling members own nothing.
#[inline]
pub fn take<const I: i32, T: FieldBind<I>>(host: T) -> T::Field {
    let host = ManuallyDrop::new(host);
    unsafe {
        std::ptr::read(
            (&*host as *const T)
                .cast::<u8>()
                .add(T::OFFSET)
                .cast::<T::Field>(),
        )
    }
}

/// A callable bound to `host`, forwarding arguments to the method
/// declared under tag `I` with an `&self` receiver.
#[inline]
pub fn bound<const I: i32, T: MethodBindRef<I>>(
    host: &T,
) -> impl Fn(T::Args) -> T::Output + '_ {
    move |args| host.invoke(args)
}

/// A callable bound to `host` for the `&mut self` path under tag `I`.
#[inline]
pub fn bound_mut<const I: i32, T: MethodBindMut<I>>(
    host: &mut T,
) -> impl FnMut(T::Args) -> T::Output + '_ {
    move |args| host.invoke_mut(args)
}

/// A callable consuming `host` for the by-value path under tag `I`.
#[inline]
pub fn bound_once<const I: i32, T: MethodBindOnce<I>>(
    host: T,
) -> impl FnOnce(T::Args) -> T::Output {
    move |args| host.invoke_once(args)
}

/// Declare a field access path: `bind_field!(Type, TAG, FieldTy, OFFSET)`.
///
/// Generates the [`FieldBind`] impl for `(Type, TAG)` plus build-time
/// checks that the offset respects the field type's alignment and that
/// the member lies entirely inside the host type. Declare it in a scope
/// where the offset is computable (`core::mem::offset_of!` where the
/// field is visible, or a documented layout constant for foreign
/// types).
#[macro_export]
macro_rules! bind_field {
    ($ty:ty, $tag:expr, $field:ty, $offset:expr) => {
        unsafe impl $crate::bind::FieldBind<{ $tag }> for $ty {
            type Field = $field;
            const OFFSET: usize = $offset;
        }
        const _: () = {
            assert!(
                ($offset) % ::core::mem::align_of::<$field>() == 0,
                "bound member offset violates the field type's alignment"
            );
            assert!(
                ($offset) + ::core::mem::size_of::<$field>() <= ::core::mem::size_of::<$ty>(),
                "bound member lies outside the host type"
            );
        };
    };
}

/// Declare a method access path.
///
/// Twelve shapes are recognized, each registered as a distinct code
/// path at declaration time: receiver `&self` / `&mut self` / `self`,
/// optionally `unsafe`, optionally `extern "C"`. The target is a path
/// to a free function (or extern symbol) whose first parameter is the
/// receiver; remaining arguments are forwarded positionally.
///
/// ```ignore
/// bind_method!(Widget, 1, fn(&self, factor: f64) -> f64 = widget_scale);
/// bind_method!(Widget, 2, unsafe extern "C" fn(&mut self) = widget_reset);
/// ```
#[macro_export]
macro_rules! bind_method {
    // --- &self receiver -------------------------------------------------
    ($ty:ty, $tag:expr, unsafe extern "C" fn(&self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@ref_unsafe $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, unsafe fn(&self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@ref_unsafe $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, extern "C" fn(&self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@ref $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, fn(&self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@ref $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };

    // --- &mut self receiver ---------------------------------------------
    ($ty:ty, $tag:expr, unsafe extern "C" fn(&mut self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@mut_unsafe $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, unsafe fn(&mut self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@mut_unsafe $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, extern "C" fn(&mut self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@mut $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, fn(&mut self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@mut $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };

    // --- by-value receiver ----------------------------------------------
    ($ty:ty, $tag:expr, unsafe extern "C" fn(self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@once_unsafe $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, unsafe fn(self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@once_unsafe $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, extern "C" fn(self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@once $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };
    ($ty:ty, $tag:expr, fn(self $(, $a:ident : $at:ty)*) $(-> $ret:ty)? = $target:path) => {
        $crate::bind_method!(@once $ty, $tag, [$($a : $at),*], ($($ret)?), $target);
    };

    // --- impl expansions ------------------------------------------------
    (@ref $ty:ty, $tag:expr, [$($a:ident : $at:ty),*], $ret:tt, $target:path) => {
        impl $crate::bind::MethodBindRef<{ $tag }> for $ty {
            type Args = ($($at,)*);
            type Output = $ret;
            #[inline]
            fn invoke(&self, args: Self::Args) -> Self::Output {
                let ($($a,)*) = args;
                $target(self, $($a),*)
            }
        }
    };
    (@ref_unsafe $ty:ty, $tag:expr, [$($a:ident : $at:ty),*], $ret:tt, $target:path) => {
        impl $crate::bind::MethodBindRef<{ $tag }> for $ty {
            type Args = ($($at,)*);
            type Output = $ret;
            #[inline]
            fn invoke(&self, args: Self::Args) -> Self::Output {
                let ($($a,)*) = args;
                unsafe { $target(self, $($a),*) }
            }
        }
    };
    (@mut $ty:ty, $tag:expr, [$($a:ident : $at:ty),*], $ret:tt, $target:path) => {
        impl $crate::bind::MethodBindMut<{ $tag }> for $ty {
            type Args = ($($at,)*);
            type Output = $ret;
            #[inline]
            fn invoke_mut(&mut self, args: Self::Args) -> Self::Output {
                let ($($a,)*) = args;
                $target(self, $($a),*)
            }
        }
    };
    (@mut_unsafe $ty:ty, $tag:expr, [$($a:ident : $at:ty),*], $ret:tt, $target:path) => {
        impl $crate::bind::MethodBindMut<{ $tag }> for $ty {
            type Args = ($($at,)*);
            type Output = $ret;
            #[inline]
            fn invoke_mut(&mut self, args: Self::Args) -> Self::Output {
                let ($($a,)*) = args;
                unsafe { $target(self, $($a),*) }
            }
        }
    };
    (@once $ty:ty, $tag:expr, [$($a:ident : $at:ty),*], $ret:tt, $target:path) => {
        impl $crate::bind::MethodBindOnce<{ $tag }> for $ty {
            type Args = ($($at,)*);
            type Output = $ret;
            #[inline]
            fn invoke_once(self, args: Self::Args) -> Self::Output {
                let ($($a,)*) = args;
                $target(self, $($a),*)
            }
        }
    };
    (@once_unsafe $ty:ty, $tag:expr, [$($a:ident : $at:ty),*], $ret:tt, $target:path) => {
        impl $crate::bind::MethodBindOnce<{ $tag }> for $ty {
            type Args = ($($at,)*);
            type Output = $ret;
            #[inline]
            fn invoke_once(self, args: Self::Args) -> Self::Output {
                let ($($a,)*) = args;
                unsafe { $target(self, $($a),*) }
            }
        }
    };
}
