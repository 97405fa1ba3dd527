//! Compile-time-bound bypasses of encapsulation and standard-library
//! abstraction boundaries.
//!
//! Three independent capabilities, each fixed entirely at build time:
//!
//! - [`bind`]: tagged accessor generation for members a type never
//!   exported (fields by declared offset, methods by forwarding shims).
//! - [`layout`] / [`string`] / [`vector`]: non-owning pointer/length/
//!   capacity views over growable containers across several concrete
//!   runtime layouts, and construction of such containers over
//!   externally owned buffers.
//! - [`shared`] / [`stream`]: detaching a raw pointer from the sole
//!   surviving shared-ownership handle without touching its reference
//!   count, and resolving the OS descriptor underneath buffered stream
//!   abstractions.
//!
//! Nothing here runs in the background, allocates (outside the one
//! documented inline-copy case), or extends lifetimes. Every operation
//! is a bounded, synchronous view or transform over caller-owned memory
//! and caller-owned ownership state; thread safety is entirely the
//! caller's responsibility.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bind;
pub mod layout;
pub mod shared;
pub mod stream;
pub mod string;
pub mod vector;

pub use bind::{FieldBind, MethodBindMut, MethodBindOnce, MethodBindRef, Tag};
pub use layout::{CompressedPair, RawContainer, RawParts, StdAllocator, Unit, ZeroSized};
pub use shared::{detach, reattach, OwnershipError, SelfAware};
#[cfg(unix)]
pub use stream::{resolve_descriptor, resolve_fd, UNRESOLVED_FD};
#[cfg(any(unix, windows))]
pub use stream::{resolve_native_handle, NativeHandle, UNRESOLVED_HANDLE};
pub use string::{GnuString, MsvcString};
pub use vector::{GnuVec, LlvmVec, MsvcVec};
