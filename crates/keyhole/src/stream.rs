//! Resolving the OS handle underneath buffered stream abstractions.
//!
//! Pure queries: given a stream buffer as `&dyn Any`, walk a fixed
//! chain of recognized backends and surface the descriptor they sit on.
//! Nothing is owned, created, or kept; absence of a resolvable handle
//! is a sentinel, never a failure. The result is a point-in-time
//! snapshot, only as consistent as the backend's own guarantees.
//!
//! Recognition order mirrors the backends' specificity: the file-backed
//! buffering wrappers first, then the process standard streams matched
//! by compiled type identity, then the sentinel.

#[cfg(any(unix, windows))]
use std::any::Any;
#[cfg(any(unix, windows))]
use std::fs::File;
#[cfg(any(unix, windows))]
use std::io::{BufReader, BufWriter, LineWriter, Stderr, Stdin, Stdout};

#[cfg(unix)]
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};
#[cfg(windows)]
use std::os::windows::io::{AsRawHandle, RawHandle};

/// Sentinel descriptor, distinct from every valid descriptor.
#[cfg(unix)]
pub const UNRESOLVED_FD: RawFd = -1;

/// Platform-native handle type.
#[cfg(unix)]
pub type NativeHandle = RawFd;
/// Platform-native handle type.
#[cfg(windows)]
pub type NativeHandle = RawHandle;

/// Sentinel native handle, distinct from every valid handle.
#[cfg(unix)]
pub const UNRESOLVED_HANDLE: NativeHandle = -1;
/// Sentinel native handle, distinct from every valid handle.
#[cfg(windows)]
pub const UNRESOLVED_HANDLE: NativeHandle = usize::MAX as NativeHandle;

/// Borrow the descriptor underneath a recognized stream buffer.
///
/// Returns `None` for unrecognized backends. The borrow is tied to the
/// stream reference; the descriptor is never owned.
#[cfg(unix)]
pub fn resolve_fd(stream: &dyn Any) -> Option<BorrowedFd<'_>> {
    // File-backed buffering wrappers first.
    if let Some(f) = stream.downcast_ref::<File>() {
        return Some(f.as_fd());
    }
    if let Some(b) = stream.downcast_ref::<BufReader<File>>() {
        return Some(b.get_ref().as_fd());
    }
    if let Some(b) = stream.downcast_ref::<BufWriter<File>>() {
        return Some(b.get_ref().as_fd());
    }
    if let Some(b) = stream.downcast_ref::<LineWriter<File>>() {
        return Some(b.get_ref().as_fd());
    }
    // Standard-stream backends, matched by compiled type identity.
    if let Some(s) = stream.downcast_ref::<Stdin>() {
        return Some(s.as_fd());
    }
    if let Some(s) = stream.downcast_ref::<Stdout>() {
        return Some(s.as_fd());
    }
    if let Some(s) = stream.downcast_ref::<Stderr>() {
        return Some(s.as_fd());
    }
    None
}

/// The raw descriptor underneath a recognized stream buffer, or
/// [`UNRESOLVED_FD`].
#[cfg(unix)]
pub fn resolve_descriptor(stream: &dyn Any) -> RawFd {
    resolve_fd(stream).map_or(UNRESOLVED_FD, |fd| fd.as_raw_fd())
}

/// The platform-native handle underneath a recognized stream buffer,
/// or [`UNRESOLVED_HANDLE`].
#[cfg(unix)]
pub fn resolve_native_handle(stream: &dyn Any) -> NativeHandle {
    // On this family the descriptor is the native handle.
    resolve_descriptor(stream)
}

/// The platform-native handle underneath a recognized stream buffer,
/// or [`UNRESOLVED_HANDLE`].
#[cfg(windows)]
pub fn resolve_native_handle(stream: &dyn Any) -> NativeHandle {
    if let Some(f) = stream.downcast_ref::<File>() {
        return f.as_raw_handle();
    }
    if let Some(b) = stream.downcast_ref::<BufReader<File>>() {
        return b.get_ref().as_raw_handle();
    }
    if let Some(b) = stream.downcast_ref::<BufWriter<File>>() {
        return b.get_ref().as_raw_handle();
    }
    if let Some(b) = stream.downcast_ref::<LineWriter<File>>() {
        return b.get_ref().as_raw_handle();
    }
    if let Some(s) = stream.downcast_ref::<Stdin>() {
        return s.as_raw_handle();
    }
    if let Some(s) = stream.downcast_ref::<Stdout>() {
        return s.as_raw_handle();
    }
    if let Some(s) = stream.downcast_ref::<Stderr>() {
        return s.as_raw_handle();
    }
    UNRESOLVED_HANDLE
}
