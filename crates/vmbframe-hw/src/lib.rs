//! vmbframe-hw — Native access to the Vimba C SDK.
//!
//! Loads `libVimbaC` at runtime, implements the frame entry points of
//! [`vmbframe_core::FrameSdk`] on top of it, and provides the camera
//! handle, feature reads and capture control a capture loop needs.

#![warn(unsafe_op_in_unsafe_fn)]

/// Call a VimbaC entry point and log its status code.
macro_rules! vmb_call {
    ($name:literal, $expr:expr) => {{
        let code = vmbframe_core::ErrorCode(unsafe { $expr });
        tracing::debug!(call = $name, code = code.0, "VimbaC call");
        code
    }};
}

pub mod camera;
pub mod ffi;
pub mod library;

pub use camera::{Camera, CameraError};
pub use library::{CameraInfo, LibraryError, VimbaLibrary};
