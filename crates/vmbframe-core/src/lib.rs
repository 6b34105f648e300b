//! vmbframe-core — Frame buffer lifecycle over the Vimba C frame API.
//!
//! Drives one native buffer per [`Frame`] through announce, enqueue, wait,
//! read and revoke. The SDK is reached through the [`FrameSdk`] trait so the
//! same adapter runs against the native library (`vmbframe-hw`) or the
//! in-process [`fake::FakeSdk`].

#![warn(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod fake;
pub mod ffi;
pub mod frame;
pub mod pixel;
pub mod sdk;
pub mod status;

pub use ffi::CameraHandle;
pub use frame::{Frame, FrameError, FrameInfo, FrameState, DEFAULT_WAIT_TIMEOUT_MS};
pub use pixel::{pixel_bytes, PixelFormat, UnsupportedPixelFormat};
pub use sdk::{AcquisitionControl, CameraAttributes, FrameSdk};
pub use status::ErrorCode;
