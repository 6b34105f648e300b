//! Capability traits over the SDK.
//!
//! The frame adapter only needs four entry points; capture-engine control
//! lives in a separate trait so a capture loop can run against either the
//! native library or [`crate::fake::FakeSdk`].

use crate::ffi::{CameraHandle, VmbFrame};
use crate::status::ErrorCode;

/// The four frame entry points of the SDK.
///
/// Methods take the descriptor by raw pointer because the SDK keeps that
/// pointer (and the buffer it references) between calls and writes through
/// it while a frame is queued.
pub trait FrameSdk {
    /// `VmbFrameAnnounce`.
    ///
    /// # Safety
    ///
    /// `frame` must point to a descriptor whose address stays fixed, and
    /// whose `buffer` stays allocated for `buffer_size` bytes, until a
    /// successful `frame_revoke` for the same pointer.
    unsafe fn frame_announce(&self, camera: CameraHandle, frame: *mut VmbFrame, size: u32)
        -> ErrorCode;

    /// `VmbFrameRevoke`.
    ///
    /// # Safety
    ///
    /// `frame` must be valid for reads for the duration of the call.
    unsafe fn frame_revoke(&self, camera: CameraHandle, frame: *mut VmbFrame) -> ErrorCode;

    /// `VmbCaptureFrameQueue` without a completion callback.
    ///
    /// # Safety
    ///
    /// Same contract as [`FrameSdk::frame_announce`].
    unsafe fn capture_frame_queue(&self, camera: CameraHandle, frame: *mut VmbFrame) -> ErrorCode;

    /// `VmbCaptureFrameWait`. Blocks up to `timeout_ms`.
    ///
    /// # Safety
    ///
    /// Same contract as [`FrameSdk::frame_announce`].
    unsafe fn capture_frame_wait(
        &self,
        camera: CameraHandle,
        frame: *mut VmbFrame,
        timeout_ms: u32,
    ) -> ErrorCode;
}

/// Capture engine and acquisition control for one camera.
pub trait AcquisitionControl {
    /// `VmbCaptureStart`: prepare the host side to receive frames.
    fn capture_start(&self) -> Result<(), ErrorCode>;
    /// `VmbCaptureEnd`.
    fn capture_end(&self) -> Result<(), ErrorCode>;
    /// `VmbCaptureQueueFlush`: hand every queued frame back to the caller.
    fn capture_queue_flush(&self) -> Result<(), ErrorCode>;
    /// Run the `AcquisitionStart` command feature.
    fn acquisition_start(&self) -> Result<(), ErrorCode>;
    /// Run the `AcquisitionStop` command feature.
    fn acquisition_stop(&self) -> Result<(), ErrorCode>;
}

/// Snapshot of the camera configuration a frame is sized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraAttributes {
    pub handle: CameraHandle,
    /// `PayloadSize` feature, in bytes.
    pub payload_size: usize,
    pub width: u32,
    pub height: u32,
    /// `PixelFormat` feature value, e.g. "Mono8".
    pub pixel_format: String,
}
