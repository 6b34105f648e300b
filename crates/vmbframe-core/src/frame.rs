//! Frame buffer adapter: announce, revoke, enqueue, wait, read.

use crate::buffer::NativeBuffer;
use crate::ffi::{CameraHandle, VmbFrame, VMB_FRAME_SIZE, VMB_FRAME_STATUS_COMPLETE};
use crate::pixel::{PixelFormat, UnsupportedPixelFormat};
use crate::sdk::{CameraAttributes, FrameSdk};
use crate::status::ErrorCode;
use ndarray::ArrayView2;
use serde::Serialize;
use std::cell::UnsafeCell;
use thiserror::Error;

/// Wait timeout used by [`Frame::wait`], in milliseconds.
pub const DEFAULT_WAIT_TIMEOUT_MS: u32 = 2000;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("{call} failed: {code}")]
    Sdk { call: &'static str, code: ErrorCode },
    #[error(transparent)]
    UnsupportedPixelFormat(#[from] UnsupportedPixelFormat),
    #[error("payload size {0} does not fit the SDK's 32-bit buffer size")]
    PayloadTooLarge(usize),
    #[error("frame has no filled buffer (state: {0:?})")]
    NotFilled(FrameState),
    #[error("buffer too small for view: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("view of {width}x{height} at {pixel_bytes} bytes per pixel overflows usize")]
    GeometryOverflow {
        width: u32,
        height: u32,
        pixel_bytes: usize,
    },
}

impl FrameError {
    /// The SDK status code, if this error came from an SDK call.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Sdk { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Where a frame sits in its announce/queue/wait/revoke cycle, as last
/// observed by this binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameState {
    Created,
    Announced,
    Queued,
    Filled,
    TimedOut,
    Revoked,
}

impl FrameState {
    /// Whether the SDK holds a registration for the descriptor.
    pub fn is_registered(self) -> bool {
        matches!(
            self,
            Self::Announced | Self::Queued | Self::Filled | Self::TimedOut
        )
    }
}

/// Metadata the SDK writes into the descriptor when it fills a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameInfo {
    pub frame_id: u64,
    pub timestamp: u64,
    /// `VmbFrameStatusType`: 0 complete, -1 incomplete, -2 too small, -3 invalid.
    pub receive_status: i32,
    pub image_size: u32,
    pub width: u32,
    pub height: u32,
    pub pixel_format: Option<PixelFormat>,
}

impl FrameInfo {
    pub fn is_complete(&self) -> bool {
        self.receive_status == VMB_FRAME_STATUS_COMPLETE
    }
}

/// One capture buffer bound to a camera.
///
/// The descriptor is boxed so its address, which the SDK uses as the frame's
/// identity, never changes. The buffer is allocated on announce and freed on
/// a successful revoke, or on drop once the SDK has let go of it.
pub struct Frame<'sdk, S: FrameSdk + ?Sized> {
    sdk: &'sdk S,
    handle: CameraHandle,
    payload_size: usize,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    pixel_bytes: usize,
    descriptor: Box<UnsafeCell<VmbFrame>>,
    buffer: Option<NativeBuffer>,
    state: FrameState,
}

impl<'sdk, S: FrameSdk + ?Sized> Frame<'sdk, S> {
    /// Create a frame sized from the camera's current configuration.
    ///
    /// Fails if the camera reports a pixel format outside the table.
    pub fn new(sdk: &'sdk S, camera: &CameraAttributes) -> Result<Self, FrameError> {
        let pixel_format: PixelFormat = camera.pixel_format.parse()?;
        Ok(Self {
            sdk,
            handle: camera.handle,
            payload_size: camera.payload_size,
            width: camera.width,
            height: camera.height,
            pixel_format,
            pixel_bytes: pixel_format.bytes_per_pixel(),
            descriptor: Box::new(UnsafeCell::new(VmbFrame::empty())),
            buffer: None,
            state: FrameState::Created,
        })
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn pixel_bytes(&self) -> usize {
        self.pixel_bytes
    }

    /// Allocate a payload-sized buffer and register it with the SDK.
    ///
    /// If a buffer from an earlier announce is still held it is reused, so
    /// memory the SDK may already reference is never replaced.
    pub fn announce(&mut self) -> Result<(), FrameError> {
        let size = u32::try_from(self.payload_size)
            .map_err(|_| FrameError::PayloadTooLarge(self.payload_size))?;

        let fresh = self.buffer.is_none();
        if fresh {
            let buffer = NativeBuffer::zeroed(self.payload_size);
            // SAFETY: no buffer is held, so the SDK has no registration for
            // the descriptor and nothing else touches it.
            unsafe {
                let desc = &mut *self.descriptor.get();
                desc.buffer = buffer.as_mut_ptr().cast();
                desc.buffer_size = size;
            }
            self.buffer = Some(buffer);
        }

        // SAFETY: descriptor and buffer stay put until a successful revoke,
        // and Drop revokes (or leaks) before freeing either.
        let code = unsafe {
            self.sdk
                .frame_announce(self.handle, self.descriptor.get(), VMB_FRAME_SIZE)
        };
        tracing::debug!(code = code.0, payload_size = self.payload_size, "VmbFrameAnnounce");

        if let Err(code) = code.into_result() {
            if fresh {
                self.release_buffer();
            }
            return Err(FrameError::Sdk {
                call: "VmbFrameAnnounce",
                code,
            });
        }
        self.state = FrameState::Announced;
        Ok(())
    }

    /// Deregister the buffer from the SDK and free it.
    pub fn revoke(&mut self) -> Result<(), FrameError> {
        // SAFETY: see `announce`.
        let code = unsafe { self.sdk.frame_revoke(self.handle, self.descriptor.get()) };
        tracing::debug!(code = code.0, "VmbFrameRevoke");
        code.into_result().map_err(|code| FrameError::Sdk {
            call: "VmbFrameRevoke",
            code,
        })?;
        self.release_buffer();
        self.state = FrameState::Revoked;
        Ok(())
    }

    /// Submit the buffer to the capture queue for the next fill.
    ///
    /// No local precondition checks: an unannounced or already-queued frame
    /// is reported by the SDK.
    pub fn enqueue(&mut self) -> Result<(), FrameError> {
        // SAFETY: see `announce`.
        let code = unsafe { self.sdk.capture_frame_queue(self.handle, self.descriptor.get()) };
        tracing::debug!(code = code.0, "VmbCaptureFrameQueue");
        code.into_result().map_err(|code| FrameError::Sdk {
            call: "VmbCaptureFrameQueue",
            code,
        })?;
        self.state = FrameState::Queued;
        Ok(())
    }

    /// Wait up to [`DEFAULT_WAIT_TIMEOUT_MS`] for the queued buffer to fill.
    pub fn wait(&mut self) -> ErrorCode {
        self.wait_timeout(DEFAULT_WAIT_TIMEOUT_MS)
    }

    /// Wait up to `timeout_ms` for the queued buffer to fill.
    ///
    /// Returns the SDK's status code as-is. A timeout (for example a
    /// hardware trigger that never fired) is data for the capture loop,
    /// not an error.
    pub fn wait_timeout(&mut self, timeout_ms: u32) -> ErrorCode {
        // SAFETY: see `announce`.
        let code = unsafe {
            self.sdk
                .capture_frame_wait(self.handle, self.descriptor.get(), timeout_ms)
        };
        if code.is_success() {
            tracing::debug!(timeout_ms, "VmbCaptureFrameWait: filled");
            self.state = FrameState::Filled;
        } else if code.is_timeout() {
            tracing::debug!(timeout_ms, "VmbCaptureFrameWait: timed out");
            self.state = FrameState::TimedOut;
        } else {
            tracing::warn!(code = code.0, name = code.name(), "VmbCaptureFrameWait failed");
            // Waiting on a frame that was never requeued fails; its old
            // contents are no longer the result of the last wait.
            if self.state == FrameState::Filled {
                self.state = FrameState::Announced;
            }
        }
        code
    }

    /// The filled buffer as (height x bpp) rows by (width x bpp) columns.
    ///
    /// Borrows the native memory, no copy. Only available after a
    /// successful wait and before the frame is queued again.
    pub fn read(&self) -> Result<ArrayView2<'_, u8>, FrameError> {
        let rows = self.scaled(self.height as usize)?;
        let cols = self.scaled(self.width as usize)?;
        self.view(rows, cols)
    }

    /// The filled buffer as `height` rows of (width x bpp) bytes, the layout
    /// an unpacked monochrome camera produces.
    pub fn read_rows(&self) -> Result<ArrayView2<'_, u8>, FrameError> {
        let cols = self.scaled(self.width as usize)?;
        self.view(self.height as usize, cols)
    }

    /// Descriptor metadata from the last successful wait.
    pub fn info(&self) -> Option<FrameInfo> {
        if self.state != FrameState::Filled {
            return None;
        }
        // SAFETY: a filled frame is not queued; the SDK is done with it.
        let desc = unsafe { &*self.descriptor.get() };
        Some(FrameInfo {
            frame_id: desc.frame_id,
            timestamp: desc.timestamp,
            receive_status: desc.receive_status,
            image_size: desc.image_size,
            width: desc.width,
            height: desc.height,
            pixel_format: PixelFormat::from_code(desc.pixel_format),
        })
    }

    fn view(&self, rows: usize, cols: usize) -> Result<ArrayView2<'_, u8>, FrameError> {
        let buffer = match (&self.buffer, self.state) {
            (Some(buffer), FrameState::Filled) => buffer,
            _ => return Err(FrameError::NotFilled(self.state)),
        };
        let needed = rows.checked_mul(cols).ok_or_else(|| self.overflow())?;
        let data = buffer.as_slice();
        let too_small = FrameError::BufferTooSmall {
            needed,
            available: data.len(),
        };
        if needed > data.len() {
            return Err(too_small);
        }
        ArrayView2::from_shape((rows, cols), &data[..needed]).map_err(|_| too_small)
    }

    fn scaled(&self, pixels: usize) -> Result<usize, FrameError> {
        pixels
            .checked_mul(self.pixel_bytes)
            .ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> FrameError {
        FrameError::GeometryOverflow {
            width: self.width,
            height: self.height,
            pixel_bytes: self.pixel_bytes,
        }
    }

    fn release_buffer(&mut self) {
        // SAFETY: the SDK holds no registration for the descriptor here.
        unsafe {
            let desc = &mut *self.descriptor.get();
            desc.buffer = std::ptr::null_mut();
            desc.buffer_size = 0;
        }
        self.buffer = None;
    }
}

impl<S: FrameSdk + ?Sized> Drop for Frame<'_, S> {
    fn drop(&mut self) {
        if !self.state.is_registered() {
            return;
        }
        if let Err(e) = self.revoke() {
            // The SDK may still write into the buffer, or key on the
            // descriptor address. Neither can be freed.
            tracing::warn!(error = %e, "revoke on drop failed; leaking frame memory");
            if let Some(buffer) = self.buffer.take() {
                buffer.leak();
            }
            let descriptor = std::mem::replace(
                &mut self.descriptor,
                Box::new(UnsafeCell::new(VmbFrame::empty())),
            );
            Box::leak(descriptor);
        }
    }
}

impl<S: FrameSdk + ?Sized> std::fmt::Debug for Frame<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("descriptor", &self.descriptor.get())
            .field("buffer", &self.buffer)
            .field("payload_size", &self.payload_size)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_format", &self.pixel_format)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeCall, FakeSdk};

    fn attrs(sdk: &FakeSdk, width: u32, height: u32, format: &str, payload: usize) -> CameraAttributes {
        CameraAttributes {
            handle: sdk.camera_handle(),
            payload_size: payload,
            width,
            height,
            pixel_format: format.to_string(),
        }
    }

    #[test]
    fn test_new_rejects_unknown_pixel_format() {
        let sdk = FakeSdk::new();
        let err = Frame::new(&sdk, &attrs(&sdk, 4, 4, "RGB8Packed", 48)).unwrap_err();
        assert!(matches!(err, FrameError::UnsupportedPixelFormat(_)));
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_new_resolves_pixel_bytes() {
        let sdk = FakeSdk::new();
        let frame = Frame::new(&sdk, &attrs(&sdk, 8, 2, "Mono12", 32)).unwrap();
        assert_eq!(frame.pixel_bytes(), 2);
        assert_eq!(frame.state(), FrameState::Created);
    }

    #[test]
    fn test_announce_then_revoke_without_enqueue() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 3, "Mono8", 12)).unwrap();

        frame.announce().unwrap();
        assert_eq!(frame.state(), FrameState::Announced);
        assert_eq!(sdk.announced_count(), 1);
        frame.revoke().unwrap();
        assert_eq!(frame.state(), FrameState::Revoked);
        assert_eq!(sdk.announced_count(), 0);
        assert_eq!(sdk.calls(), vec![FakeCall::Announce, FakeCall::Revoke]);
    }

    #[test]
    fn test_announce_registers_payload_sized_buffer() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 10, 10, "Mono8", 123)).unwrap();
        frame.announce().unwrap();
        assert_eq!(sdk.last_announced_size(), Some(123));
        assert_eq!(sdk.last_struct_size(), Some(VMB_FRAME_SIZE));
        frame.revoke().unwrap();
    }

    #[test]
    fn test_announce_rejection_propagates_code() {
        let sdk = FakeSdk::new();
        sdk.reject_next(FakeCall::Announce, ErrorCode::RESOURCES);
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();

        let err = frame.announce().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::RESOURCES));
        assert_eq!(frame.state(), FrameState::Created);
        // a later announce still works
        frame.announce().unwrap();
    }

    #[test]
    fn test_zero_payload_rejected_by_sdk() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 0, 0, "Mono8", 0)).unwrap();
        let err = frame.announce().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BAD_PARAMETER));
    }

    #[test]
    fn test_enqueue_before_announce_propagates_rejection() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();

        let err = frame.enqueue().unwrap_err();
        match err {
            FrameError::Sdk { call, code } => {
                assert_eq!(call, "VmbCaptureFrameQueue");
                assert_eq!(code, ErrorCode::BAD_HANDLE);
            }
            other => panic!("expected SDK error, got {other:?}"),
        }
        assert_eq!(frame.state(), FrameState::Created);
    }

    #[test]
    fn test_revoke_before_announce_propagates_rejection() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        let err = frame.revoke().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BAD_HANDLE));
    }

    #[test]
    fn test_double_revoke_propagates_rejection() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        frame.announce().unwrap();
        frame.revoke().unwrap();
        assert_eq!(frame.revoke().unwrap_err().code(), Some(ErrorCode::BAD_HANDLE));
    }

    #[test]
    fn test_wait_returns_timeout_code_without_error() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();

        sdk.time_out_next_wait();
        let code = frame.wait_timeout(5);
        assert_eq!(code, ErrorCode::TIMEOUT);
        assert_eq!(frame.state(), FrameState::TimedOut);
        assert_eq!(sdk.last_wait_timeout(), Some(5));
        assert!(matches!(frame.read(), Err(FrameError::NotFilled(FrameState::TimedOut))));

        // still queued on the SDK side; the next wait fills it
        assert_eq!(frame.wait(), ErrorCode::SUCCESS);
        assert_eq!(sdk.last_wait_timeout(), Some(DEFAULT_WAIT_TIMEOUT_MS));
    }

    #[test]
    fn test_wait_returns_arbitrary_code_verbatim() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        sdk.reject_next(FakeCall::Wait, ErrorCode(-42));
        assert_eq!(frame.wait(), ErrorCode(-42));
        assert_eq!(frame.state(), FrameState::Queued);
    }

    #[test]
    fn test_enqueue_twice_is_reported_by_sdk() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert_eq!(frame.enqueue().unwrap_err().code(), Some(ErrorCode::INVALID_CALL));
    }

    #[test]
    fn test_read_round_trips_fill_pattern() {
        let sdk = FakeSdk::new();
        let (w, h) = (6u32, 4u32);
        let mut frame = Frame::new(&sdk, &attrs(&sdk, w, h, "Mono8", (w * h) as usize)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert!(frame.wait().is_success());

        let view = frame.read().unwrap();
        assert_eq!(view.dim(), (4, 6));
        for ((row, col), &value) in view.indexed_iter() {
            assert_eq!(value, FakeSdk::pattern_byte(0, row * 6 + col));
        }
    }

    #[test]
    fn test_read_dimensions_scale_with_pixel_bytes() {
        let sdk = FakeSdk::new();
        let (w, h) = (3u32, 2u32);
        // payload large enough for the (h*bpp) x (w*bpp) view
        let payload = (h as usize * 2) * (w as usize * 2);
        let mut frame = Frame::new(&sdk, &attrs(&sdk, w, h, "Mono12", payload)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert!(frame.wait().is_success());

        let view = frame.read().unwrap();
        assert_eq!(view.dim(), (4, 6));
        let flat: Vec<u8> = view.iter().copied().collect();
        let expected: Vec<u8> = (0..payload).map(|i| FakeSdk::pattern_byte(0, i)).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_read_reports_short_buffer() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono16", 32)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert!(frame.wait().is_success());

        match frame.read() {
            Err(FrameError::BufferTooSmall { needed, available }) => {
                assert_eq!(needed, 64);
                assert_eq!(available, 32);
            }
            other => panic!("expected BufferTooSmall, got {other:?}"),
        }
        // the row layout fits exactly
        assert_eq!(frame.read_rows().unwrap().dim(), (4, 8));
    }

    #[test]
    fn test_read_before_wait_is_refused() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        assert!(matches!(frame.read(), Err(FrameError::NotFilled(FrameState::Created))));
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert!(matches!(frame.read(), Err(FrameError::NotFilled(FrameState::Queued))));
    }

    #[test]
    fn test_failed_wait_after_fill_refuses_stale_read() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert!(frame.wait().is_success());
        assert!(frame.read().is_ok());

        // not requeued, so the SDK rejects the wait
        assert_eq!(frame.wait(), ErrorCode::INVALID_CALL);
        assert_eq!(frame.state(), FrameState::Announced);
        assert!(matches!(frame.read(), Err(FrameError::NotFilled(FrameState::Announced))));
        assert!(frame.read_rows().is_err());
        assert!(frame.info().is_none());

        // the frame is still usable
        frame.enqueue().unwrap();
        assert!(frame.wait().is_success());
        assert_eq!(frame.info().unwrap().frame_id, 1);
        frame.revoke().unwrap();
    }

    #[test]
    fn test_read_reports_geometry_overflow() {
        let sdk = FakeSdk::new();
        let mut frame =
            Frame::new(&sdk, &attrs(&sdk, u32::MAX, u32::MAX, "Mono16", 16)).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert!(frame.wait().is_success());

        for result in [frame.read(), frame.read_rows()] {
            match result {
                Err(FrameError::GeometryOverflow {
                    width,
                    height,
                    pixel_bytes,
                }) => {
                    assert_eq!((width, height, pixel_bytes), (u32::MAX, u32::MAX, 2));
                }
                other => panic!("expected GeometryOverflow, got {other:?}"),
            }
        }
        frame.revoke().unwrap();
    }

    #[test]
    fn test_steady_state_loop_sees_new_frames() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 2, 2, "Mono8", 4)).unwrap();
        frame.announce().unwrap();
        for n in 0..3u64 {
            frame.enqueue().unwrap();
            assert!(frame.wait().is_success());
            let info = frame.info().unwrap();
            assert_eq!(info.frame_id, n);
            assert!(info.is_complete());
            assert_eq!(info.pixel_format, Some(PixelFormat::Mono8));
            assert_eq!(frame.read().unwrap()[[0, 0]], FakeSdk::pattern_byte(n, 0));
        }
        frame.revoke().unwrap();
    }

    #[test]
    fn test_drop_revokes_registered_frame() {
        let sdk = FakeSdk::new();
        {
            let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
            frame.announce().unwrap();
        }
        assert_eq!(sdk.announced_count(), 0);
        assert_eq!(sdk.calls(), vec![FakeCall::Announce, FakeCall::Revoke]);
    }

    #[test]
    fn test_drop_leaks_when_revoke_fails() {
        let sdk = FakeSdk::new();
        {
            let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
            frame.announce().unwrap();
            frame.enqueue().unwrap();
            // the fake refuses to revoke a queued frame
        }
        assert_eq!(sdk.announced_count(), 1);
    }

    #[test]
    fn test_reannounce_reuses_live_buffer() {
        let sdk = FakeSdk::new();
        let mut frame = Frame::new(&sdk, &attrs(&sdk, 4, 4, "Mono8", 16)).unwrap();
        frame.announce().unwrap();
        let first = sdk.last_announced_buffer();
        assert_eq!(frame.announce().unwrap_err().code(), Some(ErrorCode::INVALID_CALL));
        assert_eq!(sdk.last_announced_buffer(), first);
        frame.revoke().unwrap();
    }
}
