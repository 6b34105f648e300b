//! In-process stand-in for the SDK.
//!
//! Behaves like a well-behaved VimbaC for a single camera: it tracks which
//! descriptors are announced and queued, rejects calls on unknown
//! descriptors, and on a successful wait fills the buffer with a
//! deterministic pattern. Individual calls can be scripted to fail or time
//! out. Not thread-safe; the binding is single-threaded.

use crate::ffi::{
    CameraHandle, VmbFrame, VmbHandle, VMB_FRAME_SIZE, VMB_FRAME_STATUS_COMPLETE,
    VMB_FRAME_STATUS_INCOMPLETE,
};
use crate::pixel::PixelFormat;
use crate::sdk::{AcquisitionControl, CameraAttributes, FrameSdk};
use crate::status::ErrorCode;
use std::cell::RefCell;

const FAKE_CAMERA: usize = 0xCA_4E_0001;

/// An SDK entry point, as recorded by [`FakeSdk::calls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCall {
    Announce,
    Revoke,
    Queue,
    Wait,
}

#[derive(Default)]
struct State {
    calls: Vec<FakeCall>,
    announced: Vec<*mut VmbFrame>,
    queued: Vec<*mut VmbFrame>,
    rejections: Vec<(FakeCall, ErrorCode)>,
    pending_timeouts: usize,
    next_frame_id: u64,
    geometry: Option<(u32, u32, PixelFormat)>,
    last_announced_size: Option<u32>,
    last_struct_size: Option<u32>,
    last_announced_buffer: Option<usize>,
    last_wait_timeout: Option<u32>,
    capturing: bool,
    acquiring: bool,
}

/// Fake SDK for tests and the CLI self-test.
#[derive(Default)]
pub struct FakeSdk {
    state: RefCell<State>,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the one camera this fake serves.
    pub fn camera_handle(&self) -> CameraHandle {
        CameraHandle(FAKE_CAMERA as VmbHandle)
    }

    /// Attributes of a camera with the given geometry. Filled frames report
    /// the same geometry in their descriptor.
    pub fn attributes(&self, width: u32, height: u32, format: PixelFormat) -> CameraAttributes {
        self.state.borrow_mut().geometry = Some((width, height, format));
        CameraAttributes {
            handle: self.camera_handle(),
            payload_size: width as usize * height as usize * format.bytes_per_pixel(),
            width,
            height,
            pixel_format: format.name().to_string(),
        }
    }

    /// Byte `index` of the fill for frame id `frame_id`.
    pub fn pattern_byte(frame_id: u64, index: usize) -> u8 {
        ((index as u64).wrapping_mul(31).wrapping_add(frame_id.wrapping_mul(7)) % 251) as u8
    }

    /// Make the next call to `call` return `code` instead of running.
    pub fn reject_next(&self, call: FakeCall, code: ErrorCode) {
        self.state.borrow_mut().rejections.push((call, code));
    }

    /// Make the next wait time out, leaving the frame queued.
    pub fn time_out_next_wait(&self) {
        self.time_out_waits(1);
    }

    /// Make the next `n` waits time out.
    pub fn time_out_waits(&self, n: usize) {
        self.state.borrow_mut().pending_timeouts += n;
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.state.borrow().calls.clone()
    }

    pub fn announced_count(&self) -> usize {
        self.state.borrow().announced.len()
    }

    pub fn queued_count(&self) -> usize {
        self.state.borrow().queued.len()
    }

    pub fn last_announced_size(&self) -> Option<u32> {
        self.state.borrow().last_announced_size
    }

    pub fn last_struct_size(&self) -> Option<u32> {
        self.state.borrow().last_struct_size
    }

    /// Address of the buffer passed with the last announce.
    pub fn last_announced_buffer(&self) -> Option<usize> {
        self.state.borrow().last_announced_buffer
    }

    pub fn last_wait_timeout(&self) -> Option<u32> {
        self.state.borrow().last_wait_timeout
    }

    pub fn is_capturing(&self) -> bool {
        self.state.borrow().capturing
    }

    pub fn is_acquiring(&self) -> bool {
        self.state.borrow().acquiring
    }

    /// Record the call, then apply a scripted rejection or the handle check.
    fn enter(&self, call: FakeCall, camera: CameraHandle, frame: *mut VmbFrame) -> Option<ErrorCode> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if let Some(pos) = state.rejections.iter().position(|(c, _)| *c == call) {
            return Some(state.rejections.remove(pos).1);
        }
        if camera != self.camera_handle() {
            return Some(ErrorCode::BAD_HANDLE);
        }
        if frame.is_null() {
            return Some(ErrorCode::BAD_PARAMETER);
        }
        None
    }
}

impl FrameSdk for FakeSdk {
    unsafe fn frame_announce(
        &self,
        camera: CameraHandle,
        frame: *mut VmbFrame,
        size: u32,
    ) -> ErrorCode {
        if let Some(code) = self.enter(FakeCall::Announce, camera, frame) {
            return code;
        }
        // SAFETY: caller guarantees `frame` is a live descriptor.
        let desc = unsafe { &*frame };
        let mut state = self.state.borrow_mut();
        state.last_struct_size = Some(size);
        state.last_announced_size = Some(desc.buffer_size);
        state.last_announced_buffer = Some(desc.buffer as usize);

        if size != VMB_FRAME_SIZE {
            return ErrorCode::STRUCT_SIZE;
        }
        if desc.buffer.is_null() || desc.buffer_size == 0 {
            return ErrorCode::BAD_PARAMETER;
        }
        if state.announced.contains(&frame) {
            return ErrorCode::INVALID_CALL;
        }
        state.announced.push(frame);
        ErrorCode::SUCCESS
    }

    unsafe fn frame_revoke(&self, camera: CameraHandle, frame: *mut VmbFrame) -> ErrorCode {
        if let Some(code) = self.enter(FakeCall::Revoke, camera, frame) {
            return code;
        }
        let mut state = self.state.borrow_mut();
        let Some(pos) = state.announced.iter().position(|&f| f == frame) else {
            return ErrorCode::BAD_HANDLE;
        };
        if state.queued.contains(&frame) {
            return ErrorCode::INVALID_CALL;
        }
        state.announced.remove(pos);
        ErrorCode::SUCCESS
    }

    unsafe fn capture_frame_queue(&self, camera: CameraHandle, frame: *mut VmbFrame) -> ErrorCode {
        if let Some(code) = self.enter(FakeCall::Queue, camera, frame) {
            return code;
        }
        let mut state = self.state.borrow_mut();
        if !state.announced.contains(&frame) {
            return ErrorCode::BAD_HANDLE;
        }
        if state.queued.contains(&frame) {
            return ErrorCode::INVALID_CALL;
        }
        state.queued.push(frame);
        ErrorCode::SUCCESS
    }

    unsafe fn capture_frame_wait(
        &self,
        camera: CameraHandle,
        frame: *mut VmbFrame,
        timeout_ms: u32,
    ) -> ErrorCode {
        if let Some(code) = self.enter(FakeCall::Wait, camera, frame) {
            return code;
        }
        let mut state = self.state.borrow_mut();
        state.last_wait_timeout = Some(timeout_ms);
        if !state.announced.contains(&frame) {
            return ErrorCode::BAD_HANDLE;
        }
        let Some(pos) = state.queued.iter().position(|&f| f == frame) else {
            return ErrorCode::INVALID_CALL;
        };
        if state.pending_timeouts > 0 {
            state.pending_timeouts -= 1;
            return ErrorCode::TIMEOUT;
        }
        state.queued.remove(pos);

        let frame_id = state.next_frame_id;
        state.next_frame_id += 1;

        // SAFETY: the descriptor is announced and queued, so by the
        // FrameSdk contract it and its buffer are live and unborrowed.
        let desc = unsafe { &mut *frame };
        let len = desc.buffer_size as usize;
        let data = unsafe { std::slice::from_raw_parts_mut(desc.buffer as *mut u8, len) };
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = Self::pattern_byte(frame_id, i);
        }

        let (width, height, format) = state.geometry.unwrap_or((0, 0, PixelFormat::Mono8));
        desc.receive_status = VMB_FRAME_STATUS_COMPLETE;
        desc.image_size = desc.buffer_size;
        desc.width = width;
        desc.height = height;
        desc.pixel_format = format.code();
        desc.frame_id = frame_id;
        desc.timestamp = frame_id * 1_000_000;
        ErrorCode::SUCCESS
    }
}

impl AcquisitionControl for FakeSdk {
    fn capture_start(&self) -> Result<(), ErrorCode> {
        let mut state = self.state.borrow_mut();
        if state.capturing {
            return Err(ErrorCode::INVALID_CALL);
        }
        state.capturing = true;
        Ok(())
    }

    fn capture_end(&self) -> Result<(), ErrorCode> {
        self.state.borrow_mut().capturing = false;
        Ok(())
    }

    fn capture_queue_flush(&self) -> Result<(), ErrorCode> {
        let mut state = self.state.borrow_mut();
        for frame in state.queued.drain(..) {
            // SAFETY: queued descriptors are live by the FrameSdk contract.
            unsafe { (*frame).receive_status = VMB_FRAME_STATUS_INCOMPLETE };
        }
        Ok(())
    }

    fn acquisition_start(&self) -> Result<(), ErrorCode> {
        self.state.borrow_mut().acquiring = true;
        Ok(())
    }

    fn acquisition_stop(&self) -> Result<(), ErrorCode> {
        self.state.borrow_mut().acquiring = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    #[test]
    fn test_wrong_camera_handle_rejected() {
        let sdk = FakeSdk::new();
        let mut attrs = sdk.attributes(2, 2, PixelFormat::Mono8);
        attrs.handle = CameraHandle::null();
        let mut frame = Frame::new(&sdk, &attrs).unwrap();
        assert_eq!(frame.announce().unwrap_err().code(), Some(ErrorCode::BAD_HANDLE));
    }

    #[test]
    fn test_attributes_size_payload_from_geometry() {
        let sdk = FakeSdk::new();
        let attrs = sdk.attributes(640, 480, PixelFormat::Mono16);
        assert_eq!(attrs.payload_size, 640 * 480 * 2);
        assert_eq!(attrs.pixel_format, "Mono16");
    }

    #[test]
    fn test_flush_returns_queued_frames() {
        let sdk = FakeSdk::new();
        let attrs = sdk.attributes(2, 2, PixelFormat::Mono8);
        let mut frame = Frame::new(&sdk, &attrs).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert_eq!(sdk.queued_count(), 1);

        sdk.capture_queue_flush().unwrap();
        assert_eq!(sdk.queued_count(), 0);
        frame.revoke().unwrap();
    }

    #[test]
    fn test_filled_descriptor_reports_geometry() {
        let sdk = FakeSdk::new();
        let attrs = sdk.attributes(4, 3, PixelFormat::Mono14);
        let mut frame = Frame::new(&sdk, &attrs).unwrap();
        frame.announce().unwrap();
        frame.enqueue().unwrap();
        assert!(frame.wait().is_success());

        let info = frame.info().unwrap();
        assert_eq!((info.width, info.height), (4, 3));
        assert_eq!(info.pixel_format, Some(PixelFormat::Mono14));
        assert_eq!(info.image_size, 24);
    }

    #[test]
    fn test_capture_start_twice_is_invalid() {
        let sdk = FakeSdk::new();
        sdk.capture_start().unwrap();
        assert_eq!(sdk.capture_start(), Err(ErrorCode::INVALID_CALL));
        sdk.capture_end().unwrap();
        assert!(!sdk.is_capturing());
    }
}
