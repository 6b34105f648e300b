//! C layout of the structures exchanged with the frame API.
//!
//! Mirrors `VmbFrame_t` and friends from `VimbaC/Include/VimbaC.h`.

/// Opaque SDK handle (`VmbHandle_t`).
pub type VmbHandle = *mut libc::c_void;

/// Frame completion callback (`VmbFrameCallback`). The binding never installs
/// one; it exists so the native signature of `VmbCaptureFrameQueue` is exact.
pub type VmbFrameCallback = Option<unsafe extern "C" fn(camera: VmbHandle, frame: *mut VmbFrame)>;

// VmbFrameStatusType
pub const VMB_FRAME_STATUS_COMPLETE: i32 = 0;
pub const VMB_FRAME_STATUS_INCOMPLETE: i32 = -1;
pub const VMB_FRAME_STATUS_TOO_SMALL: i32 = -2;
pub const VMB_FRAME_STATUS_INVALID: i32 = -3;

/// Mirror of `VmbFrame_t`.
///
/// Layout (64-bit):
///   buffer:*mut 8, bufferSize:u32 4, pad 4, context:[*mut;4] 32,
///   receiveStatus..offsetY: 9 x 4, pad 4, frameID:u64 8, timestamp:u64 8
/// Total: 104 bytes, checked below.
#[repr(C)]
#[derive(Debug)]
pub struct VmbFrame {
    pub buffer: *mut libc::c_void,
    pub buffer_size: u32,
    pub context: [*mut libc::c_void; 4],
    pub receive_status: i32,
    pub receive_flags: u32,
    pub image_size: u32,
    pub ancillary_size: u32,
    pub pixel_format: u32,
    pub width: u32,
    pub height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub frame_id: u64,
    pub timestamp: u64,
}

#[cfg(target_pointer_width = "64")]
const _SIZE_ASSERT: () = assert!(
    std::mem::size_of::<VmbFrame>() == 104,
    "VmbFrame must be 104 bytes to match VmbFrame_t"
);

impl VmbFrame {
    /// A descriptor with no buffer attached.
    pub fn empty() -> Self {
        Self {
            buffer: std::ptr::null_mut(),
            buffer_size: 0,
            context: [std::ptr::null_mut(); 4],
            receive_status: VMB_FRAME_STATUS_INVALID,
            receive_flags: 0,
            image_size: 0,
            ancillary_size: 0,
            pixel_format: 0,
            width: 0,
            height: 0,
            offset_x: 0,
            offset_y: 0,
            frame_id: 0,
            timestamp: 0,
        }
    }
}

/// `sizeof(VmbFrame_t)` as passed to `VmbFrameAnnounce`.
pub const VMB_FRAME_SIZE: u32 = std::mem::size_of::<VmbFrame>() as u32;

/// Native handle of an opened camera, as used to address every frame call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraHandle(pub VmbHandle);

impl CameraHandle {
    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_raw(self) -> VmbHandle {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_descriptor_has_no_buffer() {
        let frame = VmbFrame::empty();
        assert!(frame.buffer.is_null());
        assert_eq!(frame.buffer_size, 0);
        assert_eq!(frame.receive_status, VMB_FRAME_STATUS_INVALID);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn field_offsets_match_c_layout() {
        let frame = VmbFrame::empty();
        let base = &frame as *const VmbFrame as usize;
        let offset = |p: usize| p - base;
        assert_eq!(offset(&frame.buffer_size as *const _ as usize), 8);
        assert_eq!(offset(&frame.context as *const _ as usize), 16);
        assert_eq!(offset(&frame.receive_status as *const _ as usize), 48);
        assert_eq!(offset(&frame.pixel_format as *const _ as usize), 64);
        assert_eq!(offset(&frame.frame_id as *const _ as usize), 88);
        assert_eq!(offset(&frame.timestamp as *const _ as usize), 96);
        assert_eq!(VMB_FRAME_SIZE, 104);
    }
}
