//! Native entry point signatures and the camera info struct.

use libc::c_char;
use vmbframe_core::ffi::{VmbFrame, VmbFrameCallback, VmbHandle};

/// `VmbAccessModeFull`: read and write access.
pub const VMB_ACCESS_MODE_FULL: u32 = 1;

/// Mirror of `VmbCameraInfo_t`.
///
/// Layout (64-bit): 4 x *const c_char, u32, pad 4, *const c_char = 48 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VmbCameraInfo {
    pub camera_id_string: *const c_char,
    pub camera_name: *const c_char,
    pub model_name: *const c_char,
    pub serial_string: *const c_char,
    pub permitted_access: u32,
    pub interface_id_string: *const c_char,
}

#[cfg(target_pointer_width = "64")]
const _SIZE_ASSERT: () = assert!(
    std::mem::size_of::<VmbCameraInfo>() == 48,
    "VmbCameraInfo must be 48 bytes to match VmbCameraInfo_t"
);

impl VmbCameraInfo {
    pub fn empty() -> Self {
        Self {
            camera_id_string: std::ptr::null(),
            camera_name: std::ptr::null(),
            model_name: std::ptr::null(),
            serial_string: std::ptr::null(),
            permitted_access: 0,
            interface_id_string: std::ptr::null(),
        }
    }
}

pub type VmbStartupFn = unsafe extern "C" fn() -> i32;
pub type VmbShutdownFn = unsafe extern "C" fn();
pub type VmbCamerasListFn = unsafe extern "C" fn(
    list: *mut VmbCameraInfo,
    list_length: u32,
    num_found: *mut u32,
    sizeof_camera_info: u32,
) -> i32;
pub type VmbCameraOpenFn =
    unsafe extern "C" fn(id: *const c_char, access_mode: u32, handle: *mut VmbHandle) -> i32;
pub type VmbCameraCloseFn = unsafe extern "C" fn(handle: VmbHandle) -> i32;
pub type VmbFeatureIntGetFn =
    unsafe extern "C" fn(handle: VmbHandle, name: *const c_char, value: *mut i64) -> i32;
pub type VmbFeatureEnumGetFn =
    unsafe extern "C" fn(handle: VmbHandle, name: *const c_char, value: *mut *const c_char) -> i32;
pub type VmbFeatureCommandRunFn = unsafe extern "C" fn(handle: VmbHandle, name: *const c_char) -> i32;
pub type VmbCaptureControlFn = unsafe extern "C" fn(handle: VmbHandle) -> i32;
pub type VmbFrameAnnounceFn =
    unsafe extern "C" fn(handle: VmbHandle, frame: *const VmbFrame, size: u32) -> i32;
pub type VmbFrameRevokeFn = unsafe extern "C" fn(handle: VmbHandle, frame: *const VmbFrame) -> i32;
pub type VmbCaptureFrameQueueFn = unsafe extern "C" fn(
    handle: VmbHandle,
    frame: *const VmbFrame,
    callback: VmbFrameCallback,
) -> i32;
pub type VmbCaptureFrameWaitFn =
    unsafe extern "C" fn(handle: VmbHandle, frame: *const VmbFrame, timeout: u32) -> i32;
