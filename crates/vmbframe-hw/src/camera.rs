//! Native camera: open/close, feature reads, capture control.

use crate::ffi::VMB_ACCESS_MODE_FULL;
use crate::library::{c_string, VimbaLibrary};
use std::ffi::CString;
use thiserror::Error;
use vmbframe_core::ffi::VmbHandle;
use vmbframe_core::{AcquisitionControl, CameraAttributes, CameraHandle, ErrorCode};

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("name contains an interior NUL: {0}")]
    InvalidName(#[from] std::ffi::NulError),
    #[error("{call}({target}) failed: {code}")]
    Sdk {
        call: &'static str,
        target: String,
        code: ErrorCode,
    },
    #[error("feature {feature} out of range: {value}")]
    OutOfRange { feature: &'static str, value: i64 },
}

impl CameraError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Sdk { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// An opened camera. Closed on drop.
pub struct Camera<'lib> {
    lib: &'lib VimbaLibrary,
    handle: CameraHandle,
    pub id: String,
    is_open: bool,
}

impl<'lib> Camera<'lib> {
    /// Open a camera by id string (e.g. "DEV_000F315B91E2") with full access.
    pub fn open(lib: &'lib VimbaLibrary, id: &str) -> Result<Self, CameraError> {
        let c_id = CString::new(id)?;
        let mut handle: VmbHandle = std::ptr::null_mut();
        // SAFETY: `c_id` is NUL-terminated; `handle` is a valid out pointer.
        let code = vmb_call!(
            "VmbCameraOpen",
            (lib.api.camera_open)(c_id.as_ptr(), VMB_ACCESS_MODE_FULL, &mut handle)
        );
        code.into_result().map_err(|code| CameraError::Sdk {
            call: "VmbCameraOpen",
            target: id.to_string(),
            code,
        })?;

        tracing::info!(camera = id, "opened camera");
        Ok(Self {
            lib,
            handle: CameraHandle(handle),
            id: id.to_string(),
            is_open: true,
        })
    }

    pub fn handle(&self) -> CameraHandle {
        self.handle
    }

    /// Read an integer feature such as `PayloadSize` or `Width`.
    pub fn feature_int(&self, name: &str) -> Result<i64, CameraError> {
        let c_name = CString::new(name)?;
        let mut value = 0i64;
        // SAFETY: open handle, NUL-terminated name, valid out pointer.
        let code = vmb_call!(
            "VmbFeatureIntGet",
            (self.lib.api.feature_int_get)(self.handle.as_raw(), c_name.as_ptr(), &mut value)
        );
        self.check("VmbFeatureIntGet", name, code)?;
        Ok(value)
    }

    /// Read an enum feature such as `PixelFormat`.
    pub fn feature_enum(&self, name: &str) -> Result<String, CameraError> {
        let c_name = CString::new(name)?;
        let mut value: *const libc::c_char = std::ptr::null();
        // SAFETY: open handle, NUL-terminated name, valid out pointer.
        let code = vmb_call!(
            "VmbFeatureEnumGet",
            (self.lib.api.feature_enum_get)(self.handle.as_raw(), c_name.as_ptr(), &mut value)
        );
        self.check("VmbFeatureEnumGet", name, code)?;
        Ok(c_string(value))
    }

    /// Run a command feature such as `AcquisitionStart`.
    pub fn command_run(&self, name: &str) -> Result<(), CameraError> {
        let c_name = CString::new(name)?;
        // SAFETY: open handle, NUL-terminated name.
        let code = vmb_call!(
            "VmbFeatureCommandRun",
            (self.lib.api.feature_command_run)(self.handle.as_raw(), c_name.as_ptr())
        );
        self.check("VmbFeatureCommandRun", name, code)
    }

    /// Snapshot the features a frame is sized from.
    pub fn attributes(&self) -> Result<CameraAttributes, CameraError> {
        let payload_size = self.feature_int("PayloadSize")?;
        let width = self.feature_int("Width")?;
        let height = self.feature_int("Height")?;
        let pixel_format = self.feature_enum("PixelFormat")?;

        let attrs = CameraAttributes {
            handle: self.handle,
            payload_size: usize::try_from(payload_size).map_err(|_| CameraError::OutOfRange {
                feature: "PayloadSize",
                value: payload_size,
            })?,
            width: u32::try_from(width).map_err(|_| CameraError::OutOfRange {
                feature: "Width",
                value: width,
            })?,
            height: u32::try_from(height).map_err(|_| CameraError::OutOfRange {
                feature: "Height",
                value: height,
            })?,
            pixel_format,
        };
        tracing::info!(
            camera = %self.id,
            payload_size = attrs.payload_size,
            width = attrs.width,
            height = attrs.height,
            pixel_format = %attrs.pixel_format,
            "camera attributes"
        );
        Ok(attrs)
    }

    /// Close explicitly, reporting the SDK's status.
    pub fn close(mut self) -> Result<(), CameraError> {
        self.is_open = false;
        self.close_handle()
    }

    fn close_handle(&self) -> Result<(), CameraError> {
        // SAFETY: the handle came from a successful open and is closed once.
        let code = vmb_call!("VmbCameraClose", (self.lib.api.camera_close)(self.handle.as_raw()));
        self.check("VmbCameraClose", &self.id, code)
    }

    fn capture_control(&self, call: &'static str, f: crate::ffi::VmbCaptureControlFn) -> ErrorCode {
        // SAFETY: open handle; the capture control calls take nothing else.
        let code = ErrorCode(unsafe { f(self.handle.as_raw()) });
        tracing::debug!(call, code = code.0, "VimbaC call");
        code
    }

    fn check(&self, call: &'static str, target: &str, code: ErrorCode) -> Result<(), CameraError> {
        code.into_result().map_err(|code| CameraError::Sdk {
            call,
            target: target.to_string(),
            code,
        })
    }
}

impl AcquisitionControl for Camera<'_> {
    fn capture_start(&self) -> Result<(), ErrorCode> {
        self.capture_control("VmbCaptureStart", self.lib.api.capture_start)
            .into_result()
    }

    fn capture_end(&self) -> Result<(), ErrorCode> {
        self.capture_control("VmbCaptureEnd", self.lib.api.capture_end)
            .into_result()
    }

    fn capture_queue_flush(&self) -> Result<(), ErrorCode> {
        self.capture_control("VmbCaptureQueueFlush", self.lib.api.capture_queue_flush)
            .into_result()
    }

    fn acquisition_start(&self) -> Result<(), ErrorCode> {
        self.command_run("AcquisitionStart")
            .map_err(|e| e.code().unwrap_or(ErrorCode::OTHER))
    }

    fn acquisition_stop(&self) -> Result<(), ErrorCode> {
        self.command_run("AcquisitionStop")
            .map_err(|e| e.code().unwrap_or(ErrorCode::OTHER))
    }
}

impl Drop for Camera<'_> {
    fn drop(&mut self) {
        if !self.is_open {
            return;
        }
        if let Err(e) = self.close_handle() {
            tracing::warn!(camera = %self.id, error = %e, "camera close failed");
        }
    }
}

impl std::fmt::Debug for Camera<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .finish()
    }
}
