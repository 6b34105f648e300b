//! Dynamic loading of the VimbaC shared library.
//!
//! The vendor library is resolved at runtime with `libloading` so the
//! workspace builds and tests on machines without the SDK installed.

use crate::ffi::*;
use libloading::Library;
use serde::Serialize;
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vmbframe_core::ffi::{CameraHandle, VmbFrame};
use vmbframe_core::{ErrorCode, FrameSdk};

/// Environment variable overriding the library location.
pub const LIB_PATH_ENV: &str = "VIMBAC_LIB_PATH";

#[cfg(target_os = "windows")]
pub const DEFAULT_LIB_PATH: &str =
    r#"C:\Program Files\Allied Vision\Vimba_6.0\VimbaC\Bin\Win64\VimbaC.dll"#;
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_LIB_PATH: &str = "/opt/vimba/Vimba_6_0/VimbaC/DynamicLib/x86_64bit/libVimbaC.so";

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("missing symbol {symbol}: {source}")]
    Symbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },
    #[error("VmbStartup failed: {0}")]
    Startup(ErrorCode),
    #[error("VmbCamerasList failed: {0}")]
    CamerasList(ErrorCode),
}

/// Resolved entry points. Valid as long as the owning `Library` is loaded.
pub(crate) struct Api {
    pub startup: VmbStartupFn,
    pub shutdown: VmbShutdownFn,
    pub cameras_list: VmbCamerasListFn,
    pub camera_open: VmbCameraOpenFn,
    pub camera_close: VmbCameraCloseFn,
    pub feature_int_get: VmbFeatureIntGetFn,
    pub feature_enum_get: VmbFeatureEnumGetFn,
    pub feature_command_run: VmbFeatureCommandRunFn,
    pub capture_start: VmbCaptureControlFn,
    pub capture_end: VmbCaptureControlFn,
    pub capture_queue_flush: VmbCaptureControlFn,
    pub frame_announce: VmbFrameAnnounceFn,
    pub frame_revoke: VmbFrameRevokeFn,
    pub capture_frame_queue: VmbCaptureFrameQueueFn,
    pub capture_frame_wait: VmbCaptureFrameWaitFn,
}

/// Look up `name` and copy the function pointer out of the symbol.
///
/// # Safety
///
/// `T` must be the exact function pointer type of the exported symbol.
unsafe fn symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T, LibraryError> {
    // SAFETY: forwarded under the caller's contract.
    unsafe { lib.get::<T>(name.as_bytes()) }
        .map(|sym| *sym)
        .map_err(|source| LibraryError::Symbol {
            symbol: name,
            source,
        })
}

impl Api {
    /// # Safety
    ///
    /// `lib` must be a VimbaC build whose exports match the signatures in
    /// [`crate::ffi`].
    unsafe fn resolve(lib: &Library) -> Result<Self, LibraryError> {
        // SAFETY: signatures match VimbaC.h per the caller's contract.
        unsafe {
            Ok(Self {
                startup: symbol(lib, "VmbStartup")?,
                shutdown: symbol(lib, "VmbShutdown")?,
                cameras_list: symbol(lib, "VmbCamerasList")?,
                camera_open: symbol(lib, "VmbCameraOpen")?,
                camera_close: symbol(lib, "VmbCameraClose")?,
                feature_int_get: symbol(lib, "VmbFeatureIntGet")?,
                feature_enum_get: symbol(lib, "VmbFeatureEnumGet")?,
                feature_command_run: symbol(lib, "VmbFeatureCommandRun")?,
                capture_start: symbol(lib, "VmbCaptureStart")?,
                capture_end: symbol(lib, "VmbCaptureEnd")?,
                capture_queue_flush: symbol(lib, "VmbCaptureQueueFlush")?,
                frame_announce: symbol(lib, "VmbFrameAnnounce")?,
                frame_revoke: symbol(lib, "VmbFrameRevoke")?,
                capture_frame_queue: symbol(lib, "VmbCaptureFrameQueue")?,
                capture_frame_wait: symbol(lib, "VmbCaptureFrameWait")?,
            })
        }
    }
}

/// Info about a camera reported by `VmbCamerasList`.
#[derive(Debug, Clone, Serialize)]
pub struct CameraInfo {
    pub id: String,
    pub name: String,
    pub model: String,
    pub serial: String,
    pub interface_id: String,
    pub permitted_access: u32,
}

/// A loaded and started VimbaC. Shuts the API down on drop.
pub struct VimbaLibrary {
    pub(crate) api: Api,
    path: PathBuf,
    _lib: Library,
}

impl VimbaLibrary {
    /// Load from `VIMBAC_LIB_PATH`, falling back to the default install path.
    pub fn from_env() -> Result<Self, LibraryError> {
        Self::load(lib_path_from_env())
    }

    /// Load the library at `path`, resolve the entry points and call `VmbStartup`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LibraryError> {
        let path = path.as_ref().to_path_buf();
        // SAFETY: loading runs the library's initialisers; VimbaC has no
        // load-time requirements beyond being a genuine VimbaC build.
        let lib = unsafe { Library::new(&path) }.map_err(|source| LibraryError::Load {
            path: path.clone(),
            source,
        })?;
        // SAFETY: see `Api::resolve`.
        let api = unsafe { Api::resolve(&lib) }?;

        // SAFETY: takes no arguments; entry points were resolved above.
        let code = vmb_call!("VmbStartup", (api.startup)());
        code.into_result().map_err(LibraryError::Startup)?;
        tracing::info!(path = %path.display(), "VimbaC started");

        Ok(Self {
            api,
            path,
            _lib: lib,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List connected cameras.
    pub fn cameras(&self) -> Result<Vec<CameraInfo>, LibraryError> {
        let info_size = std::mem::size_of::<VmbCameraInfo>() as u32;
        let mut count = 0u32;
        // SAFETY: a null list with length 0 only queries the count.
        vmb_call!(
            "VmbCamerasList",
            (self.api.cameras_list)(std::ptr::null_mut(), 0, &mut count, info_size)
        )
        .into_result()
        .map_err(LibraryError::CamerasList)?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let mut list = vec![VmbCameraInfo::empty(); count as usize];
        let mut found = 0u32;
        // SAFETY: `list` has room for `count` entries of the declared size.
        let code = vmb_call!(
            "VmbCamerasList",
            (self.api.cameras_list)(list.as_mut_ptr(), count, &mut found, info_size)
        );
        // MoreData: a camera appeared between the two calls; keep what fit.
        if !code.is_success() && code != ErrorCode::MORE_DATA {
            return Err(LibraryError::CamerasList(code));
        }
        list.truncate(found.min(count) as usize);

        Ok(list
            .iter()
            .map(|ci| CameraInfo {
                id: c_string(ci.camera_id_string),
                name: c_string(ci.camera_name),
                model: c_string(ci.model_name),
                serial: c_string(ci.serial_string),
                interface_id: c_string(ci.interface_id_string),
                permitted_access: ci.permitted_access,
            })
            .collect())
    }
}

impl Drop for VimbaLibrary {
    fn drop(&mut self) {
        // SAFETY: startup succeeded in `load`; shutdown is called once.
        unsafe { (self.api.shutdown)() };
        tracing::debug!("VimbaC shut down");
    }
}

impl FrameSdk for VimbaLibrary {
    unsafe fn frame_announce(
        &self,
        camera: CameraHandle,
        frame: *mut VmbFrame,
        size: u32,
    ) -> ErrorCode {
        // SAFETY (all four calls): the descriptor contract is carried by
        // the `FrameSdk` method contracts.
        vmb_call!(
            "VmbFrameAnnounce",
            (self.api.frame_announce)(camera.as_raw(), frame, size)
        )
    }

    unsafe fn frame_revoke(&self, camera: CameraHandle, frame: *mut VmbFrame) -> ErrorCode {
        vmb_call!("VmbFrameRevoke", (self.api.frame_revoke)(camera.as_raw(), frame))
    }

    unsafe fn capture_frame_queue(&self, camera: CameraHandle, frame: *mut VmbFrame) -> ErrorCode {
        vmb_call!(
            "VmbCaptureFrameQueue",
            (self.api.capture_frame_queue)(camera.as_raw(), frame, None)
        )
    }

    unsafe fn capture_frame_wait(
        &self,
        camera: CameraHandle,
        frame: *mut VmbFrame,
        timeout_ms: u32,
    ) -> ErrorCode {
        vmb_call!(
            "VmbCaptureFrameWait",
            (self.api.capture_frame_wait)(camera.as_raw(), frame, timeout_ms)
        )
    }
}

/// Library path from `VIMBAC_LIB_PATH`, or the platform default.
pub fn lib_path_from_env() -> PathBuf {
    std::env::var_os(LIB_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIB_PATH))
}

/// Copy a C string owned by the SDK. Null becomes empty.
pub(crate) fn c_string(ptr: *const libc::c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null strings from VimbaC are NUL-terminated and live at
    // least until the next call on the same API.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}
