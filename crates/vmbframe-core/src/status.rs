//! SDK status codes.
//!
//! Every VimbaC entry point returns a signed 32-bit `VmbError_t`. Zero is
//! success; the negative values below are the documented failures. Codes
//! outside the table are passed through untouched and reported as unknown.

use serde::Serialize;
use std::fmt;

/// Raw status code returned by a VimbaC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const SUCCESS: Self = Self(0);
    pub const INTERNAL_FAULT: Self = Self(-1);
    pub const API_NOT_STARTED: Self = Self(-2);
    pub const NOT_FOUND: Self = Self(-3);
    pub const BAD_HANDLE: Self = Self(-4);
    pub const DEVICE_NOT_OPEN: Self = Self(-5);
    pub const INVALID_ACCESS: Self = Self(-6);
    pub const BAD_PARAMETER: Self = Self(-7);
    pub const STRUCT_SIZE: Self = Self(-8);
    pub const MORE_DATA: Self = Self(-9);
    pub const WRONG_TYPE: Self = Self(-10);
    pub const INVALID_VALUE: Self = Self(-11);
    pub const TIMEOUT: Self = Self(-12);
    pub const OTHER: Self = Self(-13);
    pub const RESOURCES: Self = Self(-14);
    pub const INVALID_CALL: Self = Self(-15);
    pub const NO_TL: Self = Self(-16);
    pub const NOT_IMPLEMENTED: Self = Self(-17);
    pub const NOT_SUPPORTED: Self = Self(-18);
    pub const INCOMPLETE: Self = Self(-19);
    pub const IO: Self = Self(-20);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn is_timeout(self) -> bool {
        self == Self::TIMEOUT
    }

    /// Convert to `Ok(())` on success, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), ErrorCode> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Symbolic name as it appears in `VmbCommonTypes.h`.
    pub fn name(self) -> &'static str {
        self.entry().map_or("VmbErrorUnknown", |e| e.1)
    }

    /// Human-readable description of the code.
    pub fn description(self) -> &'static str {
        self.entry().map_or("Unknown SDK status code.", |e| e.2)
    }

    /// All codes the binding knows a name for, in declaration order.
    pub fn known() -> impl Iterator<Item = ErrorCode> {
        CODES.iter().map(|&(code, _, _)| ErrorCode(code))
    }

    fn entry(self) -> Option<&'static (i32, &'static str, &'static str)> {
        CODES.iter().find(|(code, _, _)| *code == self.0)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.0, self.description())
    }
}

const CODES: &[(i32, &str, &str)] = &[
    (0, "VmbErrorSuccess", "No error."),
    (-1, "VmbErrorInternalFault", "Unexpected fault in VimbaC or driver."),
    (-2, "VmbErrorApiNotStarted", "VmbStartup() was not called before the current command."),
    (-3, "VmbErrorNotFound", "The designated instance (camera, feature etc.) cannot be found."),
    (-4, "VmbErrorBadHandle", "The given handle is not valid."),
    (-5, "VmbErrorDeviceNotOpen", "Device was not opened for usage."),
    (-6, "VmbErrorInvalidAccess", "Operation is invalid with the current access mode."),
    (-7, "VmbErrorBadParameter", "One of the parameters is invalid (usually an illegal pointer)."),
    (-8, "VmbErrorStructSize", "The given struct size is not valid for this version of the API."),
    (-9, "VmbErrorMoreData", "More data available in a string/list than space is provided."),
    (-10, "VmbErrorWrongType", "Wrong feature type for this access function."),
    (-11, "VmbErrorInvalidValue", "The value is not valid; either out of bounds or not an increment of the minimum."),
    (-12, "VmbErrorTimeout", "Timeout during wait."),
    (-13, "VmbErrorOther", "Other error."),
    (-14, "VmbErrorResources", "Resources not available (e.g. memory)."),
    (-15, "VmbErrorInvalidCall", "Call is invalid in the current context (e.g. callback)."),
    (-16, "VmbErrorNoTL", "No transport layers are found."),
    (-17, "VmbErrorNotImplemented", "API feature is not implemented."),
    (-18, "VmbErrorNotSupported", "API feature is not supported."),
    (-19, "VmbErrorIncomplete", "A multiple registers read or write was partially completed."),
    (-20, "VmbErrorIO", "Low level IO error in transport layer."),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_zero() {
        assert!(ErrorCode(0).is_success());
        assert_eq!(ErrorCode::SUCCESS.into_result(), Ok(()));
    }

    #[test]
    fn timeout_is_minus_twelve() {
        assert!(ErrorCode(-12).is_timeout());
        assert_eq!(ErrorCode::TIMEOUT.name(), "VmbErrorTimeout");
        assert_eq!(ErrorCode::TIMEOUT.into_result(), Err(ErrorCode::TIMEOUT));
    }

    #[test]
    fn unknown_code_passes_through() {
        let code = ErrorCode::from(-999);
        assert_eq!(code.0, -999);
        assert_eq!(code.name(), "VmbErrorUnknown");
        assert!(!code.is_success());
    }

    #[test]
    fn known_table_is_contiguous() {
        let codes: Vec<i32> = ErrorCode::known().map(|c| c.0).collect();
        assert_eq!(codes, (-20..=0).rev().collect::<Vec<_>>());
    }

    #[test]
    fn display_includes_name_and_value() {
        let text = ErrorCode::BAD_HANDLE.to_string();
        assert!(text.starts_with("VmbErrorBadHandle (-4)"), "got: {text}");
    }
}
