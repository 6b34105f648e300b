//! Pixel format table.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Monochrome pixel formats the frame adapter knows the byte width of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PixelFormat {
    /// 8-bit grayscale (1 byte/pixel).
    Mono8,
    /// 12-bit grayscale, unpacked into 2 bytes/pixel.
    Mono12,
    /// 14-bit grayscale, unpacked into 2 bytes/pixel.
    Mono14,
    /// 16-bit grayscale (2 bytes/pixel).
    Mono16,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 4] = [Self::Mono8, Self::Mono12, Self::Mono14, Self::Mono16];

    /// GenICam feature value for this format (e.g. "Mono12").
    pub fn name(self) -> &'static str {
        match self {
            Self::Mono8 => "Mono8",
            Self::Mono12 => "Mono12",
            Self::Mono14 => "Mono14",
            Self::Mono16 => "Mono16",
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Mono8 => 1,
            Self::Mono12 | Self::Mono14 | Self::Mono16 => 2,
        }
    }

    /// PFNC code the SDK writes into `VmbFrame_t::pixelFormat`.
    pub fn code(self) -> u32 {
        match self {
            Self::Mono8 => 0x0108_0001,
            Self::Mono12 => 0x0110_0005,
            Self::Mono14 => 0x0110_0025,
            Self::Mono16 => 0x0110_0007,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a camera reports a format missing from the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported pixel format: {0}")]
pub struct UnsupportedPixelFormat(pub String);

impl FromStr for PixelFormat {
    type Err = UnsupportedPixelFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnsupportedPixelFormat(s.to_string()))
    }
}

/// Bytes per pixel for a format name as reported by the camera.
pub fn pixel_bytes(name: &str) -> Result<usize, UnsupportedPixelFormat> {
    name.parse::<PixelFormat>().map(PixelFormat::bytes_per_pixel)
}
