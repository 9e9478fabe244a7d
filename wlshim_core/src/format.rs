// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-memory pixel formats.

/// Pixel layouts a `wl_shm` buffer can carry.
///
/// `Argb8888` and `Xrgb8888` are the two formats every compositor must
/// support; the rest depend on `wl_shm.format` announcements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit ARGB, premultiplied alpha.
    Argb8888,
    /// 32-bit RGB with an unused byte.
    Xrgb8888,
    /// 32-bit ABGR, premultiplied alpha.
    Abgr8888,
    /// 32-bit BGR with an unused byte.
    Xbgr8888,
    /// Packed 24-bit RGB.
    Rgb888,
    /// Packed 24-bit BGR.
    Bgr888,
    /// 16-bit 5:6:5 RGB.
    Rgb565,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> i32 {
        match self {
            Self::Argb8888 | Self::Xrgb8888 | Self::Abgr8888 | Self::Xbgr8888 => 4,
            Self::Rgb888 | Self::Bgr888 => 3,
            Self::Rgb565 => 2,
        }
    }

    /// The `wl_shm.format` code. The two mandatory formats use 0 and 1; the
    /// others use their DRM fourcc.
    #[must_use]
    pub const fn wl_shm_code(self) -> u32 {
        match self {
            Self::Argb8888 => 0,
            Self::Xrgb8888 => 1,
            Self::Abgr8888 => fourcc(b"AB24"),
            Self::Xbgr8888 => fourcc(b"XB24"),
            Self::Rgb888 => fourcc(b"RG24"),
            Self::Bgr888 => fourcc(b"BG24"),
            Self::Rgb565 => fourcc(b"RG16"),
        }
    }

    /// Maps a `wl_shm.format` code back to a format this crate models.
    #[must_use]
    pub fn from_wl_shm_code(code: u32) -> Option<Self> {
        [
            Self::Argb8888,
            Self::Xrgb8888,
            Self::Abgr8888,
            Self::Xbgr8888,
            Self::Rgb888,
            Self::Bgr888,
            Self::Rgb565,
        ]
        .into_iter()
        .find(|format| format.wl_shm_code() == code)
    }
}

const fn fourcc(code: &[u8; 4]) -> u32 {
    (code[0] as u32) | ((code[1] as u32) << 8) | ((code[2] as u32) << 16) | ((code[3] as u32) << 24)
}
