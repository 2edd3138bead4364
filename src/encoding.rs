//! Packed pixel encodings used by texture manifests.
//!
//! The encoding identifier lives in the top nibble of a manifest's packed
//! width field.  Known identifiers:
//!   - `0x0` – RGBA8888, one byte per channel
//!   - `0x2` – RGB565
//!   - `0x3` – RGBA4444
//!   - `0x4` – RGBA5551
//!   - `0x8` / `0x9` – 8-bit greyscale
//!   - `0xB` / `0xC` – PVR-compressed, 4bpp / 2bpp (pixels not decoded)
//!   - `0xD` – raw file data, usually an embedded JPEG

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Rgba8888,
    Rgb565,
    Rgba4444,
    Rgba5551,
    Grey8,
    Pvrtc4,
    Pvrtc2,
    /// Opaque passthrough data with no channel layout.
    Raw,
}

impl Encoding {
    /// Look up the encoding for a manifest identifier.
    ///
    /// Returns `None` for identifiers outside the table; callers substitute
    /// [`Encoding::Raw`] and report the identifier.
    pub fn from_identifier(identifier: u8) -> Option<Self> {
        match identifier {
            0x0 => Some(Encoding::Rgba8888),
            0x2 => Some(Encoding::Rgb565),
            0x3 => Some(Encoding::Rgba4444),
            0x4 => Some(Encoding::Rgba5551),
            0x8 | 0x9 => Some(Encoding::Grey8),
            0xB => Some(Encoding::Pvrtc4),
            0xC => Some(Encoding::Pvrtc2),
            0xD => Some(Encoding::Raw),
            _ => None,
        }
    }

    /// Channel bit widths, most-significant channel first.
    pub fn channels(self) -> &'static [u8] {
        match self {
            Encoding::Rgba8888 => &[8, 8, 8, 8],
            Encoding::Rgb565 => &[5, 6, 5],
            Encoding::Rgba4444 => &[4, 4, 4, 4],
            Encoding::Rgba5551 => &[5, 5, 5, 1],
            Encoding::Grey8 => &[8],
            Encoding::Pvrtc4 => &[4],
            Encoding::Pvrtc2 => &[2],
            Encoding::Raw => &[],
        }
    }

    /// Total bits per pixel, `None` for raw data.
    pub fn stride_in_bits(self) -> Option<u32> {
        match self {
            Encoding::Raw => None,
            _ => Some(self.channels().iter().map(|&bits| u32::from(bits)).sum()),
        }
    }

    pub fn channels_per_pixel(self) -> usize {
        self.channels().len()
    }

    pub fn has_alpha(self) -> bool {
        self.channels().len() == 4
    }

    pub fn is_greyscale(self) -> bool {
        self.channels().len() == 1
    }

    pub fn is_pvr(self) -> bool {
        matches!(self, Encoding::Pvrtc4 | Encoding::Pvrtc2)
    }

    /// Number of payload bytes a `width` x `height` texture occupies.
    ///
    /// Raw payloads carry an explicit length in their manifest, so this
    /// returns `None` for them.
    pub fn byte_count(self, width: u32, height: u32) -> Option<usize> {
        self.stride_in_bits()
            .map(|stride| (width as usize * height as usize * stride as usize) / 8)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Rgba8888 => "RGBA8888",
            Encoding::Rgb565 => "RGB565",
            Encoding::Rgba4444 => "RGBA4444",
            Encoding::Rgba5551 => "RGBA5551",
            Encoding::Grey8 => "L8",
            Encoding::Pvrtc4 => "PVRTC4BPP",
            Encoding::Pvrtc2 => "PVRTC2BPP",
            Encoding::Raw => "RAW",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_table() {
        assert_eq!(Encoding::from_identifier(0x0), Some(Encoding::Rgba8888));
        assert_eq!(Encoding::from_identifier(0x2), Some(Encoding::Rgb565));
        assert_eq!(Encoding::from_identifier(0x3), Some(Encoding::Rgba4444));
        assert_eq!(Encoding::from_identifier(0x4), Some(Encoding::Rgba5551));
        assert_eq!(Encoding::from_identifier(0x8), Some(Encoding::Grey8));
        assert_eq!(Encoding::from_identifier(0x9), Some(Encoding::Grey8));
        assert_eq!(Encoding::from_identifier(0xB), Some(Encoding::Pvrtc4));
        assert_eq!(Encoding::from_identifier(0xC), Some(Encoding::Pvrtc2));
        assert_eq!(Encoding::from_identifier(0xD), Some(Encoding::Raw));
        for unknown in [0x1, 0x5, 0x6, 0x7, 0xA, 0xE, 0xF] {
            assert_eq!(Encoding::from_identifier(unknown), None, "0x{unknown:X}");
        }
    }

    #[test]
    fn test_derived_properties() {
        assert_eq!(Encoding::Rgba8888.stride_in_bits(), Some(32));
        assert_eq!(Encoding::Rgb565.stride_in_bits(), Some(16));
        assert_eq!(Encoding::Rgba4444.stride_in_bits(), Some(16));
        assert_eq!(Encoding::Rgba5551.stride_in_bits(), Some(16));
        assert_eq!(Encoding::Grey8.stride_in_bits(), Some(8));
        assert_eq!(Encoding::Pvrtc4.stride_in_bits(), Some(4));
        assert_eq!(Encoding::Pvrtc2.stride_in_bits(), Some(2));
        assert_eq!(Encoding::Raw.stride_in_bits(), None);

        assert!(Encoding::Rgba5551.has_alpha());
        assert!(!Encoding::Rgb565.has_alpha());
        assert!(Encoding::Grey8.is_greyscale());
        assert!(!Encoding::Raw.has_alpha());
        assert!(!Encoding::Raw.is_greyscale());
        assert!(Encoding::Pvrtc2.is_pvr());
        assert!(!Encoding::Rgba4444.is_pvr());
    }

    #[test]
    fn test_byte_count() {
        assert_eq!(Encoding::Rgba8888.byte_count(2, 2), Some(16));
        assert_eq!(Encoding::Rgb565.byte_count(3, 1), Some(6));
        assert_eq!(Encoding::Pvrtc2.byte_count(8, 8), Some(16));
        assert_eq!(Encoding::Grey8.byte_count(0, 100), Some(0));
        assert_eq!(Encoding::Raw.byte_count(16, 16), None);
    }
}
