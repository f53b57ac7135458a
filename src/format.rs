//! Format descriptor table.
//!
//! Every per-format decision the encoder and decoder make is derived from the
//! [`FormatDescriptor`] returned here. Nothing else in the crate matches on
//! [`ColorFormat`] to decide where a channel lives.

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use crate::error::FramebufferError;

/// Framebuffer pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    /// 16-bit packed 5/6/5, no alpha.
    Rgb565,
    /// Bytes A, R, G, B.
    Argb8888,
    /// Bytes A, B, G, R.
    Abgr8888,
    /// Bytes B, G, R, A.
    Bgra8888,
    /// Bytes R, G, B, A.
    Rgba8888,
}

/// A channel stored in a sub-byte bit range of a 16-bit word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitField {
    /// Position of the field's least significant bit within the word.
    pub shift: u8,
    /// Field width in bits (1..=8).
    pub bits: u8,
}

impl BitField {
    const fn new(shift: u8, bits: u8) -> Self {
        Self { shift, bits }
    }

    /// Mask covering the field once shifted down to bit 0.
    #[inline]
    pub fn mask(self) -> u16 {
        (1u16 << self.bits) - 1
    }

    /// Truncate an 8-bit channel to this field's width and place it in the word.
    #[inline]
    pub fn pack(self, channel: u8) -> u16 {
        (u16::from(channel) >> (8 - self.bits)) << self.shift
    }

    /// Extract this field from a word, left-aligned in 8 bits.
    ///
    /// Low bits are zero (no replication), so `0x1F` red becomes `0xF8`.
    #[inline]
    pub fn unpack(self, word: u16) -> u8 {
        (((word >> self.shift) & self.mask()) << (8 - self.bits)) as u8
    }
}

/// Where each channel lives inside one packed pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelLayout {
    /// One byte per channel; values are byte offsets within the pixel.
    Bytes { r: usize, g: usize, b: usize, a: usize },
    /// Three bit fields in a 16-bit word, no alpha.
    Packed16 {
        red: BitField,
        green: BitField,
        blue: BitField,
        /// Word is stored high byte first (byte-swapped relative to a
        /// little-endian host's native `u16`).
        high_byte_first: bool,
    },
}

/// Static metadata for one [`ColorFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub format: ColorFormat,
    pub name: &'static str,
    pub bytes_per_pixel: usize,
    pub channels: ChannelLayout,
}

impl FormatDescriptor {
    /// Whether the format stores an alpha channel.
    pub fn has_alpha(&self) -> bool {
        matches!(self.channels, ChannelLayout::Bytes { .. })
    }
}

static DESCRIPTORS: [FormatDescriptor; 5] = [
    FormatDescriptor {
        format: ColorFormat::Rgb565,
        name: "RGB565",
        bytes_per_pixel: 2,
        channels: ChannelLayout::Packed16 {
            red: BitField::new(11, 5),
            green: BitField::new(5, 6),
            blue: BitField::new(0, 5),
            high_byte_first: true,
        },
    },
    FormatDescriptor {
        format: ColorFormat::Argb8888,
        name: "ARGB8888",
        bytes_per_pixel: 4,
        channels: ChannelLayout::Bytes { a: 0, r: 1, g: 2, b: 3 },
    },
    FormatDescriptor {
        format: ColorFormat::Abgr8888,
        name: "ABGR8888",
        bytes_per_pixel: 4,
        channels: ChannelLayout::Bytes { a: 0, b: 1, g: 2, r: 3 },
    },
    FormatDescriptor {
        format: ColorFormat::Bgra8888,
        name: "BGRA8888",
        bytes_per_pixel: 4,
        channels: ChannelLayout::Bytes { b: 0, g: 1, r: 2, a: 3 },
    },
    FormatDescriptor {
        format: ColorFormat::Rgba8888,
        name: "RGBA8888",
        bytes_per_pixel: 4,
        channels: ChannelLayout::Bytes { r: 0, g: 1, b: 2, a: 3 },
    },
];

impl ColorFormat {
    /// All supported formats, in table order.
    pub const ALL: [ColorFormat; 5] = [
        ColorFormat::Rgb565,
        ColorFormat::Argb8888,
        ColorFormat::Abgr8888,
        ColorFormat::Bgra8888,
        ColorFormat::Rgba8888,
    ];

    /// Descriptor table entry for this format.
    pub fn descriptor(self) -> &'static FormatDescriptor {
        let idx = match self {
            ColorFormat::Rgb565 => 0,
            ColorFormat::Argb8888 => 1,
            ColorFormat::Abgr8888 => 2,
            ColorFormat::Bgra8888 => 3,
            ColorFormat::Rgba8888 => 4,
        };
        &DESCRIPTORS[idx]
    }

    pub fn bytes_per_pixel(self) -> usize {
        self.descriptor().bytes_per_pixel
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Map a device's `bits_per_pixel` to a format.
    ///
    /// Only 32 (ARGB8888) and 16 (RGB565) are representable by this codec.
    pub fn from_bits_per_pixel(bpp: u32) -> Result<Self, FramebufferError> {
        match bpp {
            32 => Ok(ColorFormat::Argb8888),
            16 => Ok(ColorFormat::Rgb565),
            other => {
                let name = match other {
                    24 => "RGB888",
                    15 => "ARGB1555",
                    12 => "RGB444",
                    8 => "RGB332",
                    _ => "unknown",
                };
                Err(FramebufferError::UnsupportedFormat(alloc::format!(
                    "{other} bits per pixel ({name})"
                )))
            }
        }
    }
}

/// Look up a format descriptor by name (`"RGB565"`, `"argb8888"`, ...).
pub fn describe(name: &str) -> Result<&'static FormatDescriptor, FramebufferError> {
    DESCRIPTORS
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| FramebufferError::UnsupportedFormat(name.to_string()))
}

impl FromStr for ColorFormat {
    type Err = FramebufferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        describe(s).map(|d| d.format)
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
