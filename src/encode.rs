//! RGBA → framebuffer bytes.

use alloc::vec;

use enough::Stop;
use rgb::RGBA8;

use crate::error::FramebufferError;
use crate::format::{ChannelLayout, ColorFormat, FormatDescriptor};
use crate::framebuffer::FramebufferImage;
use crate::layout::{Layout, StrideWarning};
use crate::limits::{Limits, check_limits};
use crate::pixel::PixelGrid;

/// One pixel in its on-wire byte form. Only the first `len` bytes are used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedPixel {
    bytes: [u8; 4],
    len: usize,
}

impl PackedPixel {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Pack a single pixel for `format`.
pub fn encode_pixel(format: ColorFormat, px: RGBA8, force_opaque_alpha: bool) -> PackedPixel {
    let desc = format.descriptor();
    let mut bytes = [0u8; 4];
    pack_pixel(desc, px, force_opaque_alpha, &mut bytes[..desc.bytes_per_pixel]);
    PackedPixel {
        bytes,
        len: desc.bytes_per_pixel,
    }
}

/// Write one pixel into `out`, which is exactly `desc.bytes_per_pixel` long.
pub(crate) fn pack_pixel(desc: &FormatDescriptor, px: RGBA8, force_opaque_alpha: bool, out: &mut [u8]) {
    match desc.channels {
        ChannelLayout::Bytes { r, g, b, a } => {
            out[r] = px.r;
            out[g] = px.g;
            out[b] = px.b;
            out[a] = if force_opaque_alpha { 255 } else { px.a };
        }
        ChannelLayout::Packed16 {
            red,
            green,
            blue,
            high_byte_first,
        } => {
            let word = red.pack(px.r) | green.pack(px.g) | blue.pack(px.b);
            let pair = if high_byte_first {
                word.to_be_bytes()
            } else {
                word.to_le_bytes()
            };
            out[..2].copy_from_slice(&pair);
        }
    }
}

/// Encode `pixels` into a framebuffer laid out as `layout`.
///
/// The grid must match the layout's dimensions. Row padding is zero-filled.
/// With `force_opaque_alpha`, every alpha byte is written as 255; formats
/// without alpha ignore the source alpha regardless.
pub fn encode(
    pixels: &PixelGrid,
    layout: &Layout,
    force_opaque_alpha: bool,
    stop: &dyn Stop,
) -> Result<FramebufferImage, FramebufferError> {
    layout.require_nonzero()?;
    if (pixels.width(), pixels.height()) != (layout.width(), layout.height()) {
        return Err(FramebufferError::GridMismatch {
            expected: (layout.width(), layout.height()),
            actual: (pixels.width(), pixels.height()),
        });
    }

    let desc = layout.format().descriptor();
    let row_bytes = layout.row_bytes();
    let mut out = vec![0u8; layout.buffer_len()?];

    for (y, (dst, src)) in out
        .chunks_exact_mut(layout.stride() as usize)
        .zip(pixels.rows())
        .enumerate()
    {
        if y % 16 == 0 {
            stop.check()?;
        }
        for (slot, &px) in dst[..row_bytes]
            .chunks_exact_mut(desc.bytes_per_pixel)
            .zip(src)
        {
            pack_pixel(desc, px, force_opaque_alpha, slot);
        }
    }

    Ok(FramebufferImage::from_parts(out, *layout))
}

/// Encoded framebuffer plus any layout warning raised while resolving the stride.
#[derive(Clone, Debug)]
pub struct EncodeOutput {
    pub image: FramebufferImage,
    pub stride_warning: Option<StrideWarning>,
}

impl EncodeOutput {
    pub fn into_image(self) -> FramebufferImage {
        self.image
    }
}

/// Builder for encoding an RGBA grid to a device framebuffer.
///
/// ```
/// use zenfb::{ColorFormat, EncodeRequest, PixelGrid, RGBA8, Unstoppable};
///
/// let grid = PixelGrid::filled(RGBA8::new(0xFF, 0x80, 0x10, 0x00), 2, 1)?;
/// let out = EncodeRequest::new(ColorFormat::Argb8888)
///     .with_stride(16)
///     .with_force_opaque_alpha(true)
///     .encode(&grid, Unstoppable)?;
/// assert_eq!(&out.image.as_bytes()[..4], &[0xFF, 0xFF, 0x80, 0x10]);
/// assert_eq!(&out.image.as_bytes()[8..], &[0; 8]);
/// # Ok::<(), zenfb::FramebufferError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EncodeRequest<'a> {
    format: ColorFormat,
    stride: Option<u32>,
    force_opaque_alpha: bool,
    limits: Option<&'a Limits>,
}

impl<'a> EncodeRequest<'a> {
    pub fn new(format: ColorFormat) -> Self {
        Self {
            format,
            stride: None,
            force_opaque_alpha: false,
            limits: None,
        }
    }

    /// Row stride in bytes, as reported by the device. Used verbatim.
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_force_opaque_alpha(mut self, force: bool) -> Self {
        self.force_opaque_alpha = force;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn encode(&self, pixels: &PixelGrid, stop: impl Stop) -> Result<EncodeOutput, FramebufferError> {
        let resolved = Layout::resolve(pixels.width(), pixels.height(), self.format, self.stride)?;
        let layout = resolved.layout;
        check_limits(self.limits, layout.width(), layout.height(), layout.buffer_len()?)?;
        stop.check()?;
        let image = encode(pixels, &layout, self.force_opaque_alpha, &stop)?;
        Ok(EncodeOutput {
            image,
            stride_warning: resolved.warning(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::unpack_pixel;
    use crate::format::BitField;

    fn rgb565(high_byte_first: bool) -> FormatDescriptor {
        FormatDescriptor {
            format: ColorFormat::Rgb565,
            name: "RGB565",
            bytes_per_pixel: 2,
            channels: ChannelLayout::Packed16 {
                red: BitField { shift: 11, bits: 5 },
                green: BitField { shift: 5, bits: 6 },
                blue: BitField { shift: 0, bits: 5 },
                high_byte_first,
            },
        }
    }

    #[test]
    fn packed16_word_order() {
        let px = RGBA8::new(0xFF, 0x00, 0x00, 0x10);
        let mut be = [0u8; 2];
        let mut le = [0u8; 2];
        pack_pixel(&rgb565(true), px, false, &mut be);
        pack_pixel(&rgb565(false), px, false, &mut le);
        assert_eq!(be, [0xF8, 0x00]);
        assert_eq!(le, [0x00, 0xF8]);

        let expected = RGBA8::new(0xF8, 0x00, 0x00, 255);
        assert_eq!(unpack_pixel(&rgb565(true), &be), expected);
        assert_eq!(unpack_pixel(&rgb565(false), &le), expected);
        assert_ne!(unpack_pixel(&rgb565(false), &be), expected);
    }

    #[test]
    fn table_rgb565_is_high_byte_first() {
        assert_eq!(*ColorFormat::Rgb565.descriptor(), rgb565(true));
        let px = RGBA8::new(0x12, 0x34, 0x56, 0x78);
        let mut out = [0u8; 2];
        pack_pixel(&rgb565(true), px, false, &mut out);
        assert_eq!(encode_pixel(ColorFormat::Rgb565, px, false).as_bytes(), &out[..]);
    }
}
