//! Framebuffer bytes → RGBA.

use alloc::vec::Vec;

use enough::Stop;
use rgb::RGBA8;

use crate::error::FramebufferError;
use crate::format::{ChannelLayout, ColorFormat, FormatDescriptor};
use crate::layout::{Layout, StrideWarning};
use crate::limits::{Limits, check_limits};
use crate::pixel::PixelGrid;

/// Decode raw framebuffer bytes laid out as `layout` into a [`PixelGrid`].
///
/// Reads only the `width * bytes_per_pixel` pixel bytes of each row; row
/// padding never reaches the output. Bytes past `stride * height` are ignored.
pub fn decode(bytes: &[u8], layout: &Layout, stop: &dyn Stop) -> Result<PixelGrid, FramebufferError> {
    layout.require_nonzero()?;
    let needed = layout.buffer_len()?;
    let data = bytes.get(..needed).ok_or(FramebufferError::TruncatedBuffer {
        needed,
        actual: bytes.len(),
    })?;

    let desc = layout.format().descriptor();
    let row_bytes = layout.row_bytes();
    let mut pixels = Vec::with_capacity(layout.width() as usize * layout.height() as usize);

    for (y, row) in data.chunks_exact(layout.stride() as usize).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        pixels.extend(
            row[..row_bytes]
                .chunks_exact(desc.bytes_per_pixel)
                .map(|packed| unpack_pixel(desc, packed)),
        );
    }

    PixelGrid::new(pixels, layout.width(), layout.height())
}

/// Unpack one pixel. `packed` is exactly `desc.bytes_per_pixel` long.
pub(crate) fn unpack_pixel(desc: &FormatDescriptor, packed: &[u8]) -> RGBA8 {
    match desc.channels {
        ChannelLayout::Bytes { r, g, b, a } => RGBA8::new(packed[r], packed[g], packed[b], packed[a]),
        ChannelLayout::Packed16 {
            red,
            green,
            blue,
            high_byte_first,
        } => {
            let pair = [packed[0], packed[1]];
            let word = if high_byte_first {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            };
            RGBA8::new(red.unpack(word), green.unpack(word), blue.unpack(word), 255)
        }
    }
}

/// Decoded image plus any layout warning raised while resolving the stride.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pub pixels: PixelGrid,
    pub layout: Layout,
    pub stride_warning: Option<StrideWarning>,
}

impl DecodeOutput {
    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    pub fn into_pixels(self) -> PixelGrid {
        self.pixels
    }
}

/// Builder for decoding a framebuffer dump whose stride may be unknown.
///
/// ```
/// use zenfb::{ColorFormat, DecodeRequest, Unstoppable};
///
/// let dump = vec![0xFFu8; 4 * 2 * 2];
/// let out = DecodeRequest::new(&dump, 2, 2, ColorFormat::Argb8888)
///     .with_stride(8)
///     .decode(Unstoppable)?;
/// assert_eq!(out.pixels.get(1, 1), Some(zenfb::RGBA8::new(255, 255, 255, 255)));
/// # Ok::<(), zenfb::FramebufferError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: ColorFormat,
    stride: Option<u32>,
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, format: ColorFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
            stride: None,
            limits: None,
        }
    }

    /// Row stride in bytes, as reported by the device. Used verbatim.
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, FramebufferError> {
        let resolved = Layout::resolve(self.width, self.height, self.format, self.stride)?;
        let layout = resolved.layout;
        let out_bytes = (layout.width() as usize)
            .checked_mul(layout.height() as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or(FramebufferError::DimensionsTooLarge {
                width: layout.width(),
                height: layout.height(),
            })?;
        check_limits(self.limits, layout.width(), layout.height(), out_bytes)?;
        stop.check()?;
        let pixels = decode(self.data, &layout, &stop)?;
        Ok(DecodeOutput {
            pixels,
            layout,
            stride_warning: resolved.warning(),
        })
    }
}
