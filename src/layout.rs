//! Row stride and buffer layout.

use crate::error::FramebufferError;
use crate::format::ColorFormat;

/// Default stride for a tightly packed row: `width * bytes_per_pixel`.
pub fn stride_for(width: u32, format: ColorFormat) -> Result<u32, FramebufferError> {
    width
        .checked_mul(format.bytes_per_pixel() as u32)
        .ok_or(FramebufferError::DimensionsTooLarge { width, height: 0 })
}

/// Physical layout of a framebuffer.
///
/// `stride` is the byte distance between row starts and is always at least
/// `width * bytes_per_pixel`. Anything past the pixel bytes of a row is padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    width: u32,
    height: u32,
    stride: u32,
    format: ColorFormat,
}

impl Layout {
    /// Layout with an explicit stride. The stride is validated, never adjusted.
    pub fn new(
        width: u32,
        height: u32,
        stride: u32,
        format: ColorFormat,
    ) -> Result<Self, FramebufferError> {
        let layout = Self {
            width,
            height,
            stride,
            format,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Tightly packed layout (no row padding).
    pub fn packed(width: u32, height: u32, format: ColorFormat) -> Result<Self, FramebufferError> {
        Self::new(width, height, stride_for(width, format)?, format)
    }

    /// Use `stride` if the caller knows it, otherwise fall back to the packed
    /// stride and flag the result as guessed.
    pub fn resolve(
        width: u32,
        height: u32,
        format: ColorFormat,
        stride: Option<u32>,
    ) -> Result<ResolvedLayout, FramebufferError> {
        match stride {
            Some(stride) => Ok(ResolvedLayout {
                layout: Self::new(width, height, stride, format)?,
                source: StrideSource::Explicit,
            }),
            None => {
                let layout = Self::packed(width, height, format)?;
                log::warn!(
                    "no stride given for {width}x{height} {format}; assuming {} bytes per row, \
                     output may be corrupted if the device pads rows",
                    layout.stride
                );
                Ok(ResolvedLayout {
                    layout,
                    source: StrideSource::Guessed,
                })
            }
        }
    }

    /// Check `stride >= width * bytes_per_pixel`.
    pub fn validate(&self) -> Result<(), FramebufferError> {
        let min_stride = stride_for(self.width, self.format)?;
        if self.stride < min_stride {
            return Err(FramebufferError::InvalidLayout {
                stride: self.stride,
                min_stride,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Bytes of pixel data in each row, excluding padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Padding bytes at the end of each row.
    pub fn padding_bytes(&self) -> usize {
        self.stride as usize - self.row_bytes()
    }

    /// Total buffer length, `stride * height`.
    pub fn buffer_len(&self) -> Result<usize, FramebufferError> {
        (self.stride as usize)
            .checked_mul(self.height as usize)
            .ok_or(FramebufferError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            })
    }

    pub(crate) fn require_nonzero(&self) -> Result<(), FramebufferError> {
        if self.width == 0 || self.height == 0 {
            return Err(FramebufferError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Where a layout's stride came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrideSource {
    /// Supplied by the caller or probed from the device.
    Explicit,
    /// Computed as `width * bytes_per_pixel` because none was supplied.
    Guessed,
}

/// Non-fatal signal that a stride was computed rather than supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrideWarning {
    pub assumed_stride: u32,
}

impl core::fmt::Display for StrideWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "stride not provided, assumed {} bytes per row; query the device for the real stride",
            self.assumed_stride
        )
    }
}

/// A [`Layout`] plus the provenance of its stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub layout: Layout,
    pub source: StrideSource,
}

impl ResolvedLayout {
    pub fn is_guessed(&self) -> bool {
        self.source == StrideSource::Guessed
    }

    pub fn warning(&self) -> Option<StrideWarning> {
        self.is_guessed().then_some(StrideWarning {
            assumed_stride: self.layout.stride,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stride() {
        assert_eq!(stride_for(100, ColorFormat::Argb8888).unwrap(), 400);
        assert_eq!(stride_for(100, ColorFormat::Rgb565).unwrap(), 200);
    }

    #[test]
    fn explicit_stride_is_kept() {
        let resolved = Layout::resolve(100, 10, ColorFormat::Argb8888, Some(512)).unwrap();
        assert_eq!(resolved.layout.stride(), 512);
        assert_eq!(resolved.layout.padding_bytes(), 112);
        assert!(!resolved.is_guessed());
        assert_eq!(resolved.warning(), None);
    }

    #[test]
    fn missing_stride_is_guessed_with_warning() {
        let resolved = Layout::resolve(100, 10, ColorFormat::Argb8888, None).unwrap();
        assert_eq!(resolved.layout.stride(), 400);
        assert!(resolved.is_guessed());
        assert_eq!(
            resolved.warning(),
            Some(StrideWarning { assumed_stride: 400 })
        );
    }

    #[test]
    fn short_stride_rejected() {
        match Layout::new(4, 2, 7, ColorFormat::Rgb565) {
            Err(FramebufferError::InvalidLayout { stride, min_stride }) => {
                assert_eq!(stride, 7);
                assert_eq!(min_stride, 8);
            }
            other => panic!("expected InvalidLayout, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_width_rejected() {
        assert!(matches!(
            stride_for(u32::MAX, ColorFormat::Rgba8888),
            Err(FramebufferError::DimensionsTooLarge { .. })
        ));
    }
}
