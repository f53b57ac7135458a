use alloc::vec;
use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::AsPixels as _;
use rgb::RGBA8;

use crate::error::FramebufferError;

/// Format-agnostic RGBA image: `width * height` pixels, row-major, no padding.
#[derive(Clone, Debug)]
pub struct PixelGrid {
    img: ImgVec<RGBA8>,
}

impl PixelGrid {
    /// Wrap a pixel vector holding at least `width * height` pixels.
    /// Extra trailing pixels are dropped.
    pub fn new(mut pixels: Vec<RGBA8>, width: u32, height: u32) -> Result<Self, FramebufferError> {
        let needed = pixel_count(width, height)?;
        if pixels.len() < needed {
            return Err(FramebufferError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        pixels.truncate(needed);
        Ok(Self {
            img: ImgVec::new(pixels, width as usize, height as usize),
        })
    }

    /// Build from packed 8-bit RGBA bytes (`width * height * 4` bytes).
    pub fn from_rgba_bytes(bytes: &[u8], width: u32, height: u32) -> Result<Self, FramebufferError> {
        let needed = pixel_count(width, height)?;
        let byte_len = needed
            .checked_mul(4)
            .ok_or(FramebufferError::DimensionsTooLarge { width, height })?;
        let bytes = bytes.get(..byte_len).ok_or(FramebufferError::BufferTooSmall {
            needed,
            actual: bytes.len() / 4,
        })?;
        let pixels: &[RGBA8] = bytes.as_pixels();
        Self::new(pixels.to_vec(), width, height)
    }

    /// Grid with every pixel set to `color`.
    pub fn filled(color: RGBA8, width: u32, height: u32) -> Result<Self, FramebufferError> {
        let count = pixel_count(width, height)?;
        Self::new(vec![color; count], width, height)
    }

    pub fn width(&self) -> u32 {
        self.img.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.img.height() as u32
    }

    /// Pixel at `(x, y)`, or `None` if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<RGBA8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.img
            .buf()
            .get(y as usize * self.img.stride() + x as usize)
            .copied()
    }

    /// Overwrite the pixel at `(x, y)`. Returns `false` if out of bounds.
    pub fn set(&mut self, x: u32, y: u32, px: RGBA8) -> bool {
        if x >= self.width() || y >= self.height() {
            return false;
        }
        let idx = y as usize * self.img.stride() + x as usize;
        match self.img.buf_mut().get_mut(idx) {
            Some(slot) => {
                *slot = px;
                true
            }
            None => false,
        }
    }

    /// Iterate rows of pixels.
    pub fn rows(&self) -> impl Iterator<Item = &[RGBA8]> {
        self.img.rows()
    }

    pub fn pixels(&self) -> &[RGBA8] {
        self.img.buf()
    }

    /// Pixels as packed RGBA bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels()
            .iter()
            .flat_map(|px| [px.r, px.g, px.b, px.a])
            .collect()
    }

    /// Borrow as an [`imgref::ImgRef`].
    pub fn as_imgref(&self) -> ImgRef<'_, RGBA8> {
        self.img.as_ref()
    }

    pub fn into_imgvec(self) -> ImgVec<RGBA8> {
        self.img
    }
}

impl PartialEq for PixelGrid {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width() && self.height() == other.height() && self.pixels() == other.pixels()
    }
}

impl Eq for PixelGrid {}

impl TryFrom<ImgVec<RGBA8>> for PixelGrid {
    type Error = FramebufferError;

    /// Copies out of strided images so the grid is always contiguous.
    fn try_from(img: ImgVec<RGBA8>) -> Result<Self, Self::Error> {
        let width = img.width() as u32;
        let height = img.height() as u32;
        if img.stride() == img.width() {
            return Self::new(img.into_buf(), width, height);
        }
        let pixels: Vec<RGBA8> = img.rows().flatten().copied().collect();
        Self::new(pixels, width, height)
    }
}

fn pixel_count(width: u32, height: u32) -> Result<usize, FramebufferError> {
    if width == 0 || height == 0 {
        return Err(FramebufferError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(FramebufferError::DimensionsTooLarge { width, height })
}
