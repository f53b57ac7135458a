use alloc::vec::Vec;

use enough::Stop;

use crate::error::FramebufferError;
use crate::layout::Layout;
use crate::pixel::PixelGrid;

/// Raw, headerless framebuffer bytes: `stride * height` bytes, row-major.
///
/// Width, height, stride and format travel alongside in [`Layout`]; nothing
/// about them is stored in the bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramebufferImage {
    data: Vec<u8>,
    layout: Layout,
}

impl FramebufferImage {
    /// Wrap raw framebuffer bytes (e.g. a dump of `/dev/fb0`).
    ///
    /// Bytes past `stride * height` are dropped.
    pub fn from_bytes(mut data: Vec<u8>, layout: Layout) -> Result<Self, FramebufferError> {
        let needed = layout.buffer_len()?;
        if data.len() < needed {
            return Err(FramebufferError::TruncatedBuffer {
                needed,
                actual: data.len(),
            });
        }
        data.truncate(needed);
        Ok(Self { data, layout })
    }

    pub(crate) fn from_parts(data: Vec<u8>, layout: Layout) -> Self {
        debug_assert_eq!(Some(data.len()), layout.buffer_len().ok());
        Self { data, layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel bytes of row `y` (padding excluded).
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let start = self.row_start(y)?;
        self.data.get(start..start + self.layout.row_bytes())
    }

    /// Padding bytes at the end of row `y`.
    pub fn row_padding(&self, y: u32) -> Option<&[u8]> {
        let start = self.row_start(y)? + self.layout.row_bytes();
        self.data.get(start..start + self.layout.padding_bytes())
    }

    fn row_start(&self, y: u32) -> Option<usize> {
        (y < self.layout.height()).then(|| y as usize * self.layout.stride() as usize)
    }

    /// Decode back to RGBA using this image's own layout.
    pub fn decode(&self, stop: impl Stop) -> Result<PixelGrid, FramebufferError> {
        crate::decode::decode(&self.data, &self.layout, &stop)
    }

    /// Write the raw bytes verbatim, no header.
    #[cfg(feature = "std")]
    pub fn write_to<W: std::io::Write>(&self, mut writer: W) -> Result<(), FramebufferError> {
        writer.write_all(&self.data)?;
        writer.flush()?;
        Ok(())
    }
}

impl AsRef<[u8]> for FramebufferImage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
