//! Solid-color framebuffers.

use alloc::string::ToString;
use alloc::vec;

use enough::Stop;
use rgb::RGBA8;

use crate::encode::encode_pixel;
use crate::error::FramebufferError;
use crate::framebuffer::FramebufferImage;
use crate::layout::Layout;

/// Parse `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
///
/// Six-digit colors are fully opaque.
pub fn parse_hex_color(s: &str) -> Result<RGBA8, FramebufferError> {
    let hex = s.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FramebufferError::InvalidColor(s.to_string()));
    }
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| FramebufferError::InvalidColor(s.to_string()))
    };
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(RGBA8::new(channel(0)?, channel(2)?, channel(4)?, a))
}

/// Framebuffer with every pixel set to `color`, always fully opaque.
///
/// The color is packed once and replicated; row padding stays zero.
pub fn fill(color: RGBA8, layout: &Layout, stop: &dyn Stop) -> Result<FramebufferImage, FramebufferError> {
    layout.require_nonzero()?;
    let packed = encode_pixel(layout.format(), color, true);
    let packed = packed.as_bytes();
    let row_bytes = layout.row_bytes();
    let mut out = vec![0u8; layout.buffer_len()?];

    for (y, row) in out.chunks_exact_mut(layout.stride() as usize).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        for slot in row[..row_bytes].chunks_exact_mut(packed.len()) {
            slot.copy_from_slice(packed);
        }
    }

    Ok(FramebufferImage::from_parts(out, *layout))
}
