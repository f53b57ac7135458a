//! Parsers for framebuffer device descriptions.
//!
//! These take the text of `/proc/fb`, the `/sys/class/graphics/fbN/*`
//! attributes and the display-size tool's output. Fetching that text (adb,
//! `su`, local reads) is left to the caller.

use alloc::format;
use alloc::string::{String, ToString};

use crate::error::FramebufferError;
use crate::format::ColorFormat;
use crate::layout::{Layout, ResolvedLayout};

/// Framebuffer device as listed in `/proc/fb`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FbDevice {
    pub id: u32,
    pub driver: String,
}

impl FbDevice {
    /// Device node paths to probe, in order.
    pub fn node_candidates(&self) -> [String; 2] {
        [
            format!("/dev/graphics/fb{}", self.id),
            format!("/dev/fb{}", self.id),
        ]
    }

    /// Sysfs directory holding this device's attributes.
    pub fn sysfs_dir(&self) -> String {
        format!("/sys/class/graphics/fb{}/", self.id)
    }
}

/// Parse the first entry of `/proc/fb`, e.g. `"0 mdssfb_80000"`.
pub fn parse_proc_fb(text: &str) -> Result<FbDevice, FramebufferError> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| invalid("no framebuffer devices listed"))?;
    let mut parts = line.split_whitespace();
    let id = parts
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| invalid(format!("cannot parse /proc/fb line {line:?}")))?;
    let driver = parts
        .next()
        .ok_or_else(|| invalid(format!("missing driver name in {line:?}")))?;
    Ok(FbDevice {
        id,
        driver: driver.to_string(),
    })
}

/// Parse a sysfs `virtual_size` value: `"1080,1920"` or `"1080 1920"`.
pub fn parse_virtual_size(text: &str) -> Result<(u32, u32), FramebufferError> {
    let mut dims = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    match (dims.next(), dims.next(), dims.next()) {
        (Some(w), Some(h), None) => Ok((parse_u32("virtual_size", w)?, parse_u32("virtual_size", h)?)),
        _ => Err(invalid(format!("unexpected virtual_size format {text:?}"))),
    }
}

/// Parse display-size output, e.g. `"Physical size: 1080x1920"`.
///
/// Any `Override size:` line is ignored.
pub fn parse_physical_size(text: &str) -> Result<(u32, u32), FramebufferError> {
    let dims = text
        .lines()
        .find_map(|l| l.trim().strip_prefix("Physical size:"))
        .ok_or_else(|| invalid(format!("unexpected size output {text:?}")))?;
    let (w, h) = dims
        .trim()
        .split_once('x')
        .ok_or_else(|| invalid(format!("unexpected size output {text:?}")))?;
    Ok((parse_u32("physical size", w)?, parse_u32("physical size", h)?))
}

/// Geometry and pixel depth reported by a framebuffer device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u32,
    /// Bytes per row as reported by the device, if it reports one.
    pub stride: Option<u32>,
    pub mode: Option<String>,
}

impl DeviceInfo {
    /// Build from `(attribute, contents)` pairs of the sysfs directory.
    ///
    /// Recognised attributes: `bits_per_pixel`, `virtual_size`, `stride`,
    /// `mode`. Others are ignored. A zero or empty `stride` counts as absent.
    pub fn from_attributes<'a, I>(attrs: I) -> Result<Self, FramebufferError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut bpp = None;
        let mut size = None;
        let mut stride = None;
        let mut mode = None;
        for (name, value) in attrs {
            let value = value.trim();
            match name.trim() {
                "bits_per_pixel" => bpp = Some(parse_u32("bits_per_pixel", value)?),
                "virtual_size" => size = Some(parse_virtual_size(value)?),
                "stride" if !value.is_empty() => {
                    stride = Some(parse_u32("stride", value)?).filter(|&s| s != 0)
                }
                "mode" if !value.is_empty() => mode = Some(value.to_string()),
                other => log::trace!("ignoring framebuffer attribute {other:?}"),
            }
        }
        let bits_per_pixel = bpp.ok_or_else(|| invalid("missing bits_per_pixel"))?;
        let (width, height) = size.ok_or_else(|| invalid("missing virtual_size"))?;
        Ok(Self {
            width,
            height,
            bits_per_pixel,
            stride,
            mode,
        })
    }

    pub fn format(&self) -> Result<ColorFormat, FramebufferError> {
        ColorFormat::from_bits_per_pixel(self.bits_per_pixel)
    }

    /// Layout for this device. A reported stride is used exactly as given.
    pub fn layout(&self) -> Result<ResolvedLayout, FramebufferError> {
        Layout::resolve(self.width, self.height, self.format()?, self.stride)
    }
}

fn parse_u32(what: &str, s: &str) -> Result<u32, FramebufferError> {
    s.trim()
        .parse()
        .map_err(|_| invalid(format!("cannot parse {what} value {s:?}")))
}

fn invalid(msg: impl Into<String>) -> FramebufferError {
    FramebufferError::InvalidDeviceInfo(msg.into())
}
