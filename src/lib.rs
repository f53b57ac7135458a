//! # zenfb
//!
//! Bit-exact conversion between RGBA pixels and raw device framebuffer bytes.
//!
//! A framebuffer dump carries no header: width, height, row stride and pixel
//! format are known only out-of-band (from the device's sysfs attributes, or
//! from the caller). This crate takes that description as a [`Layout`] and
//! translates in both directions.
//!
//! ## Supported Formats
//!
//! | Format     | Bytes | Layout                                        |
//! |------------|-------|-----------------------------------------------|
//! | `RGB565`   | 2     | `RRRRRGGG GGGBBBBB`, high byte first, no alpha |
//! | `ARGB8888` | 4     | A, R, G, B                                    |
//! | `ABGR8888` | 4     | A, B, G, R                                    |
//! | `BGRA8888` | 4     | B, G, R, A                                    |
//! | `RGBA8888` | 4     | R, G, B, A                                    |
//!
//! All channel placement comes from one descriptor table ([`describe`],
//! [`ColorFormat::descriptor`]); encoder and decoder never special-case a
//! format on their own.
//!
//! ## Stride
//!
//! Devices often pad rows for alignment, so the stride can exceed
//! `width * bytes_per_pixel`. An explicit stride is used as given. When none is
//! known, [`Layout::resolve`] falls back to the packed stride, logs a warning,
//! and reports it through [`ResolvedLayout::warning`]; the output is then
//! best effort. Padding is zero-filled on encode and never read on decode.
//!
//! ## Batch encoding
//!
//! With the `batch` feature (default), [`BatchEncoder`] encodes frame
//! sequences (e.g. decoded video) on a bounded worker pool, keeping output
//! slot `i` bound to source frame `i` and isolating per-frame failures.
//!
//! ## Non-Goals
//!
//! - Picture file formats, font rendering, video demuxing, resizing
//! - Talking to a device (adb, mmap, ioctl)
//! - Color management, gamma, dithering
//!
//! ## Usage
//!
//! ```
//! use zenfb::{ColorFormat, DecodeRequest, EncodeRequest, PixelGrid, RGBA8, Unstoppable};
//!
//! let grid = PixelGrid::filled(RGBA8::new(0xF8, 0xFC, 0xF8, 0xFF), 4, 2)?;
//!
//! let out = EncodeRequest::new(ColorFormat::Rgb565)
//!     .with_stride(16)
//!     .encode(&grid, Unstoppable)?;
//! assert_eq!(out.image.as_bytes().len(), 32);
//! assert!(out.stride_warning.is_none());
//!
//! let back = DecodeRequest::new(out.image.as_bytes(), 4, 2, ColorFormat::Rgb565)
//!     .with_stride(16)
//!     .decode(Unstoppable)?;
//! assert_eq!(back.pixels, grid);
//! # Ok::<(), zenfb::FramebufferError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod format;
mod framebuffer;
mod layout;
mod limits;
mod pixel;

mod decode;
mod encode;

pub mod device;
pub mod fill;

#[cfg(feature = "batch")]
mod batch;

// Re-exports
#[cfg(feature = "batch")]
pub use batch::{BatchEncoder, BatchReport, CollectFrames, DirectorySink, FrameOutcome, FrameSink};
pub use decode::{DecodeOutput, DecodeRequest, decode};
pub use encode::{EncodeOutput, EncodeRequest, PackedPixel, encode, encode_pixel};
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::FramebufferError;
pub use format::{BitField, ChannelLayout, ColorFormat, FormatDescriptor, describe};
pub use framebuffer::FramebufferImage;
pub use layout::{Layout, ResolvedLayout, StrideSource, StrideWarning, stride_for};
pub use limits::Limits;
pub use pixel::PixelGrid;
pub use rgb::RGBA8;
