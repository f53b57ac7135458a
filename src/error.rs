use alloc::string::String;
use enough::StopReason;

/// Errors from framebuffer encoding, decoding and layout resolution.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FramebufferError {
    #[error("unsupported framebuffer format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid layout: stride {stride} is smaller than the minimum {min_stride}")]
    InvalidLayout { stride: u32, min_stride: u32 },

    #[error("truncated framebuffer: need {needed} bytes, got {actual}")]
    TruncatedBuffer { needed: usize, actual: usize },

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(
        "pixel grid is {}x{}, layout expects {}x{}",
        actual.0, actual.1, expected.0, expected.1
    )]
    GridMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("buffer too small: need {needed} pixels, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid device info: {0}")]
    InvalidDeviceInfo(String),

    #[error("worker pool: {0}")]
    WorkerPool(String),

    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for FramebufferError {
    fn from(r: StopReason) -> Self {
        FramebufferError::Cancelled(r)
    }
}
