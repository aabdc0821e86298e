use thiserror::Error;

/// Errors raised while fetching or decoding a bitmap for an image `src`.
///
/// Cloneable so one failed load can be reported to every element and
/// caller waiting on the same source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageLoadError {
    #[error("failed to fetch image {src}: {reason}")]
    Fetch { src: String, reason: String },

    #[error("failed to decode image {src}: {reason}")]
    Decode { src: String, reason: String },

    #[error("image {src} did not finish loading within {after_ms}ms")]
    Timeout { src: String, after_ms: u64 },

    #[error("image {src} has invalid dimensions {width}x{height}")]
    InvalidDimensions { src: String, width: u32, height: u32 },

    #[error("image load for {src} was dropped before completing")]
    Dropped { src: String },
}

impl ImageLoadError {
    /// The image source this error refers to
    pub fn src(&self) -> &str {
        match self {
            Self::Fetch { src, .. }
            | Self::Decode { src, .. }
            | Self::Timeout { src, .. }
            | Self::InvalidDimensions { src, .. }
            | Self::Dropped { src } => src,
        }
    }
}

/// Errors from the raster surface and image export
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} raster surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to load font {path}: {reason}")]
    Font { path: String, reason: String },

    #[error("font file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading an editor configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
