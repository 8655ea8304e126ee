// imgpress/src/core/mod.rs
pub mod geometry;
pub mod processor;
pub mod raster;

use std::fmt;
use thiserror::Error;

pub use geometry::{AffineTransform, Size};
pub use raster::{AlphaInfo, Orientation, Raster};

pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    #[default]
    Bicubic,
    Lanczos3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Codec {
    #[default]
    Jpeg,
    Png,
    WebP,
}

impl Codec {
    pub const ALL: [Codec; 3] = [Codec::Jpeg, Codec::Png, Codec::WebP];

    pub fn mime_type(self) -> &'static str {
        match self {
            Codec::Jpeg => "image/jpeg",
            Codec::Png => "image/png",
            Codec::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Codec::Jpeg => "jpg",
            Codec::Png => "png",
            Codec::WebP => "webp",
        }
    }

    /// PNG is always lossless, so quality has no effect on it.
    pub fn honors_quality(self) -> bool {
        !matches!(self, Codec::Png)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Codec::Jpeg => "jpeg",
            Codec::Png => "png",
            Codec::WebP => "webp",
        };
        f.write_str(name)
    }
}

/// Caller-level settings for one compression request. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct CompressConfig {
    pub codec: Codec,
    /// Encoder quality in `[0.0, 1.0]`.
    pub quality: f32,
    pub max_dimension: u32,
    pub algorithm: ResizeAlgorithm,
    pub optimize_png: bool,
    pub max_file_size: Option<u64>,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            codec: Codec::Jpeg,
            quality: 1.0,
            max_dimension: DEFAULT_MAX_DIMENSION,
            algorithm: ResizeAlgorithm::Bicubic,
            optimize_png: false,
            max_file_size: None,
        }
    }
}

impl CompressConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ImgPressError::InvalidParameter(format!(
                "Quality must be between 0.0 and 1.0, got {}",
                self.quality
            )));
        }

        if self.max_dimension == 0 {
            return Err(ImgPressError::InvalidParameter(
                "Max dimension must be positive".to_string(),
            ));
        }

        if self.max_dimension > 100_000 {
            return Err(ImgPressError::InvalidParameter(
                "Dimensions too large (max 100,000 pixels)".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ImgPressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode failure: {0}")]
    Decode(String),

    #[error("Encode failure ({codec}): {reason}")]
    Encode { codec: Codec, reason: String },

    #[error("Degenerate geometry: {width}x{height}")]
    DegenerateGeometry { width: u32, height: u32 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),

    #[error("Pixel conversion failed: {0}")]
    PixelConversion(String),
}

pub type Result<T> = std::result::Result<T, ImgPressError>;

pub fn validate_config(config: &CompressConfig) -> Result<()> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CompressConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_dimension, 1920);
        assert_eq!(config.quality, 1.0);
        assert_eq!(config.algorithm, ResizeAlgorithm::Bicubic);
    }

    #[test]
    fn rejects_out_of_range_quality() {
        for quality in [-0.1, 1.5, f32::NAN] {
            let config = CompressConfig {
                quality,
                ..Default::default()
            };
            assert!(matches!(
                validate_config(&config),
                Err(ImgPressError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn rejects_zero_and_huge_dimension() {
        let zero = CompressConfig {
            max_dimension: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let huge = CompressConfig {
            max_dimension: 100_001,
            ..Default::default()
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn codec_metadata() {
        assert_eq!(Codec::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(Codec::WebP.extension(), "webp");
        assert!(!Codec::Png.honors_quality());
        assert_eq!(Codec::WebP.to_string(), "webp");
    }
}
