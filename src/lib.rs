mod cli;
mod core;
mod processors;
mod utils;

pub use cli::{Algorithm, Cli, CodecArg, Commands};
pub use core::processor::{
    CompressionTask, ImageProcessor, PipelineReport, PreparedImage, SizingReport, Stage,
};
pub use core::{
    validate_config, AffineTransform, AlphaInfo, Codec, CompressConfig, ImgPressError,
    Orientation, Raster, ResizeAlgorithm, Result, Size, DEFAULT_MAX_DIMENSION,
};
pub use processors::orientation::{is_transposed, transform_for};
pub use processors::sniffer::{detect, identify, is_webp, ContainerKind};
pub use processors::{
    target_size, CompressionResult, Compressor, Loader, MetadataProcessor, Resizer,
    MAX_CANVAS_PIXELS,
};
pub use utils::{calculate_aspect_ratio, calculate_savings, format_file_size, generate_output_path};

pub mod prelude {
    pub use crate::{
        Codec, CompressConfig, Compressor, ContainerKind, ImageProcessor, Loader, Orientation,
        Raster, ResizeAlgorithm, Resizer,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
