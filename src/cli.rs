// imgpress/src/cli.rs
use crate::core::{Codec, ResizeAlgorithm, DEFAULT_MAX_DIMENSION};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "imgpress", version, about = "Resize and compress a photo, then report size and timing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resize to the bounding box and encode with the chosen codec
    Compress {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = CodecArg::Jpeg)]
        codec: CodecArg,

        /// Encoder quality between 0.0 and 1.0 (ignored for PNG)
        #[arg(short, long, default_value_t = 1.0)]
        quality: f32,

        /// Longest side after resizing
        #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_DIMENSION)]
        max_dimension: u32,

        #[arg(short, long, value_enum, default_value_t = Algorithm::Bicubic)]
        algorithm: Algorithm,

        /// Run lossless oxipng optimization on PNG output
        #[arg(long)]
        optimize_png: bool,
    },

    /// Report the container format detected from the file's leading bytes
    Identify { input: PathBuf },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
    Jpeg,
    Png,
    Webp,
}

impl From<CodecArg> for Codec {
    fn from(codec: CodecArg) -> Self {
        match codec {
            CodecArg::Jpeg => Codec::Jpeg,
            CodecArg::Png => Codec::Png,
            CodecArg::Webp => Codec::WebP,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compress_defaults() {
        let cli = Cli::parse_from(["imgpress", "compress", "photo.jpg"]);
        match cli.command {
            Commands::Compress {
                codec,
                quality,
                max_dimension,
                algorithm,
                optimize_png,
                output,
                ..
            } => {
                assert_eq!(Codec::from(codec), Codec::Jpeg);
                assert_eq!(quality, 1.0);
                assert_eq!(max_dimension, 1920);
                assert_eq!(ResizeAlgorithm::from(algorithm), ResizeAlgorithm::Bicubic);
                assert!(!optimize_png);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parses_webp_request() {
        let cli = Cli::parse_from([
            "imgpress", "-v", "compress", "in.png", "--codec", "webp", "--quality", "0.6",
            "--max-dimension", "1080",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Compress {
                codec,
                quality,
                max_dimension,
                ..
            } => {
                assert_eq!(Codec::from(codec), Codec::WebP);
                assert_eq!(quality, 0.6);
                assert_eq!(max_dimension, 1080);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
