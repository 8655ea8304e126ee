use anyhow::{Context, Result};
use clap::Parser;
use imgpress::{
    detect, generate_output_path, is_webp, Cli, Codec, Commands, CompressConfig, ImageProcessor,
};
use log::LevelFilter;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Compress {
            input,
            output,
            codec,
            quality,
            max_dimension,
            algorithm,
            optimize_png,
        } => {
            let config = CompressConfig {
                codec: codec.into(),
                quality,
                max_dimension,
                algorithm: algorithm.into(),
                optimize_png,
                ..Default::default()
            };
            process_compress(&input, output, config)?;
        }
        Commands::Identify { input } => {
            process_identify(&input)?;
        }
    }

    Ok(())
}

fn process_compress(input: &Path, output: Option<PathBuf>, config: CompressConfig) -> Result<()> {
    config.validate()?;
    let codec: Codec = config.codec;
    let output_path = generate_output_path(input, output.as_deref(), "compressed", codec.extension());

    let source = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    log::debug!(
        "Compressing {} as {} (max {} px, {:?})",
        input.display(),
        codec,
        config.max_dimension,
        config.algorithm
    );

    let processor = ImageProcessor::new(config);
    let report = processor
        .run(&source)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    println!("{}", report);

    match &report.compressed {
        Some(data) => {
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, data)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            println!("Compressed image saved to: {}", output_path.display());
        }
        None => {
            anyhow::bail!(
                "{} encoder produced no data; try a different codec or quality",
                codec
            );
        }
    }

    Ok(())
}

fn process_identify(input: &Path) -> Result<()> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let kind = detect(&bytes);

    println!("=== Container ===");
    println!("File: {}", input.display());
    println!("Kind: {}", kind);
    println!("MIME type: {}", kind.mime_type());
    println!(
        "Extension: {}",
        if kind.extension().is_empty() { "(none)" } else { kind.extension() }
    );
    println!("WebP: {}", is_webp(&bytes));

    Ok(())
}
