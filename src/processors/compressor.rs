// imgpress/src/processors/compressor.rs
use crate::core::{Codec, ImgPressError, Raster, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageICC};
use oxipng::{optimize_from_memory, Options};
use std::time::{Duration, Instant};

/// Encoded output of one compression attempt. `data` is `None` when the
/// backend produced nothing; `elapsed` is reported either way.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub codec: Codec,
    pub data: Option<Vec<u8>>,
    pub elapsed: Duration,
}

impl CompressionResult {
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    pub fn len(&self) -> Option<usize> {
        self.data.as_ref().map(Vec::len)
    }
}

pub struct Compressor {
    optimize_png: bool,
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            optimize_png: false,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    /// Encodes `raster` as `codec`. `quality` is clamped to `[0, 1]` and ignored for PNG.
    pub fn compress(&self, raster: &Raster, codec: Codec, quality: f32) -> CompressionResult {
        let quality = clamp_quality(quality);

        let start = Instant::now();
        let encoded = self.encode(raster, codec, quality);
        let elapsed = start.elapsed();

        let data = match encoded {
            Ok(bytes) => {
                log::info!(
                    "Encoded {} ({} bytes, quality {:.2}) in {:?}",
                    codec,
                    bytes.len(),
                    quality,
                    elapsed
                );
                Some(bytes)
            }
            Err(e) => {
                log::warn!("{} after {:?}", e, elapsed);
                None
            }
        };

        CompressionResult {
            codec,
            data,
            elapsed,
        }
    }

    fn encode(&self, raster: &Raster, codec: Codec, quality: f32) -> Result<Vec<u8>> {
        log::debug!(
            "Encoding {}x{} raster ({:?}) as {}",
            raster.pixel_dimensions().0,
            raster.pixel_dimensions().1,
            raster.alpha(),
            codec
        );

        let encoded = match codec {
            Codec::Jpeg => self.encode_jpeg(raster, quality),
            Codec::Png => self.encode_png(raster),
            Codec::WebP => self.encode_webp(raster, quality),
        }?;

        match raster.icc_profile() {
            Some(icc) => embed_icc(codec, encoded, icc),
            None => Ok(encoded),
        }
    }

    fn encode_jpeg(&self, raster: &Raster, quality: f32) -> Result<Vec<u8>> {
        let rgb = raster.to_opaque_rgb();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
        rgb.write_with_encoder(encoder)
            .map_err(|e| encode_error(Codec::Jpeg, e))?;
        Ok(buffer)
    }

    fn encode_png(&self, raster: &Raster) -> Result<Vec<u8>> {
        let straight = raster.to_straight_alpha()?;
        let mut buffer = Vec::new();
        straight
            .write_with_encoder(PngEncoder::new(&mut buffer))
            .map_err(|e| encode_error(Codec::Png, e))?;

        if self.optimize_png {
            return self.optimize_png_bytes(&buffer);
        }

        Ok(buffer)
    }

    fn encode_webp(&self, raster: &Raster, quality: f32) -> Result<Vec<u8>> {
        let rgb = raster.flatten_onto_white()?;
        let (width, height) = rgb.dimensions();
        let encoder = webp::Encoder::from_rgb(&rgb, width, height);

        let mut config = webp::WebPConfig::new()
            .map_err(|_| encode_error(Codec::WebP, "failed to create WebPConfig"))?;
        config.lossless = 0;
        config.quality = webp_quality(quality);
        config.method = 4;
        config.pass = 1;
        config.thread_level = 0;
        config.preprocessing = 0;

        let memory = encoder
            .encode_advanced(&config)
            .map_err(|e| encode_error(Codec::WebP, format!("{:?}", e)))?;
        Ok(memory.to_vec())
    }

    fn optimize_png_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        optimize_from_memory(data, &Options::default())
            .map_err(|e| encode_error(Codec::Png, format!("PNG optimization failed: {}", e)))
    }

    pub fn calculate_savings(&self, original_size: u64, compressed_size: u64) -> f64 {
        crate::utils::calculate_savings(original_size, compressed_size)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `icc` into the encoded container, replacing any profile already there.
fn embed_icc(codec: Codec, encoded: Vec<u8>, icc: &[u8]) -> Result<Vec<u8>> {
    let encoded = Bytes::from(encoded);
    let profile = Some(Bytes::copy_from_slice(icc));
    let parse_error = |e: img_parts::Error| {
        encode_error(codec, format!("failed to parse output for ICC: {}", e))
    };

    let mut output = Vec::new();
    let written = match codec {
        Codec::Jpeg => {
            let mut jpeg = Jpeg::from_bytes(encoded).map_err(parse_error)?;
            jpeg.set_icc_profile(profile);
            jpeg.encoder().write_to(&mut output)
        }
        Codec::Png => {
            let mut png = Png::from_bytes(encoded).map_err(parse_error)?;
            png.set_icc_profile(profile);
            png.encoder().write_to(&mut output)
        }
        Codec::WebP => {
            let mut webp = WebP::from_bytes(encoded).map_err(parse_error)?;
            webp.set_icc_profile(profile);
            webp.encoder().write_to(&mut output)
        }
    };
    written.map_err(|e| encode_error(codec, format!("failed to write ICC profile: {}", e)))?;

    log::debug!("Embedded {} byte ICC profile in {} output", icc.len(), codec);
    Ok(output)
}

fn encode_error(codec: Codec, reason: impl ToString) -> ImgPressError {
    ImgPressError::Encode {
        codec,
        reason: reason.to_string(),
    }
}

fn clamp_quality(quality: f32) -> f32 {
    if quality.is_nan() {
        1.0
    } else {
        quality.clamp(0.0, 1.0)
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn webp_quality(quality: f32) -> f32 {
    (quality * 100.0).clamp(0.0, 100.0)
}
