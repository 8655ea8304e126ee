// imgpress/src/processors/resizer.rs
use super::orientation::{is_transposed, transform_for};
use crate::core::raster::premultiply;
use crate::core::{
    AffineTransform, AlphaInfo, ImgPressError, Orientation, Raster, ResizeAlgorithm, Result, Size,
    DEFAULT_MAX_DIMENSION,
};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Pixel};

/// Largest canvas the resizer will allocate.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Fits `size` into a `max_dimension` square, pinning the longer axis to it.
///
/// Returns `None` for zero, negative or non-finite sizes.
pub fn target_size(size: Size, max_dimension: u32) -> Option<Size> {
    if size.is_degenerate() {
        return None;
    }

    let max = max_dimension as f64;
    let ratio = size.width / size.height;

    if ratio > 1.0 {
        Some(Size::new(max, max / ratio))
    } else {
        Some(Size::new(max * ratio, max))
    }
}

pub struct Resizer {
    algorithm: ResizeAlgorithm,
    max_dimension: u32,
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::Bicubic, DEFAULT_MAX_DIMENSION)
    }
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm, max_dimension: u32) -> Self {
        Self {
            algorithm,
            max_dimension,
        }
    }

    /// Resizes and bakes the orientation into the pixels.
    ///
    /// Best effort: any failure hands back the source raster unchanged.
    pub fn resize(&self, raster: Raster) -> Raster {
        let Some(target) = target_size(raster.size(), self.max_dimension) else {
            let (width, height) = raster.display_dimensions();
            log::warn!(
                "{}, keeping original",
                ImgPressError::DegenerateGeometry { width, height }
            );
            return raster;
        };

        let (width, height) = target.integral();

        if (width, height) == raster.display_dimensions()
            && raster.orientation() == Orientation::Up
            && raster.alpha() == raster.alpha().normalized()
        {
            log::debug!("Image dimensions unchanged, skipping resize");
            return raster;
        }

        log::debug!(
            "Resizing image from {}x{} ({:?}) to {}x{}",
            raster.display_dimensions().0,
            raster.display_dimensions().1,
            raster.orientation(),
            width,
            height
        );

        match self.render(&raster, width, height) {
            Ok(resized) => resized,
            Err(e) => {
                log::warn!("Resize failed, keeping original: {}", e);
                raster
            }
        }
    }

    fn render(&self, raster: &Raster, width: u32, height: u32) -> Result<Raster> {
        let pixel_count = width as u64 * height as u64;
        if pixel_count > MAX_CANVAS_PIXELS {
            return Err(ImgPressError::MemoryLimitExceeded(format!(
                "Canvas {}x{} exceeds {} pixels",
                width, height, MAX_CANVAS_PIXELS
            )));
        }

        let orientation = raster.orientation();
        let canvas_size = Size::from_dimensions((width, height));
        let inverse = transform_for(orientation, canvas_size)
            .inverted()
            .ok_or_else(|| {
                ImgPressError::InvalidParameter(format!(
                    "Orientation transform for {:?} is singular",
                    orientation
                ))
            })?;

        let draw = if is_transposed(orientation) {
            (height, width)
        } else {
            (width, height)
        };
        let filter = self.get_filter_type();
        let alpha = raster.alpha().normalized();

        let pixels = if raster.pixels().color().has_alpha() {
            let mut rgba = raster.pixels().to_rgba8();
            if alpha.is_premultiplied() && !raster.alpha().is_premultiplied() {
                rgba = premultiply(&rgba)?;
            }
            let scaled = imageops::resize(&rgba, draw.0, draw.1, filter);
            DynamicImage::ImageRgba8(place(&scaled, &inverse, width, height)?)
        } else {
            let rgb = raster.pixels().to_rgb8();
            let scaled = imageops::resize(&rgb, draw.0, draw.1, filter);
            DynamicImage::ImageRgb8(place(&scaled, &inverse, width, height)?)
        };

        let alpha = if pixels.color().has_alpha() {
            alpha
        } else {
            AlphaInfo::None
        };

        Ok(Raster::with_alpha(pixels, Orientation::Up, alpha)?
            .with_icc_profile(raster.icc_profile().map(<[u8]>::to_vec)))
    }

    fn get_filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Samples `drawn` into a `width`x`height` canvas through `inverse`.
///
/// Both images are addressed top row first; the transform works in y-up space,
/// so rows are flipped on the way in and out.
fn place<P: Pixel>(
    drawn: &ImageBuffer<P, Vec<P::Subpixel>>,
    inverse: &AffineTransform,
    width: u32,
    height: u32,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    let (draw_w, draw_h) = drawn.dimensions();
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(P::CHANNEL_COUNT as usize))
        .ok_or_else(|| {
            ImgPressError::MemoryLimitExceeded(format!("Canvas {}x{} overflows", width, height))
        })?;
    let mut canvas: ImageBuffer<P, Vec<P::Subpixel>> = ImageBuffer::new(width, height);

    for (cx, row, pixel) in canvas.enumerate_pixels_mut() {
        let (x, y) = inverse.apply(cx as f64 + 0.5, height as f64 - row as f64 - 0.5);
        let sx = x.floor();
        let sy = (draw_h as f64 - y).floor();
        if sx < 0.0 || sy < 0.0 || sx >= draw_w as f64 || sy >= draw_h as f64 {
            continue;
        }
        *pixel = *drawn.get_pixel(sx as u32, sy as u32);
    }

    Ok(canvas)
}
