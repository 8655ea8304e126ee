// imgpress/src/core/raster.rs
use super::geometry::Size;
use super::{ImgPressError, Result};
use fast_image_resize::images::Image as AlphaBuffer;
use fast_image_resize::{MulDiv, PixelType};
use image::{imageops, DynamicImage, GenericImageView, RgbImage, Rgba, RgbaImage};

/// Capture orientation, named after how the stored pixels sit relative to upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
    UpMirrored,
    DownMirrored,
    LeftMirrored,
    RightMirrored,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::Up,
        Orientation::Down,
        Orientation::Left,
        Orientation::Right,
        Orientation::UpMirrored,
        Orientation::DownMirrored,
        Orientation::LeftMirrored,
        Orientation::RightMirrored,
    ];

    /// Maps an EXIF Orientation tag (1-8). Out-of-range values are treated as upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Orientation::UpMirrored,
            3 => Orientation::Down,
            4 => Orientation::DownMirrored,
            5 => Orientation::LeftMirrored,
            6 => Orientation::Right,
            7 => Orientation::RightMirrored,
            8 => Orientation::Left,
            _ => Orientation::Up,
        }
    }

    pub fn exif_value(self) -> u32 {
        match self {
            Orientation::Up => 1,
            Orientation::UpMirrored => 2,
            Orientation::Down => 3,
            Orientation::DownMirrored => 4,
            Orientation::LeftMirrored => 5,
            Orientation::Right => 6,
            Orientation::RightMirrored => 7,
            Orientation::Left => 8,
        }
    }
}

/// Where the alpha channel lives and whether color is premultiplied by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaInfo {
    None,
    PremultipliedLast,
    PremultipliedFirst,
    Last,
    First,
    NoneSkipLast,
    NoneSkipFirst,
    Only,
}

impl AlphaInfo {
    pub fn is_premultiplied(self) -> bool {
        matches!(self, AlphaInfo::PremultipliedLast | AlphaInfo::PremultipliedFirst)
    }

    /// Straight alpha becomes premultiplied in the same position; everything else is kept.
    pub fn normalized(self) -> Self {
        match self {
            AlphaInfo::Last => AlphaInfo::PremultipliedLast,
            AlphaInfo::First => AlphaInfo::PremultipliedFirst,
            other => other,
        }
    }
}

/// A decoded bitmap plus the metadata needed to render it upright.
///
/// Pixels are stored as decoded (not yet oriented). Channel storage is always
/// alpha-last; `AlphaInfo` records the logical layout and premultiplication.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: DynamicImage,
    scale: f32,
    alpha: AlphaInfo,
    orientation: Orientation,
    icc_profile: Option<Vec<u8>>,
}

impl Raster {
    pub fn new(pixels: DynamicImage, orientation: Orientation) -> Result<Self> {
        let alpha = if pixels.color().has_alpha() {
            AlphaInfo::Last
        } else {
            AlphaInfo::None
        };
        Self::with_alpha(pixels, orientation, alpha)
    }

    pub fn with_alpha(
        pixels: DynamicImage,
        orientation: Orientation,
        alpha: AlphaInfo,
    ) -> Result<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ImgPressError::DegenerateGeometry { width, height });
        }

        Ok(Self {
            pixels,
            scale: 1.0,
            alpha,
            orientation,
            icc_profile: None,
        })
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
        self
    }

    pub fn with_icc_profile(mut self, icc_profile: Option<Vec<u8>>) -> Self {
        self.icc_profile = icc_profile;
        self
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Stored pixel dimensions, before orientation is applied.
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Pixel dimensions as displayed upright.
    pub fn display_dimensions(&self) -> (u32, u32) {
        let (width, height) = self.pixels.dimensions();
        if crate::processors::orientation::is_transposed(self.orientation) {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Upright size in points (pixels divided by scale).
    pub fn size(&self) -> Size {
        let (width, height) = self.display_dimensions();
        let scale = self.scale as f64;
        Size::new(width as f64 / scale, height as f64 / scale)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn alpha(&self) -> AlphaInfo {
        self.alpha
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }

    /// Pixels with straight (non-premultiplied) alpha, as encoders expect.
    pub fn to_straight_alpha(&self) -> Result<DynamicImage> {
        if self.alpha.is_premultiplied() && self.pixels.color().has_alpha() {
            Ok(DynamicImage::ImageRgba8(unpremultiply(
                &self.pixels.to_rgba8(),
            )?))
        } else {
            Ok(self.pixels.clone())
        }
    }

    /// Drops alpha from the stored channels. Premultiplied data ends up composited over black.
    pub fn to_opaque_rgb(&self) -> RgbImage {
        self.pixels.to_rgb8()
    }

    /// Composites the straight-alpha pixels onto a white background.
    pub fn flatten_onto_white(&self) -> Result<RgbImage> {
        if !self.pixels.color().has_alpha() {
            return Ok(self.pixels.to_rgb8());
        }

        let straight = self.to_straight_alpha()?.to_rgba8();
        let (width, height) = straight.dimensions();
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        imageops::overlay(&mut canvas, &straight, 0, 0);
        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}

pub(crate) fn premultiply(image: &RgbaImage) -> Result<RgbaImage> {
    convert_alpha(image, |mul_div, buffer| {
        mul_div
            .multiply_alpha_inplace(buffer)
            .map_err(|e| format!("failed to premultiply alpha: {}", e))
    })
}

/// Fully transparent pixels come back black.
pub(crate) fn unpremultiply(image: &RgbaImage) -> Result<RgbaImage> {
    convert_alpha(image, |mul_div, buffer| {
        mul_div
            .divide_alpha_inplace(buffer)
            .map_err(|e| format!("failed to unpremultiply alpha: {}", e))
    })
}

fn convert_alpha<F>(image: &RgbaImage, op: F) -> Result<RgbaImage>
where
    F: FnOnce(&MulDiv, &mut AlphaBuffer<'static>) -> std::result::Result<(), String>,
{
    let (width, height) = image.dimensions();
    let mut buffer =
        AlphaBuffer::from_vec_u8(width, height, image.as_raw().clone(), PixelType::U8x4)
            .map_err(|e| ImgPressError::PixelConversion(e.to_string()))?;

    op(&MulDiv::default(), &mut buffer).map_err(ImgPressError::PixelConversion)?;

    RgbaImage::from_raw(width, height, buffer.into_vec()).ok_or_else(|| {
        ImgPressError::PixelConversion(format!("{}x{} buffer has the wrong length", width, height))
    })
}
