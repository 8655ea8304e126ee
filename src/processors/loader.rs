// imgpress/src/processors/loader.rs
use super::metadata::MetadataProcessor;
use crate::core::{ImgPressError, Raster, Result};
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::Path;

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    pub fn load(&self, path: &Path) -> Result<Raster> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;
        let data = std::fs::read(path)?;
        self.load_from_bytes(&data)
    }

    /// Decodes `data` into an oriented-but-unrotated raster carrying its EXIF
    /// orientation and ICC profile.
    pub fn load_from_bytes(&self, data: &[u8]) -> Result<Raster> {
        if data.is_empty() {
            return Err(ImgPressError::Decode("Input is empty".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImgPressError::Decode(format!("Failed to read image header: {}", e)))?;

        if reader.format().is_none() {
            return Err(ImgPressError::Decode(
                "Unrecognized image format".to_string(),
            ));
        }

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| ImgPressError::Decode(format!("Failed to decode image: {}", e)))?;

        if let Some((max_w, max_h)) = self.max_dimensions {
            let (width, height) = decoder.dimensions();
            if width > max_w || height > max_h {
                return Err(ImgPressError::MemoryLimitExceeded(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        let icc_profile = decoder.icc_profile().unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable ICC profile: {}", e);
            None
        });

        let image = DynamicImage::from_decoder(decoder)
            .map_err(|e| ImgPressError::Decode(format!("Failed to decode image: {}", e)))?;

        let orientation = MetadataProcessor::new().read_orientation(data);
        let (width, height) = image.dimensions();

        log::info!(
            "Loaded image: {}x{} pixels, format: {:?}, orientation: {:?}",
            width,
            height,
            image.color(),
            orientation
        );

        let raster = Raster::new(image, orientation)
            .map_err(|e| ImgPressError::Decode(e.to_string()))?;
        Ok(raster.with_icc_profile(icc_profile))
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(ImgPressError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(ImgPressError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AlphaInfo, Orientation};
    use crate::processors::metadata::jpeg_with_orientation;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn decodes_png_with_alpha() {
        let png = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 3, Rgba([1, 2, 3, 4]))),
            ImageFormat::Png,
        );
        let raster = Loader::new().load_from_bytes(&png).unwrap();
        assert_eq!(raster.pixel_dimensions(), (5, 3));
        assert_eq!(raster.alpha(), AlphaInfo::Last);
        assert_eq!(raster.orientation(), Orientation::Up);
    }

    #[test]
    fn carries_exif_orientation() {
        let jpeg = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, Rgb([50, 60, 70]))),
            ImageFormat::Jpeg,
        );
        let raster = Loader::new()
            .load_from_bytes(&jpeg_with_orientation(&jpeg, 8))
            .unwrap();
        assert_eq!(raster.orientation(), Orientation::Left);
        assert_eq!(raster.display_dimensions(), (4, 8));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        for bytes in [&b""[..], b"not an image at all", &[0xFF, 0xD8, 0xFF, 0x00]] {
            let err = Loader::new().load_from_bytes(bytes).unwrap_err();
            assert!(matches!(err, ImgPressError::Decode(_)), "{:?}", err);
        }
    }

    #[test]
    fn enforces_dimension_limit() {
        let png = encode(DynamicImage::new_rgb8(20, 2), ImageFormat::Png);
        let err = Loader::new()
            .with_max_dimensions(10, 10)
            .load_from_bytes(&png)
            .unwrap_err();
        assert!(matches!(err, ImgPressError::MemoryLimitExceeded(_)));
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = Loader::new()
            .load(Path::new("does/not/exist.png"))
            .unwrap_err();
        assert!(matches!(err, ImgPressError::InvalidParameter(_)));
    }
}
