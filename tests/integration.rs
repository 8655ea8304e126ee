#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use imgpress::{
        detect, identify, is_webp, AlphaInfo, Codec, CompressConfig, Compressor, ContainerKind,
        ImageProcessor, ImgPressError, Loader, Orientation, Raster, ResizeAlgorithm, Resizer,
    };
    use std::fs;
    use std::io::Cursor;

    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_landscape_alpha_last_scenario() {
        let image = RgbaImage::from_fn(4000, 2000, |x, y| {
            Rgba([(x / 16) as u8, (y / 8) as u8, 128, 255])
        });
        let raster = Raster::new(DynamicImage::ImageRgba8(image), Orientation::Up).unwrap();
        assert_eq!(raster.alpha(), AlphaInfo::Last);

        let resized = Resizer::new(ResizeAlgorithm::Bicubic, 1920).resize(raster);
        assert_eq!(resized.pixel_dimensions(), (1920, 960));
        assert_eq!(resized.alpha(), AlphaInfo::PremultipliedLast);

        let result = Compressor::new().compress(&resized, Codec::Jpeg, 0.8);
        let data = result.data.expect("jpeg output");
        assert!(!data.is_empty());
        assert_eq!(identify(&data), ContainerKind::Jpeg);
    }

    #[test]
    fn test_compress_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.child("photo.png");
        input.write_binary(&gradient_png(300, 200)).unwrap();

        let raster = Loader::new().load(input.path()).unwrap();
        assert_eq!(raster.pixel_dimensions(), (300, 200));

        let processor = ImageProcessor::new(CompressConfig {
            codec: Codec::WebP,
            quality: 0.7,
            max_dimension: 150,
            ..Default::default()
        });
        let report = processor.run(&fs::read(input.path()).unwrap()).unwrap();
        assert_eq!(report.sizing.resized_dimensions, (150, 100));

        let output = temp_dir.child("photo_compressed.webp");
        output.write_binary(report.compressed.as_ref().unwrap()).unwrap();
        assert!(output.path().exists());

        let written = fs::read(output.path()).unwrap();
        assert!(is_webp(&written));
        assert_eq!(detect(&written), ContainerKind::WebP);

        let decoded = Loader::new().load_from_bytes(&written).unwrap();
        assert_eq!(decoded.pixel_dimensions(), (150, 100));
    }

    #[test]
    fn test_icc_profile_survives_pipeline() {
        use img_parts::jpeg::Jpeg;
        use img_parts::png::Png;
        use img_parts::{Bytes, ImageICC};

        let icc = vec![7u8; 200];
        let mut png = Png::from_bytes(Bytes::from(gradient_png(64, 32))).unwrap();
        png.set_icc_profile(Some(Bytes::from(icc.clone())));
        let mut source = Vec::new();
        png.encoder().write_to(&mut source).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.child("tagged.png");
        input.write_binary(&source).unwrap();

        let loaded = Loader::new().load(input.path()).unwrap();
        assert_eq!(loaded.icc_profile(), Some(&icc[..]));

        let processor = ImageProcessor::new(CompressConfig {
            codec: Codec::Jpeg,
            quality: 0.8,
            max_dimension: 32,
            ..Default::default()
        });
        let report = processor.run(&fs::read(input.path()).unwrap()).unwrap();
        let jpeg = Jpeg::from_bytes(Bytes::from(report.compressed.unwrap())).unwrap();
        assert_eq!(jpeg.icc_profile().as_deref(), Some(&icc[..]));
    }

    #[test]
    fn test_lower_quality_is_smaller_jpeg() {
        let source = gradient_png(256, 256);
        let run = |quality| {
            ImageProcessor::new(CompressConfig {
                codec: Codec::Jpeg,
                quality,
                max_dimension: 256,
                ..Default::default()
            })
            .run(&source)
            .unwrap()
            .compressed_bytes()
            .unwrap()
        };
        assert!(run(1.0) >= run(0.1));
    }

    #[test]
    fn test_invalid_input() {
        let processor = ImageProcessor::new(CompressConfig::default());
        let result = processor.run(b"definitely not an image");
        assert!(matches!(result, Err(ImgPressError::Decode(_))));

        assert_eq!(identify(&[]), ContainerKind::Unknown);
    }

    #[test]
    fn test_invalid_file() {
        let result = Loader::new().load(std::path::Path::new("nonexistent.jpg"));
        assert!(result.is_err());
    }
}
