// imgpress/src/core/processor.rs
use super::{Codec, CompressConfig, ImgPressError, Raster, Result};
use crate::processors::sniffer::{self, ContainerKind};
use crate::processors::{Compressor, Loader, Resizer};
use crate::utils::{calculate_aspect_ratio, calculate_savings, format_file_size};
use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Decoding,
    Resizing,
    Compressing,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingReport {
    pub container: ContainerKind,
    pub original_bytes: u64,
    /// Upright dimensions of the decoded source.
    pub original_dimensions: (u32, u32),
    pub resized_dimensions: (u32, u32),
}

/// A decoded and resized image waiting for an explicit compression trigger.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub raster: Raster,
    pub sizing: SizingReport,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub sizing: SizingReport,
    pub codec: Codec,
    pub quality: f32,
    pub compressed: Option<Vec<u8>>,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn compressed_bytes(&self) -> Option<u64> {
        self.compressed.as_ref().map(|data| data.len() as u64)
    }

    pub fn savings(&self) -> Option<f64> {
        self.compressed_bytes()
            .map(|size| calculate_savings(self.sizing.original_bytes, size))
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ow, oh) = self.sizing.original_dimensions;
        let (rw, rh) = self.sizing.resized_dimensions;

        writeln!(f, "=== Compression Result ===")?;
        writeln!(
            f,
            "Source: {} ({})",
            self.sizing.container,
            self.sizing.container.mime_type()
        )?;
        writeln!(f, "Original: {} x {} pixels", ow, oh)?;
        writeln!(
            f,
            "Resized: {} x {} pixels ({:.2}:1)",
            rw,
            rh,
            calculate_aspect_ratio(rw, rh)
        )?;
        writeln!(
            f,
            "Original size: {}",
            format_file_size(self.sizing.original_bytes)
        )?;
        if self.codec.honors_quality() {
            writeln!(f, "Codec: {} (quality {:.2})", self.codec, self.quality)?;
        } else {
            writeln!(f, "Codec: {}", self.codec)?;
        }
        match (self.compressed_bytes(), self.savings()) {
            (Some(size), Some(savings)) => writeln!(
                f,
                "Compressed size: {} ({:.1}% smaller)",
                format_file_size(size),
                savings
            )?,
            _ => writeln!(f, "Compressed size: encoding failed")?,
        }
        write!(f, "Time: {:.3} ms", self.elapsed.as_secs_f64() * 1000.0)
    }
}

/// Runs decode, resize and compress for one request at a time.
///
/// Holds no per-request state, so one instance can serve overlapping calls.
pub struct ImageProcessor {
    config: CompressConfig,
    loader: Loader,
    resizer: Resizer,
    compressor: Compressor,
}

impl ImageProcessor {
    pub fn new(config: CompressConfig) -> Self {
        let resizer = Resizer::new(config.algorithm, config.max_dimension);
        let compressor = Compressor::new().with_png_optimization(config.optimize_png);

        Self {
            config,
            loader: Loader::new(),
            resizer,
            compressor,
        }
    }

    /// Decodes and resizes `source`. Decode failures are terminal.
    pub fn prepare(&self, source: &[u8]) -> Result<PreparedImage> {
        self.prepare_observed(source, &mut |_: Stage| {})
    }

    /// Compresses an already prepared image with the configured codec and quality.
    pub fn compress(&self, prepared: &PreparedImage) -> PipelineReport {
        let result = self
            .compressor
            .compress(&prepared.raster, self.config.codec, self.config.quality);

        PipelineReport {
            sizing: prepared.sizing.clone(),
            codec: result.codec,
            quality: self.config.quality,
            compressed: result.data,
            elapsed: result.elapsed,
        }
    }

    pub fn run(&self, source: &[u8]) -> Result<PipelineReport> {
        self.run_observed(source, |_| {})
    }

    /// Like [`run`](Self::run), reporting each stage transition to `observer`.
    pub fn run_observed<F>(&self, source: &[u8], mut observer: F) -> Result<PipelineReport>
    where
        F: FnMut(Stage),
    {
        let prepared = self.prepare_observed(source, &mut observer)?;

        observer(Stage::Compressing);
        let report = self.compress(&prepared);
        observer(Stage::Done);

        Ok(report)
    }

    fn prepare_observed(
        &self,
        source: &[u8],
        observer: &mut dyn FnMut(Stage),
    ) -> Result<PreparedImage> {
        observer(Stage::Idle);
        self.config.validate().inspect_err(|_| observer(Stage::Failed))?;

        let original_bytes = source.len() as u64;
        if let Some(max_size) = self.config.max_file_size {
            if original_bytes > max_size {
                observer(Stage::Failed);
                return Err(ImgPressError::MemoryLimitExceeded(format!(
                    "File size {} exceeds limit {}",
                    original_bytes, max_size
                )));
            }
        }

        observer(Stage::Decoding);
        let container = sniffer::detect(source);
        let raster = self.loader.load_from_bytes(source).inspect_err(|e| {
            log::warn!("Decoding {} input failed: {}", container, e);
            observer(Stage::Failed);
        })?;
        let original_dimensions = raster.display_dimensions();

        observer(Stage::Resizing);
        let raster = self.resizer.resize(raster);
        let resized_dimensions = raster.display_dimensions();

        log::debug!(
            "Prepared {} image: {}x{} -> {}x{}",
            container,
            original_dimensions.0,
            original_dimensions.1,
            resized_dimensions.0,
            resized_dimensions.1
        );

        Ok(PreparedImage {
            raster,
            sizing: SizingReport {
                container,
                original_bytes,
                original_dimensions,
                resized_dimensions,
            },
        })
    }

    /// Compresses on a rayon worker. The result is collected on whichever
    /// thread calls [`CompressionTask::wait`].
    pub fn spawn_compress(
        processor: Arc<ImageProcessor>,
        prepared: Arc<PreparedImage>,
    ) -> CompressionTask {
        let (sender, receiver) = mpsc::channel();

        rayon::spawn(move || {
            let report = processor.compress(&prepared);
            // the caller may have dropped the task
            let _ = sender.send(report);
        });

        CompressionTask { receiver }
    }
}

/// Handle to an in-flight background compression. Dropping it discards the result.
pub struct CompressionTask {
    receiver: Receiver<PipelineReport>,
}

impl CompressionTask {
    pub fn wait(self) -> Result<PipelineReport> {
        self.receiver.recv().map_err(|_| {
            ImgPressError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "compression worker exited without a result",
            ))
        })
    }

    /// `None` while the worker is still running.
    pub fn try_result(&self) -> Option<Result<PipelineReport>> {
        match self.receiver.try_recv() {
            Ok(report) => Some(Ok(report)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ImgPressError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "compression worker exited without a result",
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AlphaInfo, Orientation};
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 90, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn processor(codec: Codec, max_dimension: u32) -> ImageProcessor {
        ImageProcessor::new(CompressConfig {
            codec,
            quality: 0.8,
            max_dimension,
            ..Default::default()
        })
    }

    #[test]
    fn prepare_resizes_before_compression() {
        let source = png(80, 40);
        let prepared = processor(Codec::Jpeg, 20).prepare(&source).unwrap();

        assert_eq!(prepared.sizing.container, ContainerKind::Png);
        assert_eq!(prepared.sizing.original_bytes, source.len() as u64);
        assert_eq!(prepared.sizing.original_dimensions, (80, 40));
        assert_eq!(prepared.sizing.resized_dimensions, (20, 10));
        assert_eq!(prepared.raster.alpha(), AlphaInfo::PremultipliedLast);
        assert_eq!(prepared.raster.orientation(), Orientation::Up);
    }

    #[test]
    fn run_produces_requested_codec() {
        for codec in Codec::ALL {
            let report = processor(codec, 16).run(&png(32, 32)).unwrap();
            let data = report.compressed.as_ref().expect("encoded bytes");
            let kind = sniffer::detect(data);
            assert_eq!(kind.mime_type(), codec.mime_type());
            assert!(report.savings().is_some());
        }
    }

    #[test]
    fn observer_sees_every_stage() {
        let mut stages = Vec::new();
        processor(Codec::Png, 8)
            .run_observed(&png(16, 8), |stage| stages.push(stage))
            .unwrap();
        assert_eq!(
            stages,
            vec![
                Stage::Idle,
                Stage::Decoding,
                Stage::Resizing,
                Stage::Compressing,
                Stage::Done
            ]
        );
    }

    #[test]
    fn decode_failure_is_terminal_and_distinct() {
        let mut stages = Vec::new();
        let err = processor(Codec::Jpeg, 8)
            .run_observed(b"RIFF\0\0\0\0WEBPgarbage", |stage| stages.push(stage))
            .unwrap_err();
        assert!(matches!(err, ImgPressError::Decode(_)), "{:?}", err);
        assert_eq!(stages.last(), Some(&Stage::Failed));
        assert!(!stages.contains(&Stage::Resizing));
    }

    #[test]
    fn file_size_limit_is_enforced() {
        let processor = ImageProcessor::new(CompressConfig {
            max_file_size: Some(10),
            ..Default::default()
        });
        assert!(matches!(
            processor.prepare(&png(4, 4)),
            Err(ImgPressError::MemoryLimitExceeded(_))
        ));
    }

    #[test]
    fn background_matches_synchronous() {
        let processor = Arc::new(processor(Codec::Png, 12));
        let prepared = Arc::new(processor.prepare(&png(24, 12)).unwrap());

        let expected = processor.compress(&prepared);
        let task = ImageProcessor::spawn_compress(Arc::clone(&processor), Arc::clone(&prepared));
        let report = task.wait().unwrap();

        assert_eq!(report.compressed, expected.compressed);
        assert_eq!(report.sizing, expected.sizing);
    }

    #[test]
    fn polling_eventually_yields_the_report() {
        let processor = Arc::new(processor(Codec::Jpeg, 16));
        let prepared = Arc::new(processor.prepare(&png(32, 16)).unwrap());
        let task = ImageProcessor::spawn_compress(Arc::clone(&processor), prepared);

        let report = loop {
            match task.try_result() {
                Some(result) => break result.unwrap(),
                None => std::thread::sleep(Duration::from_millis(1)),
            }
        };
        assert_eq!(report.codec, Codec::Jpeg);
        assert_eq!(report.sizing.resized_dimensions, (16, 8));
        assert!(report.compressed.is_some());
    }

    #[test]
    fn report_mentions_sizes_and_time() {
        let report = processor(Codec::Jpeg, 10).run(&png(20, 10)).unwrap();
        let text = report.to_string();
        assert!(text.contains("Resized: 10 x 5 pixels"));
        assert!(text.contains("quality 0.80"));
        assert!(text.contains("Time: "));
    }
}
