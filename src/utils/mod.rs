// imgpress/src/utils/mod.rs
use std::path::{Path, PathBuf};

/// `<stem>_<suffix>.<extension>` next to the input, numbered so an existing file is never overwritten.
pub fn generate_output_path(
    input_path: &Path,
    output: Option<&Path>,
    suffix: &str,
    extension: &str,
) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = input_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image");

            let mut candidate = input_path.with_file_name(format!("{}_{}.{}", stem, suffix, extension));
            let mut counter = 1;

            while candidate.exists() {
                candidate = input_path
                    .with_file_name(format!("{}_{}_{}.{}", stem, suffix, counter, extension));
                counter += 1;
            }

            candidate
        }
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as i32).clamp(0, 5);
    let size = bytes_f64 / base.powi(exponent);

    format!("{:.2} {}", size, UNITS[exponent as usize])
}

pub fn calculate_aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        0.0
    } else {
        width as f32 / height as f32
    }
}

/// Size reduction in percent, never negative.
pub fn calculate_savings(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }

    let savings = (original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0;
    savings.max(0.0)
}
