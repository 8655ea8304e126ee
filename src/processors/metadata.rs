// imgpress/src/processors/metadata.rs
use crate::core::Orientation;
use exif::{Exif, In, Reader, Tag};
use std::io::Cursor;

pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Parses the EXIF block from any container kamadak-exif understands
    /// (JPEG, TIFF, PNG, WebP, HEIF).
    pub fn read_metadata(&self, bytes: &[u8]) -> Option<Exif> {
        let mut cursor = Cursor::new(bytes);

        match Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => {
                log::debug!("Found EXIF data ({} fields)", exif.fields().count());
                Some(exif)
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found");
                None
            }
            Err(e) => {
                log::warn!("Failed to read EXIF: {}", e);
                None
            }
        }
    }

    /// Orientation tag, or `Up` when it is missing or out of range.
    pub fn read_orientation(&self, bytes: &[u8]) -> Orientation {
        self.read_metadata(bytes)
            .and_then(|exif| Self::orientation_from_exif(&exif))
            .unwrap_or_default()
    }

    fn orientation_from_exif(exif: &Exif) -> Option<Orientation> {
        let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
        // stored as SHORT, sometimes LONG
        let value = field.value.get_uint(0)?;
        if (1..=8).contains(&value) {
            Some(Orientation::from_exif(value))
        } else {
            log::warn!("Ignoring out-of-range EXIF orientation {}", value);
            None
        }
    }
}

impl Default for MetadataProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Splices a minimal big-endian EXIF APP1 segment carrying `orientation`
/// right after the JPEG SOI marker.
#[cfg(test)]
pub(crate) fn jpeg_with_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\0\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}
