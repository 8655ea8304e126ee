// imgpress/src/processors/sniffer.rs
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Pdf,
    WebP,
    Vnd,
    PlainText,
    Unknown,
}

impl ContainerKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            ContainerKind::Jpeg => "image/jpeg",
            ContainerKind::Png => "image/png",
            ContainerKind::Gif => "image/gif",
            ContainerKind::Tiff => "image/tiff",
            ContainerKind::Pdf => "application/pdf",
            ContainerKind::WebP => "image/webp",
            ContainerKind::Vnd => "application/vnd",
            ContainerKind::PlainText => "text/plain",
            ContainerKind::Unknown => "application/octet-stream",
        }
    }

    /// Canonical extension; empty when the kind has none.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerKind::Jpeg => "jpg",
            ContainerKind::Png => "png",
            ContainerKind::Gif => "gif",
            ContainerKind::Tiff => "tiff",
            ContainerKind::Pdf => "pdf",
            ContainerKind::WebP => "webp",
            ContainerKind::Vnd => "vnd",
            ContainerKind::PlainText | ContainerKind::Unknown => "",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::Jpeg => "JPEG",
            ContainerKind::Png => "PNG",
            ContainerKind::Gif => "GIF",
            ContainerKind::Tiff => "TIFF",
            ContainerKind::Pdf => "PDF",
            ContainerKind::WebP => "WebP",
            ContainerKind::Vnd => "VND",
            ContainerKind::PlainText => "Plain text",
            ContainerKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Classifies bytes by their first byte only. Cannot recognise WebP; see [`is_webp`].
pub fn identify(bytes: &[u8]) -> ContainerKind {
    match bytes.first() {
        Some(0xFF) => ContainerKind::Jpeg,
        Some(0x89) => ContainerKind::Png,
        Some(0x47) => ContainerKind::Gif,
        Some(0x49) | Some(0x4D) => ContainerKind::Tiff,
        Some(0x25) => ContainerKind::Pdf,
        Some(0xD0) => ContainerKind::Vnd,
        Some(0x46) => ContainerKind::PlainText,
        _ => ContainerKind::Unknown,
    }
}

/// `RIFF` at offset 0 and `WEBP` at offset 8. The four bytes between are the chunk length.
pub fn is_webp(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

pub fn detect(bytes: &[u8]) -> ContainerKind {
    if is_webp(bytes) {
        ContainerKind::WebP
    } else {
        identify(bytes)
    }
}
