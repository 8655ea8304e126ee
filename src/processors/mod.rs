// imgpress/src/processors/mod.rs
mod compressor;
mod loader;
mod metadata;
mod resizer;
pub mod orientation;
pub mod sniffer;

pub use compressor::{CompressionResult, Compressor};
pub use loader::Loader;
pub use metadata::MetadataProcessor;
pub use resizer::{target_size, Resizer, MAX_CANVAS_PIXELS};

pub mod prelude {
    pub use super::{Compressor, Loader, MetadataProcessor, Resizer};
}
