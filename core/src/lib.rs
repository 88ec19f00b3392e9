pub mod error;
pub mod image;
pub mod options;

pub use error::{IsoError, Result};
pub use image::{ImageBlob, ImageWriter, OCTET_STREAM};
pub use options::{ImageOptions, DEFAULT_VOLUME_LABEL};
