use crate::Result;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// A finished image paired with the mime type it should be served with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: OCTET_STREAM,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builds a disc image from a flat set of `(path, bytes)` entries.
pub trait ImageWriter {
    fn name(&self) -> &'static str;

    /// Register a file. Implied parent directories are created as needed.
    fn add_file(&mut self, path: &str, data: Vec<u8>) -> Result<()>;

    /// Produce the complete image. Calling this repeatedly on the same
    /// state yields identical bytes.
    fn create(&self) -> Result<Vec<u8>>;

    fn get_blob(&self) -> Result<ImageBlob> {
        Ok(ImageBlob::new(self.create()?))
    }
}
