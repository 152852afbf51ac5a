use crate::binary::ArrayDecoder;
use crate::parameters::ValueExtractor;

/// Configuration for reading export files
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Load blob columns and decode array parameters
    pub load_blobs: bool,
    /// Decoder for array blobs
    pub decoder: ArrayDecoder,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            load_blobs: true,
            decoder: ArrayDecoder::default(),
        }
    }
}

impl ReaderConfig {
    /// Skip the blob pass; array parameters carry no value
    pub fn without_blobs(mut self) -> Self {
        self.load_blobs = false;
        self
    }

    pub(super) fn extractor(&self) -> ValueExtractor {
        ValueExtractor::new()
            .with_decoder(self.decoder.clone())
            .with_blobs(self.load_blobs)
    }
}
