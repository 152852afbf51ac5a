//! Binary array decoding for parameter blobs
//!
//! Array-valued parameters are stored as opaque blobs written by a foreign,
//! general-purpose object serializer. Only the repeating element region is
//! modelled here; the serializer's type-metadata header is skipped, not parsed.
//!
//! Each element in that region is laid out as:
//!
//! ```text
//! +----------------------+------------------------------+
//! | marker (6 bytes)     | value (f64, little-endian)   |
//! +----------------------+------------------------------+
//! ```
//!
//! Decoding locates the first marker and then reads values with a fixed
//! 14-byte stride. Later markers are not re-verified.

use byteorder::{ByteOrder, LittleEndian};

/// Marker preceding every element in the serialized array region.
pub const ELEMENT_MARKER: [u8; 6] = [0x0B, 0x00, 0x00, 0x00, 0x08, 0x06];

/// Size of the encoded value following a marker.
pub const VALUE_SIZE: usize = 8;

/// Decoder for marker-prefixed `f64` arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDecoder {
    marker: Vec<u8>,
}

impl Default for ArrayDecoder {
    fn default() -> Self {
        Self {
            marker: ELEMENT_MARKER.to_vec(),
        }
    }
}

impl ArrayDecoder {
    /// Create a decoder using [`ELEMENT_MARKER`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder for a different element marker
    ///
    /// An empty marker matches at offset zero, which turns the decoder into a
    /// plain stride reader over `VALUE_SIZE`-byte values.
    pub fn with_marker(marker: impl Into<Vec<u8>>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The element marker this decoder scans for
    pub fn marker(&self) -> &[u8] {
        &self.marker
    }

    /// Byte distance between consecutive elements
    pub fn stride(&self) -> usize {
        self.marker.len() + VALUE_SIZE
    }

    /// Decode every complete element after the first marker.
    ///
    /// An empty blob, or one without a marker, yields an empty vector.
    /// Bytes after the last complete stride are ignored.
    pub fn decode(&self, blob: &[u8]) -> Vec<f64> {
        let Some(offset) = self.find_marker(blob) else {
            if !blob.is_empty() {
                log::warn!(
                    "Array blob of {} bytes contains no element marker",
                    blob.len()
                );
            }
            return Vec::new();
        };

        let region = &blob[offset..];
        let stride = self.stride();
        let count = region.len() / stride;
        if region.len() % stride != 0 {
            log::debug!(
                "Dropping {} trailing bytes after {} array elements",
                region.len() % stride,
                count
            );
        }

        (0..count)
            .map(|i| {
                let start = i * stride + self.marker.len();
                LittleEndian::read_f64(&region[start..start + VALUE_SIZE])
            })
            .collect()
    }

    /// Offset of the first marker occurrence
    fn find_marker(&self, blob: &[u8]) -> Option<usize> {
        if blob.is_empty() {
            return None;
        }
        if self.marker.is_empty() {
            return Some(0);
        }
        blob.windows(self.marker.len())
            .position(|window| window == self.marker.as_slice())
    }
}

/// Decode a blob with the default marker
pub fn decode(blob: &[u8]) -> Vec<f64> {
    ArrayDecoder::default().decode(blob)
}

#[cfg(test)]
pub(crate) fn encode(values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * (ELEMENT_MARKER.len() + VALUE_SIZE));
    for value in values {
        bytes.extend_from_slice(&ELEMENT_MARKER);
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}
