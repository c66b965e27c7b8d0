//! Document codec. JSON via serde_json.

use crate::entry::Document;
use crate::error::Result;

/// Converts the whole document to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode the document.
    fn encode(&self, doc: &Document) -> Result<Vec<u8>>;

    /// Decode bytes into a document. Anything that isn't an object of
    /// entries is rejected as [`CorruptDocument`](crate::Error::CorruptDocument).
    fn decode(&self, bytes: &[u8]) -> Result<Document>;
}

/// JSON codec with optional pretty-printing.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-printed JSON with indentation, easier to edit by hand.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Whether output is indented.
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Serializer for JsonSerializer {
    fn encode(&self, doc: &Document) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(doc)?
        } else {
            serde_json::to_vec(doc)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Document> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
