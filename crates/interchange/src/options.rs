//! Adapter configuration.

use funrec_core::{RecordError, WireShape};
use serde::{Deserialize, Serialize};

/// How a [`ChoiceCodec`](crate::ChoiceCodec) writes documents. Decoding
/// always accepts both shapes.
///
/// Missing fields take their defaults, so `{}` is a valid configuration:
///
/// ```
/// use funrec_interchange::CodecOptions;
/// use funrec_core::WireShape;
///
/// let options = CodecOptions::from_json_str(r#"{"encode_shape": "positional"}"#).unwrap();
/// assert_eq!(options.encode_shape, WireShape::Positional);
/// assert!(!options.pretty);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Shape written by `encode`. Tagged by default.
    pub encode_shape: WireShape,
    /// Indent text produced by the string helpers.
    pub pretty: bool,
}

impl CodecOptions {
    pub fn from_json_str(text: &str) -> Result<Self, RecordError> {
        serde_json::from_str(text)
            .map_err(|e| RecordError::Configuration(format!("invalid codec options: {}", e)))
    }

    pub fn with_encode_shape(mut self, shape: WireShape) -> Self {
        self.encode_shape = shape;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
