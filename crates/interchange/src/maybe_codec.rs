//! `Maybe<T>` over any codec for `T`.

use funrec_core::{Decoder, Encoder, Maybe, RecordError};
use serde_json::Value;

/// Writes an absent [`Maybe`] as `null` and a present one with the inner
/// codec. Register it for `Maybe<T>` to keep a custom `T` codec in effect
/// when the value is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaybeCodec<C> {
    inner: C,
}

impl<C> MaybeCodec<C> {
    pub fn new(inner: C) -> Self {
        MaybeCodec { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<T, C: Encoder<T>> Encoder<Maybe<T>> for MaybeCodec<C> {
    fn encode(&self, value: &Maybe<T>) -> Result<Value, RecordError> {
        match value.as_option() {
            Some(inner) => self.inner.encode(inner),
            None => Ok(Value::Null),
        }
    }
}

impl<T, C: Decoder<T>> Decoder<Maybe<T>> for MaybeCodec<C> {
    fn decode(&self, doc: &Value) -> Result<Maybe<T>, RecordError> {
        if doc.is_null() {
            return Ok(Maybe::none());
        }
        self.inner.decode(doc).map(Maybe::some)
    }
}
