//! Per-type encode/decode capabilities.
//!
//! Choice codecs never reach for a global registry. Instead they are handed
//! a provider that can encode or decode each alternative type, expressed as
//! `C: Encoder<T1> + Encoder<T2> + ...`. [`JsonCodec`] provides every serde
//! type; richer providers (per-type overrides) live in `funrec-interchange`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::RecordError;
use crate::scope::Scope;

/// Encodes values of type `T` into a JSON document.
pub trait Encoder<T> {
    fn encode(&self, value: &T) -> Result<Value, RecordError>;

    /// Writes `value` straight into `serializer`.
    ///
    /// The default goes through [`Encoder::encode`], so the output is
    /// whatever a [`Value`] can hold: `f32` is widened to `f64`. Providers
    /// backed by serde override it to stream the value unchanged.
    fn serialize_into<S: Serializer>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        Self: Sized,
    {
        self.encode(value)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

/// Decodes values of type `T` from a JSON document.
pub trait Decoder<T> {
    fn decode(&self, doc: &Value) -> Result<T, RecordError>;
}

/// Both directions for `T`. Implemented for every type that is both an
/// [`Encoder<T>`] and a [`Decoder<T>`].
pub trait Codec<T>: Encoder<T> + Decoder<T> {}

impl<T, C: Encoder<T> + Decoder<T> + ?Sized> Codec<T> for C {}

/// `value` through an encoder, as something serde can write.
pub struct Encoded<'a, T, C> {
    value: &'a T,
    codecs: &'a C,
}

impl<'a, T, C: Encoder<T>> Encoded<'a, T, C> {
    pub fn new(value: &'a T, codecs: &'a C) -> Self {
        Encoded { value, codecs }
    }
}

impl<T, C: Encoder<T>> Serialize for Encoded<'_, T, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.codecs.serialize_into(self.value, serializer)
    }
}

/// The serde-backed codec: `serde_json::to_value` / `T::deserialize`.
///
/// Plain serde all the way down: choices nested in the value see no codec
/// overrides, though they keep the encode shape of the enclosing adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl<T: Serialize> Encoder<T> for JsonCodec {
    fn encode(&self, value: &T) -> Result<Value, RecordError> {
        Scope::current()
            .with_overrides(None)
            .enter(|| serde_encode(value))
    }

    fn serialize_into<S: Serializer>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        Scope::current()
            .with_overrides(None)
            .enter(|| value.serialize(serializer))
    }
}

impl<T: DeserializeOwned> Decoder<T> for JsonCodec {
    fn decode(&self, doc: &Value) -> Result<T, RecordError> {
        Scope::current()
            .with_overrides(None)
            .enter(|| serde_decode(doc))
    }
}

pub(crate) fn serde_encode<T: Serialize>(value: &T) -> Result<Value, RecordError> {
    serde_json::to_value(value).map_err(|e| {
        RecordError::Format(format!(
            "cannot encode {}: {}",
            std::any::type_name::<T>(),
            e
        ))
    })
}

pub(crate) fn serde_decode<T: DeserializeOwned>(doc: &Value) -> Result<T, RecordError> {
    T::deserialize(doc).map_err(|e| {
        RecordError::Format(format!(
            "cannot decode {}: {}",
            std::any::type_name::<T>(),
            e
        ))
    })
}

// ── Forwarding impls ────────────────────────────────────────────────

impl<T, C: Encoder<T> + ?Sized> Encoder<T> for &C {
    fn encode(&self, value: &T) -> Result<Value, RecordError> {
        (**self).encode(value)
    }
}

impl<T, C: Decoder<T> + ?Sized> Decoder<T> for &C {
    fn decode(&self, doc: &Value) -> Result<T, RecordError> {
        (**self).decode(doc)
    }
}

impl<T, C: Encoder<T> + ?Sized> Encoder<T> for Arc<C> {
    fn encode(&self, value: &T) -> Result<Value, RecordError> {
        (**self).encode(value)
    }
}

impl<T, C: Decoder<T> + ?Sized> Decoder<T> for Arc<C> {
    fn decode(&self, doc: &Value) -> Result<T, RecordError> {
        (**self).decode(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_json_codec_round_trip() {
        let doc = Encoder::<i32>::encode(&JsonCodec, &1231).unwrap();
        assert_eq!(doc, json!(1231));
        let back: i32 = JsonCodec.decode(&doc).unwrap();
        assert_eq!(back, 1231);
    }

    #[test]
    fn test_json_codec_decode_mismatch_is_format() {
        let err = Decoder::<i32>::decode(&JsonCodec, &json!("abc")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("i32"), "{}", err);
    }

    #[test]
    fn test_forwarding_through_reference_and_arc() {
        fn encode_with<C: Encoder<String>>(codec: C) -> Value {
            codec.encode(&"x".to_string()).unwrap()
        }

        assert_eq!(encode_with(&JsonCodec), json!("x"));
        assert_eq!(encode_with(Arc::new(JsonCodec)), json!("x"));

        let shared: Arc<dyn Codec<String>> = Arc::new(JsonCodec);
        assert_eq!(encode_with(&*shared), json!("x"));
    }

    #[test]
    fn test_streamed_f32_keeps_its_shortest_form() {
        let text = serde_json::to_string(&Encoded::new(&0.1f32, &JsonCodec)).unwrap();
        assert_eq!(text, "0.1");
        let doc = Encoder::<f32>::encode(&JsonCodec, &0.1).unwrap();
        assert_eq!(doc.as_f64(), Some(0.1f32 as f64));
    }
}
