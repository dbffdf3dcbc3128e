//! The configurable choice adapter.

use std::fmt;
use std::io;
use std::marker::PhantomData;

use funrec_core::{
    wire, ChoiceDecode, ChoiceEncode, ChoiceSchema, Decoder, Encoded, EncodedChoice, Encoder,
    JsonCodec, RecordError, Scope, TypeNameResolver,
};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::options::CodecOptions;

/// Encodes and decodes choices of type `K` using the alternative codecs
/// in `C`.
///
/// The configured encode shape applies to the whole document, choices
/// nested inside alternatives included.
///
/// Names of `K`'s alternatives are checked once, when the adapter is
/// built, so a choice whose alternatives collide is rejected before any
/// document is read or written:
///
/// ```
/// use funrec_core::{Choice2, ErrorKind};
/// use funrec_interchange::ChoiceCodec;
///
/// let err = ChoiceCodec::<Choice2<i32, i32>>::json().unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// ```
pub struct ChoiceCodec<K, C = JsonCodec> {
    codecs: C,
    options: CodecOptions,
    resolver: TypeNameResolver,
    _choice: PhantomData<fn() -> K>,
}

impl<K: ChoiceSchema> ChoiceCodec<K, JsonCodec> {
    /// An adapter over the serde codecs, with default options.
    pub fn json() -> Result<Self, RecordError> {
        Self::new(JsonCodec)
    }
}

impl<K: ChoiceSchema, C> ChoiceCodec<K, C> {
    pub fn new(codecs: C) -> Result<Self, RecordError> {
        Self::with_options(codecs, CodecOptions::default())
    }

    pub fn with_options(codecs: C, options: CodecOptions) -> Result<Self, RecordError> {
        let resolver = TypeNameResolver::for_choice::<K>()?;
        tracing::debug!(
            choice = std::any::type_name::<K>(),
            shape = ?options.encode_shape,
            "built choice codec"
        );
        Ok(ChoiceCodec {
            codecs,
            options,
            resolver,
            _choice: PhantomData,
        })
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn resolver(&self) -> &TypeNameResolver {
        &self.resolver
    }

    /// Encodes `value` as JSON text, indented when the options ask for it.
    ///
    /// The text is streamed, not built from a [`Value`], so it is byte for
    /// byte what `serde_json` writes for the same document: struct fields
    /// keep their order and `f32` values keep their shortest form. Failures
    /// of alternative codecs come back as format errors.
    pub fn encode_to_string(&self, value: &K) -> Result<String, RecordError>
    where
        Self: Encoder<K>,
    {
        let encoded = Encoded::new(value, self);
        let text = if self.options.pretty {
            serde_json::to_string_pretty(&encoded)
        } else {
            serde_json::to_string(&encoded)
        };
        Ok(text?)
    }

    /// Like [`Self::encode_to_string`], writing into `writer`.
    pub fn encode_to_writer<W: io::Write>(&self, value: &K, writer: W) -> Result<(), RecordError>
    where
        Self: Encoder<K>,
    {
        let encoded = Encoded::new(value, self);
        if self.options.pretty {
            serde_json::to_writer_pretty(writer, &encoded)?;
        } else {
            serde_json::to_writer(writer, &encoded)?;
        }
        Ok(())
    }

    /// Parses JSON text and decodes it. Text that is not JSON is a format
    /// error.
    pub fn decode_str(&self, text: &str) -> Result<K, RecordError>
    where
        Self: Decoder<K>,
    {
        let doc: Value = serde_json::from_str(text)?;
        self.decode(&doc)
    }
}

impl<K, C> Encoder<K> for ChoiceCodec<K, C>
where
    K: ChoiceEncode<C>,
    C: Encoder<i64> + Encoder<String>,
{
    /// An `f32` alternative is widened to `f64` in the returned [`Value`];
    /// the text helpers keep it exact.
    fn encode(&self, value: &K) -> Result<Value, RecordError> {
        let shape = self.options.encode_shape;
        Scope::current()
            .with_shape(shape)
            .enter(|| wire::encode(value, &self.codecs, shape, &self.resolver))
    }

    fn serialize_into<S: Serializer>(&self, value: &K, serializer: S) -> Result<S::Ok, S::Error> {
        let shape = self.options.encode_shape;
        Scope::current().with_shape(shape).enter(|| {
            EncodedChoice::new(value, &self.codecs, shape, &self.resolver).serialize(serializer)
        })
    }
}

impl<K, C> Decoder<K> for ChoiceCodec<K, C>
where
    K: ChoiceDecode<C>,
    C: Decoder<i64> + Decoder<String>,
{
    fn decode(&self, doc: &Value) -> Result<K, RecordError> {
        wire::decode(doc, &self.codecs, &self.resolver)
    }
}

impl<K, C: fmt::Debug> fmt::Debug for ChoiceCodec<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceCodec")
            .field("choice", &std::any::type_name::<K>())
            .field("codecs", &self.codecs)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funrec_core::{Choice2, Choice3, ErrorKind, WireShape};
    use serde_json::json;

    type IntOrString = Choice2<i32, String>;

    #[test]
    fn test_default_options_encode_tagged() {
        let codec = ChoiceCodec::<IntOrString>::json().unwrap();
        let doc = codec.encode(&IntOrString::from_first(1231)).unwrap();
        assert_eq!(doc, json!({"$choiceType": "Int32", "value": 1231}));
    }

    #[test]
    fn test_positional_option() {
        let options = CodecOptions::default().with_encode_shape(WireShape::Positional);
        let codec = ChoiceCodec::<IntOrString>::with_options(JsonCodec, options).unwrap();
        let text = codec
            .encode_to_string(&IntOrString::from_second("ABC".to_string()))
            .unwrap();
        assert_eq!(text, r#"[2,"ABC"]"#);
    }

    #[test]
    fn test_decode_ignores_encode_shape() {
        let options = CodecOptions::default().with_encode_shape(WireShape::Positional);
        let codec = ChoiceCodec::<IntOrString>::with_options(JsonCodec, options).unwrap();
        let c = codec
            .decode_str(r#"{"$choiceType":"String","value":"x"}"#)
            .unwrap();
        assert_eq!(c, IntOrString::from_second("x".to_string()));
    }

    #[test]
    fn test_pretty_text() {
        let codec = ChoiceCodec::<IntOrString>::with_options(
            JsonCodec,
            CodecOptions::default().with_pretty(true),
        )
        .unwrap();
        let text = codec.encode_to_string(&IntOrString::from_first(1)).unwrap();
        assert!(text.contains('\n'), "{}", text);
        assert_eq!(codec.decode_str(&text).unwrap(), IntOrString::from_first(1));
    }

    #[test]
    fn test_malformed_text_is_format_error() {
        let codec = ChoiceCodec::<IntOrString>::json().unwrap();
        for text in ["", "[2, \"ABC\"", "{\"$choiceType\":", "nope"] {
            let err = codec.decode_str(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{:?}", text);
        }
    }

    #[test]
    fn test_colliding_names_rejected_at_construction() {
        mod a {
            pub struct Name;
            funrec_core::named!(Name);
        }
        mod b {
            pub struct Name;
            funrec_core::named!(Name);
        }

        let err = ChoiceCodec::<Choice2<a::Name, b::Name>>::json().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let err = ChoiceCodec::<Choice3<i32, String, i32>>::json().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_encode_shape_applies_to_nested_choices() {
        type Nested = Choice2<bool, IntOrString>;
        let options = CodecOptions::default().with_encode_shape(WireShape::Positional);
        let codec = ChoiceCodec::<Nested>::with_options(JsonCodec, options).unwrap();
        let c = Nested::from_second(IntOrString::from_first(5));

        assert_eq!(codec.encode(&c).unwrap(), json!([2, [1, 5]]));
        assert_eq!(codec.encode_to_string(&c).unwrap(), "[2,[1,5]]");
        assert_eq!(codec.decode_str("[2,[1,5]]").unwrap(), c);

        // Outside the adapter, serde is back to the tagged shape.
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({
                "$choiceType": "Choice<Int32,String>",
                "value": {"$choiceType": "Int32", "value": 5}
            })
        );
    }

    #[test]
    fn test_writer_matches_string() {
        let codec = ChoiceCodec::<Choice3<i32, String, f32>>::json().unwrap();
        let c = Choice3::from_third(0.1f32);
        let mut out = Vec::new();
        codec.encode_to_writer(&c, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), codec.encode_to_string(&c).unwrap());
    }

    #[test]
    fn test_resolver_is_built_for_choice() {
        let codec = ChoiceCodec::<Choice3<i32, String, f32>>::json().unwrap();
        assert_eq!(codec.resolver().resolve("Single").unwrap(), 3);
        assert_eq!(codec.options(), &CodecOptions::default());
    }
}
