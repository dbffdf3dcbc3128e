//! The two JSON shapes a choice travels in.
//!
//! - Positional: `[<index>, <value>]`, `index` 1-based.
//! - Tagged: `{"$choiceType": "<TypeName>", "value": <value>}`.
//!
//! [`decode`] accepts either and picks by looking at the document;
//! [`encode`] writes the shape it is asked for, and [`EncodedChoice`]
//! streams the same document into any serde serializer. The index and the
//! tag go through the provider's `i64` and `String` codecs, the value
//! through the selected alternative's own codec.

use serde::ser::{Error as _, SerializeMap, SerializeTuple};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::choice::{ChoiceDecode, ChoiceEncode};
use crate::codec::{Decoder, Encoded, Encoder};
use crate::error::RecordError;
use crate::type_name::TypeNameResolver;

/// Property holding the canonical type name of the selected alternative.
pub const CHOICE_TYPE_PROPERTY: &str = "$choiceType";
/// Property holding the encoded alternative.
pub const VALUE_PROPERTY: &str = "value";

/// Which JSON shape a choice is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireShape {
    /// `{"$choiceType": ..., "value": ...}`
    #[default]
    Tagged,
    /// `[index, value]`
    Positional,
}

impl WireShape {
    /// Detects the shape of `doc` from its outer JSON type.
    pub fn detect(doc: &Value) -> Result<Self, RecordError> {
        match doc {
            Value::Array(_) => Ok(WireShape::Positional),
            Value::Object(_) => Ok(WireShape::Tagged),
            other => Err(RecordError::Format(format!(
                "expected a choice array or object, got {}",
                json_kind(other)
            ))),
        }
    }
}

/// A choice document split into its selector and its encoded value,
/// before either has been decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireParts<'a> {
    Positional { index: &'a Value, value: &'a Value },
    Tagged { tag: &'a Value, value: &'a Value },
}

impl<'a> WireParts<'a> {
    /// Checks the outer structure of `doc` and borrows its two parts.
    pub fn split(doc: &'a Value) -> Result<Self, RecordError> {
        match doc {
            Value::Array(items) => match items.as_slice() {
                [index, value] => Ok(WireParts::Positional { index, value }),
                _ => Err(RecordError::Format(format!(
                    "expected a choice array of 2 elements [index, value], got {}",
                    items.len()
                ))),
            },
            Value::Object(props) => {
                let tag = props
                    .get(CHOICE_TYPE_PROPERTY)
                    .ok_or_else(|| RecordError::property_not_found(CHOICE_TYPE_PROPERTY))?;
                let value = props
                    .get(VALUE_PROPERTY)
                    .ok_or_else(|| RecordError::property_not_found(VALUE_PROPERTY))?;
                Ok(WireParts::Tagged { tag, value })
            }
            other => Err(RecordError::Format(format!(
                "expected a choice array or object, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn shape(&self) -> WireShape {
        match self {
            WireParts::Positional { .. } => WireShape::Positional,
            WireParts::Tagged { .. } => WireShape::Tagged,
        }
    }

    pub fn value(&self) -> &'a Value {
        match self {
            WireParts::Positional { value, .. } | WireParts::Tagged { value, .. } => value,
        }
    }
}

/// Encodes `choice` in `shape`.
///
/// `resolver` must have been built for `K`; a resolver missing the
/// selected position is an internal error.
pub fn encode<K, C>(
    choice: &K,
    codecs: &C,
    shape: WireShape,
    resolver: &TypeNameResolver,
) -> Result<Value, RecordError>
where
    K: ChoiceEncode<C>,
    C: Encoder<i64> + Encoder<String>,
{
    let index = choice.selected_index();
    tracing::trace!(index, ?shape, "encoding choice");

    match shape {
        WireShape::Tagged => {
            let name = resolver.name_of(index).ok_or_else(|| {
                RecordError::Unreachable(format!(
                    "no type name for selected index {} of {}",
                    index,
                    K::ARITY
                ))
            })?;
            let tag = Encoder::<String>::encode(codecs, &name.short_name().to_string())?;
            let value = choice.encode_selected(codecs)?;

            let mut props = Map::new();
            props.insert(CHOICE_TYPE_PROPERTY.to_string(), tag);
            props.insert(VALUE_PROPERTY.to_string(), value);
            Ok(Value::Object(props))
        }
        WireShape::Positional => {
            let index = Encoder::<i64>::encode(codecs, &(index as i64))?;
            let value = choice.encode_selected(codecs)?;
            Ok(Value::Array(vec![index, value]))
        }
    }
}

/// A choice in `shape`, written by serde without building a [`Value`]
/// first, so the alternative comes out exactly as its codec streams it.
pub struct EncodedChoice<'a, K, C> {
    choice: &'a K,
    codecs: &'a C,
    shape: WireShape,
    resolver: &'a TypeNameResolver,
}

impl<'a, K, C> EncodedChoice<'a, K, C>
where
    K: ChoiceEncode<C>,
    C: Encoder<i64> + Encoder<String>,
{
    pub fn new(
        choice: &'a K,
        codecs: &'a C,
        shape: WireShape,
        resolver: &'a TypeNameResolver,
    ) -> Self {
        EncodedChoice {
            choice,
            codecs,
            shape,
            resolver,
        }
    }
}

impl<K, C> Serialize for EncodedChoice<'_, K, C>
where
    K: ChoiceEncode<C>,
    C: Encoder<i64> + Encoder<String>,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let index = self.choice.selected_index();
        tracing::trace!(index, shape = ?self.shape, "streaming choice");
        let value = Selected {
            choice: self.choice,
            codecs: self.codecs,
        };

        match self.shape {
            WireShape::Tagged => {
                let name = self.resolver.name_of(index).ok_or_else(|| {
                    S::Error::custom(format!("no type name for selected index {}", index))
                })?;
                let tag = name.short_name().to_string();

                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(CHOICE_TYPE_PROPERTY, &Encoded::new(&tag, self.codecs))?;
                map.serialize_entry(VALUE_PROPERTY, &value)?;
                map.end()
            }
            WireShape::Positional => {
                let index = index as i64;
                let mut items = serializer.serialize_tuple(2)?;
                items.serialize_element(&Encoded::new(&index, self.codecs))?;
                items.serialize_element(&value)?;
                items.end()
            }
        }
    }
}

/// The selected alternative of a choice, through its codec.
struct Selected<'a, K, C> {
    choice: &'a K,
    codecs: &'a C,
}

impl<K: ChoiceEncode<C>, C> Serialize for Selected<'_, K, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.choice.serialize_selected(self.codecs, serializer)
    }
}

/// Decodes a choice from either shape.
pub fn decode<K, C>(doc: &Value, codecs: &C, resolver: &TypeNameResolver) -> Result<K, RecordError>
where
    K: ChoiceDecode<C>,
    C: Decoder<i64> + Decoder<String>,
{
    let parts = WireParts::split(doc)?;
    tracing::debug!(shape = ?parts.shape(), "decoding choice");

    let index = match parts {
        WireParts::Positional { index, .. } => {
            let index: i64 = Decoder::<i64>::decode(codecs, index).map_err(|e| {
                RecordError::Format(format!("choice index must be an integer: {}", e))
            })?;
            checked_index(index, K::ARITY)?
        }
        WireParts::Tagged { tag, .. } => {
            let tag: String = Decoder::<String>::decode(codecs, tag).map_err(|e| {
                RecordError::Format(format!("choice type tag must be a string: {}", e))
            })?;
            resolver.resolve(&tag)?
        }
    };

    K::decode_alternative(index, parts.value(), codecs)
}

/// Validates a decoded positional index against `1..=arity`.
pub fn checked_index(index: i64, arity: usize) -> Result<usize, RecordError> {
    match usize::try_from(index) {
        Ok(i) if (1..=arity).contains(&i) => Ok(i),
        _ => Err(RecordError::IndexOutOfRange { index, arity }),
    }
}

fn json_kind(doc: &Value) -> &'static str {
    match doc {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
