//! Tuples of 1 to 6 elements as JSON arrays, one codec per element.

use funrec_core::{Decoder, Encoder, RecordError};
use serde_json::Value;

/// Encodes `(A, B, ..)` as `[a, b, ..]`, each element through the inner
/// provider. Decoding requires an array of exactly the tuple's length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TupleCodec<C> {
    inner: C,
}

impl<C> TupleCodec<C> {
    pub fn new(inner: C) -> Self {
        TupleCodec { inner }
    }
}

fn elements(doc: &Value, len: usize) -> Result<&[Value], RecordError> {
    match doc {
        Value::Array(items) if items.len() == len => Ok(items),
        Value::Array(items) => Err(RecordError::Format(format!(
            "expected a tuple of {} elements, got {}",
            len,
            items.len()
        ))),
        other => Err(RecordError::Format(format!(
            "expected a tuple array, got {}",
            other
        ))),
    }
}

macro_rules! tuple_codec {
    ($len:literal => $($t:ident $i:tt),+) => {
        impl<C, $($t),+> Encoder<($($t,)+)> for TupleCodec<C>
        where
            $( C: Encoder<$t>, )+
        {
            fn encode(&self, value: &($($t,)+)) -> Result<Value, RecordError> {
                Ok(Value::Array(vec![
                    $( Encoder::<$t>::encode(&self.inner, &value.$i)?, )+
                ]))
            }
        }

        impl<C, $($t),+> Decoder<($($t,)+)> for TupleCodec<C>
        where
            $( C: Decoder<$t>, )+
        {
            fn decode(&self, doc: &Value) -> Result<($($t,)+), RecordError> {
                let items = elements(doc, $len)?;
                Ok(( $( Decoder::<$t>::decode(&self.inner, &items[$i])?, )+ ))
            }
        }
    };
}

tuple_codec!(1 => A 0);
tuple_codec!(2 => A 0, B 1);
tuple_codec!(3 => A 0, B 1, C2 2);
tuple_codec!(4 => A 0, B 1, C2 2, D 3);
tuple_codec!(5 => A 0, B 1, C2 2, D 3, E 4);
tuple_codec!(6 => A 0, B 1, C2 2, D 3, E 4, F 5);

#[cfg(test)]
mod tests {
    use super::*;
    use funrec_core::{ErrorKind, JsonCodec};
    use serde_json::json;

    #[test]
    fn test_pair_as_array() {
        let codec = TupleCodec::new(JsonCodec);
        let doc = codec.encode(&(1i32, "a".to_string())).unwrap();
        assert_eq!(doc, json!([1, "a"]));
        let back: (i32, String) = codec.decode(&doc).unwrap();
        assert_eq!(back, (1, "a".to_string()));
    }

    #[test]
    fn test_single_and_six() {
        let codec = TupleCodec::new(JsonCodec);
        assert_eq!(codec.encode(&(true,)).unwrap(), json!([true]));

        let six = (1u8, 2i16, 3u32, 4i64, "5".to_string(), false);
        let doc = codec.encode(&six).unwrap();
        assert_eq!(doc, json!([1, 2, 3, 4, "5", false]));
        let back: (u8, i16, u32, i64, String, bool) = codec.decode(&doc).unwrap();
        assert_eq!(back, six);
    }

    #[test]
    fn test_length_mismatch_is_format_error() {
        let codec = TupleCodec::new(JsonCodec);
        let err = Decoder::<(i32, i32)>::decode(&codec, &json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        let err = Decoder::<(i32, i32)>::decode(&codec, &json!({"0": 1})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_element_failure_propagates() {
        let codec = TupleCodec::new(JsonCodec);
        let err = Decoder::<(i32, bool)>::decode(&codec, &json!([1, "yes"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
