//! Closed tagged unions over 2 to 6 alternative types.
//!
//! `Choice3<A, B, C>` holds exactly one of an `A`, a `B` or a `C`, and
//! remembers which by its 1-based [`selected_index`](Choice::selected_index).
//! Every arity is generated by `define_choice!`, so `Choice2`..`Choice6`
//! share one API:
//!
//! ```
//! use funrec_core::Choice2;
//!
//! let length: Choice2<i32, String> = Choice2::from_value(3);
//! assert_eq!(length.selected_index(), 1);
//! assert!(length.is::<i32>());
//!
//! let n = length.match_with(|i| i as usize, |s| s.len());
//! assert_eq!(n, 3);
//! ```
//!
//! On the wire a choice is `{"$choiceType": "<TypeName>", "value": ...}`
//! or `[index, value]`; see [`crate::wire`].

use std::any::{Any, TypeId};
use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::codec::{Decoder, Encoder};
use crate::error::RecordError;
use crate::maybe::Maybe;
use crate::scope::Scope;
use crate::type_name::{Named, TypeDescriptor, TypeName, TypeNameResolver};
use crate::wire::{self, EncodedChoice};

/// Behavior shared by every choice arity.
pub trait Choice: Sized {
    /// Number of alternatives.
    const ARITY: usize;

    /// The 1-based position of the populated alternative, in `1..=ARITY`.
    fn selected_index(&self) -> usize;
}

/// A choice whose alternatives all have canonical names.
pub trait ChoiceSchema: Choice {
    /// Descriptors of the alternatives, in declaration order.
    fn alternatives() -> Vec<TypeDescriptor>;
}

/// A choice that can encode its populated alternative with codecs `C`.
pub trait ChoiceEncode<C>: ChoiceSchema {
    fn encode_selected(&self, codecs: &C) -> Result<Value, RecordError>;

    /// Streams the populated alternative into `serializer`.
    fn serialize_selected<S: Serializer>(
        &self,
        codecs: &C,
        serializer: S,
    ) -> Result<S::Ok, S::Error>;
}

/// A choice that can decode any of its alternatives with codecs `C`.
pub trait ChoiceDecode<C>: ChoiceSchema {
    /// Decodes `doc` as the alternative at 1-based `index`.
    fn decode_alternative(index: usize, doc: &Value, codecs: &C) -> Result<Self, RecordError>;
}

/// Construction of a choice from a bare value of one of its alternative
/// types. `I` is a position marker ([`At1`]..[`At6`]) that the compiler
/// infers; it is ambiguous, and construction fails to compile, when the
/// same type appears at two positions.
pub trait Alternative<T, I>: Sized {
    fn from_alternative(value: T) -> Self;
}

/// Position markers for [`Alternative`].
pub enum At1 {}
pub enum At2 {}
pub enum At3 {}
pub enum At4 {}
pub enum At5 {}
pub enum At6 {}

macro_rules! impl_alternative {
    ($name:ident [$($all:ident),+] $ty:ident $marker:ident $variant:ident) => {
        impl<$($all),+> Alternative<$ty, $marker> for $name<$($all),+> {
            fn from_alternative(value: $ty) -> Self {
                $name::$variant(value)
            }
        }
    };
}

macro_rules! define_choice {
    (
        $(#[$meta:meta])*
        $name:ident $gens:tt arity $arity:literal {
            $( $idx:literal => $variant:ident($ty:ident) $marker:ident,
               $from:ident, $try_from:ident, $get:ident, $on:ident; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name<$($ty),+> {
            $( $variant($ty), )+
        }

        impl<$($ty),+> $name<$($ty),+> {
            $(
                #[doc = concat!("Selects alternative ", stringify!($idx), ".")]
                pub fn $from(value: $ty) -> Self {
                    $name::$variant(value)
                }

                #[doc = concat!(
                    "Selects alternative ", stringify!($idx),
                    ", failing with an invalid-argument error when `value` is absent."
                )]
                pub fn $try_from(value: Maybe<$ty>) -> Result<Self, RecordError> {
                    if value.is_none() {
                        return Err(RecordError::absent_argument(
                            "value",
                            concat!(
                                "cannot select alternative ", stringify!($idx),
                                " from an absent value"
                            ),
                        ));
                    }
                    value.into_value().map($name::$variant)
                }

                #[doc = concat!("The value of alternative ", stringify!($idx), ", if selected.")]
                pub fn $get(&self) -> Option<&$ty> {
                    match self {
                        $name::$variant(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            )+

            /// Selects the alternative whose type is `T`.
            pub fn from_value<T, I>(value: T) -> Self
            where
                Self: Alternative<T, I>,
            {
                <Self as Alternative<T, I>>::from_alternative(value)
            }

            /// Like [`Self::from_value`], failing when `value` is absent.
            pub fn try_from_value<T, I>(value: Maybe<T>) -> Result<Self, RecordError>
            where
                Self: Alternative<T, I>,
            {
                if value.is_none() {
                    return Err(RecordError::absent_argument(
                        "value",
                        "cannot select an alternative from an absent value",
                    ));
                }
                value
                    .into_value()
                    .map(<Self as Alternative<T, I>>::from_alternative)
            }

            pub fn selected_index(&self) -> usize {
                match self {
                    $( $name::$variant(_) => $idx, )+
                }
            }

            /// Consumes the choice, calling the one handler for the selected
            /// alternative.
            pub fn match_with<R>(self, $( $on: impl FnOnce($ty) -> R ),+) -> R {
                match self {
                    $( $name::$variant(value) => $on(value), )+
                }
            }

            pub fn match_ref<R>(&self, $( $on: impl FnOnce(&$ty) -> R ),+) -> R {
                match self {
                    $( $name::$variant(value) => $on(value), )+
                }
            }

            /// Calls the handler for the selected alternative for its side
            /// effects only.
            pub fn inspect(&self, $( $on: impl FnOnce(&$ty) ),+) {
                match self {
                    $( $name::$variant(value) => $on(value), )+
                }
            }
        }

        impl<$($ty: 'static),+> $name<$($ty),+> {
            /// Whether the selected alternative's type is `T`. Types that are
            /// not alternatives of this choice are never selected.
            pub fn is<T: 'static>(&self) -> bool {
                match self {
                    $( $name::$variant(_) => TypeId::of::<$ty>() == TypeId::of::<T>(), )+
                }
            }

            /// The selected value as `dyn Any`, for callers that cannot name
            /// its type statically.
            pub fn value_untyped(&self) -> &dyn Any {
                match self {
                    $( $name::$variant(value) => value, )+
                }
            }

            /// The selected value if its type is `T`.
            pub fn get<T: 'static>(&self) -> Option<&T> {
                self.value_untyped().downcast_ref::<T>()
            }
        }

        impl<$($ty: Named + 'static),+> $name<$($ty),+> {
            /// The descriptor of the selected alternative's type.
            pub fn selected_type(&self) -> TypeDescriptor {
                match self {
                    $( $name::$variant(_) => TypeDescriptor::of::<$ty>(), )+
                }
            }
        }

        impl<$($ty),+> Choice for $name<$($ty),+> {
            const ARITY: usize = $arity;

            fn selected_index(&self) -> usize {
                $name::selected_index(self)
            }
        }

        impl<$($ty: Named + 'static),+> ChoiceSchema for $name<$($ty),+> {
            fn alternatives() -> Vec<TypeDescriptor> {
                vec![$( TypeDescriptor::of::<$ty>() ),+]
            }
        }

        impl<C, $($ty),+> ChoiceEncode<C> for $name<$($ty),+>
        where
            $( $ty: Named + 'static, C: Encoder<$ty>, )+
        {
            fn encode_selected(&self, codecs: &C) -> Result<Value, RecordError> {
                match self {
                    $( $name::$variant(value) => <C as Encoder<$ty>>::encode(codecs, value), )+
                }
            }

            fn serialize_selected<S: Serializer>(
                &self,
                codecs: &C,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                match self {
                    $( $name::$variant(value) => {
                        <C as Encoder<$ty>>::serialize_into(codecs, value, serializer)
                    } )+
                }
            }
        }

        impl<C, $($ty),+> ChoiceDecode<C> for $name<$($ty),+>
        where
            $( $ty: Named + 'static, C: Decoder<$ty>, )+
        {
            fn decode_alternative(
                index: usize,
                doc: &Value,
                codecs: &C,
            ) -> Result<Self, RecordError> {
                match index {
                    $( $idx => <C as Decoder<$ty>>::decode(codecs, doc).map($name::$variant), )+
                    _ => Err(RecordError::IndexOutOfRange {
                        index: index as i64,
                        arity: $arity,
                    }),
                }
            }
        }

        $( impl_alternative!($name $gens $ty $marker $variant); )+

        impl<$($ty: Named),+> Named for $name<$($ty),+> {
            fn type_name() -> TypeName {
                TypeName::generic("Choice", &[$( <$ty as Named>::type_name() ),+])
            }
        }

        impl<$($ty: fmt::Display),+> fmt::Display for $name<$($ty),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $name::$variant(value) => fmt::Display::fmt(value, f), )+
                }
            }
        }

        /// Written in the shape and with the codec overrides of the current
        /// [`Scope`]: the tagged object over plain serde when none is set.
        impl<$($ty),+> Serialize for $name<$($ty),+>
        where
            $( $ty: Serialize + Named + 'static, )+
        {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let resolver = TypeNameResolver::for_choice::<Self>().map_err(S::Error::custom)?;
                let scope = Scope::current();
                EncodedChoice::new(self, &scope, scope.shape(), &resolver).serialize(serializer)
            }
        }

        /// Accepts both the tagged-object and the positional-array shape,
        /// decoding alternatives with the overrides of the current [`Scope`].
        impl<'de, $($ty),+> Deserialize<'de> for $name<$($ty),+>
        where
            $( $ty: DeserializeOwned + Named + 'static, )+
        {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let resolver = TypeNameResolver::for_choice::<Self>().map_err(D::Error::custom)?;
                let doc = Value::deserialize(deserializer)?;
                wire::decode(&doc, &Scope::current(), &resolver).map_err(D::Error::custom)
            }
        }
    };
}

define_choice! {
    /// Exactly one of two alternatives.
    Choice2 [T1, T2] arity 2 {
        1 => First(T1) At1, from_first, try_from_first, first, on_first;
        2 => Second(T2) At2, from_second, try_from_second, second, on_second;
    }
}

define_choice! {
    /// Exactly one of three alternatives.
    Choice3 [T1, T2, T3] arity 3 {
        1 => First(T1) At1, from_first, try_from_first, first, on_first;
        2 => Second(T2) At2, from_second, try_from_second, second, on_second;
        3 => Third(T3) At3, from_third, try_from_third, third, on_third;
    }
}

define_choice! {
    /// Exactly one of four alternatives.
    Choice4 [T1, T2, T3, T4] arity 4 {
        1 => First(T1) At1, from_first, try_from_first, first, on_first;
        2 => Second(T2) At2, from_second, try_from_second, second, on_second;
        3 => Third(T3) At3, from_third, try_from_third, third, on_third;
        4 => Fourth(T4) At4, from_fourth, try_from_fourth, fourth, on_fourth;
    }
}

define_choice! {
    /// Exactly one of five alternatives.
    Choice5 [T1, T2, T3, T4, T5] arity 5 {
        1 => First(T1) At1, from_first, try_from_first, first, on_first;
        2 => Second(T2) At2, from_second, try_from_second, second, on_second;
        3 => Third(T3) At3, from_third, try_from_third, third, on_third;
        4 => Fourth(T4) At4, from_fourth, try_from_fourth, fourth, on_fourth;
        5 => Fifth(T5) At5, from_fifth, try_from_fifth, fifth, on_fifth;
    }
}

define_choice! {
    /// Exactly one of six alternatives.
    Choice6 [T1, T2, T3, T4, T5, T6] arity 6 {
        1 => First(T1) At1, from_first, try_from_first, first, on_first;
        2 => Second(T2) At2, from_second, try_from_second, second, on_second;
        3 => Third(T3) At3, from_third, try_from_third, third, on_third;
        4 => Fourth(T4) At4, from_fourth, try_from_fourth, fourth, on_fourth;
        5 => Fifth(T5) At5, from_fifth, try_from_fifth, fifth, on_fifth;
        6 => Sixth(T6) At6, from_sixth, try_from_sixth, sixth, on_sixth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    type IntOrString = Choice2<i32, String>;

    #[test]
    fn test_from_value_selects_position_by_type() {
        let c = IntOrString::from_value(3);
        assert_eq!(c.selected_index(), 1);
        let c = IntOrString::from_value("a".to_string());
        assert_eq!(c.selected_index(), 2);
    }

    #[test]
    fn test_is_checks_selected_type_only() {
        let c = IntOrString::from_first(3);
        assert!(c.is::<i32>());
        assert!(!c.is::<String>());
        assert!(!c.is::<u64>());
    }

    #[test]
    fn test_match_with_uses_selected_handler() {
        let length = |c: IntOrString| c.match_with(|i| i as usize, |s| s.len());
        assert_eq!(length(IntOrString::from_first(3)), 3);
        assert_eq!(length(IntOrString::from_second("abcd".to_string())), 4);
    }

    #[test]
    fn test_inspect_calls_exactly_one_handler() {
        let c = IntOrString::from_second("x".to_string());
        let mut called = (false, false);
        c.inspect(|_| called.0 = true, |_| called.1 = true);
        assert_eq!(called, (false, true));
    }

    #[test]
    fn test_try_from_absent_is_invalid_argument() {
        let err = IntOrString::try_from_first(Maybe::none()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = IntOrString::try_from_value::<String, _>(Maybe::none()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let c = IntOrString::try_from_second(Maybe::some("x".to_string())).unwrap();
        assert_eq!(c.selected_index(), 2);
    }

    #[test]
    fn test_untyped_value_and_get() {
        let c = IntOrString::from_first(1231);
        assert_eq!(c.value_untyped().downcast_ref::<i32>(), Some(&1231));
        assert_eq!(c.get::<i32>(), Some(&1231));
        assert_eq!(c.get::<String>(), None);
        assert_eq!(c.second(), None);
    }

    #[test]
    fn test_selected_type() {
        let c = IntOrString::from_second("x".to_string());
        let ty = c.selected_type();
        assert!(ty.is::<String>());
        assert_eq!(ty.name().short_name(), "String");
    }

    #[test]
    fn test_equality_needs_same_index_and_value() {
        assert_eq!(IntOrString::from_first(1), IntOrString::from_first(1));
        assert_ne!(IntOrString::from_first(1), IntOrString::from_first(2));
        assert_ne!(
            Choice2::<i32, i64>::from_first(1),
            Choice2::<i32, i64>::from_second(1)
        );
    }

    #[test]
    fn test_type_name_and_schema() {
        assert_eq!(TypeName::of::<IntOrString>().short_name(), "Choice<Int32,String>");
        assert_eq!(<Choice4<u8, i8, u16, i16> as Choice>::ARITY, 4);
        let names: Vec<String> = IntOrString::alternatives()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["Int32", "String"]);
    }

    #[test]
    fn test_display_shows_selected_value() {
        assert_eq!(IntOrString::from_first(7).to_string(), "7");
        assert_eq!(IntOrString::from_second("seven".to_string()).to_string(), "seven");
    }

    #[test]
    fn test_serialize_writes_tag_before_value() {
        let text = serde_json::to_string(&IntOrString::from_first(1231)).unwrap();
        assert_eq!(text, r#"{"$choiceType":"Int32","value":1231}"#);
    }

    #[test]
    fn test_deserialize_accepts_both_shapes() {
        let c: IntOrString = serde_json::from_value(json!([2, "ABC"])).unwrap();
        assert_eq!(c, IntOrString::from_second("ABC".to_string()));

        let c: IntOrString =
            serde_json::from_value(json!({"$choiceType": "String", "value": "ABC"})).unwrap();
        assert_eq!(c, IntOrString::from_second("ABC".to_string()));
    }

    #[test]
    fn test_serialize_rejects_colliding_names() {
        let c = Choice2::<i32, i32>::from_second(1);
        assert!(serde_json::to_string(&c).is_err());
    }

    #[test]
    fn test_nested_choice_round_trip() {
        type Nested = Choice2<bool, Choice2<i32, String>>;
        let c = Nested::from_second(IntOrString::from_first(5));
        let doc = serde_json::to_value(&c).unwrap();
        assert_eq!(
            doc,
            json!({
                "$choiceType": "Choice<Int32,String>",
                "value": {"$choiceType": "Int32", "value": 5}
            })
        );
        let back: Nested = serde_json::from_value(doc).unwrap();
        assert_eq!(back, c);
    }
}
