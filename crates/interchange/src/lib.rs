//! funrec-interchange: configurable JSON adapters for funrec values.
//!
//! `funrec-core` gives every choice a serde representation (always the
//! tagged object). This crate adds adapters for callers that need more
//! control:
//!
//! - [`ChoiceCodec`] picks the encode shape from [`CodecOptions`] and
//!   validates alternative names once, up front.
//! - [`CodecRegistry`] overrides the codec of individual types and falls
//!   back to serde for the rest.
//! - [`MaybeCodec`] and [`TupleCodec`] lift element codecs to `Maybe<T>`
//!   and tuples.
//!
//! ```
//! use funrec_core::{Choice2, WireShape};
//! use funrec_interchange::{ChoiceCodec, CodecOptions, CodecRegistry};
//!
//! let options = CodecOptions::default().with_encode_shape(WireShape::Positional);
//! let codec = ChoiceCodec::<Choice2<i32, String>, _>::with_options(CodecRegistry::new(), options)?;
//!
//! let text = codec.encode_to_string(&Choice2::from_value("ABC".to_string()))?;
//! assert_eq!(text, r#"[2,"ABC"]"#);
//! # Ok::<(), funrec_core::RecordError>(())
//! ```

pub mod choice_codec;
pub mod maybe_codec;
pub mod options;
pub mod registry;
pub mod tuple_codec;

pub use choice_codec::ChoiceCodec;
pub use maybe_codec::MaybeCodec;
pub use options::CodecOptions;
pub use funrec_core::SharedCodec;
pub use registry::CodecRegistry;
pub use tuple_codec::TupleCodec;
