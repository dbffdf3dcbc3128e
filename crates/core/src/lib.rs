//! funrec-core: closed tagged unions and their JSON wire format.
//!
//! A choice type (`Choice2<T1, T2>` through `Choice6<T1, .., T6>`) holds
//! exactly one value drawn from a fixed, ordered list of alternative types.
//! It is serialized either as a tagged object keyed by the canonical name
//! of the selected type or as a positional `[index, value]` array.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Choice2`]..[`Choice6`] -- the choice types, plus the [`Choice`],
//!   [`ChoiceSchema`], [`ChoiceEncode`] and [`ChoiceDecode`] traits
//! - [`Maybe`] -- an optional value with an explicit absent state
//! - [`TypeName`], [`Named`], [`TypeNameResolver`] -- canonical type names
//! - [`Encoder`], [`Decoder`], [`Codec`], [`JsonCodec`] -- per-type codecs
//! - [`Scope`] -- the codec overrides and shape choices nested inside other
//!   values are encoded with
//! - [`RecordError`] -- the error type for every fallible operation
//!
//! The wire-level entry points live in [`wire`].

pub mod choice;
pub mod codec;
pub mod error;
pub mod maybe;
pub mod scope;
pub mod type_name;
pub mod wire;

// ── Convenience re-exports: key types ────────────────────────────────

pub use choice::{
    Alternative, At1, At2, At3, At4, At5, At6, Choice, Choice2, Choice3, Choice4, Choice5,
    Choice6, ChoiceDecode, ChoiceEncode, ChoiceSchema,
};
pub use codec::{Codec, Decoder, Encoded, Encoder, JsonCodec};
pub use error::{ErrorKind, RecordError};
pub use maybe::Maybe;
pub use scope::{CodecLookup, Scope, SharedCodec};
pub use type_name::{Named, TypeDescriptor, TypeName, TypeNameResolver};
pub use wire::{EncodedChoice, WireParts, WireShape, CHOICE_TYPE_PROPERTY, VALUE_PROPERTY};
