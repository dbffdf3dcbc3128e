//! Per-type codec overrides with a serde fallback.
//!
//! A [`CodecRegistry`] is a codec provider: for any type `T` it encodes
//! and decodes with the codec registered for `T`, or with serde when
//! nothing is registered. Hand it to a
//! [`ChoiceCodec`](crate::ChoiceCodec) to change how one alternative is
//! written without touching the others.
//!
//! Overrides reach choices at any depth. While the registry falls back to
//! serde it publishes itself as the current [`Scope`], so a choice nested
//! in another choice, a `Vec` or a struct field still encodes its
//! alternatives through the registry.
//!
//! The serde fallback is why the provider impls ask for `T: Serialize`
//! (or `DeserializeOwned`) even when `T` has a registered codec. A type
//! with no serde impls at all needs a provider of its own: implement
//! [`Encoder`] and [`Decoder`] for it on a small struct and build the
//! `ChoiceCodec` over that.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use funrec_core::scope;
use funrec_core::{Codec, CodecLookup, Decoder, Encoder, RecordError, Scope, SharedCodec};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Clone)]
struct RegisteredCodec {
    type_name: &'static str,
    /// Holds a `SharedCodec<T>` for the `T` this entry is keyed by.
    codec: Arc<dyn Any + Send + Sync>,
}

#[derive(Clone, Default)]
struct Overrides {
    codecs: HashMap<TypeId, RegisteredCodec>,
}

impl CodecLookup for Overrides {
    fn lookup(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)> {
        self.codecs.get(&type_id).map(|entry| &*entry.codec)
    }
}

/// Codec overrides keyed by type. Clones share their entries until one of
/// them registers another codec.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    overrides: Arc<Overrides>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `codec` for `T`, replacing any earlier registration.
    pub fn register<T, C>(&mut self, codec: C) -> &mut Self
    where
        T: 'static,
        C: Codec<T> + Send + Sync + 'static,
    {
        self.register_shared::<T>(Arc::new(codec))
    }

    pub fn register_shared<T: 'static>(&mut self, codec: SharedCodec<T>) -> &mut Self {
        let type_name = std::any::type_name::<T>();
        tracing::debug!(type_name, "registering codec");
        let previous = Arc::make_mut(&mut self.overrides).codecs.insert(
            TypeId::of::<T>(),
            RegisteredCodec {
                type_name,
                codec: Arc::new(codec),
            },
        );
        if previous.is_some() {
            tracing::debug!(type_name, "replaced existing codec");
        }
        self
    }

    /// Builder form of [`Self::register`].
    pub fn with<T, C>(mut self, codec: C) -> Self
    where
        T: 'static,
        C: Codec<T> + Send + Sync + 'static,
    {
        self.register::<T, C>(codec);
        self
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.overrides.codecs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.overrides.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.codecs.is_empty()
    }

    /// The codec registered for `T`, if any.
    pub fn get<T: 'static>(&self) -> Result<Option<&(dyn Codec<T> + Send + Sync)>, RecordError> {
        scope::find::<T>(&*self.overrides)
    }

    /// The current scope with this registry's overrides in effect.
    fn scope(&self) -> Scope {
        let overrides: Arc<dyn CodecLookup> = self.overrides.clone();
        Scope::current().with_overrides(Some(overrides))
    }
}

impl<T: Serialize + 'static> Encoder<T> for CodecRegistry {
    fn encode(&self, value: &T) -> Result<Value, RecordError> {
        Encoder::<T>::encode(&self.scope(), value)
    }

    fn serialize_into<S: Serializer>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        Encoder::<T>::serialize_into(&self.scope(), value, serializer)
    }
}

impl<T: DeserializeOwned + 'static> Decoder<T> for CodecRegistry {
    fn decode(&self, doc: &Value) -> Result<T, RecordError> {
        Decoder::<T>::decode(&self.scope(), doc)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.overrides.codecs.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        f.debug_struct("CodecRegistry").field("codecs", &names).finish()
    }
}
