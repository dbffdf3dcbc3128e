//! The codec scope that choices reached through serde encode in.
//!
//! A choice nested inside another value is written by its own `Serialize`
//! impl, which cannot see the provider encoding its parent. Providers
//! therefore publish a [`Scope`] on the current thread for the duration of
//! each call: the codec overrides in effect and the shape nested choices
//! are written in. A choice's serde impls read the innermost scope; with
//! none published they use plain serde and the tagged shape.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::codec::{self, Codec, Decoder, Encoder};
use crate::error::RecordError;
use crate::wire::WireShape;

/// A codec for `T`, shareable between threads and registries.
pub type SharedCodec<T> = Arc<dyn Codec<T> + Send + Sync>;

/// Type-erased codec overrides, as published by a registry.
pub trait CodecLookup: Send + Sync {
    /// The entry stored for `type_id`, which must hold a
    /// `SharedCodec<T>` for the `T` with that id.
    fn lookup(&self, type_id: TypeId) -> Option<&(dyn Any + Send + Sync)>;
}

/// The codec registered for `T` in `overrides`, if any.
pub fn find<T: 'static>(
    overrides: &dyn CodecLookup,
) -> Result<Option<&(dyn Codec<T> + Send + Sync)>, RecordError> {
    let Some(entry) = overrides.lookup(TypeId::of::<T>()) else {
        return Ok(None);
    };
    entry
        .downcast_ref::<SharedCodec<T>>()
        .map(|codec| Some(&**codec))
        .ok_or_else(|| {
            RecordError::Unreachable(format!(
                "codec registered for {} has another type",
                std::any::type_name::<T>()
            ))
        })
}

thread_local! {
    static SCOPES: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

/// Overrides plus nested encode shape. Also a codec provider in its own
/// right: registered codecs first, serde for everything else.
#[derive(Clone, Default)]
pub struct Scope {
    overrides: Option<Arc<dyn CodecLookup>>,
    shape: WireShape,
}

impl Scope {
    /// The innermost scope published on this thread, or the empty scope.
    pub fn current() -> Scope {
        SCOPES
            .with(|scopes| scopes.borrow().last().cloned())
            .unwrap_or_default()
    }

    pub fn shape(&self) -> WireShape {
        self.shape
    }

    /// The same scope with `overrides` in place of the current ones.
    pub fn with_overrides(mut self, overrides: Option<Arc<dyn CodecLookup>>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_shape(mut self, shape: WireShape) -> Self {
        self.shape = shape;
        self
    }

    /// Publishes this scope while `f` runs.
    pub fn enter<R>(self, f: impl FnOnce() -> R) -> R {
        SCOPES.with(|scopes| scopes.borrow_mut().push(self));
        let _guard = Exit;
        f()
    }

    /// The override for `T` in this scope, if any.
    pub fn codec<T: 'static>(&self) -> Result<Option<&(dyn Codec<T> + Send + Sync)>, RecordError> {
        match &self.overrides {
            Some(overrides) => find::<T>(&**overrides),
            None => Ok(None),
        }
    }
}

/// Pops the scope pushed by [`Scope::enter`], on unwind too.
struct Exit;

impl Drop for Exit {
    fn drop(&mut self) {
        let _ = SCOPES.try_with(|scopes| scopes.borrow_mut().pop());
    }
}

impl<T: Serialize + 'static> Encoder<T> for Scope {
    fn encode(&self, value: &T) -> Result<Value, RecordError> {
        match self.codec::<T>()? {
            Some(codec) => Encoder::<T>::encode(codec, value),
            None => self.clone().enter(|| codec::serde_encode(value)),
        }
    }

    fn serialize_into<S: Serializer>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        match self.codec::<T>().map_err(S::Error::custom)? {
            Some(codec) => Encoder::<T>::encode(codec, value)
                .map_err(S::Error::custom)?
                .serialize(serializer),
            None => self.clone().enter(|| value.serialize(serializer)),
        }
    }
}

impl<T: DeserializeOwned + 'static> Decoder<T> for Scope {
    fn decode(&self, doc: &Value) -> Result<T, RecordError> {
        match self.codec::<T>()? {
            Some(codec) => Decoder::<T>::decode(codec, doc),
            None => self.clone().enter(|| codec::serde_decode(doc)),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("overrides", &self.overrides.is_some())
            .field("shape", &self.shape)
            .finish()
    }
}
