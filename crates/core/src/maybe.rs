//! Optional values with an explicit absent state.
//!
//! [`Maybe<T>`] is the collaborator choice constructors consult when a
//! value may be absent: `Choice2::try_from_first(Maybe::none())` fails
//! with [`RecordError::InvalidArgument`] instead of producing a choice
//! with nothing in it. On the wire an absent value is `null`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RecordError;
use crate::type_name::{Named, TypeName};

/// A value that is either present (`some`) or absent (`none`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Maybe<T>(Option<T>);

impl<T> Maybe<T> {
    pub const fn none() -> Self {
        Maybe(None)
    }

    pub const fn some(value: T) -> Self {
        Maybe(Some(value))
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    /// The "is absent" predicate.
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the value, failing when absent.
    pub fn value(&self) -> Result<&T, RecordError> {
        self.0.as_ref().ok_or_else(absent::<T>)
    }

    pub fn into_value(self) -> Result<T, RecordError> {
        self.0.ok_or_else(absent::<T>)
    }

    pub fn value_or_default(self) -> T
    where
        T: Default,
    {
        self.0.unwrap_or_default()
    }

    pub fn as_ref(&self) -> Maybe<&T> {
        Maybe(self.0.as_ref())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Maybe<U> {
        Maybe(self.0.map(f))
    }

    /// Calls `some` with the value or `none` when absent, returning its result.
    pub fn match_with<R>(self, some: impl FnOnce(T) -> R, none: impl FnOnce() -> R) -> R {
        match self.0 {
            Some(value) => some(value),
            None => none(),
        }
    }

    /// Runs `f` only when a value is present.
    pub fn if_some(&self, f: impl FnOnce(&T)) {
        if let Some(value) = &self.0 {
            f(value);
        }
    }

    /// Runs `f` only when absent.
    pub fn if_none(&self, f: impl FnOnce()) {
        if self.0.is_none() {
            f();
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }
}

fn absent<T>() -> RecordError {
    RecordError::absent_argument(
        "value",
        format!("Maybe<{}> value not set", std::any::type_name::<T>()),
    )
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Maybe::none()
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        Maybe(value)
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(value: Maybe<T>) -> Self {
        value.0
    }
}

impl<T: Named> Named for Maybe<T> {
    fn type_name() -> TypeName {
        TypeName::generic("Maybe", &[T::type_name()])
    }
}

impl<T: Named + fmt::Display> fmt::Display for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "Maybe<{}> Value: {}", T::type_name(), value),
            None => write!(f, "Maybe<{}>: None", T::type_name()),
        }
    }
}

impl<T: Serialize> Serialize for Maybe<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Maybe<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Maybe)
    }
}
