//! Canonical short type names used as wire-format type tags.
//!
//! A [`TypeName`] is a deterministic string built from a type's shape:
//!
//! - simple types use their bare name (`Int32`, `String`, `PersonName`)
//! - arrays append `[]` to the element name (`PersonName[]`)
//! - generic types list their arguments without spaces
//!   (`Dictionary<Int32,PersonName>`)
//!
//! Types opt in by implementing [`Named`]; [`named!`](crate::named) covers
//! plain structs and enums. [`TypeNameResolver`] maps a decoded tag back to
//! the 1-based position of one of a fixed list of alternatives.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::RecordError;

/// The canonical short name of a type.
///
/// Two names are equal exactly when their rendered short names are equal,
/// regardless of how they were built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    short_name: String,
}

impl TypeName {
    /// A non-generic, non-array type. Module paths are dropped, so
    /// `"crate::model::PersonName"` becomes `PersonName`.
    pub fn simple(name: &str) -> Self {
        TypeName {
            short_name: bare(name).to_string(),
        }
    }

    /// An array (or `Vec`) whose elements are named `element`.
    pub fn array(element: &TypeName) -> Self {
        TypeName {
            short_name: format!("{}[]", element.short_name),
        }
    }

    /// A generic type applied to `args`, in declaration order.
    pub fn generic(name: &str, args: &[TypeName]) -> Self {
        let mut short_name = String::from(bare(name));
        short_name.push('<');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                short_name.push(',');
            }
            short_name.push_str(&arg.short_name);
        }
        short_name.push('>');
        TypeName { short_name }
    }

    /// The canonical name of `T`.
    pub fn of<T: Named + ?Sized>() -> Self {
        T::type_name()
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name)
    }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        self.short_name == other
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        self.short_name == *other
    }
}

/// Strips a leading module path and any generic suffix from a type name.
fn bare(name: &str) -> &str {
    let name = name.trim();
    let name = name.split(|c: char| c == '<' || c == '`').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}

/// A type with a canonical short name.
pub trait Named {
    fn type_name() -> TypeName;
}

/// Implements [`Named`] for plain (non-generic) types using their
/// identifier as the short name.
///
/// ```
/// use funrec_core::{named, TypeName};
///
/// struct PersonName;
/// named!(PersonName);
///
/// assert_eq!(TypeName::of::<PersonName>().short_name(), "PersonName");
/// ```
#[macro_export]
macro_rules! named {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::Named for $ty {
                fn type_name() -> $crate::TypeName {
                    $crate::TypeName::simple(stringify!($ty))
                }
            }
        )+
    };
}

// ── Built-in names ──────────────────────────────────────────────────

macro_rules! primitive_names {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl Named for $ty {
                fn type_name() -> TypeName {
                    TypeName::simple($name)
                }
            }
        )+
    };
}

primitive_names! {
    i8 => "SByte",
    u8 => "Byte",
    i16 => "Int16",
    u16 => "UInt16",
    i32 => "Int32",
    u32 => "UInt32",
    i64 => "Int64",
    u64 => "UInt64",
    i128 => "Int128",
    u128 => "UInt128",
    isize => "IntPtr",
    usize => "UIntPtr",
    f32 => "Single",
    f64 => "Double",
    bool => "Boolean",
    char => "Char",
    String => "String",
    str => "String",
    &'static str => "String",
    () => "Unit",
}

impl<T: Named> Named for Vec<T> {
    fn type_name() -> TypeName {
        TypeName::array(&T::type_name())
    }
}

impl<T: Named> Named for [T] {
    fn type_name() -> TypeName {
        TypeName::array(&T::type_name())
    }
}

impl<T: Named, const N: usize> Named for [T; N] {
    fn type_name() -> TypeName {
        TypeName::array(&T::type_name())
    }
}

impl<T: Named> Named for Option<T> {
    fn type_name() -> TypeName {
        TypeName::generic("Option", &[T::type_name()])
    }
}

impl<K: Named, V: Named, S> Named for HashMap<K, V, S> {
    fn type_name() -> TypeName {
        TypeName::generic("Dictionary", &[K::type_name(), V::type_name()])
    }
}

impl<K: Named, V: Named> Named for BTreeMap<K, V> {
    fn type_name() -> TypeName {
        TypeName::generic("Dictionary", &[K::type_name(), V::type_name()])
    }
}

impl<T: Named, S> Named for HashSet<T, S> {
    fn type_name() -> TypeName {
        TypeName::generic("HashSet", &[T::type_name()])
    }
}

impl<T: Named> Named for BTreeSet<T> {
    fn type_name() -> TypeName {
        TypeName::generic("SortedSet", &[T::type_name()])
    }
}

// Smart pointers are transparent on the wire, so they carry the pointee's name.
macro_rules! transparent_names {
    ($($ptr:ident),+) => {
        $(
            impl<T: Named + ?Sized> Named for $ptr<T> {
                fn type_name() -> TypeName {
                    T::type_name()
                }
            }
        )+
    };
}

transparent_names!(Box, Arc, Rc);

macro_rules! tuple_names {
    ($($t:ident),+) => {
        impl<$($t: Named),+> Named for ($($t,)+) {
            fn type_name() -> TypeName {
                TypeName::generic("ValueTuple", &[$($t::type_name()),+])
            }
        }
    };
}

tuple_names!(A);
tuple_names!(A, B);
tuple_names!(A, B, C);
tuple_names!(A, B, C, D);
tuple_names!(A, B, C, D, E);
tuple_names!(A, B, C, D, E, F);

// ── Type descriptors ────────────────────────────────────────────────

/// Runtime identity of one alternative type: its `TypeId`, canonical
/// name and Rust type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: TypeName,
    rust_name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: Named + 'static>() -> Self {
        TypeDescriptor {
            id: TypeId::of::<T>(),
            name: T::type_name(),
            rust_name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// The compiler's name for the type, e.g. `alloc::string::String`.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// Whether this descriptor describes `T`.
    pub fn is<T: 'static + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}

// ── Resolution ──────────────────────────────────────────────────────

/// Maps type tags to the 1-based position of one of a fixed list of
/// alternative names.
///
/// Construction fails with a configuration error when fewer than two
/// names are supplied or when two names collide, so an ambiguous set of
/// alternatives is rejected before any document is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNameResolver {
    names: Vec<TypeName>,
}

impl TypeNameResolver {
    pub fn new(names: Vec<TypeName>) -> Result<Self, RecordError> {
        if names.len() < 2 {
            return Err(RecordError::Configuration(format!(
                "a choice needs at least 2 alternatives, got {}",
                names.len()
            )));
        }

        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                tracing::debug!(name = %name, "rejecting alternatives with colliding type names");
                return Err(RecordError::Configuration(format!(
                    "two types give equal name `{}`",
                    name
                )));
            }
        }

        Ok(TypeNameResolver { names })
    }

    /// Builds a resolver over the alternatives of choice type `K`.
    pub fn for_choice<K: crate::ChoiceSchema>() -> Result<Self, RecordError> {
        Self::new(
            K::alternatives()
                .into_iter()
                .map(|alt| alt.name)
                .collect(),
        )
    }

    pub fn names(&self) -> &[TypeName] {
        &self.names
    }

    /// The name of the alternative at 1-based `index`.
    pub fn name_of(&self, index: usize) -> Option<&TypeName> {
        index.checked_sub(1).and_then(|i| self.names.get(i))
    }

    /// Resolves `tag` to the 1-based index of the alternative it names.
    pub fn resolve(&self, tag: &str) -> Result<usize, RecordError> {
        if tag.trim().is_empty() {
            return Err(RecordError::Format(
                "choice type tag must not be blank".to_string(),
            ));
        }

        self.names
            .iter()
            .position(|name| name == tag)
            .map(|i| i + 1)
            .ok_or_else(|| RecordError::UnknownTypeTag {
                tag: tag.to_string(),
                expected: self.names.iter().map(|n| n.to_string()).collect(),
            })
    }
}
