//! Field capabilities.
//!
//! Every field type implements [`Field`], which hands the engine a typed
//! handle ([`FieldMut`] / [`FieldRef`]) for writing and reading. Scalars
//! go through [`TextDecode`]; `Vec<T>` is a sequence; `Option<T>` is an
//! [`OptionalSlot`] that is only populated when a value is written.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};

use crate::error::{CoerceError, DecodeError};
use crate::record::{Section, Shape};

/// Conversion between a single raw value and a Rust type.
///
/// Implement this for your own types and register them with
/// [`text_field!`](crate::text_field) to use them as record fields.
/// Errors are reported to the caller verbatim.
pub trait TextDecode: Sized {
    /// Type name used in "invalid value" errors.
    ///
    /// Built-in types report their Rust name with its width (`u32`, `f64`,
    /// `Duration`), not a width-less family such as `uint`.
    const KIND: &'static str = "value";

    fn from_text(text: &str) -> Result<Self, DecodeError>;

    /// Text form used by the serializer. `None` means the value cannot be written.
    fn to_text(&self) -> Option<String> {
        None
    }
}

/// A type usable as a record field.
pub trait Field: Sized {
    fn shape() -> Shape;

    fn as_field_mut(&mut self) -> FieldMut<'_>;

    fn as_field_ref(&self) -> FieldRef<'_>;

    /// Build a fresh value from raw text, used when an absent `Option<Self>`
    /// receives a value.
    fn decode(raw: &str) -> Result<Self, CoerceError>;

    /// A fresh value to populate an absent `Option<Self>` with before
    /// writing into it field by field. Only records have one.
    fn vacant() -> Option<Self> {
        None
    }
}

/// Mutable handle to a field.
pub enum FieldMut<'a> {
    Scalar(&'a mut dyn ScalarSlot),
    Sequence(&'a mut dyn SequenceSlot),
    Record(&'a mut dyn Section),
    Optional(&'a mut dyn OptionalSlot),
    Unsupported { type_name: &'static str },
}

/// Shared handle to a field.
pub enum FieldRef<'a> {
    Scalar(&'a dyn ScalarSlot),
    Sequence(&'a dyn SequenceSlot),
    Record(&'a dyn Section),
    Optional(&'a dyn OptionalSlot),
    Unsupported { type_name: &'static str },
}

pub trait ScalarSlot {
    fn kind(&self) -> &'static str;

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError>;

    fn encode(&self) -> Option<String>;
}

impl<T: TextDecode> ScalarSlot for T {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = T::from_text(raw)?;
        Ok(())
    }

    fn encode(&self) -> Option<String> {
        self.to_text()
    }
}

pub trait SequenceSlot {
    fn element_kind(&self) -> &'static str;

    /// Replace the contents with one element per line of `raw`.
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError>;

    /// Text of every element, or `None` if one has no text form.
    fn encode(&self) -> Option<Vec<String>>;
}

impl<T: TextDecode> SequenceSlot for Vec<T> {
    fn element_kind(&self) -> &'static str {
        T::KIND
    }

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = decode_lines(raw)?;
        Ok(())
    }

    fn encode(&self) -> Option<Vec<String>> {
        self.iter().map(TextDecode::to_text).collect()
    }
}

fn decode_lines<T: TextDecode>(raw: &str) -> Result<Vec<T>, DecodeError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split('\n').map(|line| T::from_text(line.trim())).collect()
}

/// An `Option<T>` field.
pub trait OptionalSlot {
    fn inner_shape(&self) -> Shape;

    fn is_present(&self) -> bool;

    fn present_mut(&mut self) -> Option<FieldMut<'_>>;

    fn present(&self) -> Option<FieldRef<'_>>;

    /// Populate an absent record with its default and return it. Returns
    /// `None` when the inner type is not a record.
    fn ensure_present(&mut self) -> Option<FieldMut<'_>>;

    /// Replace the value with one decoded from `raw`.
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError>;
}

impl<T: Field> OptionalSlot for Option<T> {
    fn inner_shape(&self) -> Shape {
        T::shape()
    }

    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn present_mut(&mut self) -> Option<FieldMut<'_>> {
        self.as_mut().map(|value| value.as_field_mut())
    }

    fn present(&self) -> Option<FieldRef<'_>> {
        self.as_ref().map(|value| value.as_field_ref())
    }

    fn ensure_present(&mut self) -> Option<FieldMut<'_>> {
        if self.is_none() {
            *self = Some(T::vacant()?);
        }
        self.present_mut()
    }

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = Some(T::decode(raw)?);
        Ok(())
    }
}

/// Implement [`Field`] for types implementing [`TextDecode`].
///
/// ```
/// use inibind::{DecodeError, TextDecode};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Level(u8);
///
/// impl TextDecode for Level {
///     const KIND: &'static str = "level";
///
///     fn from_text(text: &str) -> Result<Self, DecodeError> {
///         match text {
///             "low" => Ok(Level(1)),
///             "high" => Ok(Level(9)),
///             _ => Err(DecodeError::custom(format!("unknown level {text}"))),
///         }
///     }
/// }
///
/// inibind::text_field!(Level);
/// ```
#[macro_export]
macro_rules! text_field {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Field for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Scalar { kind: <$ty as $crate::TextDecode>::KIND }
            }

            fn as_field_mut(&mut self) -> $crate::FieldMut<'_> {
                $crate::FieldMut::Scalar(self)
            }

            fn as_field_ref(&self) -> $crate::FieldRef<'_> {
                $crate::FieldRef::Scalar(self)
            }

            fn decode(raw: &str) -> ::core::result::Result<Self, $crate::CoerceError> {
                <$ty as $crate::TextDecode>::from_text(raw).map_err($crate::CoerceError::from)
            }
        }
    )+};
}

crate::text_field!(
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    char,
    String,
    std::path::PathBuf,
    std::net::IpAddr,
    std::net::Ipv4Addr,
    std::net::Ipv6Addr,
    std::net::SocketAddr,
    std::time::Duration,
);

impl<T: TextDecode> Field for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence { element: T::KIND }
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Sequence(self)
    }

    fn as_field_ref(&self) -> FieldRef<'_> {
        FieldRef::Sequence(self)
    }

    fn decode(raw: &str) -> Result<Self, CoerceError> {
        Ok(decode_lines(raw)?)
    }
}

impl<T: Field> Field for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(T::shape)
    }

    fn as_field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Optional(self)
    }

    fn as_field_ref(&self) -> FieldRef<'_> {
        FieldRef::Optional(self)
    }

    fn decode(raw: &str) -> Result<Self, CoerceError> {
        if raw.is_empty() {
            return Ok(None);
        }
        T::decode(raw).map(Some)
    }

    fn vacant() -> Option<Self> {
        Some(None)
    }
}

macro_rules! unsupported_field {
    ($($map:ident<$($param:ident),+>),+) => {$(
        impl<$($param),+> Field for $map<$($param),+> {
            fn shape() -> Shape {
                Shape::Unsupported { type_name: type_name::<Self>() }
            }

            fn as_field_mut(&mut self) -> FieldMut<'_> {
                FieldMut::Unsupported { type_name: type_name::<Self>() }
            }

            fn as_field_ref(&self) -> FieldRef<'_> {
                FieldRef::Unsupported { type_name: type_name::<Self>() }
            }

            fn decode(_raw: &str) -> Result<Self, CoerceError> {
                Err(CoerceError::unsupported(type_name::<Self>()))
            }
        }
    )+};
}

unsupported_field!(HashMap<K, V, S>, BTreeMap<K, V>);
