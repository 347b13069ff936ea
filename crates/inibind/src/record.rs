//! Static description of record types.
//!
//! `#[derive(Record)]` implements [`Record`] and [`Section`] for a struct.
//! Everything the binding engine knows about a type comes from the
//! [`FieldDef`] table and the per-field [`Shape`].

use std::any::TypeId;
use std::fmt;

use crate::value::{FieldMut, FieldRef};

/// One declared field of a record.
#[derive(Clone, Copy)]
pub struct FieldDef {
    /// Declared field name, without any `r#` prefix.
    pub name: &'static str,
    /// Explicit key from `#[ini(key = "...")]`.
    pub key: Option<&'static str>,
    /// Literal from `#[ini(default = ...)]`, coerced before parsing starts.
    pub default: Option<&'static str>,
    /// Set by `#[ini(flatten)]`: the nested record's keys are spliced into this one.
    pub flatten: bool,
    pub shape: fn() -> Shape,
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("default", &self.default)
            .field("flatten", &self.flatten)
            .field("shape", &(self.shape)())
            .finish()
    }
}

/// What kind of value a field holds.
#[derive(Clone, Copy)]
pub enum Shape {
    /// A single text-decodable value; `kind` names the type in errors.
    Scalar { kind: &'static str },
    /// `Vec<T>` of text-decodable elements, one per line.
    Sequence { element: &'static str },
    /// A nested record held by value.
    Record(fn() -> RecordType),
    /// `Option<T>`.
    Optional(fn() -> Shape),
    /// A type the dialect cannot express, such as a map.
    Unsupported { type_name: &'static str },
}

impl Shape {
    /// The record type behind this shape, looking through `Option`.
    pub fn nested_record(self) -> Option<RecordType> {
        match self {
            Shape::Record(record) => Some(record()),
            Shape::Optional(inner) => inner().nested_record(),
            _ => None,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar { kind } => write!(f, "Scalar({kind})"),
            Shape::Sequence { element } => write!(f, "Sequence({element})"),
            Shape::Record(record) => write!(f, "Record({})", record().name),
            Shape::Optional(inner) => write!(f, "Optional({:?})", inner()),
            Shape::Unsupported { type_name } => write!(f, "Unsupported({type_name})"),
        }
    }
}

/// Identity and field table of a record type.
#[derive(Clone, Copy)]
pub struct RecordType {
    pub id: TypeId,
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl RecordType {
    pub fn of<T: Record>() -> RecordType {
        RecordType {
            id: TypeId::of::<T>(),
            name: T::NAME,
            fields: T::FIELDS,
        }
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Object-safe access to the fields of a record instance.
pub trait Section {
    fn record_type(&self) -> RecordType;

    /// Mutable handle to the field at `index` in [`Record::FIELDS`] order.
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;

    fn field_ref(&self, index: usize) -> Option<FieldRef<'_>>;
}

/// A struct that can be the target of a parse. Use `#[derive(Record)]`.
pub trait Record: Section + Default + 'static {
    const NAME: &'static str;
    const FIELDS: &'static [FieldDef];
}

/// Walk an index path through flattened records to a field.
pub(crate) fn field_at<'a>(section: &'a mut dyn Section, path: &[usize]) -> Option<FieldMut<'a>> {
    let (&first, rest) = path.split_first()?;
    let field = section.field_mut(first)?;
    if rest.is_empty() {
        return Some(field);
    }
    match field {
        FieldMut::Record(inner) => field_at(inner, rest),
        _ => None,
    }
}

pub(crate) fn field_ref_at<'a>(section: &'a dyn Section, path: &[usize]) -> Option<FieldRef<'a>> {
    let (&first, rest) = path.split_first()?;
    let field = section.field_ref(first)?;
    if rest.is_empty() {
        return Some(field);
    }
    match field {
        FieldRef::Record(inner) => field_ref_at(inner, rest),
        _ => None,
    }
}
