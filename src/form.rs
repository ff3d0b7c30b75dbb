//! The value-shape model.
//!
//! A type takes part in form encoding by implementing [`Encode`] and
//! [`Decode`]. Both traits hand the value to a visitor ([`Encoder`] or
//! [`Decoder`]) whose methods are the shapes a form can hold: absent values,
//! scalars, sequences, maps and records. Records additionally describe their
//! fields through [`Record`] and [`Schema`], usually generated by the
//! [`record!`](crate::record) macro.

use std::any::TypeId;
use std::fmt;

use crate::de::Decoder;
use crate::error::Result;
use crate::node::Node;
use crate::ser::Encoder;

mod impls;
mod time;
mod url;

/// Boxed error returned by the text hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A value that can be written into a form.
pub trait Encode {
    /// Builds the tree for this value.
    fn encode(&self, encoder: Encoder<'_>) -> Result<Node>;

    /// Whether the value counts as empty for `omit_empty` fields.
    ///
    /// Zero numbers, `false`, empty strings and collections, `None` and
    /// records whose fields are all empty are empty. Owning pointers such as
    /// `Box` and `Rc` never are.
    fn is_empty_value(&self) -> bool {
        false
    }

    /// The record behind this value, if it is one.
    ///
    /// Used to reach the fields of embedded records.
    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    /// The schema of the record type behind `Self`, if any.
    fn record_schema() -> Option<Schema>
    where
        Self: Sized,
    {
        None
    }

    #[doc(hidden)]
    fn encode_slice(items: &[Self], encoder: Encoder<'_>) -> Result<Node>
    where
        Self: Sized,
    {
        encoder.seq(items)
    }
}

/// A value that can be read back from a form.
///
/// Decoding writes into an existing value, so fields that are missing from
/// the input keep whatever they held before.
pub trait Decode {
    fn decode(&mut self, decoder: Decoder<'_>) -> Result<()>;

    /// The record behind this value, allocating it first if it is optional.
    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }

    #[doc(hidden)]
    fn decode_vec(items: &mut Vec<Self>, decoder: Decoder<'_>) -> Result<()>
    where
        Self: Sized + Default,
    {
        decoder.seq(items)
    }
}

/// A record: a fixed set of named fields.
///
/// Field indices follow the declaration order of [`Schema::fields`].
pub trait Record {
    fn schema(&self) -> Schema;

    fn describe() -> Schema
    where
        Self: Sized;

    fn field(&self, index: usize) -> Option<&dyn Encode>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decode>;
}

/// Type-level description of a record.
#[derive(Clone, Copy)]
pub struct Schema {
    id: TypeId,
    name: &'static str,
    fields: &'static [FieldDecl],
}

impl Schema {
    pub fn of<T: 'static>(name: &'static str, fields: &'static [FieldDecl]) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
            fields,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [FieldDecl] {
        self.fields
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Declaration of a single record field.
#[derive(Clone, Copy)]
pub struct FieldDecl {
    pub name: &'static str,
    pub rename: Option<&'static str>,
    pub omit_empty: bool,
    pub skip: bool,
    pub flatten: bool,
    /// Schema of the field's type when it is itself a record.
    pub schema: fn() -> Option<Schema>,
}

impl FieldDecl {
    pub const fn new(name: &'static str, schema: fn() -> Option<Schema>) -> Self {
        Self {
            name,
            rename: None,
            omit_empty: false,
            skip: false,
            flatten: false,
            schema,
        }
    }

    /// Overrides the wire key. `"-"` excludes the field.
    pub const fn rename(mut self, key: &'static str) -> Self {
        self.rename = Some(key);
        self
    }

    pub const fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Embeds the field: a record-typed field without a rename contributes
    /// its own fields to the parent instead of a nested branch.
    pub const fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn key(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }

    pub fn is_skipped(&self) -> bool {
        self.skip || self.rename == Some("-")
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("rename", &self.rename)
            .field("omit_empty", &self.omit_empty)
            .field("skip", &self.skip)
            .field("flatten", &self.flatten)
            .finish()
    }
}

/// Custom text form of a value, used in place of its structure.
///
/// Implement together with [`UnmarshalText`] and register the type with
/// [`text!`](crate::text).
pub trait MarshalText {
    fn marshal_text(&self) -> Result<String, BoxError>;
}

pub trait UnmarshalText {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), BoxError>;
}
