//! Form encoding for structured values.
//!
//! Values are written as flat `application/x-www-form-urlencoded` strings
//! whose keys are dotted paths into the value: `A.0=x`, `M.Foo=7`,
//! `Zs.0.Z=2006-12-01`. Reading such a form back fills the same value.
//!
//! ## Supported Types
//!
//! Integers, floats, complex numbers, `bool`, `char`, strings, byte vectors,
//! sequences, arrays, maps, `Option`, smart pointers, dates and times from
//! `chrono`, `url::Url`, the untyped [`Node`] tree, and records declared
//! with [`record!`]. Types with their own text form plug in through
//! [`MarshalText`], [`UnmarshalText`] and [`text!`].
//!
//! Records may embed other records with `#[form(flatten)]`; embedded fields
//! are promoted into the outer record and resolved by depth, the way Go's
//! `encoding/json` resolves embedded struct fields.
//!
//! ## Usage
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! form_qs::record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     struct Address {
//!         city: String,
//!         postcode: String,
//!     }
//! }
//!
//! form_qs::record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     struct QueryParams {
//!         id: u8,
//!         name: String,
//!         address: Address,
//!         #[form(rename = "ids")]
//!         user_ids: Vec<u8>,
//!         tags: BTreeMap<String, u32>,
//!     }
//! }
//!
//! let params = QueryParams {
//!     id: 42,
//!     name: "Acme".to_string(),
//!     address: Address {
//!         city: "Carrot City".to_string(),
//!         postcode: "12345".to_string(),
//!     },
//!     user_ids: vec![1, 2, 3],
//!     tags: BTreeMap::from([("a".to_string(), 1)]),
//! };
//!
//! let encoded = form_qs::to_string(&params).unwrap();
//! assert_eq!(
//!     encoded,
//!     "address.city=Carrot+City&address.postcode=12345&id=42&ids=%01%02%03&name=Acme&tags.a=1"
//! );
//!
//! let decoded: QueryParams = form_qs::from_str(
//!     "name=Acme&id=42&address.postcode=12345&address.city=Carrot+City\
//!      &ids.0=1&ids.1=2&ids.2=3&tags.a=1",
//! )
//! .unwrap();
//! assert_eq!(decoded, params);
//! ```
//!
//! Byte vectors are written as a single value; other sequences use one key
//! per element. Repeated keys decode into sequences in order:
//!
//! ```
//! let words: Vec<String> = form_qs::from_str("=a&=b&=c").unwrap();
//! assert_eq!(words, ["a", "b", "c"]);
//! ```
//!
//! Use [`Config`] to change delimiters, zero-value handling, key matching or
//! the depth limit.

mod config;
mod de;
mod error;
pub mod fields;
mod form;
mod macros;
pub mod node;
mod ser;

#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use de::{
    Decoder, decode_multimap, decode_reader, decode_str, from_multimap, from_reader, from_str,
};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use form::{BoxError, Decode, Encode, FieldDecl, MarshalText, Record, Schema, UnmarshalText};
#[doc(inline)]
pub use node::{Branch, Multimap, Node};
#[doc(inline)]
pub use ser::{Encoder, to_multimap, to_string, to_writer};
