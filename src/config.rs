use std::io::{Read, Write};

use crate::de::{self, Decoder};
use crate::error::{Error, Result};
use crate::form::{Decode, Encode};
use crate::node::{self, Multimap};
use crate::ser;

/// Configuration for encoding and decoding behavior.
///
/// A `Config` is built once with the `const fn` setters below and then only
/// read, so a single value can be shared freely between calls and threads.
///
/// ## Delimiters
///
/// Nested values are flattened into composite keys whose segments are joined
/// with `delimiter` (default `.`). A segment that itself contains the
/// delimiter or the `escape` character (default `\`) has those characters
/// escaped, so `{ "a.b": { "c": 1 } }` is written as `a\.b.c=1`.
///
/// The delimiter and the escape character must differ, and the pair
/// delimiter must be an ASCII character other than `=`. Encoding and decoding
/// with a `Config` that breaks these rules fails with
/// [`Error::InvalidConfig`].
///
/// ## Zero values
///
/// By default zero values (`0`, `false`, `""`, ...) are written as an empty
/// string. `keep_zero_values(true)` writes them out instead, and
/// `omit_empty(true)` drops empty fields from records entirely, as if every
/// field had been declared `omit_empty`.
///
/// ## Nesting Depth
///
/// `max_depth` bounds how deeply values may nest. Encoding a deeper value
/// fails with [`Error::DepthLimit`]; when decoding, a key is split into at
/// most `max_depth + 1` segments and the remainder is kept verbatim as the
/// last segment. A `max_depth` of 0 means no nesting at all.
///
/// Default value: `max_depth = 16`
///
/// ## Sequence Indices
///
/// Explicit sequence indices such as `items.7=x` are accepted up to
/// `max_index`; a larger index is a structural error rather than an
/// allocation of that many elements.
///
/// Default value: `max_index = 1000`
///
/// ```
/// use form_qs::{Config, Node};
///
/// let config = Config::new().max_depth(0);
/// let mut node = Node::default();
/// config.decode_str("a.b.c=1", &mut node).unwrap();
/// assert_eq!(node.get("a.b.c").and_then(Node::as_str), Some("1"));
///
/// let mut node = Node::default();
/// Config::new().decode_str("a.b.c=1", &mut node).unwrap();
/// let c = node.get("a").and_then(|n| n.get("b")).and_then(|n| n.get("c"));
/// assert_eq!(c.and_then(Node::as_str), Some("1"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) delimiter: char,
    pub(crate) escape: char,
    pub(crate) pair_delimiter: char,
    pub(crate) keep_zero_values: bool,
    pub(crate) omit_empty: bool,
    pub(crate) ignore_case: bool,
    pub(crate) max_depth: usize,
    pub(crate) max_index: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            delimiter: '.',
            escape: '\\',
            pair_delimiter: '&',
            keep_zero_values: false,
            omit_empty: false,
            ignore_case: false,
            max_depth: 16,
            max_index: 1000,
        }
    }

    /// Sets the character separating the segments of a composite key.
    ///
    /// Must differ from the escape character.
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the character used to escape the delimiter inside a segment.
    pub const fn escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    /// Sets the character written between `key=value` pairs.
    ///
    /// Decoding always accepts `&` and `;` in addition to this character,
    /// which must be ASCII and not `=`.
    pub const fn pair_delimiter(mut self, pair_delimiter: char) -> Self {
        self.pair_delimiter = pair_delimiter;
        self
    }

    /// Writes zero values out (`num=0`) rather than as empty strings (`num=`).
    pub const fn keep_zero_values(mut self, keep_zero_values: bool) -> Self {
        self.keep_zero_values = keep_zero_values;
        self
    }

    /// Treats every record field as `omit_empty`.
    pub const fn omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    /// Falls back to a case-insensitive match when no field matches a key
    /// exactly while decoding.
    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Specifies the maximum nesting depth. Default is 16.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Specifies the largest explicit sequence index accepted when decoding.
    /// Default is 1000.
    pub const fn max_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.delimiter == self.escape {
            return Err(Error::InvalidConfig(format!(
                "the delimiter and the escape character are both `{}`",
                self.delimiter
            )));
        }
        if !self.pair_delimiter.is_ascii() || self.pair_delimiter == '=' {
            return Err(Error::InvalidConfig(format!(
                "`{}` cannot separate pairs",
                self.pair_delimiter
            )));
        }
        Ok(())
    }

    /// Encodes a value into a form string using this `Config`.
    pub fn encode_to_string<T: Encode + ?Sized>(&self, value: &T) -> Result<String> {
        let values = self.encode_to_multimap(value)?;
        Ok(ser::write_pairs(&values, self))
    }

    /// Encodes a value into its flat `key -> values` representation.
    pub fn encode_to_multimap<T: Encode + ?Sized>(&self, value: &T) -> Result<Multimap> {
        self.validate()?;
        let tree = ser::encode_tree(value, *self)?;
        Ok(tree.flatten(self))
    }

    /// Encodes a value and writes the form to `writer`.
    ///
    /// Nothing is written unless encoding succeeds.
    pub fn encode_to_writer<T: Encode + ?Sized, W: Write>(
        &self,
        value: &T,
        writer: &mut W,
    ) -> Result<()> {
        let encoded = self.encode_to_string(value)?;
        writer.write_all(encoded.as_bytes()).map_err(Error::Write)?;
        writer.flush().map_err(Error::Write)
    }

    /// Decodes a form string into `dst`.
    ///
    /// Fields missing from the input are left untouched. On error, `dst` may
    /// already hold the fields decoded before the failing one.
    pub fn decode_str<T: Decode + ?Sized>(&self, input: &str, dst: &mut T) -> Result<()> {
        let values = de::parse(input.as_bytes(), self)?;
        self.decode_multimap(&values, dst)
    }

    /// Decodes a form from raw bytes into `dst`.
    pub fn decode_bytes<T: Decode + ?Sized>(&self, input: &[u8], dst: &mut T) -> Result<()> {
        let values = de::parse(input, self)?;
        self.decode_multimap(&values, dst)
    }

    /// Decodes already-split `key -> values` pairs into `dst`.
    pub fn decode_multimap<T: Decode + ?Sized>(&self, values: &Multimap, dst: &mut T) -> Result<()> {
        self.validate()?;
        let pairs: Vec<(Vec<String>, &[String])> = values
            .iter()
            .map(|(key, values)| (node::split_path(key, self), values.as_slice()))
            .collect();
        if pairs.is_empty() {
            return Ok(());
        }
        dst.decode(Decoder::root(&pairs, self))
    }

    /// Reads everything from `reader` and decodes it into `dst`.
    pub fn decode_reader<T: Decode + ?Sized, R: Read>(&self, mut reader: R, dst: &mut T) -> Result<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map_err(Error::Read)?;
        self.decode_bytes(&buf, dst)
    }
}
