//! Decoding support for forms.
//!
//! The input is first split into percent-decoded `key -> values` pairs and
//! each key into its path segments. Decoding then walks the destination: each
//! [`Decode`] implementation receives a [`Decoder`] holding the fragment of
//! pairs below its own key, and hands sub-fragments on to its children. How
//! repeated values are read depends on the destination: a sequence takes them
//! in order as its elements, any other value takes the last one.

mod parse;
pub(crate) mod scalar;

use std::fmt::Display;
use std::io::Read;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fields;
use crate::form::{Decode, Record, UnmarshalText};
use crate::node::{self, Multimap, Node};

pub(crate) use parse::parse;

/// Decodes a form string into a new value.
///
/// ```
/// form_qs::record! {
///     #[derive(Debug, Default, PartialEq)]
///     struct Query {
///         name: String,
///         age: u8,
///         tags: Vec<String>,
///     }
/// }
///
/// let q: Query = form_qs::from_str("name=Alice&age=24&tags=a&tags=b").unwrap();
/// assert_eq!(q, Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     tags: vec!["a".to_owned(), "b".to_owned()],
/// });
/// ```
pub fn from_str<T: Decode + Default>(input: &str) -> Result<T> {
    let mut value = T::default();
    decode_str(input, &mut value)?;
    Ok(value)
}

/// Decodes flat `key -> values` pairs into a new value.
pub fn from_multimap<T: Decode + Default>(values: &Multimap) -> Result<T> {
    let mut value = T::default();
    decode_multimap(values, &mut value)?;
    Ok(value)
}

/// Reads a form from `reader` and decodes it into a new value.
pub fn from_reader<T: Decode + Default, R: Read>(reader: R) -> Result<T> {
    let mut value = T::default();
    decode_reader(reader, &mut value)?;
    Ok(value)
}

/// Decodes a form string into an existing value.
pub fn decode_str<T: Decode + ?Sized>(input: &str, dst: &mut T) -> Result<()> {
    Config::default().decode_str(input, dst)
}

pub fn decode_multimap<T: Decode + ?Sized>(values: &Multimap, dst: &mut T) -> Result<()> {
    Config::default().decode_multimap(values, dst)
}

pub fn decode_reader<T: Decode + ?Sized, R: Read>(reader: R, dst: &mut T) -> Result<()> {
    Config::default().decode_reader(reader, dst)
}

/// Remaining path segments of a key, and the values stored under it.
type Pair<'a> = (&'a [String], &'a [String]);

/// Reads a single value out of a fragment of the input.
///
/// A `Decoder` is handed to [`Decode::decode`] and consumed by one of its
/// shape methods. It holds every pair whose key lies at or below the
/// destination's own key, with that key's segments already stripped.
pub struct Decoder<'a> {
    pairs: Vec<Pair<'a>>,
    config: &'a Config,
    /// The destination's key as written on the wire, for error reports.
    key: String,
}

impl<'a> Decoder<'a> {
    pub(crate) fn root(pairs: &'a [(Vec<String>, &'a [String])], config: &'a Config) -> Self {
        Decoder {
            pairs: pairs
                .iter()
                .map(|(segments, values)| (segments.as_slice(), *values))
                .collect(),
            config,
            key: String::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// The key of the destination, escaped as on the wire.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parse_error(&self, message: impl ToString) -> Error {
        Error::parse(self.key.clone(), message)
    }

    pub fn structural_error(&self, message: impl ToString) -> Error {
        Error::structural(self.key.clone(), message)
    }

    fn child_key(&self, segment: &str) -> String {
        let segment = node::escape(segment, self.config);
        if self.key.is_empty() {
            return segment.into_owned();
        }
        let mut key = String::with_capacity(self.key.len() + 1 + segment.len());
        key.push_str(&self.key);
        key.push(self.config.delimiter);
        key.push_str(&segment);
        key
    }

    fn child(&self, segment: &str, pairs: Vec<Pair<'a>>) -> Decoder<'a> {
        Decoder {
            pairs,
            config: self.config,
            key: self.child_key(segment),
        }
    }

    /// Values stored directly under the destination's key.
    fn own(&self) -> impl Iterator<Item = &'a String> + '_ {
        self.pairs
            .iter()
            .filter(|(rest, _)| rest.is_empty())
            .flat_map(|&(_, values)| values)
    }

    /// Values stored under the empty segment below the destination's key.
    fn anonymous(&self) -> impl Iterator<Item = &'a String> + '_ {
        self.pairs
            .iter()
            .filter(|(rest, _)| matches!(rest, [only] if only.is_empty()))
            .flat_map(|&(_, values)| values)
    }

    /// The text of the destination as a scalar.
    ///
    /// This is the last value stored under the key itself or, failing that,
    /// the last value stored under the empty segment below it. A key that
    /// only holds fields below it is a structural error.
    pub fn text(&self) -> Result<&'a str> {
        if let Some(value) = self.own().last().or_else(|| self.anonymous().last()) {
            return Ok(value.as_str());
        }
        match self.pairs.iter().find_map(|(rest, _)| rest.first()) {
            Some(segment) => Err(self.structural_error(format!(
                "expected a value, found the field `{segment}`"
            ))),
            None => Ok(""),
        }
    }

    /// Groups the pairs below the key by their first segment.
    fn children(&self) -> IndexMap<&'a str, Vec<Pair<'a>>> {
        let mut groups: IndexMap<&'a str, Vec<Pair<'a>>> = IndexMap::new();
        for &(rest, values) in &self.pairs {
            if let Some((first, tail)) = rest.split_first() {
                groups.entry(first.as_str()).or_default().push((tail, values));
            }
        }
        groups
    }

    /// Parses the text with `FromStr`; the empty text yields the default.
    pub fn scalar<T>(&self) -> Result<T>
    where
        T: FromStr + Default,
        T::Err: Display,
    {
        let text = self.text()?;
        if text.is_empty() {
            return Ok(T::default());
        }
        text.parse().map_err(|e| self.parse_error(e))
    }

    pub fn bool(&self) -> Result<bool> {
        let text = self.text()?;
        if text.is_empty() {
            return Ok(false);
        }
        scalar::parse_bool(text)
            .ok_or_else(|| self.parse_error(format!("invalid boolean `{text}`")))
    }

    /// Passes the text to a custom text hook.
    pub fn unmarshal<T: UnmarshalText + ?Sized>(self, value: &mut T) -> Result<()> {
        value
            .unmarshal_text(self.text()?)
            .map_err(|e| self.parse_error(e))
    }

    /// Elements of a sequence, by index.
    ///
    /// Values under the key itself are taken in order as elements `0, 1, ...`,
    /// and so is the `i`th value of every deeper key that does not start with
    /// an index, which lands in element `i` with its path kept. Keys with a
    /// leading numeric segment address an element explicitly; they take
    /// precedence over values under the key itself and are merged with the
    /// fields of the same element. A lone empty value means no elements.
    fn elements(&self) -> Result<Vec<(usize, Decoder<'a>)>> {
        let mut ordinal: Vec<&'a String> = self.own().chain(self.anonymous()).collect();
        if matches!(ordinal.as_slice(), [only] if only.is_empty()) {
            ordinal.clear();
        }

        let mut indexed: IndexMap<usize, Vec<Pair<'a>>> = IndexMap::new();
        for &(rest, values) in &self.pairs {
            let Some((first, tail)) = rest.split_first() else {
                continue;
            };
            if first.is_empty() && tail.is_empty() {
                // already taken as ordinal values
                continue;
            }
            if node::is_index(first) {
                let index = self.element_index(first)?;
                indexed.entry(index).or_default().push((tail, values));
            } else {
                for (i, value) in values.iter().enumerate() {
                    let value = std::slice::from_ref(value);
                    indexed.entry(i).or_default().push((rest, value));
                }
            }
        }

        let mut elements: Vec<(usize, Decoder<'a>)> = ordinal
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !indexed.contains_key(i))
            .map(|(i, value)| {
                let values = std::slice::from_ref(value);
                (i, self.child(&i.to_string(), vec![(&[][..], values)]))
            })
            .collect();
        elements.extend(
            indexed
                .into_iter()
                .map(|(i, pairs)| (i, self.child(&i.to_string(), pairs))),
        );
        elements.sort_by_key(|(i, _)| *i);
        Ok(elements)
    }

    /// Parses an explicit element index, bounded by [`Config::max_index`].
    fn element_index(&self, segment: &str) -> Result<usize> {
        let key = self.child_key(segment);
        let max = self.config.max_index;
        match segment.parse::<usize>() {
            Ok(index) if index <= max => Ok(index),
            _ => Err(Error::structural(
                key,
                format!("sequence index `{segment}` exceeds the limit of {max}"),
            )),
        }
    }

    /// Decodes a growable sequence. Missing elements are filled with the
    /// default value.
    pub fn seq<T: Decode + Default>(self, items: &mut Vec<T>) -> Result<()> {
        let elements = self.elements()?;
        if let Some((last, element)) = elements.last() {
            let len = last
                .checked_add(1)
                .ok_or_else(|| element.structural_error("sequence index out of range"))?;
            if items.len() < len {
                items.resize_with(len, T::default);
            }
        }
        for (i, element) in elements {
            if let Some(item) = items.get_mut(i) {
                item.decode(element)?;
            }
        }
        Ok(())
    }

    /// Decodes a fixed-size sequence.
    pub fn array<T: Decode>(self, items: &mut [T]) -> Result<()> {
        let len = items.len();
        for (i, element) in self.elements()? {
            let Some(item) = items.get_mut(i) else {
                return Err(element.structural_error(format!(
                    "index {i} out of bounds for an array of length {len}"
                )));
            };
            item.decode(element)?;
        }
        Ok(())
    }

    /// Decodes a byte sequence from a single value, or from indexed elements
    /// if there are any.
    pub fn bytes(self, items: &mut Vec<u8>) -> Result<()> {
        let indexed = self
            .pairs
            .iter()
            .any(|(rest, _)| rest.first().is_some_and(|s| node::is_index(s)));
        if indexed {
            return self.seq(items);
        }
        items.clear();
        items.extend_from_slice(self.text()?.as_bytes());
        Ok(())
    }

    /// Decodes a map, handing each entry to `insert`.
    ///
    /// Keys are decoded from their segment text and must be scalars. A value
    /// under the key itself is stored under the empty key.
    pub fn map<K, V, F>(self, mut insert: F) -> Result<()>
    where
        K: Decode + Default,
        V: Decode + Default,
        F: FnMut(K, V),
    {
        let mut entries = self.children();
        let own: Vec<Pair<'a>> = self
            .pairs
            .iter()
            .filter(|(rest, _)| rest.is_empty())
            .copied()
            .collect();
        if self.own().any(|v| !v.is_empty()) {
            let group = entries.entry("").or_default();
            let anonymous = std::mem::replace(group, own);
            group.extend(anonymous);
        }

        for (segment, pairs) in entries {
            let child = self.child(segment, pairs);
            let segment_text = [segment.to_owned()];
            let mut key = K::default();
            key.decode(Decoder {
                pairs: vec![(&[][..], &segment_text[..])],
                config: self.config,
                key: child.key.clone(),
            })?;
            let mut value = V::default();
            value.decode(child)?;
            insert(key, value);
        }
        Ok(())
    }

    /// Decodes the fields of a record.
    ///
    /// Keys that match no field are ignored, and fields without a key in the
    /// input keep their value.
    pub fn record(self, record: &mut dyn Record) -> Result<()> {
        let schema = record.schema();
        if self.own().any(|v| !v.is_empty()) {
            return Err(self.structural_error(format!(
                "expected the fields of `{}`, found a value",
                schema.name()
            )));
        }

        let descriptors = fields::resolve(&schema);
        for (segment, pairs) in self.children() {
            let child = self.child(segment, pairs);
            let Some(descriptor) = fields::find(&descriptors, segment, self.config.ignore_case)
            else {
                debug!(key = %child.key, record = schema.name(), "ignoring unknown form key");
                continue;
            };
            if let Some(field) = lookup_mut(record, &descriptor.index) {
                field.decode(child)?;
            }
        }
        Ok(())
    }

    /// Builds the tree below the key; the last value of each key wins.
    pub fn node(self) -> Node {
        let mut root = Node::default();
        for (rest, values) in self.pairs {
            if let Some(value) = values.last() {
                root.insert(rest, Node::Scalar(value.clone()));
            }
        }
        root
    }
}

fn lookup_mut<'r>(record: &'r mut dyn Record, index: &[usize]) -> Option<&'r mut dyn Decode> {
    let (last, init) = index.split_last()?;
    let mut current = record;
    for &i in init {
        current = current.field_mut(i)?.as_record_mut()?;
    }
    current.field_mut(*last)
}
