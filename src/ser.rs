//! Encoding support for forms.

mod encode;
pub(crate) mod scalar;

use std::any::type_name;
use std::collections::HashSet;
use std::io::Write;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fields;
use crate::form::{Encode, MarshalText, Record};
use crate::node::{Branch, Multimap, Node};

/// Encodes a value into a form string.
///
/// ```
/// form_qs::record! {
///     struct Query {
///         name: String,
///         age: u8,
///         occupation: String,
///     }
/// }
///
/// let q = Query {
///     name: "Alice".to_owned(),
///     age: 24,
///     occupation: "Student".to_owned(),
/// };
///
/// assert_eq!(
///     form_qs::to_string(&q).unwrap(),
///     "age=24&name=Alice&occupation=Student");
/// ```
pub fn to_string<T: Encode + ?Sized>(input: &T) -> Result<String> {
    Config::default().encode_to_string(input)
}

/// Encodes a value into its flat `key -> values` pairs.
pub fn to_multimap<T: Encode + ?Sized>(input: &T) -> Result<Multimap> {
    Config::default().encode_to_multimap(input)
}

/// Encodes a value into a generic writer object.
///
/// ```
/// let mut buffer = Vec::new();
/// form_qs::to_writer(&vec!["a", "b"], &mut buffer).unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), "0=a&1=b");
/// ```
pub fn to_writer<T: Encode + ?Sized, W: Write>(input: &T, writer: &mut W) -> Result<()> {
    Config::default().encode_to_writer(input, writer)
}

/// Builds the tree for a value. A bare scalar, even the empty one, is kept
/// under the empty segment.
pub(crate) fn encode_tree<T: Encode + ?Sized>(value: &T, config: Config) -> Result<Node> {
    let mut state = State {
        config,
        visited: HashSet::new(),
        depth: 0,
    };
    match value.encode(Encoder { state: &mut state })? {
        Node::Scalar(text) => Ok(Node::Branch(Branch::from([(
            String::new(),
            Node::Scalar(text),
        )]))),
        branch => Ok(branch),
    }
}

/// Joins flat pairs into the wire format.
pub(crate) fn write_pairs(values: &Multimap, config: &Config) -> String {
    let mut out = String::new();
    for (key, values) in values {
        for value in values {
            if !out.is_empty() {
                out.push(config.pair_delimiter);
            }
            encode::encode_into(&mut out, key);
            out.push('=');
            encode::encode_into(&mut out, value);
        }
    }
    out
}

struct State {
    config: Config,
    /// Addresses of the shared values currently being encoded.
    visited: HashSet<usize>,
    /// Number of branches currently open.
    depth: usize,
}

/// Builds the tree of a single value.
///
/// An `Encoder` is handed to [`Encode::encode`] and consumed by exactly one of
/// its shape methods. Implementations of `Encode` for container types encode
/// their children through the same encoder, which carries the call-scoped
/// state: the configuration, the nesting depth and the set of shared
/// references currently being walked.
pub struct Encoder<'a> {
    state: &'a mut State,
}

impl Encoder<'_> {
    fn reborrow(&mut self) -> Encoder<'_> {
        Encoder {
            state: &mut *self.state,
        }
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    fn enter(&mut self) -> Result<()> {
        let max_depth = self.state.config.max_depth;
        if self.state.depth > max_depth {
            return Err(Error::DepthLimit(max_depth));
        }
        self.state.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.state.depth -= 1;
    }

    /// Text of a value that may be zero; zero values are written as `""`
    /// unless zero values are kept.
    pub(crate) fn zeroable(self, is_zero: bool, text: impl FnOnce() -> String) -> Result<Node> {
        if is_zero && !self.state.config.keep_zero_values {
            Ok(Node::empty())
        } else {
            Ok(Node::Scalar(text()))
        }
    }

    /// A missing value, such as `None`.
    pub fn absent(self) -> Result<Node> {
        Ok(Node::empty())
    }

    pub fn bool(self, v: bool) -> Result<Node> {
        self.zeroable(!v, || if v { "true" } else { "false" }.to_owned())
    }

    pub fn int<I: itoa::Integer + Default + PartialEq>(self, v: I) -> Result<Node> {
        self.zeroable(v == I::default(), || {
            let mut buffer = itoa::Buffer::new();
            buffer.format(v).to_owned()
        })
    }

    pub fn f32(self, v: f32) -> Result<Node> {
        self.zeroable(v == 0.0, || scalar::format_float(v))
    }

    pub fn f64(self, v: f64) -> Result<Node> {
        self.zeroable(v == 0.0, || scalar::format_float(v))
    }

    pub fn char(self, v: char) -> Result<Node> {
        self.zeroable(v == '\0', || v.to_string())
    }

    pub fn str(self, v: &str) -> Result<Node> {
        Ok(Node::Scalar(v.to_owned()))
    }

    /// A byte sequence, written as a single value.
    ///
    /// The bytes must be valid UTF-8.
    pub fn bytes(self, v: &[u8]) -> Result<Node> {
        let text = std::str::from_utf8(v)?;
        Ok(Node::Scalar(text.to_owned()))
    }

    /// A sequence, keyed by element index.
    pub fn seq<I>(mut self, items: I) -> Result<Node>
    where
        I: IntoIterator,
        I::Item: Encode,
    {
        self.enter()?;
        let mut branch = Branch::new();
        for (i, item) in items.into_iter().enumerate() {
            let mut buffer = itoa::Buffer::new();
            let node = item.encode(self.reborrow())?;
            branch.insert(buffer.format(i).to_owned(), node);
        }
        self.leave();
        self.collection(branch)
    }

    /// A map, keyed by the text of each key, in iteration order.
    ///
    /// Keys must encode as scalars. Zero keys are written out as-is.
    pub fn map<K, V, I>(mut self, entries: I) -> Result<Node>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Encode,
        V: Encode,
    {
        self.enter()?;
        let mut branch = Branch::new();
        for (key, value) in entries {
            let key = self.key_text(&key)?;
            let node = value.encode(self.reborrow())?;
            branch.insert(key, node);
        }
        self.leave();
        self.collection(branch)
    }

    /// A map without a defined iteration order; entries are written sorted by
    /// key text.
    pub fn unordered_map<K, V, I>(mut self, entries: I) -> Result<Node>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Encode,
        V: Encode,
    {
        let mut keyed = Vec::new();
        for (key, value) in entries {
            keyed.push((self.key_text(&key)?, value));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        self.enter()?;
        let mut branch = Branch::with_capacity(keyed.len());
        for (key, value) in keyed {
            let node = value.encode(self.reborrow())?;
            branch.insert(key, node);
        }
        self.leave();
        self.collection(branch)
    }

    fn collection(self, branch: Branch) -> Result<Node> {
        if branch.is_empty() && !self.state.config.keep_zero_values {
            return Ok(Node::empty());
        }
        Ok(Node::Branch(branch))
    }

    fn key_text<K: Encode + ?Sized>(&mut self, key: &K) -> Result<String> {
        let keep_zero_values = self.state.config.keep_zero_values;
        self.state.config.keep_zero_values = true;
        let node = key.encode(self.reborrow());
        self.state.config.keep_zero_values = keep_zero_values;
        match node? {
            Node::Scalar(text) => Ok(text),
            Node::Branch(_) => Err(Error::unsupported(format!(
                "map key of type `{}` does not encode as a scalar",
                type_name::<K>()
            ))),
        }
    }

    /// A record, one child per resolved field.
    ///
    /// Fields marked `omit_empty` (or all fields, with
    /// [`Config::omit_empty`]) are left out when their value is empty. A field
    /// inside an embedded record that is not set is written as absent.
    pub fn record(mut self, record: &dyn Record) -> Result<Node> {
        let descriptors = fields::resolve(&record.schema());
        self.enter()?;
        let mut branch = Branch::with_capacity(descriptors.len());
        for descriptor in descriptors.iter() {
            let omit = descriptor.omit_empty || self.state.config.omit_empty;
            let node = match lookup(record, &descriptor.index) {
                Some(value) if omit && value.is_empty_value() => continue,
                Some(value) => value.encode(self.reborrow())?,
                None if omit => continue,
                None => Node::empty(),
            };
            branch.insert(descriptor.key.to_owned(), node);
        }
        self.leave();
        Ok(Node::Branch(branch))
    }

    /// A value reached through a shared reference identified by `id`.
    ///
    /// Fails with [`Error::Cycle`] when the same reference is reached again
    /// while it is still being encoded. References that are merely shared
    /// are encoded each time they are reached.
    pub fn reference<T: Encode + ?Sized>(mut self, id: usize, target: &T) -> Result<Node> {
        if !self.state.visited.insert(id) {
            debug!(value_type = type_name::<T>(), "cycle detected while encoding");
            return Err(Error::Cycle(type_name::<T>().to_owned()));
        }
        let node = target.encode(self.reborrow());
        self.state.visited.remove(&id);
        node
    }

    /// A value with a custom text form. The text is written even when empty.
    pub fn marshal<T: MarshalText + ?Sized>(self, value: &T) -> Result<Node> {
        let text = value
            .marshal_text()
            .map_err(|e| Error::Custom(e.to_string()))?;
        Ok(Node::Scalar(text))
    }

    /// Rejects a value that has no form representation.
    pub fn unsupported(self, what: &str) -> Result<Node> {
        Err(Error::unsupported(what))
    }
}

fn lookup<'r>(record: &'r dyn Record, index: &[usize]) -> Option<&'r dyn Encode> {
    let (last, init) = index.split_last()?;
    let mut current = record;
    for &i in init {
        current = current.field(i)?.as_record()?;
    }
    current.field(*last)
}
