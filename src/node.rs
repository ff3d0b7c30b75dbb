//! The hierarchical tree that sits between values and flat form pairs.
//!
//! Encoding builds a [`Node`] tree and [flattens](Node::flatten) it into a
//! [`Multimap`] of composite keys. Decoding goes the other way, splitting each
//! composite key on unescaped delimiters.

use std::borrow::Cow;
use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::config::Config;

/// Children of a branch, in insertion order.
pub type Branch = IndexMap<String, Node>;

/// Flat `key -> values` pairs, sorted by key.
pub type Multimap = BTreeMap<String, Vec<String>>;

/// A node of the form tree.
///
/// Leaves hold text; branches map path segments to child nodes. The default
/// node is an empty branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Scalar(String),
    Branch(Branch),
}

impl Default for Node {
    fn default() -> Self {
        Node::Branch(Branch::new())
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(s)
    }
}

impl From<Branch> for Node {
    fn from(branch: Branch) -> Self {
        Node::Branch(branch)
    }
}

impl Node {
    /// The empty scalar, written as `key=`.
    pub fn empty() -> Self {
        Node::Scalar(String::new())
    }

    /// True for the empty scalar and for a branch without children.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Scalar(s) => s.is_empty(),
            Node::Branch(b) => b.is_empty(),
        }
    }

    /// Returns the text of a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            Node::Scalar(_) => None,
            Node::Branch(b) => Some(b),
        }
    }

    /// Looks up the child stored under `segment`.
    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.as_branch().and_then(|b| b.get(segment))
    }

    /// Text of this node as a scalar value.
    ///
    /// A branch yields the scalar stored under the empty segment, if any, and
    /// the empty string otherwise.
    pub fn text(&self) -> &str {
        match self {
            Node::Scalar(s) => s,
            Node::Branch(b) => b.get("").and_then(Node::as_str).unwrap_or(""),
        }
    }

    /// Converts this node into a branch.
    ///
    /// The empty scalar becomes an empty branch and any other scalar is kept
    /// under the empty segment.
    pub fn into_branch(self) -> Branch {
        match self {
            Node::Branch(b) => b,
            Node::Scalar(s) if s.is_empty() => Branch::new(),
            Node::Scalar(s) => Branch::from([(String::new(), Node::Scalar(s))]),
        }
    }

    fn make_branch(&mut self) -> &mut Branch {
        match self {
            Node::Branch(b) => b,
            Node::Scalar(s) => {
                let branch = Node::Scalar(std::mem::take(s)).into_branch();
                *self = Node::Branch(branch);
                self.make_branch()
            }
        }
    }

    /// Stores `value` at `path`, creating intermediate branches.
    ///
    /// A leaf written over an existing branch replaces it, and a branch
    /// written through an existing leaf keeps the leaf text under the empty
    /// segment.
    pub fn insert<S: AsRef<str>>(&mut self, path: &[S], value: Node) {
        let Some((last, init)) = path.split_last() else {
            *self = value;
            return;
        };
        let mut node = self;
        for segment in init {
            node = node
                .make_branch()
                .entry(segment.as_ref().to_owned())
                .or_insert_with(Node::default);
        }
        node.make_branch().insert(last.as_ref().to_owned(), value);
    }

    /// Flattens the tree into composite keys.
    ///
    /// Each key is the escaped segments of a leaf's path joined with the
    /// delimiter. Empty branches produce no pairs. A scalar at the root is
    /// written under the empty key.
    pub fn flatten(&self, config: &Config) -> Multimap {
        let mut values = Multimap::new();
        match self {
            Node::Scalar(s) => {
                values.insert(String::new(), vec![s.clone()]);
            }
            Node::Branch(b) => merge(b, &mut String::new(), config, &mut values),
        }
        values
    }

    /// Builds a tree from composite keys.
    ///
    /// With `ordinal` set, the `i`th value under a key is stored under a
    /// leading segment `i`, except for keys that already start with a
    /// numeric index. Otherwise the last value of each key wins.
    pub fn unflatten(values: &Multimap, ordinal: bool, config: &Config) -> Node {
        let mut root = Node::default();
        for (key, vs) in values {
            let segments = split_path(key, config);
            let indexed = segments.first().is_some_and(|s| is_index(s));
            if ordinal && !indexed {
                let own = matches!(segments.as_slice(), [only] if only.is_empty());
                if own && matches!(vs.as_slice(), [only] if only.is_empty()) {
                    continue;
                }
                for (i, v) in vs.iter().enumerate() {
                    let mut path = Vec::with_capacity(segments.len() + 1);
                    path.push(i.to_string());
                    if !own {
                        path.extend(segments.iter().cloned());
                    }
                    root.insert(&path, Node::Scalar(v.clone()));
                }
            } else if let Some(v) = vs.last() {
                root.insert(&segments, Node::Scalar(v.clone()));
            }
        }
        root
    }
}

fn merge(branch: &Branch, prefix: &mut String, config: &Config, values: &mut Multimap) {
    for (segment, child) in branch {
        let len = prefix.len();
        prefix.push_str(&escape(segment, config));
        match child {
            Node::Scalar(s) => values.entry(prefix.clone()).or_default().push(s.clone()),
            Node::Branch(b) => {
                prefix.push(config.delimiter);
                merge(b, prefix, config, values);
            }
        }
        prefix.truncate(len);
    }
}

pub(crate) fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Escapes the delimiter and the escape character inside one segment.
pub fn escape<'a>(segment: &'a str, config: &Config) -> Cow<'a, str> {
    let (delimiter, esc) = (config.delimiter, config.escape);
    if !segment.contains([delimiter, esc]) {
        return Cow::Borrowed(segment);
    }
    let mut escaped = String::with_capacity(segment.len() + 2);
    for c in segment.chars() {
        if c == delimiter || c == esc {
            escaped.push(esc);
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Reverses [`escape`] on one segment.
///
/// An escape character followed by anything other than the delimiter or
/// another escape character is kept as-is, together with that character.
pub fn unescape<'a>(segment: &'a str, config: &Config) -> Cow<'a, str> {
    if !segment.contains(config.escape) {
        return Cow::Borrowed(segment);
    }
    let mut segments = split(segment, config, None, false);
    Cow::Owned(segments.pop().unwrap_or_default())
}

/// Splits a composite key into unescaped segments.
///
/// At most `max_depth + 1` segments are produced; the remainder of a deeper
/// key is kept verbatim as the last segment.
pub fn split_path(path: &str, config: &Config) -> Vec<String> {
    split(path, config, Some(config.max_depth), true)
}

fn split(path: &str, config: &Config, max_depth: Option<usize>, on_delimiter: bool) -> Vec<String> {
    let (delimiter, esc) = (config.delimiter, config.escape);
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.char_indices();
    while let Some((i, c)) = chars.next() {
        if on_delimiter && max_depth.is_some_and(|max| segments.len() == max) {
            current.push_str(&path[i..]);
            break;
        }
        if c == esc {
            match chars.next() {
                Some((_, next)) if next == delimiter || next == esc => current.push(next),
                Some((_, next)) => {
                    current.push(c);
                    current.push(next);
                }
                None => current.push(c),
            }
        } else if on_delimiter && c == delimiter {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);
    segments
}

/// Escapes and joins segments into a composite key.
pub fn join_path<S: AsRef<str>>(segments: &[S], config: &Config) -> String {
    let mut path = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            path.push(config.delimiter);
        }
        path.push_str(&escape(segment.as_ref(), config));
    }
    path
}
