//! Field resolution for records.
//!
//! A record's wire keys are computed once per type by walking its fields
//! breadth-first by embedding depth, in the manner of Go's `encoding/json`:
//!
//! * fields of embedded (`flatten`) records compete with the fields of the
//!   embedding record one level deeper;
//! * of several fields sharing a wire key, the shallowest wins;
//! * at equal depth an explicitly renamed field wins;
//! * any remaining tie drops the key altogether.
//!
//! Results are cached for the lifetime of the process.

use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::form::Schema;

/// A resolved field: which wire key maps to which (possibly embedded) field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    /// Lowercased key, for case-insensitive matching.
    pub folded: String,
    /// Field indices from the root record down through embedded records.
    pub index: Vec<usize>,
    pub omit_empty: bool,
}

type Cache = RwLock<HashMap<TypeId, Arc<[FieldDescriptor]>>>;

static CACHE: OnceLock<Cache> = OnceLock::new();

/// Returns the resolved fields of a record type, in first-appearance order.
pub fn resolve(schema: &Schema) -> Arc<[FieldDescriptor]> {
    let cache = CACHE.get_or_init(Cache::default);
    if let Some(found) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&schema.id())
    {
        return Arc::clone(found);
    }

    let descriptors: Arc<[FieldDescriptor]> = compute(schema).into();
    trace!(
        record = schema.name(),
        fields = descriptors.len(),
        "resolved form fields"
    );
    let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(cache.entry(schema.id()).or_insert(descriptors))
}

/// Finds the field a wire key maps to.
///
/// An exact match always wins; with `ignore_case` the first declared field
/// matching case-insensitively is used otherwise.
pub fn find<'d>(
    descriptors: &'d [FieldDescriptor],
    key: &str,
    ignore_case: bool,
) -> Option<&'d FieldDescriptor> {
    descriptors.iter().find(|d| d.key == key).or_else(|| {
        if !ignore_case {
            return None;
        }
        let folded = key.to_lowercase();
        descriptors.iter().find(|d| d.folded == folded)
    })
}

struct Candidate {
    key: &'static str,
    index: Vec<usize>,
    omit_empty: bool,
    depth: usize,
    tagged: bool,
}

fn compute(root: &Schema) -> Vec<FieldDescriptor> {
    let mut visited = HashSet::from([root.id()]);
    let mut frontier = VecDeque::from([(*root, Vec::new(), 0)]);
    let mut candidates: IndexMap<&'static str, Vec<Candidate>> = IndexMap::new();

    while let Some((schema, prefix, depth)) = frontier.pop_front() {
        for (i, decl) in schema.fields().iter().enumerate() {
            if decl.is_skipped() {
                continue;
            }
            let mut index: Vec<usize> = Vec::with_capacity(prefix.len() + 1);
            index.extend_from_slice(&prefix);
            index.push(i);

            if decl.flatten && decl.rename.is_none() {
                if let Some(inner) = (decl.schema)() {
                    if visited.insert(inner.id()) {
                        frontier.push_back((inner, index, depth + 1));
                    }
                    continue;
                }
            }

            candidates.entry(decl.key()).or_default().push(Candidate {
                key: decl.key(),
                index,
                omit_empty: decl.omit_empty,
                depth,
                tagged: decl.rename.is_some(),
            });
        }
    }

    candidates
        .into_values()
        .filter_map(|group| select(root, group))
        .map(|winner| FieldDescriptor {
            key: winner.key,
            folded: winner.key.to_lowercase(),
            index: winner.index,
            omit_empty: winner.omit_empty,
        })
        .collect()
}

fn select(root: &Schema, mut group: Vec<Candidate>) -> Option<Candidate> {
    let key = group.first()?.key;
    if group.len() > 1 {
        let shallowest = group.iter().map(|c| c.depth).min().unwrap_or_default();
        group.retain(|c| c.depth == shallowest);
    }
    if group.len() > 1 {
        group.retain(|c| c.tagged);
    }
    if group.len() == 1 {
        return group.pop();
    }
    debug!(record = root.name(), key, "dropping ambiguous form field");
    None
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::form::Record;

    crate::record! {
        #[derive(Default)]
        struct Inner {
            x: String,
            y: u32,
        }
    }

    crate::record! {
        #[derive(Default)]
        struct Outer {
            x: String,
            #[form(flatten)]
            inner: Inner,
            #[form(rename = "z", omit_empty)]
            zed: i64,
            #[form(skip)]
            hidden: bool,
            #[form(rename = "-")]
            dash: bool,
        }
    }

    crate::record! {
        #[derive(Default)]
        struct Named {
            #[form(flatten, rename = "inner")]
            inner: Inner,
        }
    }

    crate::record! {
        #[derive(Default)]
        struct SelfEmbedding {
            name: String,
            #[form(flatten)]
            next: Option<Box<SelfEmbedding>>,
        }
    }

    fn keys(schema: &Schema) -> Vec<(&'static str, Vec<usize>)> {
        resolve(schema)
            .iter()
            .map(|d| (d.key, d.index.clone()))
            .collect()
    }

    #[test]
    fn embedded_fields_are_shadowed() {
        assert_eq!(
            keys(&Outer::describe()),
            vec![("x", vec![0]), ("z", vec![2]), ("y", vec![1, 1])]
        );
    }

    #[test]
    fn renamed_embedding_is_a_plain_field() {
        assert_eq!(keys(&Named::describe()), vec![("inner", vec![0])]);
    }

    #[test]
    fn self_embedding_terminates() {
        assert_eq!(keys(&SelfEmbedding::describe()), vec![("name", vec![0])]);
    }

    #[test]
    fn find_prefers_exact_match() {
        let descriptors = resolve(&Outer::describe());
        assert_eq!(find(&descriptors, "X", false), None);
        assert_eq!(find(&descriptors, "X", true).map(|d| d.key), Some("x"));
        assert_eq!(find(&descriptors, "z", true).map(|d| d.index.clone()), Some(vec![2]));
    }

    #[test]
    fn resolution_is_cached() {
        let first = resolve(&Outer::describe());
        let second = resolve(&Outer::describe());
        assert!(Arc::ptr_eq(&first, &second));
    }
}
