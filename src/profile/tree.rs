//! Concrete profile trees and their flattened context form.
//!
//! A [`Profile`] mirrors a schema's group structure with a concrete
//! [`Value`] at every leaf. [`Profile::contexts`] flattens it into a sorted
//! list of `(path, value)` loci; [`Profile::from_contexts`] rebuilds a tree
//! from such a list. Because sibling keys are unique, a leaf's path alone
//! fixes its position in the sorted list, so two profiles of one schema
//! produce position-aligned context lists.

use std::collections::BTreeMap;
use std::fmt;

use super::value::Value;

/// One entry of a profile: a nested group or a leaf value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ProfileNode {
    Group(Profile),
    Leaf(Value),
}

impl ProfileNode {
    pub fn leaf(value: impl Into<Value>) -> Self {
        ProfileNode::Leaf(value.into())
    }
}

impl From<Value> for ProfileNode {
    fn from(value: Value) -> Self {
        ProfileNode::Leaf(value)
    }
}

impl From<Profile> for ProfileNode {
    fn from(profile: Profile) -> Self {
        ProfileNode::Group(profile)
    }
}

/// A concrete value tree.
///
/// With the `serde` feature a profile (de)serializes as a plain nested map,
/// the same shape a slicer reads its configuration from.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Profile {
    entries: BTreeMap<String, ProfileNode>,
}

/// A flattened locus: the keys from the root to a leaf plus its value.
///
/// Ordered by path first, then by value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Context {
    pub path: Vec<String>,
    pub value: Value,
}

impl Context {
    pub fn new<I, K>(path: I, value: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", join_path(&self.path), self.value)
    }
}

/// Dotted rendering of a key path, for diagnostics.
pub(crate) fn join_path(path: &[String]) -> String {
    path.join(".")
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the one it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        node: impl Into<ProfileNode>,
    ) -> Option<ProfileNode> {
        self.entries.insert(key.into(), node.into())
    }

    pub fn get(&self, key: &str) -> Option<&ProfileNode> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProfileNode)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of leaves in the whole tree.
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                ProfileNode::Group(sub) => sub.leaf_count(),
                ProfileNode::Leaf(_) => 1,
            })
            .sum()
    }

    /// The leaf value at `path`, if the path ends on a leaf.
    pub fn value_at(&self, path: &[String]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut group = self;
        for key in parents {
            match group.entries.get(key)? {
                ProfileNode::Group(sub) => group = sub,
                ProfileNode::Leaf(_) => return None,
            }
        }
        match group.entries.get(last)? {
            ProfileNode::Leaf(value) => Some(value),
            ProfileNode::Group(_) => None,
        }
    }

    /// Replaces the value of an existing leaf, returning the old value.
    ///
    /// Does nothing and returns `None` when `path` does not end on a leaf.
    pub fn replace_value(&mut self, path: &[String], value: Value) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut group = self;
        for key in parents {
            match group.entries.get_mut(key)? {
                ProfileNode::Group(sub) => group = sub,
                ProfileNode::Leaf(_) => return None,
            }
        }
        match group.entries.get_mut(last)? {
            ProfileNode::Leaf(old) => Some(std::mem::replace(old, value)),
            ProfileNode::Group(_) => None,
        }
    }

    /// Flattens the tree into its sorted context list.
    ///
    /// Depth-first walk, one context per leaf, then sorted by path and
    /// value. The ordering is deterministic and depends on key paths only,
    /// which is what lets two profiles of one schema be recombined
    /// position by position.
    pub fn contexts(&self) -> Vec<Context> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.collect_contexts(&mut Vec::new(), &mut out);
        out.sort();
        out
    }

    fn collect_contexts(&self, prefix: &mut Vec<String>, out: &mut Vec<Context>) {
        for (key, node) in &self.entries {
            prefix.push(key.clone());
            match node {
                ProfileNode::Group(sub) => sub.collect_contexts(prefix, out),
                ProfileNode::Leaf(value) => out.push(Context {
                    path: prefix.clone(),
                    value: value.clone(),
                }),
            }
            prefix.pop();
        }
    }

    /// Rebuilds a tree from contexts.
    ///
    /// Intermediate groups are created empty on first reference and reused
    /// afterwards. Contexts with an empty path are skipped. When two
    /// contexts disagree about whether a key is a group or a leaf, the later
    /// one wins.
    pub fn from_contexts<I>(contexts: I) -> Profile
    where
        I: IntoIterator<Item = Context>,
    {
        let mut root = Profile::new();
        for Context { path, value } in contexts {
            let Some((last, parents)) = path.split_last() else {
                continue;
            };
            root.insert_leaf(parents, last, value);
        }
        root
    }

    /// Inserts a leaf below `parents`, turning any leaf in the way into a
    /// group.
    fn insert_leaf(&mut self, parents: &[String], key: &str, value: Value) {
        match parents.split_first() {
            None => {
                self.entries.insert(key.to_string(), ProfileNode::Leaf(value));
            }
            Some((first, rest)) => {
                let mut sub = match self.entries.remove(first) {
                    Some(ProfileNode::Group(sub)) => sub,
                    _ => Profile::new(),
                };
                sub.insert_leaf(rest, key, value);
                self.entries.insert(first.clone(), ProfileNode::Group(sub));
            }
        }
    }

    /// Returns `base` with each of this profile's top-level entries laid
    /// over it.
    ///
    /// Replacement is per top-level key: a group in `self` replaces the
    /// whole group of the same name in `base`. This is how a tuned profile
    /// is merged into a full slicer configuration before slicing.
    pub fn overlay_onto(&self, base: &Profile) -> Profile {
        let mut merged = base.clone();
        for (key, node) in &self.entries {
            merged.entries.insert(key.clone(), node.clone());
        }
        merged
    }
}

impl<K: Into<String>, N: Into<ProfileNode>> FromIterator<(K, N)> for Profile {
    fn from_iter<T: IntoIterator<Item = (K, N)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, n)| (k.into(), n.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Schema, SchemaNode};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn nested_profile() -> Profile {
        let dict2: Profile = [("g", ProfileNode::leaf(7)), ("h", ProfileNode::leaf(8))]
            .into_iter()
            .collect();
        let dict1: Profile = [
            ("d", ProfileNode::leaf(4)),
            ("e", ProfileNode::leaf(5)),
            ("f", ProfileNode::leaf(6)),
            ("dict2", dict2.into()),
        ]
        .into_iter()
        .collect();
        [
            ("a", ProfileNode::leaf(1)),
            ("b", ProfileNode::leaf(2)),
            ("c", ProfileNode::leaf(3)),
            ("dict1", dict1.into()),
        ]
        .into_iter()
        .collect()
    }

    fn nested_contexts() -> Vec<Context> {
        vec![
            Context::new(["a"], 1),
            Context::new(["b"], 2),
            Context::new(["c"], 3),
            Context::new(["dict1", "d"], 4),
            Context::new(["dict1", "dict2", "g"], 7),
            Context::new(["dict1", "dict2", "h"], 8),
            Context::new(["dict1", "e"], 5),
            Context::new(["dict1", "f"], 6),
        ]
    }

    #[test]
    fn test_contexts_sorted() {
        let contexts = nested_profile().contexts();
        assert_eq!(contexts, nested_contexts());
    }

    #[test]
    fn test_from_contexts() {
        let mut shuffled = nested_contexts();
        shuffled.reverse();
        assert_eq!(Profile::from_contexts(shuffled), nested_profile());
    }

    #[test]
    fn test_from_contexts_keeps_existing_groups() {
        let profile = Profile::from_contexts([
            Context::new(["a", "some_val"], 1776),
            Context::new(["a", "b", "c"], 1),
            Context::new(["q"], "stuff"),
        ]);
        let a = match profile.get("a") {
            Some(ProfileNode::Group(a)) => a,
            other => panic!("expected group, got {other:?}"),
        };
        assert_eq!(a.get("some_val"), Some(&ProfileNode::leaf(1776)));
        assert!(matches!(a.get("b"), Some(ProfileNode::Group(_))));
        assert_eq!(profile.leaf_count(), 3);
    }

    #[test]
    fn test_from_contexts_leaf_in_group_position() {
        let profile = Profile::from_contexts([
            Context::new(["a"], 1),
            Context::new(["a", "b"], 2),
        ]);
        let path = vec!["a".to_string(), "b".to_string()];
        assert_eq!(profile.value_at(&path), Some(&Value::from(2)));
        assert_eq!(profile.leaf_count(), 1);
    }

    #[test]
    fn test_from_contexts_skips_empty_path() {
        let profile = Profile::from_contexts([Context::new(Vec::<String>::new(), 1)]);
        assert!(profile.is_empty());
    }

    #[test]
    fn test_value_at_and_replace() {
        let mut profile = nested_profile();
        let path: Vec<String> = vec!["dict1".into(), "dict2".into(), "g".into()];
        assert_eq!(profile.value_at(&path), Some(&Value::from(7)));

        let old = profile.replace_value(&path, Value::from(70));
        assert_eq!(old, Some(Value::from(7)));
        assert_eq!(profile.value_at(&path), Some(&Value::from(70)));

        // groups are not leaves
        let group_path = vec!["dict1".to_string()];
        assert_eq!(profile.value_at(&group_path), None);
        assert_eq!(profile.replace_value(&group_path, Value::from(0)), None);
        assert_eq!(profile.value_at(&["zzz".to_string()]), None);
    }

    #[test]
    fn test_overlay_replaces_top_level_entries() {
        let base: Profile = [
            ("speed", ProfileNode::leaf(50)),
            ("layer_height", ProfileNode::leaf(0.2)),
            (
                "extruder",
                [("temp", ProfileNode::leaf(200)), ("retract", ProfileNode::leaf(1.0))]
                    .into_iter()
                    .collect::<Profile>()
                    .into(),
            ),
        ]
        .into_iter()
        .collect();
        let tuned: Profile = [
            ("speed", ProfileNode::leaf(80)),
            (
                "extruder",
                [("temp", ProfileNode::leaf(215))]
                    .into_iter()
                    .collect::<Profile>()
                    .into(),
            ),
        ]
        .into_iter()
        .collect();

        let merged = tuned.overlay_onto(&base);
        assert_eq!(merged.get("speed"), Some(&ProfileNode::leaf(80)));
        assert_eq!(merged.get("layer_height"), Some(&ProfileNode::leaf(0.2)));
        // top-level replacement: the base's `retract` is gone
        assert_eq!(merged.leaf_count(), 3);
    }

    #[test]
    fn test_context_display() {
        assert_eq!(Context::new(["a", "b"], 3).to_string(), "a.b = 3");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_profile_json_is_plain_map() {
        let json = serde_json::to_value(nested_profile()).unwrap();
        assert_eq!(json["dict1"]["dict2"]["h"], serde_json::json!(8));
        let back: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(back, nested_profile());
    }

    fn arb_node() -> impl Strategy<Value = SchemaNode> {
        let leaf = prop_oneof![
            (-50i64..50, 1i64..50).prop_map(|(lo, span)| SchemaNode::int_range(lo, lo + span)),
            (-5.0f64..5.0, 0.5f64..5.0)
                .prop_map(|(lo, span)| SchemaNode::float_range(lo, lo + span)),
            prop::collection::btree_set("[a-z]{1,4}", 2..5).prop_map(SchemaNode::choice),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop::collection::btree_map("[a-z]{1,3}", inner, 1..4).prop_map(SchemaNode::Group)
        })
    }

    fn arb_schema() -> impl Strategy<Value = Schema> {
        prop::collection::btree_map("[a-z]{1,3}", arb_node(), 1..5)
            .prop_map(|root| Schema::new(root).expect("generated schema is valid"))
    }

    proptest! {
        #[test]
        fn prop_contexts_round_trip(schema in arb_schema(), seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let profile = schema.instantiate(&mut rng);
            let contexts = profile.contexts();

            prop_assert_eq!(contexts.len(), schema.leaf_count());
            prop_assert_eq!(Profile::from_contexts(contexts), profile);
        }

        #[test]
        fn prop_contexts_align_across_profiles(schema in arb_schema(), seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let a = schema.instantiate(&mut rng).contexts();
            let b = schema.instantiate(&mut rng).contexts();

            prop_assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(&b) {
                prop_assert_eq!(&x.path, &y.path);
            }
        }
    }
}
