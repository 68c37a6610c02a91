//! Schema ("profile map") of the tunable parameter space.
//!
//! A [`Schema`] is an immutable tree of named groups whose leaves declare
//! either a numeric [`RangeSpec`] or an ordered choice list. Sampling every
//! leaf yields a concrete [`Profile`] with exactly the schema's shape.

use std::collections::BTreeMap;

use rand::seq::IndexedRandom;
use rand::Rng;

use super::tree::{join_path, Profile, ProfileNode};
use super::value::Value;
use crate::error::{EvolveError, Result};

/// A bounded numeric domain.
///
/// The kind (integer or real) is fixed by the type of the lower bound.
/// Integer domains are sampled inclusive-discrete-uniform, real domains
/// continuous-uniform over `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RangeSpec {
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
}

impl RangeSpec {
    /// Builds a range whose kind is inferred from `min`.
    ///
    /// An integer lower bound requires an integer upper bound; a real lower
    /// bound accepts either and widens an integer upper bound.
    pub fn from_bounds(min: impl Into<Value>, max: impl Into<Value>) -> Result<Self> {
        let (min, max) = (min.into(), max.into());
        match (&min, &max) {
            (Value::Int(lo), Value::Int(hi)) => Ok(RangeSpec::Int { min: *lo, max: *hi }),
            (Value::Float(lo), hi) => match hi.as_f64() {
                Some(hi) => Ok(RangeSpec::Float { min: *lo, max: hi }),
                None => Err(range_kind_error(&min, &max)),
            },
            _ => Err(range_kind_error(&min, &max)),
        }
    }

    /// Draws one value from the domain.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Value {
        match *self {
            RangeSpec::Int { min, max } => Value::Int(rng.random_range(min..=max)),
            RangeSpec::Float { min, max } => Value::Float(rng.random_range(min..=max)),
        }
    }

    /// Whether `value` lies inside the domain and has the domain's kind.
    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (RangeSpec::Int { min, max }, Value::Int(v)) => (min..=max).contains(&v),
            (RangeSpec::Float { min, max }, Value::Float(v)) => (min..=max).contains(&v),
            _ => false,
        }
    }

    fn has_alternatives(&self) -> bool {
        match *self {
            RangeSpec::Int { min, max } => min < max,
            RangeSpec::Float { min, max } => min < max,
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        match *self {
            RangeSpec::Int { min, max } if min > max => {
                Err(format!("range min {min} exceeds max {max}"))
            }
            RangeSpec::Float { min, max } if !min.is_finite() || !max.is_finite() => {
                Err(format!("range bounds {min}..{max} must be finite"))
            }
            RangeSpec::Float { min, max } if min > max => {
                Err(format!("range min {min} exceeds max {max}"))
            }
            // the sampler scales by slightly more than the width
            RangeSpec::Float { min, max } if !((max - min) * 2.0).is_finite() => {
                Err(format!("range {min}..{max} is too wide to sample"))
            }
            _ => Ok(()),
        }
    }
}

fn range_kind_error(min: &Value, max: &Value) -> EvolveError {
    EvolveError::InvalidSpec {
        path: String::new(),
        reason: format!(
            "cannot build a range from a {} min and a {} max",
            min.kind(),
            max.kind()
        ),
    }
}

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SchemaNode {
    /// Named sub-parameters; keys are unique within the group.
    Group(BTreeMap<String, SchemaNode>),
    Range(RangeSpec),
    /// Candidate values, sampled uniformly with replacement.
    Choice(Vec<Value>),
}

impl SchemaNode {
    pub fn int_range(min: i64, max: i64) -> Self {
        SchemaNode::Range(RangeSpec::Int { min, max })
    }

    pub fn float_range(min: f64, max: f64) -> Self {
        SchemaNode::Range(RangeSpec::Float { min, max })
    }

    pub fn choice<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        SchemaNode::Choice(values.into_iter().map(Into::into).collect())
    }

    pub fn group<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        SchemaNode::Group(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_group(&self) -> bool {
        matches!(self, SchemaNode::Group(_))
    }

    /// Draws a value for a leaf. Returns `None` for groups.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<Value> {
        match self {
            SchemaNode::Group(_) => None,
            SchemaNode::Range(range) => Some(range.sample(rng)),
            SchemaNode::Choice(values) => values.choose(rng).cloned(),
        }
    }

    /// Whether a leaf can realize at least two distinct values.
    ///
    /// Mutation requires this: resampling a single-valued domain can never
    /// produce a different value.
    pub fn has_alternatives(&self) -> bool {
        match self {
            SchemaNode::Group(_) => false,
            SchemaNode::Range(range) => range.has_alternatives(),
            SchemaNode::Choice(values) => values.iter().any(|v| *v != values[0]),
        }
    }

    /// Whether a leaf's domain admits `value`.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            SchemaNode::Group(_) => false,
            SchemaNode::Range(range) => range.contains(value),
            SchemaNode::Choice(values) => values.contains(value),
        }
    }
}

/// The full parameter space a genotype is drawn from.
///
/// Construction validates every leaf, so a `Schema` value always has
/// non-empty groups, non-empty choice lists and ordered, finite ranges.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "BTreeMap<String, SchemaNode>",
        into = "BTreeMap<String, SchemaNode>"
    )
)]
pub struct Schema {
    root: BTreeMap<String, SchemaNode>,
}

impl Schema {
    /// Builds and validates a schema from its top-level entries.
    pub fn new<I, K>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        let root: BTreeMap<String, SchemaNode> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if root.is_empty() {
            return Err(EvolveError::InvalidSpec {
                path: "<root>".into(),
                reason: "schema declares no parameters".into(),
            });
        }
        validate_group(&root, &mut Vec::new())?;
        Ok(Self { root })
    }

    /// Top-level entries.
    pub fn entries(&self) -> &BTreeMap<String, SchemaNode> {
        &self.root
    }

    /// Looks up the node at a key path.
    pub fn node_at(&self, path: &[String]) -> Option<&SchemaNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(first)?;
        for key in rest {
            match node {
                SchemaNode::Group(children) => node = children.get(key)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Number of leaves (tunable parameters).
    pub fn leaf_count(&self) -> usize {
        fn count(group: &BTreeMap<String, SchemaNode>) -> usize {
            group
                .values()
                .map(|node| match node {
                    SchemaNode::Group(children) => count(children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.root)
    }

    /// Samples every leaf, producing a profile with this schema's shape.
    pub fn instantiate<R: Rng>(&self, rng: &mut R) -> Profile {
        instantiate_group(&self.root, rng)
    }

    /// Checks that `profile` has exactly this schema's shape: the same keys
    /// at every level, groups where the schema has groups and leaves where
    /// it has specs.
    pub fn check_shape(&self, profile: &Profile) -> Result<()> {
        check_group(&self.root, profile, &mut Vec::new())
    }
}

impl TryFrom<BTreeMap<String, SchemaNode>> for Schema {
    type Error = EvolveError;

    fn try_from(root: BTreeMap<String, SchemaNode>) -> Result<Self> {
        Schema::new(root)
    }
}

impl From<Schema> for BTreeMap<String, SchemaNode> {
    fn from(schema: Schema) -> Self {
        schema.root
    }
}

fn validate_group(group: &BTreeMap<String, SchemaNode>, path: &mut Vec<String>) -> Result<()> {
    for (key, node) in group {
        path.push(key.clone());
        let reason = match node {
            SchemaNode::Group(children) if children.is_empty() => Some("empty group".to_string()),
            SchemaNode::Group(children) => {
                validate_group(children, path)?;
                None
            }
            SchemaNode::Range(range) => range.check().err(),
            SchemaNode::Choice(values) if values.is_empty() => {
                Some("choice list is empty".to_string())
            }
            SchemaNode::Choice(_) => None,
        };
        if let Some(reason) = reason {
            return Err(EvolveError::InvalidSpec {
                path: join_path(path),
                reason,
            });
        }
        path.pop();
    }
    Ok(())
}

fn instantiate_group<R: Rng>(group: &BTreeMap<String, SchemaNode>, rng: &mut R) -> Profile {
    let mut profile = Profile::new();
    for (key, node) in group {
        let child = match node {
            SchemaNode::Group(children) => ProfileNode::Group(instantiate_group(children, rng)),
            leaf => match leaf.sample(rng) {
                Some(value) => ProfileNode::Leaf(value),
                None => continue,
            },
        };
        profile.insert(key.clone(), child);
    }
    profile
}

fn check_group(
    group: &BTreeMap<String, SchemaNode>,
    profile: &Profile,
    path: &mut Vec<String>,
) -> Result<()> {
    if let Some(extra) = profile.keys().find(|k| !group.contains_key(*k)) {
        path.push(extra.clone());
        return Err(EvolveError::SchemaMismatch(format!(
            "unexpected key `{}`",
            join_path(path)
        )));
    }
    for (key, node) in group {
        path.push(key.clone());
        match (node, profile.get(key)) {
            (_, None) => {
                return Err(EvolveError::SchemaMismatch(format!(
                    "missing key `{}`",
                    join_path(path)
                )))
            }
            (SchemaNode::Group(children), Some(ProfileNode::Group(sub))) => {
                check_group(children, sub, path)?
            }
            (SchemaNode::Group(_), Some(ProfileNode::Leaf(_))) => {
                return Err(EvolveError::SchemaMismatch(format!(
                    "expected group at `{}`, found a value",
                    join_path(path)
                )))
            }
            (_, Some(ProfileNode::Group(_))) => {
                return Err(EvolveError::SchemaMismatch(format!(
                    "expected value at `{}`, found a group",
                    join_path(path)
                )))
            }
            (_, Some(ProfileNode::Leaf(_))) => {}
        }
        path.pop();
    }
    Ok(())
}
