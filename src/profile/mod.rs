//! Parameter-space schema and concrete profile trees.
//!
//! - [`Schema`]: the static, validated description of what can be tuned:
//!   nested groups whose leaves are numeric ranges or choice lists.
//! - [`Profile`]: one concrete assignment over a schema, with the same
//!   group structure and a [`Value`] at every leaf.
//! - [`Context`]: a flattened `(path, value)` locus. The sorted context list
//!   of a profile is the canonical, position-addressable genome used by
//!   crossover and mutation.

mod schema;
mod tree;
mod value;

pub use schema::{RangeSpec, Schema, SchemaNode};
pub use tree::{Context, Profile, ProfileNode};
pub use value::Value;

pub(crate) use tree::join_path;
