//! Nest Relation - derived parent/child adjacency and the combinators built on it
//!
//! Geometry changes flow through three stages:
//! - [`resolve_containment`] counts strict region containment against every
//!   other entity and reports only the counts that changed
//! - [`propagate`] commits those counts to both sides of the relation and
//!   emits per-relative deltas through the world's listeners
//! - [`subscribe_relation`] turns those deltas into filtered, projected,
//!   keyed state with enter/exit hooks

mod combinator;
mod containment;
mod propagate;

pub use combinator::{subscribe_relation, RelationHandle, RelationSubscription};
pub use containment::{resolve_containment, ContainmentChange};
pub use propagate::{move_region, propagate, recompute, recompute_all};
