//! Nest World - entity store with labeled reactive properties
//!
//! Every entity carries a type tag, a list of regions and a map of lazily
//! created properties. Each property holds an optional value plus a table
//! of labeled listeners that fire synchronously on every `set`.

mod entity;
mod value;
mod world;

pub use entity::EntityInfo;
pub use value::{props, CountChange, Delta, Relation, Value};
pub use world::{Listener, World};
