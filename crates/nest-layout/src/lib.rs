//! Nest Layout - catalog loading and layout persistence
//!
//! A [`Catalog`] declares entities, their rules and default placements. A
//! [`LayoutSnapshot`] records where regions actually are and is kept in a
//! [`LayoutStore`]. [`build_world`] combines the two into a settled world.

mod build;
mod catalog;
mod snapshot;
mod store;

pub use build::{build_world, seed_regions};
pub use catalog::{Catalog, EntityDef};
pub use snapshot::{load_snapshot, save_snapshot, LayoutSnapshot, SNAPSHOT_KEY};
pub use store::{FileStore, LayoutStore, MemoryStore};
