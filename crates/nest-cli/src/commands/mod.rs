//! CLI command implementations

pub mod check;
pub mod place;
pub mod snapshot;

use anyhow::Result;
use nest_layout::{build_world, load_snapshot, Catalog, FileStore, LayoutSnapshot};
use nest_world::World;
use std::path::Path;

/// Load a catalog from a file or from `<dir>/catalog/*.toml`
pub fn load_catalog(path: &str) -> Result<Catalog> {
    let catalog = if Path::new(path).is_dir() {
        Catalog::load_from_directory(path)?
    } else {
        Catalog::load_file(path)?
    };
    if catalog.is_empty() {
        anyhow::bail!("No entities declared in {}", path);
    }
    Ok(catalog)
}

/// Build a settled world, seeding regions from the saved layout if there is one
pub fn open_world(catalog: &Catalog, store: Option<&FileStore>) -> Result<World> {
    let snapshot = match store {
        Some(store) => load_snapshot(store)?,
        None => LayoutSnapshot::new(),
    };
    Ok(build_world(catalog, &snapshot)?)
}
