//! Layout snapshot command

use super::{load_catalog, open_world};
use anyhow::Result;
use nest_layout::{save_snapshot, FileStore, LayoutSnapshot};

pub fn run(catalog: &str, layout: &str) -> Result<()> {
    let catalog = load_catalog(catalog)?;
    let mut store = FileStore::new(layout);
    let world = open_world(&catalog, Some(&store))?;

    let placed = LayoutSnapshot::capture(&world).regions.len();
    if save_snapshot(&mut store, &world)? {
        println!("Saved {} placed entit(ies) to {}", placed, store.root().display());
    } else {
        println!("Layout unchanged ({} placed entit(ies)).", placed);
    }
    Ok(())
}
