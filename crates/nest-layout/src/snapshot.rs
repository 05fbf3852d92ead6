//! Layout snapshots: the current rectangles of every entity

use crate::store::LayoutStore;
use nest_core::{ContentHash, NestError, Rect, Result};
use nest_world::World;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use tracing::{debug, warn};

/// Storage key the snapshot lives under
pub const SNAPSHOT_KEY: &str = "layout";

/// Entity id -> its regions, in region index order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub regions: BTreeMap<String, Vec<Rect>>,
}

impl LayoutSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every entity that has at least one region
    pub fn capture(world: &World) -> Self {
        let regions = world
            .all_regions()
            .filter(|(_, rects)| !rects.is_empty())
            .map(|(id, rects)| (id.to_string(), rects.to_vec()))
            .collect();
        Self { regions }
    }

    pub fn get(&self, id: &str) -> Option<&[Rect]> {
        self.regions.get(id).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Stored snapshot text. Content that is not valid UTF-8 counts as absent.
fn read_stored(store: &dyn LayoutStore) -> Result<Option<String>> {
    match store.read(SNAPSHOT_KEY) {
        Err(NestError::IoError(e)) if e.kind() == ErrorKind::InvalidData => {
            warn!(error = %e, "discarding unreadable layout snapshot");
            Ok(None)
        }
        other => other,
    }
}

/// Read the saved snapshot.
///
/// Missing data yields an empty snapshot. Malformed or undecodable data is
/// logged and discarded so callers fall back to default placements.
pub fn load_snapshot(store: &dyn LayoutStore) -> Result<LayoutSnapshot> {
    let Some(content) = read_stored(store)? else {
        return Ok(LayoutSnapshot::new());
    };

    match LayoutSnapshot::from_toml_str(&content) {
        Ok(snapshot) => Ok(snapshot),
        Err(e) => {
            warn!(error = %e, "discarding malformed layout snapshot");
            Ok(LayoutSnapshot::new())
        }
    }
}

/// Write the world's current layout, skipping the write when the stored
/// content is already identical. Returns whether anything was written.
pub fn save_snapshot(store: &mut dyn LayoutStore, world: &World) -> Result<bool> {
    let content = LayoutSnapshot::capture(world).to_toml_string()?;
    let hash = ContentHash::of_str(&content);

    if let Some(existing) = read_stored(store)? {
        if ContentHash::of_str(&existing) == hash {
            debug!(%hash, "layout unchanged, skipping save");
            return Ok(false);
        }
    }

    store.write(SNAPSHOT_KEY, &content)?;
    debug!(%hash, entities = world.entity_count(), "layout saved");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use std::fs;

    fn rect(l: f64, t: f64, r: f64, b: f64) -> Rect {
        Rect::from_edges(l, t, r, b).unwrap()
    }

    fn world() -> World {
        let mut world = World::new();
        world.spawn("CS 106A", "class").unwrap();
        world.add_region("CS 106A", rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        world.add_region("CS 106A", rect(20.0, 0.0, 30.0, 10.0)).unwrap();
        world.spawn("unplaced", "class").unwrap();
        world
    }

    #[test]
    fn test_capture_skips_unplaced() {
        let snapshot = LayoutSnapshot::capture(&world());
        assert_eq!(snapshot.regions.len(), 1);
        assert_eq!(snapshot.get("CS 106A").map(<[Rect]>::len), Some(2));
        assert!(snapshot.get("unplaced").is_none());
    }

    #[test]
    fn test_save_skips_unchanged_layout() {
        let mut world = world();
        let mut store = MemoryStore::new();

        assert!(save_snapshot(&mut store, &world).unwrap());
        assert!(!save_snapshot(&mut store, &world).unwrap());
        assert_eq!(store.writes(), 1);

        world.set_region("CS 106A", 1, rect(40.0, 0.0, 50.0, 10.0)).unwrap();
        assert!(save_snapshot(&mut store, &world).unwrap());
        assert_eq!(store.writes(), 2);

        let loaded = load_snapshot(&store).unwrap();
        assert_eq!(loaded.get("CS 106A").unwrap()[1], rect(40.0, 0.0, 50.0, 10.0));
    }

    #[test]
    fn test_malformed_snapshot_is_discarded() {
        let mut store = MemoryStore::new();
        store.write(SNAPSHOT_KEY, "regions = 12").unwrap();
        assert!(load_snapshot(&store).unwrap().is_empty());

        // A degenerate rectangle invalidates the whole snapshot
        store
            .write(
                SNAPSHOT_KEY,
                "[[regions.a]]\nleft_top = [5.0, 5.0]\nright_bottom = [1.0, 9.0]\n",
            )
            .unwrap();
        assert!(load_snapshot(&store).unwrap().is_empty());
    }

    #[test]
    fn test_undecodable_snapshot_file_is_discarded() {
        let root = std::env::temp_dir().join(format!("nest_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("layout.toml"), [0xff, 0xfe, b'[', 0x80]).unwrap();

        let mut store = FileStore::new(&root);
        assert!(load_snapshot(&store).unwrap().is_empty());

        // Saving replaces the unreadable file
        assert!(save_snapshot(&mut store, &world()).unwrap());
        assert_eq!(load_snapshot(&store).unwrap().regions.len(), 1);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_snapshot_is_empty() {
        let store = MemoryStore::new();
        assert!(load_snapshot(&store).unwrap().is_empty());
    }
}
