//! Entity information and metadata

use nest_core::{EntityId, Rect};
use serde::Serialize;

/// Read-only summary of an entity for reports and serialization
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub id: EntityId,
    /// Open type tag ("class", "quarter", "track", ...)
    pub kind: String,
    pub regions: Vec<Rect>,
    /// Names of properties that currently hold a value
    pub properties: Vec<String>,
}

impl EntityInfo {
    pub fn new(id: EntityId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            regions: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_regions(mut self, regions: Vec<Rect>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.properties = properties;
        self
    }
}
