//! Validation report types

use crate::errors::active_errors;
use nest_core::{EntityId, Result};
use nest_world::World;
use serde::Serialize;

/// Active errors of one entity
#[derive(Debug, Clone, Serialize)]
pub struct EntityReport {
    pub id: EntityId,
    pub kind: String,
    pub errors: Vec<String>,
}

/// Every entity with at least one active error
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub entities: Vec<EntityReport>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot active errors across the world, in id order
    pub fn collect(world: &World) -> Result<Self> {
        let mut entities = Vec::new();
        for id in world.ids() {
            let errors = active_errors(world, &id)?;
            if errors.is_empty() {
                continue;
            }
            entities.push(EntityReport {
                kind: world.kind(&id)?.to_string(),
                id,
                errors,
            });
        }
        Ok(Self { entities })
    }

    pub fn is_valid(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.entities.iter().map(|e| e.errors.len()).sum()
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        if self.is_valid() {
            return "No errors found.".to_string();
        }
        format!(
            "{} error(s) on {} entit{}",
            self.error_count(),
            self.entities.len(),
            if self.entities.len() == 1 { "y" } else { "ies" }
        )
    }
}
