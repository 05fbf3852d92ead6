//! Catalog files: declared entities, their rules and default placements

use nest_core::{NestError, Rect, Result};
use nest_rules::{Calendar, RuleSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Definition of one entity in a catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Open type tag ("class", "quarter", "track", ...)
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<f64>,
    /// Default placements, used when no saved layout overrides them
    #[serde(default)]
    pub regions: Vec<Rect>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl EntityDef {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            units: None,
            regions: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_units(mut self, units: f64) -> Self {
        self.units = Some(units);
        self
    }

    pub fn with_region(mut self, rect: Rect) -> Self {
        self.regions.push(rect);
        self
    }

    pub fn with_rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Root structure of a single catalog TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calendar: Option<Calendar>,
    #[serde(default)]
    entities: BTreeMap<String, EntityDef>,
}

/// Every declared entity plus the scheduling calendar
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub calendar: Calendar,
    pub entities: BTreeMap<String, EntityDef>,
    /// Whether some loaded file declared `[calendar]`
    calendar_declared: bool,
}

impl Catalog {
    /// Create an empty catalog with the default calendar
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a TOML file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.merge_file(path.as_ref())?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML string
    pub fn load_string(content: &str) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.merge_string(content, "<string>")?;
        Ok(catalog)
    }

    /// Load and merge every `*.toml` file under `<path>/catalog/`, in file
    /// name order
    pub fn load_from_directory<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut catalog = Self::new();
        let catalog_path = path.as_ref().join("catalog");
        if !catalog_path.exists() {
            return Ok(catalog);
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&catalog_path)? {
            let file_path = entry?.path();
            if file_path.extension().map(|e| e == "toml").unwrap_or(false) {
                files.push(file_path);
            }
        }
        files.sort();

        for file in files {
            catalog.merge_file(&file)?;
        }
        Ok(catalog)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        self.merge_string(&content, &path.display().to_string())
    }

    fn merge_string(&mut self, content: &str, source: &str) -> Result<()> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| {
            NestError::CatalogLoadError(format!("Failed to parse {}: {}", source, e))
        })?;

        if let Some(calendar) = file.calendar {
            if self.calendar_declared {
                return Err(NestError::CatalogLoadError(format!(
                    "{}: [calendar] declared more than once",
                    source
                )));
            }
            self.calendar = calendar;
            self.calendar_declared = true;
        }

        for (id, def) in file.entities {
            if self.entities.contains_key(&id) {
                return Err(NestError::CatalogLoadError(format!(
                    "{}: entity '{}' declared more than once",
                    source, id
                )));
            }
            self.entities.insert(id, def);
        }
        Ok(())
    }

    /// Register an entity programmatically
    pub fn insert(&mut self, id: impl Into<String>, def: EntityDef) -> Result<()> {
        let id = id.into();
        if self.entities.contains_key(&id) {
            return Err(NestError::DuplicateEntity(id));
        }
        self.entities.insert(id, def);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&EntityDef> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Serialize back to a single catalog file
    pub fn to_toml_string(&self) -> Result<String> {
        let file = CatalogFile {
            calendar: self.calendar_declared.then(|| self.calendar.clone()),
            entities: self.entities.clone(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }
}
