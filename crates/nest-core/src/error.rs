//! Error types for nest

use thiserror::Error;

/// The main error type for nest operations
#[derive(Debug, Error)]
pub enum NestError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Duplicate entity id: {0}")]
    DuplicateEntity(String),

    /// A property was read before anything was written to it and the caller
    /// supplied no fallback. This is an initialization bug, not a runtime state.
    #[error("Property '{property}' of '{entity}' has no value and no default was given")]
    PropertyUnset { entity: String, property: String },

    #[error("Property '{property}' of '{entity}' is not a {expected}")]
    PropertyType {
        entity: String,
        property: String,
        expected: &'static str,
    },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Region index {index} out of range for '{entity}' ({count} region(s))")]
    RegionIndex {
        entity: String,
        index: usize,
        count: usize,
    },

    #[error("Catalog load error: {0}")]
    CatalogLoadError(String),

    #[error("Layout error: {0}")]
    LayoutError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for nest operations
pub type Result<T> = std::result::Result<T, NestError>;

impl From<toml::de::Error> for NestError {
    fn from(err: toml::de::Error) -> Self {
        NestError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for NestError {
    fn from(err: toml::ser::Error) -> Self {
        NestError::TomlSerError(err.to_string())
    }
}
