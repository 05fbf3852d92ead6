//! Nest Core - Foundational types for the nest relation engine
//!
//! This crate provides the core types that all other nest crates depend on:
//! - `EntityId` - Stable string entity identifiers
//! - `ContentHash` - SHA-256 based content hashing
//! - `Point`, `Rect` - Region geometry
//! - `Color` - Display tints
//! - Error types and Result alias

mod error;
mod hash;
mod id;
mod types;

pub use error::{NestError, Result};
pub use hash::ContentHash;
pub use id::EntityId;
pub use types::{Color, Point, Rect};
