//! Nest Rules - validation rules built on relation combinators
//!
//! Rules are declared as [`RuleSpec`] descriptors and wired onto an entity by
//! [`apply_rules`]. Each rule owns its own error slots on that entity; the
//! display consumer and [`ValidationReport`] read the slots back.

mod dispatch;
mod display;
mod errors;
pub mod library;
mod report;
mod types;

pub use dispatch::{apply_rule, apply_rules};
pub use display::{attach_display, render_text, RegionSurface, SharedSurface, TextSurface};
pub use errors::{active_errors, clear_error, set_error};
pub use report::{EntityReport, ValidationReport};
pub use types::{Calendar, RuleSpec};
