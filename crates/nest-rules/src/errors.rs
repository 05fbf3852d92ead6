//! Named error slots on entities

use nest_core::Result;
use nest_world::{props, World};

/// Set (or overwrite) the error under `label`.
///
/// Writing the message already stored is a no-op, so rules can re-assert
/// their verdict on every aggregate call without waking listeners.
pub fn set_error(world: &mut World, id: &str, label: &str, message: impl Into<String>) -> Result<()> {
    let message = message.into();
    if world.messages(id, props::ERRORS)?.get(label) == Some(&message) {
        return Ok(());
    }
    world.update_messages(id, props::ERRORS, |errors| {
        errors.insert(label.to_string(), message);
    })
}

/// Clear the error under `label`; absent labels are a no-op
pub fn clear_error(world: &mut World, id: &str, label: &str) -> Result<()> {
    if !world.messages(id, props::ERRORS)?.contains_key(label) {
        return Ok(());
    }
    world.update_messages(id, props::ERRORS, |errors| {
        errors.remove(label);
    })
}

/// Messages of every active error slot, in label order
pub fn active_errors(world: &World, id: &str) -> Result<Vec<String>> {
    Ok(world.messages(id, props::ERRORS)?.into_values().collect())
}

/// Set or clear `label` depending on whether there is a message
pub(crate) fn assert_error(world: &mut World, id: &str, label: &str, message: Option<String>) -> Result<()> {
    match message {
        Some(message) => set_error(world, id, label, message),
        None => clear_error(world, id, label),
    }
}
