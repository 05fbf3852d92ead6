//! Display consumer: keeps visual regions in sync with derived state

use crate::errors::active_errors;
use nest_core::{Color, EntityId, Result};
use nest_world::{props, Value, World};
use std::cell::RefCell;
use std::rc::Rc;

/// A visual region that can show text and a tint
pub trait RegionSurface {
    fn set_text(&mut self, text: &str);
    /// `None` clears the tint
    fn set_color(&mut self, color: Option<Color>);
}

pub type SharedSurface = Rc<RefCell<dyn RegionSurface>>;

/// In-memory surface recording the last text and color it was given
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSurface {
    pub text: String,
    pub color: Option<Color>,
}

impl RegionSurface for TextSurface {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }
}

const DISPLAY_LABEL: &str = "display";

/// Text shown on an entity's regions: the id, its units (or aggregated
/// total when it has no units of its own), then every active error.
pub fn render_text(world: &World, id: &str) -> Result<String> {
    let mut lines = vec![id.to_string()];

    let units = world.value(id, props::UNITS)?.and_then(Value::as_number);
    let total = world.value(id, props::TOTAL_UNITS)?.and_then(Value::as_number);
    match (units, total) {
        (Some(units), _) => lines.push(format!("{units} units")),
        (None, Some(total)) => lines.push(format!("{total} units total")),
        (None, None) => {}
    }

    lines.extend(active_errors(world, id)?);
    Ok(lines.join("\n"))
}

fn paint(world: &World, id: &str, surfaces: &[SharedSurface]) -> Result<()> {
    let text = render_text(world, id)?;
    let color = (!active_errors(world, id)?.is_empty()).then_some(Color::ERROR_TINT);
    for surface in surfaces {
        let mut surface = surface.borrow_mut();
        surface.set_text(&text);
        surface.set_color(color);
    }
    Ok(())
}

/// Repaint `surfaces` whenever the entity's errors or units change, and
/// paint them once now.
pub fn attach_display(world: &mut World, id: &str, surfaces: Vec<SharedSurface>) -> Result<()> {
    let owner = EntityId::from(id);
    let surfaces = Rc::new(surfaces);

    for prop in [props::ERRORS, props::TOTAL_UNITS, props::UNITS] {
        let owner = owner.clone();
        let surfaces = Rc::clone(&surfaces);
        world.subscribe(id, prop, DISPLAY_LABEL, move |w, _| paint(w, &owner, &surfaces))?;
    }

    paint(world, id, &surfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{clear_error, set_error};

    fn surface() -> (Rc<RefCell<TextSurface>>, SharedSurface) {
        let concrete = Rc::new(RefCell::new(TextSurface::default()));
        let shared: SharedSurface = concrete.clone();
        (concrete, shared)
    }

    #[test]
    fn test_render_text() {
        let mut world = World::new();
        world.spawn("MATH 19", "class").unwrap();
        world.spawn("Fall 2022-23", "quarter").unwrap();
        world.set_number("MATH 19", props::UNITS, 3.0).unwrap();
        world.set_number("Fall 2022-23", props::TOTAL_UNITS, 25.0).unwrap();
        set_error(&mut world, "Fall 2022-23", "units-max", ">22 units").unwrap();

        assert_eq!(render_text(&world, "MATH 19").unwrap(), "MATH 19\n3 units");
        assert_eq!(
            render_text(&world, "Fall 2022-23").unwrap(),
            "Fall 2022-23\n25 units total\n>22 units"
        );
    }

    #[test]
    fn test_surfaces_follow_errors() {
        let mut world = World::new();
        world.spawn("q", "quarter").unwrap();
        let (first, first_shared) = surface();
        let (second, second_shared) = surface();
        attach_display(&mut world, "q", vec![first_shared, second_shared]).unwrap();
        assert_eq!(first.borrow().text, "q");
        assert_eq!(first.borrow().color, None);

        set_error(&mut world, "q", "units-max", ">22 units").unwrap();
        set_error(&mut world, "q", "already-taken", "q already taken").unwrap();
        for s in [&first, &second] {
            assert_eq!(s.borrow().text, "q\nq already taken\n>22 units");
            assert_eq!(s.borrow().color, Some(Color::ERROR_TINT));
        }

        clear_error(&mut world, "q", "units-max").unwrap();
        clear_error(&mut world, "q", "already-taken").unwrap();
        assert_eq!(second.borrow().text, "q");
        assert_eq!(second.borrow().color, None);
    }

    #[test]
    fn test_units_change_repaints() {
        let mut world = World::new();
        world.spawn("q", "quarter").unwrap();
        let (concrete, shared) = surface();
        attach_display(&mut world, "q", vec![shared]).unwrap();

        world.set_number("q", props::TOTAL_UNITS, 7.5).unwrap();
        assert_eq!(concrete.borrow().text, "q\n7.5 units total");
    }
}
