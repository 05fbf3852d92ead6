//! Region placement command

use super::{load_catalog, open_world};
use anyhow::{Context, Result};
use nest_core::Rect;
use nest_layout::{save_snapshot, FileStore};
use nest_relation::move_region;
use nest_rules::{render_text, ValidationReport};
use std::collections::{BTreeMap, BTreeSet};

pub struct PlaceArgs {
    pub catalog: String,
    pub id: String,
    pub index: usize,
    /// left, top, right, bottom
    pub edges: [f64; 4],
    pub layout: String,
}

pub fn run(args: PlaceArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let mut store = FileStore::new(&args.layout);
    let mut world = open_world(&catalog, Some(&store))?;

    let [left, top, right, bottom] = args.edges;
    let rect = Rect::from_edges(left, top, right, bottom)
        .with_context(|| format!("Invalid region for {}", args.id))?;

    let before = errors_by_entity(&ValidationReport::collect(&world)?);
    let change = move_region(&mut world, &args.id, args.index, rect)?;
    let after = errors_by_entity(&ValidationReport::collect(&world)?);

    println!(
        "Moved {} region {} ({} parent change(s), {} child change(s))",
        args.id,
        args.index,
        change.parents.len(),
        change.children.len()
    );

    let empty = Vec::new();
    let touched: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    let mut changed = 0;
    for id in touched {
        if before.get(id).unwrap_or(&empty) == after.get(id).unwrap_or(&empty) {
            continue;
        }
        changed += 1;
        println!();
        for line in render_text(&world, id)?.lines() {
            println!("  {}", line);
        }
    }
    if changed == 0 {
        println!("No error changes.");
    }

    if save_snapshot(&mut store, &world)? {
        println!("\nLayout saved to {}", args.layout);
    } else {
        println!("\nLayout unchanged.");
    }
    Ok(())
}

fn errors_by_entity(report: &ValidationReport) -> BTreeMap<String, Vec<String>> {
    report
        .entities
        .iter()
        .map(|e| (e.id.to_string(), e.errors.clone()))
        .collect()
}
