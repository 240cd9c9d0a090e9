use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use serde_json::json;

pub fn run(dir: &Path, as_json: bool) -> Result<(), String> {
    let (store, _) = super::load_dir(dir)?;
    let config = store.config().map_err(|e| e.to_string())?;
    let scenarios: Vec<_> = store.scenarios().map_err(|e| e.to_string())?.collect();

    if as_json {
        let rows: Vec<_> = scenarios
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "elements": s.tree.len(),
                    "timingMax": s.timing.max_points(),
                })
            })
            .collect();
        let out = serde_json::to_string_pretty(&rows).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    if let Some(config) = config {
        if !config.description.is_empty() {
            println!("  {}", config.description);
        }
        if config.scenario_count as usize != scenarios.len() {
            println!(
                "  config lists {} scenario{}",
                config.scenario_count,
                super::plural(config.scenario_count as usize)
            );
        }
    }

    if scenarios.is_empty() {
        println!("  No scenarios found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Elements", "Timing max"]);
    for scenario in &scenarios {
        table.add_row(vec![
            scenario.id.to_string(),
            scenario.name.clone(),
            scenario.tree.len().to_string(),
            scenario.timing.max_points().to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} scenario{}", scenarios.len(), super::plural(scenarios.len()));

    Ok(())
}
