use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(dir: &Path, id: u32) -> Result<(), String> {
    let (store, _) = super::load_dir(dir)?;
    let scenario = store.get(id).map_err(|e| e.to_string())?;

    println!("  {} [{}]", scenario.name.bold(), format!("Scenario{id}").dimmed());
    println!();

    for element_id in scenario.tree.flatten() {
        let Some(element) = scenario.element(element_id) else {
            continue;
        };
        let indent = "  ".repeat(scenario.tree.depth(element_id) + 1);
        let text = element
            .learner_text()
            .or_else(|| element.answer_text())
            .unwrap_or("");
        let score = if element.score != 0 {
            format!(" ({})", element.score)
        } else {
            String::new()
        };
        println!(
            "{indent}{} {}{score}  {text}",
            element_id.to_string().dimmed(),
            element.category.to_string().cyan()
        );
        if !element.triggers.is_empty() {
            let names: Vec<_> = element.triggers.iter().map(|t| t.name()).collect();
            println!("{indent}    -> {}", names.join(", ").yellow());
        }
    }

    println!();
    if scenario.timing.is_empty() {
        println!("  No timing table.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Within (s)", "Points"]);
    for row in scenario.timing.rows() {
        table.add_row(vec![row.time_seconds.to_string(), row.points.to_string()]);
    }
    println!("{table}");

    Ok(())
}
