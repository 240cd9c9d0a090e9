use std::path::Path;

pub fn run(dir: &Path) -> Result<(), String> {
    let (store, report) = super::load_dir(dir)?;

    if !report.is_complete() {
        return Err(format!(
            "{} file{} could not be loaded",
            report.skipped.len(),
            super::plural(report.skipped.len())
        ));
    }

    let elements: usize = store
        .scenarios()
        .map_err(|e| e.to_string())?
        .map(|s| s.tree.len())
        .sum();
    println!("  All checks passed for '{}'.", dir.display());
    println!(
        "  {} scenario{}, {} element{}, {} warning{}",
        store.len(),
        super::plural(store.len()),
        elements,
        super::plural(elements),
        report.warnings.len(),
        super::plural(report.warnings.len())
    );

    Ok(())
}
