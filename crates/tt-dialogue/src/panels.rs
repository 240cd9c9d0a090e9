//! Patient-info panel content carried in element answers.

use serde_json::{Map, Value};
use tracing::warn;
use tt_core::{Category, ElementId, Scenario, VisibleSet};

/// Key/value pairs from the flat JSON object in an answer text, in document
/// order. Strings are taken as-is; every other value, including `null`,
/// arrays and nested objects, is kept as its compact JSON text.
pub fn parse_flat_object(text: &str) -> Option<Vec<(String, String)>> {
    let map: Map<String, Value> = serde_json::from_str(text).ok()?;
    Some(
        map.into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect(),
    )
}

/// Panel entries from every visible element of `category`, in visible order.
/// Elements whose answer is not a flat JSON object are logged and skipped.
pub fn panel_entries(
    scenario: &Scenario,
    visible: &VisibleSet,
    category: &Category,
) -> Vec<(String, String)> {
    visible
        .iter()
        .filter_map(|id| scenario.element(id))
        .filter(|el| &el.category == category)
        .flat_map(|el| {
            let entries = el.answer_text().and_then(parse_flat_object);
            if entries.is_none() {
                log_bad_panel(el.id, category);
            }
            entries.unwrap_or_default()
        })
        .collect()
}

fn log_bad_panel(element: ElementId, category: &Category) {
    warn!(%element, %category, "panel content is not a flat JSON object");
}
