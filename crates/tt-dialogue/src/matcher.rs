//! Matching typed learner input against visible scripted elements.

use strsim::levenshtein;
use tt_core::{Category, ElementId, ElementTree, VisibleSet};

/// Characters that separate tokens, in addition to whitespace.
const SEPARATORS: [char; 5] = [',', '.', ';', ':', '!'];

/// Normalized edit-distance similarity in `0.0..=1.0`.
///
/// Identical strings score 1.0; if either side is empty the score is 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Lowercase and split input into non-empty tokens.
pub fn tokenize(input: &str) -> Vec<String> {
    input
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether any token hits the keyword by substring or by similarity.
fn keyword_matches(keyword: &str, tokens: &[String], threshold: f64) -> bool {
    let keyword = keyword.to_lowercase();
    tokens
        .iter()
        .any(|token| keyword.contains(token.as_str()) || similarity(token, &keyword) > threshold)
}

/// Visible elements of `topic` whose keywords match `input`, in visible-set
/// order. Each element appears at most once.
pub fn resolve(
    tree: &ElementTree,
    topic: &Category,
    input: &str,
    visible: &VisibleSet,
    threshold: f64,
) -> Vec<ElementId> {
    if topic.is_empty() {
        return Vec::new();
    }
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Vec::new();
    }

    visible
        .iter()
        .filter_map(|id| tree.get(id))
        .filter(|element| &element.category == topic && element.is_well_formed())
        .filter(|element| {
            element
                .matches
                .iter()
                .any(|keyword| keyword_matches(keyword, &tokens, threshold))
        })
        .map(|element| element.id)
        .collect()
}

/// The first visible element whose learner line is exactly `input` and
/// whose category passes `in_scope`.
pub fn find_exact(
    tree: &ElementTree,
    visible: &VisibleSet,
    input: &str,
    in_scope: impl Fn(&Category) -> bool,
) -> Option<ElementId> {
    visible
        .iter()
        .filter_map(|id| tree.get(id))
        .filter(|element| element.is_well_formed() && in_scope(&element.category))
        .find(|element| element.learner_text() == Some(input))
        .map(|element| element.id)
}
