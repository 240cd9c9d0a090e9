//! Property-based tests for the dialogue state machine.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use tt_core::tree::element;
use tt_core::{Category, ElementId, ElementTree, Scenario, TimingTable, Trigger, Utterance};

use super::*;
use crate::config::DialogueConfig;

// ============================================================================
// Generators
// ============================================================================

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::TransferCenter),
        Just(Category::PresentIllnessHistory),
        Just(Category::ElicitedHistory),
        Just(Category::Disposition),
    ]
}

/// (category, parent slot, carries Connect, asks bed status)
fn arb_node() -> impl Strategy<Value = (Category, Option<usize>, bool, bool)> {
    (arb_category(), prop::option::of(0usize..8), any::<bool>(), any::<bool>())
}

fn build_scenario(nodes: Vec<(Category, Option<usize>, bool, bool)>) -> Scenario {
    let config = DialogueConfig::default();
    let mut tree = ElementTree::new();
    for (index, (category, parent, connect, bed)) in nodes.into_iter().enumerate() {
        let text = if bed {
            config.bed_status_phrase.clone()
        } else {
            format!("line {index}")
        };
        let mut el = element(
            category,
            Some(Utterance::new("Learner", "OSH", text)),
            Some(Utterance::new("OSH", "Learner", "ok")),
        );
        el.score = 1;
        if connect {
            el.triggers.push(Trigger::Connect);
        }
        // Parents must already exist, which keeps the arena acyclic.
        match parent.filter(|&p| p < index) {
            Some(p) => {
                tree.add_child(ElementId(p), el);
            }
            None => {
                tree.add_root(el);
            }
        }
    }
    Scenario::new(1, "generated", tree, TimingTable::default())
}

fn arb_scenario_and_inputs() -> impl Strategy<Value = (Scenario, Vec<usize>)> {
    (
        prop::collection::vec(arb_node(), 1..12),
        prop::collection::vec(0usize..12, 0..40),
    )
        .prop_map(|(nodes, inputs)| (build_scenario(nodes), inputs))
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    #[test]
    fn monotone_progress((scenario, inputs) in arb_scenario_and_inputs()) {
        let config = DialogueConfig::default();
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut state = transition(
            &DialogueState::new(&scenario),
            &scenario,
            &config,
            Event::Start { at: t0 },
        )
        .unwrap()
        .new_state;

        for (step, pick) in inputs.into_iter().enumerate() {
            let event = Event::Apply {
                element: ElementId(pick),
                at: t0 + Duration::seconds(step as i64),
            };
            match transition(&state, &scenario, &config, event) {
                Ok(result) => {
                    let next = result.new_state;
                    // Connection never reverts.
                    prop_assert!(!state.connected || next.connected);
                    // Visibility only grows and keeps its order.
                    prop_assert!(next.visible.len() >= state.visible.len());
                    prop_assert_eq!(
                        &next.visible.as_slice()[..state.visible.len()],
                        state.visible.as_slice()
                    );
                    // Bed status is recorded at most once.
                    if state.bed_status != BedStatusAsked::NotAsked {
                        prop_assert_eq!(next.bed_status, state.bed_status);
                    }
                    // The applied element is now visited.
                    prop_assert!(next.visits.is_visited(ElementId(pick)));
                    state = next;
                }
                Err(err) => prop_assert!(err.is_state_violation()),
            }
        }
    }

    #[test]
    fn connected_effect_fires_at_most_once((scenario, inputs) in arb_scenario_and_inputs()) {
        let config = DialogueConfig::default();
        let at = Utc::now();
        let start = Event::Start { at };
        let mut state = transition(&DialogueState::new(&scenario), &scenario, &config, start)
            .unwrap()
            .new_state;
        let mut connects = 0;
        for pick in inputs {
            let apply = Event::Apply { element: ElementId(pick), at };
            if let Ok(result) = transition(&state, &scenario, &config, apply) {
                connects += result.effects.iter().filter(|e| **e == Effect::Connected).count();
                state = result.new_state;
            }
        }
        prop_assert!(connects <= 1);
        prop_assert_eq!(connects == 1, state.connected);
    }
}
