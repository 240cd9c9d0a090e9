//! Line-based play loop.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use tt_core::{Category, ElementId, ScoreBucket, Trigger};
use tt_dialogue::{DialogueResult, Fragment, FragmentKind, Presenter};
use tt_session::{
    SavedRecord, ScoreSummary, SessionConfig, SessionPresenter, TrainingSession,
    validate_learner_id,
};

const HELP: &str = "\
  topic <name>   select the topic for `?`
  ? <text>       list matching options
  <n>            pick option n
  vitals, labs   show the patient panels
  status         show the attempt status
  end            end and score the scenario
  exit           leave the scenario and void its totals
  quit           save the session record and leave
  anything else is said to the current party";

/// Writes dialogue to stdout as it is delivered.
struct Terminal;

impl Presenter for Terminal {
    fn on_text_fragment(&mut self, fragment: &Fragment) {
        match (fragment.kind, fragment.from_learner) {
            (FragmentKind::Label, true) => print!("{}", fragment.text.green().bold()),
            (FragmentKind::Label, false) => print!("{}", fragment.text.cyan().bold()),
            (FragmentKind::Pause, _) => {
                let _ = io::stdout().flush();
            }
            _ => print!("{}", fragment.text),
        }
    }

    fn on_delivery_complete(&mut self) {
        println!();
        let _ = io::stdout().flush();
    }

    fn on_side_effect(&mut self, trigger: &Trigger) -> DialogueResult<()> {
        println!("  {}", format!("[{}]", trigger.name()).dimmed());
        Ok(())
    }
}

impl SessionPresenter for Terminal {
    fn on_score_finalized(&mut self, summary: &ScoreSummary) {
        print_summary(summary);
    }
}

fn print_summary(summary: &ScoreSummary) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Earned", "Max"]);
    let buckets = [
        ("Present illness", ScoreBucket::PresentIllnessHistory),
        ("Elicited history", ScoreBucket::ElicitedHistory),
        ("Interventions", ScoreBucket::Interventions),
        ("Actions", ScoreBucket::Actions),
    ];
    for (label, bucket) in buckets {
        let tally = summary.bucket(bucket);
        table.add_row(vec![label.to_string(), tally.earned.to_string(), tally.max.to_string()]);
    }
    let timing = summary.timing();
    table.add_row(vec!["Timing".to_string(), timing.earned.to_string(), timing.max.to_string()]);
    table.add_row(vec![
        "Total".to_string(),
        summary.total_points.to_string(),
        summary.total_max.to_string(),
    ]);

    println!();
    println!("  {} {}", "Scored".bold(), summary.scenario_name);
    println!("{table}");
    println!("  {:.1}s, bed status {:?}", summary.time_elapsed_seconds, summary.bed_status_asked);
}

/// What to print when the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Export {
    Json,
    Text,
}

impl Export {
    fn parse(format: &str) -> Result<Self, String> {
        match format {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("unsupported export format: \"{format}\". Use: json, text")),
        }
    }
}

pub fn run(dir: &Path, id: u32, config: SessionConfig, export: &str) -> Result<(), String> {
    let export = Export::parse(export)?;
    validate_learner_id(&config.learner_id).map_err(|e| e.to_string())?;
    let (store, _) = super::load_dir(dir)?;
    let mut session = TrainingSession::new(Arc::new(store), config);
    let mut terminal = Terminal;

    session
        .start_scenario(id, &mut terminal)
        .map_err(|e| e.to_string())?;
    session.drain(&mut terminal);
    println!("  {}", "Type `help` for commands.".dimmed());

    let mut options: Vec<ElementId> = Vec::new();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let result = match input {
            "quit" => break,
            "help" => {
                println!("{HELP}");
                Ok(())
            }
            "vitals" => {
                print_panel("Vital signs", session.active().map(|d| d.vital_signs()));
                Ok(())
            }
            "labs" => {
                print_panel("Labs", session.active().map(|d| d.lab_results()));
                Ok(())
            }
            "status" => {
                print_status(&session);
                Ok(())
            }
            "end" => session.end_scenario(&mut terminal).map(|_| ()),
            "exit" => {
                session.exit_scenario();
                println!("  Scenario left; totals voided.");
                Ok(())
            }
            _ => {
                if let Some(name) = input.strip_prefix("topic ") {
                    let topic = Category::from_topic_name(name)
                        .unwrap_or_else(|| Category::parse(name.trim()));
                    println!("  topic: {topic}");
                    session.set_topic(topic)
                } else if let Some(query) = input.strip_prefix('?') {
                    options = session.options(query.trim());
                    print_options(&session, &options);
                    Ok(())
                } else if let Ok(n) = input.parse::<usize>() {
                    match n.checked_sub(1).and_then(|i| options.get(i)) {
                        Some(&element) => session.choose(element, &mut terminal).map(|_| ()),
                        None => {
                            println!("  No option {n}.");
                            Ok(())
                        }
                    }
                } else {
                    session.say(input, &mut terminal).map(|_| ())
                }
            }
        };

        if let Err(e) = result {
            eprintln!("error: {e}");
        }
        session.drain(&mut terminal);
    }

    let saved = session.end_session().map_err(|e| e.to_string())?;
    print_saved(&saved, export)
}

/// Report where the record went, then print it in the chosen format. JSON
/// is only printed when the record was not written to disk.
fn print_saved(saved: &SavedRecord, export: Export) -> Result<(), String> {
    if let Some(path) = &saved.path {
        println!("  Session record written to {}", path.display());
    }
    match export {
        Export::Text => print!("{}", saved.record.export_text()),
        Export::Json if saved.path.is_none() => {
            let json = saved.record.to_json().map_err(|e| e.to_string())?;
            println!("{json}");
        }
        Export::Json => {}
    }
    Ok(())
}

fn print_options(session: &TrainingSession, options: &[ElementId]) {
    let Some(dialogue) = session.active() else {
        println!("  No scenario running.");
        return;
    };
    if options.is_empty() {
        println!("  No options.");
        return;
    }
    for (i, &id) in options.iter().enumerate() {
        let text = dialogue
            .scenario()
            .element(id)
            .and_then(|e| e.learner_text())
            .unwrap_or("");
        println!("  {}. {text}", i + 1);
    }
}

fn print_panel(title: &str, entries: Option<Vec<(String, String)>>) {
    let entries = entries.unwrap_or_default();
    if entries.is_empty() {
        println!("  {title}: nothing yet.");
        return;
    }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![title, ""]);
    for (key, value) in entries {
        table.add_row(vec![key, value]);
    }
    println!("{table}");
}

fn print_status(session: &TrainingSession) {
    let Some(dialogue) = session.active() else {
        println!("  No scenario running; {} scored.", session.ledger().len());
        return;
    };
    println!("  scenario:   {}", dialogue.scenario().name);
    println!("  topic:      {}", dialogue.topic());
    println!("  connected:  {}", dialogue.is_connected());
    println!("  bed status: {:?}", dialogue.bed_status());
    println!("  visited:    {}", dialogue.state().visits.visited_count());
    println!("  elapsed:    {:.0}s", dialogue.elapsed_secs(Utc::now()));
}
