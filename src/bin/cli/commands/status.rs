use anyhow::Result;
use chrono::Utc;

use tutor_lib::scheduler::summarize_module;
use tutor_lib::session::InteractionState;

use crate::app::App;
use crate::render::terminal::{column_width, paint, strength_bar, truncate, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let now = Utc::now();
    let summaries: Vec<_> = app
        .tracker
        .snapshot()
        .modules
        .iter()
        .map(|module| summarize_module(module, now))
        .collect();
    let state = app
        .cursor
        .as_ref()
        .map(|c| InteractionState::restore(&c.interaction_state))
        .unwrap_or_default();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "dataDir": app.data_dir.to_string_lossy(),
                "interactionState": state,
                "cursor": app.cursor,
                "modules": summaries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Data: {}", app.data_dir.display());
            println!("State: {}", state);
            if let Some(cursor) = &app.cursor {
                if let (Some(module), Some(node)) = (&cursor.current_module, &cursor.current_node) {
                    println!("Current: {} / {}", module, node);
                }
            }
            println!();

            if summaries.is_empty() {
                println!("No progress yet.");
                return Ok(());
            }

            let title_width = column_width(summaries.iter().map(|s| s.title.as_str()), "Module", 32);
            println!(
                "{}",
                paint(
                    &format!("{:<tw$} {:>5} {:>5} {:>5} {:>5} {:>5}  {}", "Module", "New", "Fam", "Und", "Rev", "Due", "Strength", tw = title_width),
                    Color::BOLD,
                    use_color,
                )
            );

            for s in &summaries {
                let strength = match s.average_strength {
                    Some(avg) => format!("{} {:.0}", strength_bar(avg, use_color), avg),
                    None => paint("not reviewed", Color::DIM, use_color),
                };
                println!(
                    "{:<tw$} {:>5} {:>5} {:>5} {:>5} {:>5}  {}",
                    truncate(&s.title, title_width),
                    s.new_nodes,
                    s.familiar_nodes,
                    s.understood_nodes,
                    s.needs_review_nodes,
                    s.due_nodes,
                    strength,
                    tw = title_width,
                );
            }

            let due: usize = summaries.iter().map(|s| s.due_nodes).sum();
            println!("\n{} nodes due for review", due);
        }
    }

    Ok(())
}
