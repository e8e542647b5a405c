use anyhow::Result;
use chrono::Utc;

use tutor_lib::content::ContentProvider;
use tutor_lib::scheduler::{derive_review_candidates, review_prompt, ReviewFilters, ReviewWindow};

use crate::app::App;
use crate::render::terminal::{column_width, paint, strength_bar, truncate, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    module: Option<String>,
    domain: Option<String>,
    limit: Option<usize>,
    window: Option<ReviewWindow>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut filters = app.config.review.filters();
    filters.module_id = module;
    filters.domain_id = domain;
    if let Some(limit) = limit {
        filters.limit = Some(limit);
    }
    if let Some(window) = window {
        filters.window = window;
    }

    let now = Utc::now();
    let mut rng = app.rng();
    let candidates = derive_review_candidates(app.tracker.snapshot(), now, &filters, &mut rng);

    match format {
        OutputFormat::Json => {
            let output = candidates
                .iter()
                .map(|c| {
                    let prompt = app
                        .catalog
                        .node(&c.module_id, c.domain_index, c.node_index)
                        .map(|node| review_prompt(c.chosen_epic_component, node));
                    let mut value = serde_json::to_value(c)?;
                    value["prompt"] = serde_json::json!(prompt);
                    Ok(value)
                })
                .collect::<serde_json::Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if candidates.is_empty() {
                println!("No reviews{}.", window_label(&filters));
                return Ok(());
            }

            let titles: Vec<String> = candidates
                .iter()
                .map(|c| {
                    app.catalog
                        .node(&c.module_id, c.domain_index, c.node_index)
                        .map(|n| n.title.clone())
                        .unwrap_or_else(|| c.node_id.clone())
                })
                .collect();
            let title_width = column_width(titles.iter().map(String::as_str), "Node", 32);

            println!(
                "{}",
                paint(
                    &format!("{:<tw$} {:<12} {:<10} {:>8}  {:<10} {}", "Node", "Module", "Strength", "Priority", "Component", "Due", tw = title_width),
                    Color::BOLD,
                    use_color,
                )
            );

            for (candidate, title) in candidates.iter().zip(&titles) {
                let due = if candidate.is_due {
                    paint("overdue", Color::RED, use_color)
                } else {
                    candidate.due_date.format("%Y-%m-%d %H:%M").to_string()
                };
                println!(
                    "{:<tw$} {:<12} {} {:>8.1}  {:<10} {}",
                    truncate(title, title_width),
                    truncate(&candidate.module_id, 12),
                    strength_bar(candidate.current_memory_strength, use_color),
                    candidate.priority_score,
                    format!("{:?}", candidate.chosen_epic_component).to_lowercase(),
                    due,
                    tw = title_width,
                );
            }

            println!(
                "\n{}",
                paint(&format!("{} reviews{}", candidates.len(), window_label(&filters)), Color::DIM, use_color)
            );
        }
    }

    Ok(())
}

fn window_label(filters: &ReviewFilters) -> &'static str {
    match filters.window {
        ReviewWindow::All => "",
        ReviewWindow::Due => " due now",
        ReviewWindow::Today => " due today",
        ReviewWindow::Week => " due this week",
    }
}
