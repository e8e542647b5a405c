use anyhow::Result;

use tutor_lib::content::ContentProvider;
use tutor_lib::progress::NodeStatus;

use crate::app::App;
use crate::render::terminal::{column_width, paint, truncate, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let modules = app.catalog.modules();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = modules
                .iter()
                .map(|module| {
                    let progress = app.tracker.module(&module.id);
                    serde_json::json!({
                        "id": module.id,
                        "title": module.title,
                        "type": module.module_type,
                        "status": progress.map(|p| p.status),
                        "domains": module.domains.len(),
                        "nodes": module.domains.iter().map(|d| d.nodes.len()).sum::<usize>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if modules.is_empty() {
                println!("No modules in catalog.");
                return Ok(());
            }

            let title_width = column_width(modules.iter().map(|m| m.title.as_str()), "Title", 40);

            println!(
                "{}",
                paint(
                    &format!("{:<tw$} {:<10} {:<12} {:>5} {:>9}", "Title", "Type", "Status", "Nodes", "Learned", tw = title_width),
                    Color::BOLD,
                    use_color,
                )
            );
            println!("{}", "\u{2500}".repeat(title_width + 41));

            for module in modules {
                let Some(progress) = app.tracker.module(&module.id) else {
                    continue;
                };
                let total = progress.nodes().count();
                let learned = progress
                    .nodes()
                    .filter(|(_, _, n)| n.status != NodeStatus::New)
                    .count();

                println!(
                    "{:<tw$} {:<10} {:<12} {:>5} {:>9}",
                    truncate(&module.title, title_width),
                    format!("{:?}", module.module_type).to_lowercase(),
                    format!("{:?}", progress.status),
                    total,
                    format!("{}/{}", learned, total),
                    tw = title_width,
                );
            }

            println!("\n{} modules total", modules.len());
        }
    }

    Ok(())
}
