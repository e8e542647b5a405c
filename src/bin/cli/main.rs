mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tutor_lib::scheduler::ReviewWindow;

#[derive(Parser)]
#[command(name = "tutor-cli", about = "Inspect tutor progress and scheduled reviews", version)]
struct Cli {
    /// Data directory (default: from config, else the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Content catalog file (default: <data-dir>/catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Config file (default: <config-dir>/tutor/tutor.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum WindowArg {
    All,
    Due,
    Today,
    Week,
}

impl From<WindowArg> for ReviewWindow {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::All => ReviewWindow::All,
            WindowArg::Due => ReviewWindow::Due,
            WindowArg::Today => ReviewWindow::Today,
            WindowArg::Week => ReviewWindow::Week,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List modules with their library status
    Modules,

    /// List review candidates, highest priority first
    Reviews {
        /// Only nodes of this module
        #[arg(long)]
        module: Option<String>,
        /// Only nodes of this domain
        #[arg(long)]
        domain: Option<String>,
        /// Maximum results (default: from config)
        #[arg(long)]
        limit: Option<usize>,
        /// Due window (default: from config)
        #[arg(long)]
        window: Option<WindowArg>,
    },

    /// Progress overview per module
    Status,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();

    let app = app::App::new(
        cli.config.as_deref(),
        cli.data_dir.clone(),
        cli.catalog.clone(),
    )?;

    match cli.command {
        Command::Modules => {
            commands::modules::run(&app, &cli.format, use_color)?;
        }
        Command::Reviews { module, domain, limit, window } => {
            commands::reviews::run(
                &app,
                module,
                domain,
                limit,
                window.map(ReviewWindow::from),
                &cli.format,
                use_color,
            )?;
        }
        Command::Status => {
            commands::status::run(&app, &cli.format, use_color)?;
        }
    }

    Ok(())
}
