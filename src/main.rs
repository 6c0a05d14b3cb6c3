mod app;
mod graph;
mod interaction;
mod simulation;
mod transform;
mod util;
mod vector;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph to open on startup.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Default path for the import and export buttons.
    #[arg(long, default_value = "graph.json")]
    file: PathBuf,

    /// Start with the force simulation paused.
    #[arg(long)]
    no_forces: bool,

    /// Start with a directed graph.
    #[arg(long)]
    directed: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    let settings = app::Settings {
        startup_graph: args.graph,
        file_path: args.file,
        forces_enabled: !args.no_forces,
        directed: args.directed,
    };

    eframe::run_native(
        "Grafatko",
        options,
        Box::new(move |cc| Ok(Box::new(app::GrafatkoApp::new(cc, settings)))),
    )
    .map_err(|error| anyhow::anyhow!("failed to run the window: {error}"))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
