use std::collections::VecDeque;
use std::path::PathBuf;

use eframe::egui::Context;

use crate::graph::{Graph, GraphFlags, NodeId};
use crate::interaction::Canvas;
use crate::simulation::{Simulation, SimulationConfig};

mod graph;
mod render_utils;
mod ui;

/// Startup options collected from the command line.
pub struct Settings {
    pub startup_graph: Option<PathBuf>,
    pub file_path: PathBuf,
    pub forces_enabled: bool,
    pub directed: bool,
}

pub struct GrafatkoApp {
    canvas: Canvas,
    file_path: String,
    pending_import: Option<PathBuf>,
    label_text: String,
    label_source: Vec<NodeId>,
    weight_text: String,
    status: Option<Status>,
    tick_accumulator_secs: f32,
    input: InputTracker,
    show_fps: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

enum Status {
    Info(String),
    Error(String),
}

/// Modifier and pointer state seen on the previous frame, used to turn
/// egui's per-frame input into press and release events.
#[derive(Default)]
struct InputTracker {
    group: bool,
    rotate: bool,
    center: bool,
    pointer: Option<eframe::egui::Pos2>,
}

impl GrafatkoApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let flags = GraphFlags {
            directed: settings.directed,
            show_labels: true,
            ..GraphFlags::default()
        };
        let config = SimulationConfig {
            forces_enabled: settings.forces_enabled,
            ..SimulationConfig::default()
        };

        Self {
            canvas: Canvas::new(Graph::with_flags(flags), config, Simulation::new()),
            file_path: settings.file_path.display().to_string(),
            pending_import: settings.startup_graph,
            label_text: String::new(),
            label_source: Vec::new(),
            weight_text: String::new(),
            status: None,
            tick_accumulator_secs: 0.0,
            input: InputTracker::default(),
            show_fps: false,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }
}

impl eframe::App for GrafatkoApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}
