use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, Ui};
use tracing::warn;

use crate::util::{format_weight, parse_weight};

use super::super::{GrafatkoApp, Status};

impl GrafatkoApp {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            self.draw_graph_controls(ui);
            ui.separator();
            self.draw_simulation_controls(ui);
            ui.separator();
            self.draw_selection_controls(ui);
            ui.separator();
            self.draw_file_controls(ui);
            ui.separator();
            self.draw_help(ui);
        });
    }

    fn draw_graph_controls(&mut self, ui: &mut Ui) {
        ui.strong("Graph");

        let mut flags = self.canvas.graph().flags();
        let graph = self.canvas.graph_mut();

        if ui
            .checkbox(&mut flags.directed, "Directed")
            .on_hover_text("Edges have an orientation. Turning it off merges opposite edges.")
            .changed()
        {
            graph.set_directed(flags.directed);
        }
        if ui
            .checkbox(&mut flags.weighted, "Weighted")
            .on_hover_text("Show and edit edge weights.")
            .changed()
        {
            graph.set_weighted(flags.weighted);
        }
        if ui
            .checkbox(&mut flags.multi, "Multigraph")
            .on_hover_text("Allow parallel edges. Turning it off merges them.")
            .changed()
        {
            graph.set_multi(flags.multi);
        }
        if ui
            .checkbox(&mut flags.self_loops, "Self-loops")
            .on_hover_text("Allow edges from a node to itself.")
            .changed()
        {
            graph.set_self_loops(flags.self_loops);
        }
        if ui.checkbox(&mut flags.show_labels, "Labels").changed() {
            graph.set_show_labels(flags.show_labels);
        }

        ui.horizontal(|ui| {
            if ui
                .button("Complement")
                .on_hover_text("Replace the edges with every missing edge.")
                .clicked()
            {
                graph.complement();
            }
            if ui
                .add_enabled(flags.directed, egui::Button::new("Reorient"))
                .on_hover_text("Reverse every edge.")
                .clicked()
            {
                graph.reorient();
            }
        });
    }

    fn draw_simulation_controls(&mut self, ui: &mut Ui) {
        ui.strong("Simulation");

        let config = self.canvas.config_mut();
        ui.checkbox(&mut config.forces_enabled, "Forces")
            .on_hover_text("Run the force-directed layout.");
        ui.checkbox(&mut config.layering, "Tree layering")
            .on_hover_text("Line up nodes by their distance from the root.");
        ui.add_enabled(
            config.layering,
            egui::Slider::new(&mut config.tree_coefficient, 0.0..=1.0).text("Layer pull"),
        );

        let mut gravity = config.gravity.y();
        if ui
            .add(egui::Slider::new(&mut gravity, 0.0..=1.0).text("Gravity"))
            .on_hover_text("Downward pull on the component containing the root.")
            .changed()
        {
            config.gravity = crate::vector::Vec2::new(config.gravity.x(), gravity);
        }

        ui.checkbox(&mut self.show_fps, "FPS display");
    }

    fn draw_selection_controls(&mut self, ui: &mut Ui) {
        ui.strong("Selection");

        let selected = self.canvas.graph().selected_nodes();
        if selected != self.label_source {
            self.label_text = selected
                .first()
                .and_then(|id| self.canvas.graph().node(*id))
                .map(|node| node.label().to_owned())
                .unwrap_or_default();
            self.label_source = selected.clone();
        }

        ui.add_enabled_ui(!selected.is_empty(), |ui| {
            ui.horizontal(|ui| {
                ui.label("Label");
                if ui.text_edit_singleline(&mut self.label_text).changed() {
                    self.canvas.set_selected_label(&self.label_text);
                }
            });
        });

        let weighted = self.canvas.graph().flags().weighted;
        ui.add_enabled_ui(weighted && selected.len() > 1, |ui| {
            ui.horizontal(|ui| {
                ui.label("Weight");
                ui.add(egui::TextEdit::singleline(&mut self.weight_text).desired_width(80.0));
                if ui
                    .button("Apply")
                    .on_hover_text("Set the weight of every edge between selected nodes.")
                    .clicked()
                {
                    self.apply_weight();
                }
            });
        });
    }

    fn apply_weight(&mut self) {
        let text = self.weight_text.trim();
        let weight = if text.is_empty() {
            None
        } else if let Some(weight) = parse_weight(text) {
            Some(weight)
        } else {
            self.status = Some(Status::Error(format!("'{text}' is not a weight")));
            return;
        };

        self.canvas.set_selected_edge_weight(weight);
        self.status = Some(Status::Info(match weight {
            Some(weight) => format!("weight set to {}", format_weight(weight)),
            None => "weight cleared".to_owned(),
        }));
    }

    fn draw_file_controls(&mut self, ui: &mut Ui) {
        ui.strong("File");
        ui.text_edit_singleline(&mut self.file_path);

        ui.horizontal(|ui| {
            if ui.button("Import").clicked() {
                self.pending_import = Some(PathBuf::from(self.file_path.trim()));
            }
            if ui.button("Export").clicked() {
                self.export();
            }
        });

        match &self.status {
            Some(Status::Info(message)) => {
                ui.label(message.as_str());
            }
            Some(Status::Error(message)) => {
                ui.label(RichText::new(message.as_str()).color(Color32::from_rgb(235, 110, 95)));
            }
            None => {}
        }
    }

    /// Loads a queued import. Runs once the canvas size is known so the view
    /// can center on the new graph.
    pub(in crate::app) fn run_pending_import(&mut self) {
        let Some(path) = self.pending_import.take() else {
            return;
        };

        self.status = Some(match self.canvas.import_from_path(&path) {
            Ok(()) => Status::Info(format!("imported {}", path.display())),
            Err(error) => {
                warn!(%error, "import failed");
                Status::Error(error.to_string())
            }
        });
    }

    fn export(&mut self) {
        let path = PathBuf::from(self.file_path.trim());
        self.status = Some(match self.canvas.export_to_path(&path) {
            Ok(()) => Status::Info(format!("exported {}", path.display())),
            Err(error) => {
                warn!(%error, "export failed");
                Status::Error(error.to_string())
            }
        });
    }

    fn draw_help(&self, ui: &mut Ui) {
        ui.collapsing("Controls", |ui| {
            for (input, action) in [
                ("Left click", "select and drag"),
                ("Right click", "add node / toggle edge"),
                ("Shift", "extend selection, drag components"),
                ("Alt + wheel", "rotate component"),
                ("Wheel", "zoom"),
                ("Middle drag", "pan"),
                ("Space", "center on selection"),
                ("R", "toggle root"),
                ("Delete", "remove selection"),
            ] {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(input).monospace());
                    ui.label(action);
                });
            }
        });
    }
}
