use eframe::egui::Context;

use super::super::GrafatkoApp;

impl GrafatkoApp {
    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        const FPS_SAMPLE_WINDOW: usize = 180;

        let dt = ctx.input(|input| input.stable_dt);
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    pub(in crate::app) fn fps_display_text(&self) -> Option<String> {
        if !self.show_fps || self.fps_samples.is_empty() {
            return None;
        }

        let average = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
        Some(format!("FPS {:.0} | avg {average:.1}", self.fps_current))
    }

    /// Counts, plus how many selected nodes hang off the root.
    pub(in crate::app) fn graph_summary_text(&self) -> String {
        let graph = self.canvas.graph();
        let selected = graph.selected_nodes();
        let (root, under_root) = match graph.root() {
            Some(root) => {
                let reached = selected
                    .iter()
                    .filter(|id| graph.weakly_connected(root, **id))
                    .count();
                (root.to_string(), format!("  under root: {reached}"))
            }
            None => ("none".to_owned(), String::new()),
        };
        format!(
            "nodes: {}  edges: {}  selected: {}  root: {root}{under_root}",
            graph.node_count(),
            graph.edge_count(),
            selected.len(),
        )
    }
}
