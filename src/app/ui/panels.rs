use std::time::Duration;

use eframe::egui::{self, Align, Context, Layout};

use super::super::GrafatkoApp;

impl GrafatkoApp {
    /// Simulation rate, independent of the frame rate.
    const TICK_SECS: f32 = 1.0 / 60.0;
    /// Ticks run in one frame before the backlog is dropped.
    const MAX_CATCH_UP_TICKS: usize = 4;

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.update_fps_counter(ctx);
        self.advance_simulation(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Grafatko");
                    ui.separator();
                    ui.label(self.graph_summary_text());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        ctx.request_repaint_after(Duration::from_secs_f32(Self::TICK_SECS));
    }

    fn advance_simulation(&mut self, ctx: &Context) {
        self.tick_accumulator_secs += ctx.input(|input| input.unstable_dt).min(0.25);

        let mut ticks = 0;
        while self.tick_accumulator_secs >= Self::TICK_SECS {
            if ticks == Self::MAX_CATCH_UP_TICKS {
                self.tick_accumulator_secs = 0.0;
                break;
            }

            self.canvas.tick();
            self.tick_accumulator_secs -= Self::TICK_SECS;
            ticks += 1;
        }
    }
}
