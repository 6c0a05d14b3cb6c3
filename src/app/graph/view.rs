use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui};

use crate::graph::{EdgeView, NODE_RADIUS, NodeView};
use crate::transform::Transform;
use crate::util::format_weight;
use crate::vector::Vec2;

use super::super::GrafatkoApp;
use super::super::render_utils::{
    EDGE, NODE_FILL, NODE_OUTLINE, ROOT, SELECTED, TEXT, arrowhead, circle_visible, clip_to_rims,
    draw_background, self_loop_circle, to_canvas, to_screen,
};

/// Arrowhead length in world units.
const ARROW_SIZE: f64 = 0.6;

impl GrafatkoApp {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.canvas
            .set_viewport(Vec2::new(f64::from(rect.width()), f64::from(rect.height())));
        self.run_pending_import();
        self.handle_canvas_input(ui, rect, &response);

        let painter = ui.painter_at(rect);
        let transform = *self.canvas.transform();
        draw_background(&painter, rect, &transform);

        let snapshot = self.canvas.snapshot();
        let scale = transform.scale() as f32;
        let line_width = (0.08 * scale).clamp(1.0, 4.0);
        let edge_stroke = Stroke::new(line_width, EDGE);

        for edge in &snapshot.edges {
            self.draw_edge(&painter, rect, edge, snapshot.directed, edge_stroke);
        }

        if snapshot.weighted {
            for edge in snapshot.edges.iter().filter(|edge| !edge.self_loop) {
                let Some(weight) = edge.weight else {
                    continue;
                };
                let middle = to_screen(rect, &transform, (edge.from + edge.to) / 2.0);
                painter.text(
                    middle,
                    Align2::CENTER_CENTER,
                    format_weight(weight),
                    FontId::proportional((0.6 * scale).clamp(10.0, 22.0)),
                    TEXT,
                );
            }
        }

        for node in &snapshot.nodes {
            Self::draw_node(&painter, rect, &transform, node, snapshot.show_labels);
        }

        let hovering_node = response.hover_pos().is_some_and(|pointer| {
            let world = transform.screen_to_world(to_canvas(rect, pointer));
            self.canvas.graph().node_at(world, NODE_RADIUS).is_some()
        });
        if hovering_node {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
    }

    fn draw_edge(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        edge: &EdgeView,
        directed: bool,
        stroke: Stroke,
    ) {
        let transform = self.canvas.transform();

        if edge.self_loop {
            let (center, radius) = self_loop_circle(edge.from, NODE_RADIUS);
            painter.circle_stroke(
                to_screen(rect, transform, center),
                (radius * transform.scale()) as f32,
                stroke,
            );
            return;
        }

        let Some((start, end)) = clip_to_rims(edge.from, edge.to, NODE_RADIUS, NODE_RADIUS) else {
            return;
        };
        painter.line_segment(
            [to_screen(rect, transform, start), to_screen(rect, transform, end)],
            stroke,
        );

        if directed
            && let Some(corners) = arrowhead(edge.from, edge.to, NODE_RADIUS, ARROW_SIZE)
        {
            let points = corners
                .iter()
                .map(|corner| to_screen(rect, transform, *corner))
                .collect();
            painter.add(Shape::convex_polygon(points, stroke.color, Stroke::NONE));
        }
    }

    fn draw_node(
        painter: &egui::Painter,
        rect: egui::Rect,
        transform: &Transform,
        node: &NodeView,
        show_labels: bool,
    ) {
        let position = to_screen(rect, transform, node.position);
        let radius = (node.radius * transform.scale()) as f32;
        if !circle_visible(rect, position, radius) {
            return;
        }

        let outline = if node.selected {
            SELECTED
        } else if node.root {
            ROOT
        } else {
            NODE_OUTLINE
        };
        let fill = if node.root {
            Color32::from_rgb(36, 72, 98)
        } else {
            NODE_FILL
        };

        painter.circle_filled(position, radius, fill);
        painter.circle_stroke(
            position,
            radius,
            Stroke::new((radius * 0.12).clamp(1.0, 3.5), outline),
        );

        if show_labels && !node.label.is_empty() {
            painter.text(
                position,
                Align2::CENTER_CENTER,
                &node.label,
                FontId::proportional((radius * 0.7).clamp(8.0, 28.0)),
                TEXT,
            );
        }
    }
}
