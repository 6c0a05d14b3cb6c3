use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, pos2};

use crate::transform::Transform;
use crate::vector::Vec2;

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
pub(super) const NODE_FILL: Color32 = Color32::from_rgb(58, 66, 78);
pub(super) const NODE_OUTLINE: Color32 = Color32::from_gray(225);
pub(super) const SELECTED: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const ROOT: Color32 = Color32::from_rgb(103, 196, 255);
pub(super) const EDGE: Color32 = Color32::from_gray(200);
pub(super) const TEXT: Color32 = Color32::from_gray(238);

/// Grid spacing in world units.
const GRID_STEP: f64 = 5.0;

pub(super) fn to_screen(rect: Rect, transform: &Transform, world: Vec2) -> Pos2 {
    let screen = transform.world_to_screen(world);
    rect.min + eframe::egui::vec2(screen.x() as f32, screen.y() as f32)
}

/// Canvas-relative pixel position of an absolute screen position.
pub(super) fn to_canvas(rect: Rect, position: Pos2) -> Vec2 {
    let relative = position - rect.min;
    Vec2::new(f64::from(relative.x), f64::from(relative.y))
}

/// Segment between the rims of two circles, or `None` when they overlap.
pub(super) fn clip_to_rims(
    from: Vec2,
    to: Vec2,
    from_radius: f64,
    to_radius: f64,
) -> Option<(Vec2, Vec2)> {
    let delta = to - from;
    let length = delta.magnitude();
    if length <= from_radius + to_radius {
        return None;
    }

    let direction = delta / length;
    Some((from + direction * from_radius, to - direction * to_radius))
}

/// Corners of an arrowhead whose tip touches the rim of the target circle:
/// `[tip, left, right]`.
pub(super) fn arrowhead(from: Vec2, to: Vec2, target_radius: f64, size: f64) -> Option<[Vec2; 3]> {
    let direction = (to - from).unit().ok()?;
    let normal = Vec2::new(-direction.y(), direction.x());

    let tip = to - direction * target_radius;
    let base = tip - direction * size;
    let half_width = size * 0.5;

    Some([tip, base + normal * half_width, base - normal * half_width])
}

/// Circle drawn for an edge from a node to itself, sitting on top of it.
pub(super) fn self_loop_circle(center: Vec2, radius: f64) -> (Vec2, f64) {
    (center - Vec2::new(0.0, radius * 1.4), radius * 0.8)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: &Transform) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (GRID_STEP * transform.scale()).max(20.0) as f32;
    let translation = transform.translation();
    let origin = rect.min + eframe::egui::vec2(translation.x() as f32, translation.y() as f32);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
