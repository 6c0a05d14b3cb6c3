use crate::vector::Vec2;

/// Pan/zoom state mapping canvas pixels to world units:
/// `screen = world * scale + translation`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    scale: f64,
    translation: Vec2,
    viewport: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Self::INITIAL_SCALE,
            translation: Vec2::ZERO,
            viewport: Vec2::ZERO,
        }
    }
}

impl Transform {
    pub const INITIAL_SCALE: f64 = 20.0;
    pub const MIN_SCALE: f64 = 0.5;
    pub const MAX_SCALE: f64 = 1_000.0;

    pub fn new(scale: f64, translation: Vec2) -> Self {
        Self {
            scale: scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE),
            translation,
            viewport: Vec2::ZERO,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Canvas size in pixels; needed to find its center.
    pub fn set_viewport(&mut self, size: Vec2) {
        self.viewport = size;
    }

    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        (point - self.translation) / self.scale
    }

    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        point * self.scale + self.translation
    }

    /// Moves `point` towards the middle of the viewport. A smoothness of 1
    /// lands it there at once, 0 leaves the view alone.
    pub fn center(&mut self, point: Vec2, smoothness: f64) {
        let smoothness = smoothness.clamp(0.0, 1.0);
        let middle = self.screen_to_world(self.viewport / 2.0);
        self.translation += (middle - point) * (smoothness * self.scale);
    }

    /// Scales by `2^delta` while keeping the world point under `pivot` fixed.
    pub fn zoom(&mut self, pivot: Vec2, delta: f64) {
        let anchor = self.screen_to_world(pivot);
        let previous = self.scale;
        self.scale = (self.scale * delta.exp2()).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
        self.translation -= anchor * (self.scale - previous);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.translation += delta;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(a.distance(b) < 1e-6, "{a:?} != {b:?}");
    }

    fn viewport() -> Transform {
        let mut transform = Transform::default();
        transform.set_viewport(Vec2::new(800.0, 600.0));
        transform
    }

    #[test]
    fn screen_and_world_are_inverse() {
        let mut transform = viewport();
        transform.translate(Vec2::new(13.0, -7.0));
        let point = Vec2::new(3.5, -1.25);

        assert_close(
            transform.screen_to_world(transform.world_to_screen(point)),
            point,
        );
    }

    #[test]
    fn full_centering_puts_point_in_the_middle() {
        let mut transform = viewport();
        transform.center(Vec2::new(10.0, 4.0), 1.0);

        assert_close(
            transform.world_to_screen(Vec2::new(10.0, 4.0)),
            Vec2::new(400.0, 300.0),
        );
    }

    #[test]
    fn zero_smoothness_does_not_move() {
        let mut transform = viewport();
        let before = transform;
        transform.center(Vec2::new(10.0, 4.0), 0.0);

        assert_eq!(transform, before);
    }

    #[test]
    fn partial_centering_converges() {
        let mut transform = viewport();
        let target = Vec2::new(-30.0, 12.0);
        for _ in 0..200 {
            transform.center(target, 0.3);
        }

        assert_close(transform.world_to_screen(target), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn zoom_doubles_per_unit_delta() {
        let mut transform = viewport();
        transform.zoom(Vec2::ZERO, 1.0);

        assert_eq!(transform.scale(), 2.0 * Transform::INITIAL_SCALE);
    }

    proptest! {
        #[test]
        fn zoom_keeps_the_pivot_fixed(
            x in 0.0..800.0f64,
            y in 0.0..600.0f64,
            delta in -3.0..3.0f64,
            pan in (-500.0..500.0f64, -500.0..500.0f64),
        ) {
            let mut transform = viewport();
            transform.translate(Vec2::new(pan.0, pan.1));
            let pivot = Vec2::new(x, y);
            let anchor = transform.screen_to_world(pivot);

            transform.zoom(pivot, delta);

            prop_assert!(transform.world_to_screen(anchor).distance(pivot) < 1e-6);
            let round_trip = transform.world_to_screen(transform.screen_to_world(pivot));
            prop_assert!(round_trip.distance(pivot) < 1e-6);
        }
    }
}
