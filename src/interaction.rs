use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::graph::{self, ExportError, Graph, GraphError, ImportError, NODE_RADIUS, NodeId};
use crate::simulation::{Simulation, SimulationConfig};
use crate::transform::Transform;
use crate::vector::Vec2;

/// How fast the view follows the selection while centering is held.
pub const CENTER_SMOOTHNESS: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Extends the selection and drags whole components along.
    Group,
    /// Turns the wheel into a rotation of the selected components.
    Rotate,
    /// Keeps the view centered on the selection while held.
    Center,
    ToggleRoot,
    Delete,
}

/// Input already decoded from the windowing layer. Pointer positions are in
/// canvas pixels, wheel deltas in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved(Vec2),
    Pressed(PointerButton),
    Released(PointerButton),
    KeyDown(Key),
    KeyUp(Key),
    Wheel(f64),
}

/// The editable canvas: a graph, the view onto it and the input state that
/// drives both.
pub struct Canvas {
    graph: Graph,
    transform: Transform,
    simulation: Simulation,
    config: SimulationConfig,
    pointer: Vec2,
    previous_pointer: Vec2,
    buttons: HashSet<PointerButton>,
    keys: HashSet<Key>,
    /// Non-selected nodes dragged along with the selection.
    followers: BTreeSet<NodeId>,
}

impl Canvas {
    pub fn new(graph: Graph, config: SimulationConfig, simulation: Simulation) -> Self {
        Self {
            graph,
            transform: Transform::default(),
            simulation,
            config,
            pointer: Vec2::ZERO,
            previous_pointer: Vec2::ZERO,
            buttons: HashSet::new(),
            keys: HashSet::new(),
            followers: BTreeSet::new(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_viewport(&mut self, size: Vec2) {
        self.transform.set_viewport(size);
    }

    pub fn snapshot(&self) -> graph::Snapshot {
        self.graph.snapshot()
    }

    pub fn pointer_world(&self) -> Vec2 {
        self.transform.screen_to_world(self.pointer)
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_pressed(&self, button: PointerButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved(position) => self.on_move(position),
            InputEvent::Pressed(button) => {
                self.buttons.insert(button);
                self.on_press(button);
            }
            InputEvent::Released(button) => {
                self.buttons.remove(&button);
                self.on_release(button);
            }
            InputEvent::KeyDown(key) => {
                let repeated = !self.keys.insert(key);
                if !repeated {
                    self.on_key_down(key);
                }
            }
            InputEvent::KeyUp(key) => {
                self.keys.remove(&key);
                self.on_key_up(key);
            }
            InputEvent::Wheel(delta) => self.on_wheel(delta),
        }
    }

    /// One simulation step, then centering if it is held.
    pub fn tick(&mut self) {
        let centering = self.is_held(Key::Center);
        let pointer = (!centering).then(|| self.pointer_world());
        self.simulation.tick(&mut self.graph, &self.config, pointer);

        if centering && let Ok(pivot) = Vec2::average(&self.graph.selected_positions()) {
            self.transform.center(pivot, CENTER_SMOOTHNESS);
        }
    }

    /// Replaces the graph with the one stored at `path` and centers on it.
    /// The current graph is kept when loading fails.
    pub fn import_from_path(&mut self, path: &Path) -> Result<(), ImportError> {
        let graph = graph::import_from_path(path)?;
        info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "imported graph"
        );

        self.graph = graph;
        self.followers.clear();
        let positions = self.graph.nodes().map(|node| node.position()).collect::<Vec<_>>();
        if let Ok(centroid) = Vec2::average(&positions) {
            self.transform.center(centroid, 1.0);
        }
        Ok(())
    }

    pub fn export_to_path(&self, path: &Path) -> Result<(), ExportError> {
        graph::export_to_path(&self.graph, path)?;
        info!(path = %path.display(), "exported graph");
        Ok(())
    }

    pub fn set_selected_label(&mut self, label: &str) {
        for id in self.graph.selected_nodes() {
            log_stale(self.graph.set_label(id, label));
        }
    }

    /// Sets the weight of every edge running between two selected nodes.
    pub fn set_selected_edge_weight(&mut self, weight: Option<f64>) {
        let selected = self.graph.selected_nodes();
        for &source in &selected {
            for &target in &selected {
                if self.graph.edge_exists(source, target, false) {
                    log_stale(self.graph.set_edge_weight(source, target, weight));
                }
            }
        }
    }

    fn on_move(&mut self, position: Vec2) {
        self.previous_pointer = self.pointer;
        self.pointer = position;

        if self.is_held(Key::Center) {
            return;
        }

        let world = self.pointer_world();
        for node in self.graph.nodes_mut() {
            node.follow_pointer(world);
        }

        if self.is_pressed(PointerButton::Middle) {
            self.transform.translate(self.pointer - self.previous_pointer);
        }
    }

    fn on_press(&mut self, button: PointerButton) {
        let world = self.pointer_world();
        let pressed = self.graph.node_at(world, NODE_RADIUS);

        match (button, pressed) {
            (PointerButton::Primary, Some(id)) => {
                self.select(id);
                for node in self.graph.nodes_mut().filter(|node| node.is_selected()) {
                    node.start_drag(world);
                }
                if self.is_held(Key::Group) {
                    self.start_followers();
                }
            }
            (PointerButton::Primary, None) => {
                if !self.is_held(Key::Group) {
                    self.graph.deselect_all();
                }
            }
            (PointerButton::Secondary, Some(target)) => {
                let self_loops = self.graph.flags().self_loops;
                for source in self.graph.selected_nodes() {
                    if source == target && !self_loops {
                        continue;
                    }
                    log_stale(self.graph.toggle_edge(source, target));
                }
            }
            (PointerButton::Secondary, None) => {
                let selected = self.graph.selected_nodes();
                let created = match self.graph.add_node(world) {
                    Ok(created) => created,
                    Err(error) => {
                        warn!(%error, "could not create node");
                        return;
                    }
                };
                for source in selected {
                    log_stale(self.graph.add_edge(source, created, None));
                }
                self.graph.deselect_all();
                log_stale(self.graph.select(created));
                debug!(node = %created, "created node");
            }
            (PointerButton::Middle, _) => {}
        }
    }

    fn on_release(&mut self, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }

        self.followers.clear();
        for node in self.graph.nodes_mut() {
            node.stop_drag();
        }
    }

    fn on_key_down(&mut self, key: Key) {
        match key {
            Key::Group if self.is_pressed(PointerButton::Primary) => self.start_followers(),
            Key::ToggleRoot => self.toggle_root(),
            Key::Delete => self.delete_selected(),
            _ => {}
        }
    }

    fn on_key_up(&mut self, key: Key) {
        if key == Key::Group {
            self.stop_followers();
        }
    }

    fn on_wheel(&mut self, delta: f64) {
        let selected = self.graph.selected_nodes();
        let pivot = Vec2::average(&self.graph.selected_positions()).ok();

        if self.is_held(Key::Rotate) {
            if let Some(pivot) = pivot {
                self.rotate_about(&selected, delta, pivot);
            }
            return;
        }

        let anchor = match pivot {
            Some(pivot) if self.is_held(Key::Center) => self.transform.world_to_screen(pivot),
            _ => self.pointer,
        };
        self.transform.zoom(anchor, delta);
    }

    fn select(&mut self, id: NodeId) {
        if !self.is_held(Key::Group) {
            self.graph.deselect_all();
        }
        log_stale(self.graph.select(id));
    }

    fn start_followers(&mut self) {
        let world = self.pointer_world();
        let selected = self.graph.selected_nodes();
        let component = self.graph.weakly_connected_set(&selected);

        for id in component {
            let Some(node) = self.graph.node_mut(id) else {
                continue;
            };
            if node.is_selected() || node.is_dragged() {
                continue;
            }
            node.start_drag(world);
            self.followers.insert(id);
        }
    }

    fn stop_followers(&mut self) {
        for id in std::mem::take(&mut self.followers) {
            if let Some(node) = self.graph.node_mut(id)
                && !node.is_selected()
            {
                node.stop_drag();
            }
        }
    }

    /// Rotates every node weakly connected to `nodes` about `pivot`.
    fn rotate_about(&mut self, nodes: &[NodeId], angle: f64, pivot: Vec2) {
        for id in self.graph.weakly_connected_set(nodes) {
            if let Some(node) = self.graph.node_mut(id) {
                let rotated = node.position().rotated(angle, pivot);
                node.set_position(rotated);
            }
        }
    }

    fn toggle_root(&mut self) {
        if self.graph.root().is_some() {
            log_stale(self.graph.set_root(None));
            return;
        }

        if let [only] = self.graph.selected_nodes()[..] {
            log_stale(self.graph.set_root(Some(only)));
        }
    }

    fn delete_selected(&mut self) {
        for id in self.graph.selected_nodes() {
            log_stale(self.graph.remove_node(id));
            self.followers.remove(&id);
        }
    }
}

/// A stale handle leaves the graph untouched; report it and carry on.
fn log_stale<T>(result: Result<T, GraphError>) {
    if let Err(error) = result {
        warn!(%error, "ignored graph operation on stale node");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canvas with an identity view, so screen and world coordinates agree.
    fn canvas() -> Canvas {
        let config = SimulationConfig {
            forces_enabled: false,
            ..SimulationConfig::default()
        };
        let mut canvas = Canvas::new(Graph::new(), config, Simulation::seeded(0));
        canvas.transform = Transform::new(1.0, Vec2::ZERO);
        canvas.set_viewport(Vec2::new(100.0, 100.0));
        canvas
    }

    fn press_at(canvas: &mut Canvas, button: PointerButton, position: Vec2) {
        canvas.handle(InputEvent::PointerMoved(position));
        canvas.handle(InputEvent::Pressed(button));
    }

    fn click_at(canvas: &mut Canvas, button: PointerButton, position: Vec2) {
        press_at(canvas, button, position);
        canvas.handle(InputEvent::Released(button));
    }

    #[test]
    fn secondary_press_on_empty_space_creates_a_connected_node() {
        let mut canvas = canvas();
        let first = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        canvas.graph_mut().select(first).unwrap();

        click_at(&mut canvas, PointerButton::Secondary, Vec2::new(10.0, 0.0));

        let created = canvas.graph().node_at(Vec2::new(10.0, 0.0), 0.1).unwrap();
        assert!(canvas.graph().edge_exists(first, created, false));
        assert_eq!(canvas.graph().selected_nodes(), vec![created]);
    }

    #[test]
    fn secondary_press_on_a_node_toggles_edges_from_the_selection() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(10.0, 0.0)).unwrap();
        canvas.graph_mut().select(a).unwrap();

        click_at(&mut canvas, PointerButton::Secondary, Vec2::new(10.0, 0.0));
        assert!(canvas.graph().edge_exists(a, b, false));

        click_at(&mut canvas, PointerButton::Secondary, Vec2::new(10.0, 0.0));
        assert!(!canvas.graph().edge_exists(a, b, false));
    }

    #[test]
    fn secondary_press_on_the_selected_node_adds_no_self_loop() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        canvas.graph_mut().select(a).unwrap();

        click_at(&mut canvas, PointerButton::Secondary, Vec2::ZERO);

        assert_eq!(canvas.graph().edge_count(), 0);
    }

    #[test]
    fn primary_press_replaces_or_extends_the_selection() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(10.0, 0.0)).unwrap();

        click_at(&mut canvas, PointerButton::Primary, Vec2::ZERO);
        click_at(&mut canvas, PointerButton::Primary, Vec2::new(10.0, 0.0));
        assert_eq!(canvas.graph().selected_nodes(), vec![b]);

        canvas.handle(InputEvent::KeyDown(Key::Group));
        click_at(&mut canvas, PointerButton::Primary, Vec2::ZERO);
        assert_eq!(canvas.graph().selected_nodes(), vec![a, b]);

        click_at(&mut canvas, PointerButton::Primary, Vec2::new(50.0, 50.0));
        assert_eq!(canvas.graph().selected_nodes(), vec![a, b]);

        canvas.handle(InputEvent::KeyUp(Key::Group));
        click_at(&mut canvas, PointerButton::Primary, Vec2::new(50.0, 50.0));
        assert!(canvas.graph().selected_nodes().is_empty());
    }

    #[test]
    fn dragging_keeps_the_grab_offset() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();

        press_at(&mut canvas, PointerButton::Primary, Vec2::new(0.5, 0.0));
        canvas.handle(InputEvent::PointerMoved(Vec2::new(5.5, 3.0)));

        assert_eq!(canvas.graph().position(a), Some(Vec2::new(5.0, 3.0)));

        canvas.handle(InputEvent::Released(PointerButton::Primary));
        canvas.handle(InputEvent::PointerMoved(Vec2::new(20.0, 20.0)));
        assert_eq!(canvas.graph().position(a), Some(Vec2::new(5.0, 3.0)));
    }

    #[test]
    fn group_drag_moves_the_whole_component() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(10.0, 0.0)).unwrap();
        let c = canvas.graph_mut().add_node(Vec2::new(0.0, 10.0)).unwrap();
        let d = canvas.graph_mut().add_node(Vec2::new(30.0, 30.0)).unwrap();
        canvas.graph_mut().add_edge(a, b, None).unwrap();
        canvas.graph_mut().add_edge(a, c, None).unwrap();

        canvas.handle(InputEvent::KeyDown(Key::Group));
        press_at(&mut canvas, PointerButton::Primary, Vec2::ZERO);
        canvas.handle(InputEvent::PointerMoved(Vec2::new(4.0, -2.0)));

        let delta = Vec2::new(4.0, -2.0);
        assert_eq!(canvas.graph().position(a), Some(delta));
        assert_eq!(canvas.graph().position(b), Some(Vec2::new(10.0, 0.0) + delta));
        assert_eq!(canvas.graph().position(c), Some(Vec2::new(0.0, 10.0) + delta));
        assert_eq!(canvas.graph().position(d), Some(Vec2::new(30.0, 30.0)));
        assert_eq!(canvas.graph().selected_nodes(), vec![a]);

        canvas.handle(InputEvent::KeyUp(Key::Group));
        canvas.handle(InputEvent::PointerMoved(Vec2::new(6.0, -2.0)));
        assert_eq!(canvas.graph().position(a), Some(Vec2::new(6.0, -2.0)));
        assert_eq!(canvas.graph().position(b), Some(Vec2::new(10.0, 0.0) + delta));
    }

    #[test]
    fn group_key_during_drag_picks_up_followers() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(10.0, 0.0)).unwrap();
        canvas.graph_mut().add_edge(a, b, None).unwrap();

        press_at(&mut canvas, PointerButton::Primary, Vec2::ZERO);
        canvas.handle(InputEvent::KeyDown(Key::Group));
        canvas.handle(InputEvent::PointerMoved(Vec2::new(1.0, 1.0)));

        assert_eq!(canvas.graph().position(b), Some(Vec2::new(11.0, 1.0)));

        canvas.handle(InputEvent::Released(PointerButton::Primary));
        assert!(canvas.graph().nodes().all(|node| !node.is_dragged()));
    }

    #[test]
    fn root_key_toggles_the_single_selected_node() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(10.0, 0.0)).unwrap();

        canvas.graph_mut().select(a).unwrap();
        canvas.graph_mut().select(b).unwrap();
        canvas.handle(InputEvent::KeyDown(Key::ToggleRoot));
        assert_eq!(canvas.graph().root(), None);
        canvas.handle(InputEvent::KeyUp(Key::ToggleRoot));

        canvas.graph_mut().deselect_all();
        canvas.graph_mut().select(a).unwrap();
        canvas.handle(InputEvent::KeyDown(Key::ToggleRoot));
        assert_eq!(canvas.graph().root(), Some(a));
        canvas.handle(InputEvent::KeyUp(Key::ToggleRoot));

        canvas.handle(InputEvent::KeyDown(Key::ToggleRoot));
        assert_eq!(canvas.graph().root(), None);
    }

    #[test]
    fn delete_key_removes_the_selection() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(10.0, 0.0)).unwrap();
        canvas.graph_mut().add_edge(a, b, None).unwrap();
        canvas.graph_mut().select(a).unwrap();

        canvas.handle(InputEvent::KeyDown(Key::Delete));

        assert_eq!(canvas.graph().node_ids(), vec![b]);
        assert_eq!(canvas.graph().edge_count(), 0);
    }

    #[test]
    fn wheel_with_rotate_turns_the_component_about_the_selection() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(2.0, 0.0)).unwrap();
        canvas.graph_mut().add_edge(a, b, None).unwrap();
        canvas.graph_mut().select(a).unwrap();
        let scale = canvas.transform().scale();

        canvas.handle(InputEvent::KeyDown(Key::Rotate));
        canvas.handle(InputEvent::Wheel(std::f64::consts::FRAC_PI_2));

        let rotated = canvas.graph().position(b).unwrap();
        assert!(rotated.distance(Vec2::new(0.0, 2.0)) < 1e-9);
        assert_eq!(canvas.graph().position(a), Some(Vec2::ZERO));
        assert_eq!(canvas.transform().scale(), scale);
    }

    #[test]
    fn wheel_zooms_about_the_pointer() {
        let mut canvas = canvas();
        canvas.handle(InputEvent::PointerMoved(Vec2::new(30.0, 40.0)));
        let anchor = canvas.pointer_world();

        canvas.handle(InputEvent::Wheel(1.0));

        assert!((canvas.transform().scale() - 2.0).abs() < 1e-9);
        assert!(canvas.pointer_world().distance(anchor) < 1e-9);
    }

    #[test]
    fn middle_button_pans() {
        let mut canvas = canvas();
        press_at(&mut canvas, PointerButton::Middle, Vec2::new(10.0, 10.0));
        canvas.handle(InputEvent::PointerMoved(Vec2::new(15.0, 7.0)));

        assert_eq!(canvas.transform().translation(), Vec2::new(5.0, -3.0));
    }

    #[test]
    fn centering_pulls_the_selection_to_the_middle() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::new(-40.0, 25.0)).unwrap();
        canvas.graph_mut().select(a).unwrap();

        canvas.handle(InputEvent::KeyDown(Key::Center));
        for _ in 0..200 {
            canvas.tick();
        }

        let screen = canvas.transform().world_to_screen(Vec2::new(-40.0, 25.0));
        assert!(screen.distance(Vec2::new(50.0, 50.0)) < 1e-6);
    }

    #[test]
    fn label_and_weight_edits_apply_to_the_selection() {
        let mut canvas = canvas();
        let a = canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let b = canvas.graph_mut().add_node(Vec2::new(10.0, 0.0)).unwrap();
        let c = canvas.graph_mut().add_node(Vec2::new(20.0, 0.0)).unwrap();
        canvas.graph_mut().add_edge(a, b, None).unwrap();
        canvas.graph_mut().add_edge(b, c, None).unwrap();
        canvas.graph_mut().select(a).unwrap();
        canvas.graph_mut().select(b).unwrap();

        canvas.set_selected_label("hub");
        canvas.set_selected_edge_weight(Some(2.5));

        assert_eq!(canvas.graph().node(a).unwrap().label(), "hub");
        assert_eq!(canvas.graph().node(c).unwrap().label(), "");
        let weights = canvas
            .graph()
            .edges()
            .iter()
            .map(|edge| edge.weight())
            .collect::<Vec<_>>();
        assert_eq!(weights, vec![Some(2.5), None]);
    }

    #[test]
    fn failed_import_keeps_the_current_graph() {
        let mut canvas = canvas();
        canvas.graph_mut().add_node(Vec2::ZERO).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(canvas.import_from_path(&path).is_err());
        assert_eq!(canvas.graph().node_count(), 1);
    }

    #[test]
    fn import_centers_on_the_new_graph() {
        let mut source = canvas();
        source.graph_mut().add_node(Vec2::new(100.0, 100.0)).unwrap();
        source.graph_mut().add_node(Vec2::new(120.0, 100.0)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        source.export_to_path(&path).unwrap();

        let mut canvas = canvas();
        canvas.import_from_path(&path).unwrap();

        assert_eq!(canvas.graph().node_count(), 2);
        let centroid = canvas.transform().world_to_screen(Vec2::new(110.0, 100.0));
        assert!(centroid.distance(Vec2::new(50.0, 50.0)) < 1e-9);
    }
}
