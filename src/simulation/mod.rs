mod forces;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::graph::Graph;
use crate::vector::Vec2;

pub use forces::{inverse_square, linear_spring};
use forces::{
    Bodies, accumulate_gravity, accumulate_layer_centering, accumulate_pairwise, linked_pairs,
};

/// Force magnitude as a function of the distance between two nodes.
pub type ForceLaw = fn(f64) -> f64;

#[derive(Clone, Copy, Debug)]
pub struct SimulationConfig {
    pub forces_enabled: bool,
    /// Pull nodes at equal BFS depth from the root onto a common line.
    pub layering: bool,
    pub tree_coefficient: f64,
    pub gravity: Vec2,
    pub repulsion: ForceLaw,
    pub attraction: ForceLaw,
    /// Force laws are never evaluated closer than this.
    pub min_distance: f64,
    /// Upper bound on the displacement of one node in one tick.
    pub max_force: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            forces_enabled: true,
            layering: true,
            tree_coefficient: 0.3,
            gravity: Vec2::new(0.0, 0.1),
            repulsion: inverse_square,
            attraction: linear_spring,
            min_distance: 0.05,
            max_force: 10.0,
        }
    }
}

pub struct Simulation {
    rng: StdRng,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Advances the layout by one tick. Dragged nodes are placed at
    /// `drag_pointer` minus their drag offset instead of being moved by forces;
    /// with no pointer they stay put.
    pub fn tick(
        &mut self,
        graph: &mut Graph,
        config: &SimulationConfig,
        drag_pointer: Option<Vec2>,
    ) {
        if config.forces_enabled {
            self.accumulate(graph, config);
            Self::integrate(graph, config);
        }

        if let Some(pointer) = drag_pointer {
            for node in graph.nodes_mut() {
                node.follow_pointer(pointer);
            }
        }
    }

    fn accumulate(&mut self, graph: &mut Graph, config: &SimulationConfig) {
        let mut bodies = Bodies::collect(graph);
        let components = graph.component_labels();

        if let Some(root) = graph.root() {
            if config.layering {
                let layers = graph.distance_layers_from_root(root);
                accumulate_layer_centering(&mut bodies, &layers, config.tree_coefficient);
            }
            accumulate_gravity(&mut bodies, &components, root, config.gravity);
        }

        let linked = linked_pairs(graph);
        accumulate_pairwise(&mut bodies, &components, &linked, config, &mut self.rng);

        for (id, force) in bodies.ids.iter().zip(bodies.forces) {
            if let Some(node) = graph.node_mut(*id) {
                node.add_force(force);
            }
        }
    }

    fn integrate(graph: &mut Graph, config: &SimulationConfig) {
        let root = graph.root();
        for node in graph.nodes_mut() {
            if Some(node.id()) == root || node.is_dragged() {
                node.clear_force();
            } else {
                node.apply_force(config.max_force);
            }
        }
    }
}
