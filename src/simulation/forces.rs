use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use rand::Rng;

use crate::graph::{Graph, NodeId};
use crate::vector::Vec2;

use super::SimulationConfig;

const NUDGE_DISTANCE: f64 = 0.5;

pub fn inverse_square(distance: f64) -> f64 {
    (1.0 / distance).powi(2)
}

/// Rest length 6: pulls together beyond it, pushes apart inside it.
pub fn linear_spring(distance: f64) -> f64 {
    -(distance - 6.0) / 3.0
}

/// Node handles and positions copied out of the graph, with one force
/// accumulator per node.
pub(super) struct Bodies {
    pub(super) ids: Vec<NodeId>,
    pub(super) positions: Vec<Vec2>,
    pub(super) forces: Vec<Vec2>,
    index_by_id: HashMap<NodeId, usize>,
}

impl Bodies {
    pub(super) fn collect(graph: &Graph) -> Self {
        let ids = graph.node_ids();
        let positions = graph.nodes().map(|node| node.position()).collect();
        let forces = vec![Vec2::ZERO; ids.len()];
        let index_by_id = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();

        Self {
            ids,
            positions,
            forces,
            index_by_id,
        }
    }

    fn index(&self, id: NodeId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }
}

/// Pulls every node of a BFS layer towards the layer's mean height.
pub(super) fn accumulate_layer_centering(
    bodies: &mut Bodies,
    layers: &[Vec<NodeId>],
    coefficient: f64,
) {
    for layer in layers.iter().skip(1) {
        let indices = layer
            .iter()
            .filter_map(|id| bodies.index(*id))
            .collect::<Vec<_>>();
        let members = indices
            .iter()
            .map(|&index| bodies.positions[index])
            .collect::<Vec<_>>();
        let Ok(pivot) = Vec2::average(&members) else {
            continue;
        };

        for &index in &indices {
            let offset = bodies.positions[index].project_onto_line(0.0, pivot.y());
            bodies.forces[index] += offset * coefficient;
        }
    }
}

pub(super) fn accumulate_gravity(
    bodies: &mut Bodies,
    components: &HashMap<NodeId, usize>,
    root: NodeId,
    gravity: Vec2,
) {
    let Some(root_component) = components.get(&root).copied() else {
        return;
    };

    for (index, id) in bodies.ids.iter().enumerate() {
        if *id != root && components.get(id) == Some(&root_component) {
            bodies.forces[index] += gravity;
        }
    }
}

/// Undirected, orientation-free set of linked pairs.
pub(super) fn linked_pairs(graph: &Graph) -> HashSet<(NodeId, NodeId)> {
    graph
        .edges()
        .iter()
        .map(|edge| {
            let (a, b) = (edge.source(), edge.target());
            if a <= b { (a, b) } else { (b, a) }
        })
        .collect()
}

/// Repulsion between every weakly connected pair plus attraction along edges.
/// Pairs in different components never interact.
pub(super) fn accumulate_pairwise(
    bodies: &mut Bodies,
    components: &HashMap<NodeId, usize>,
    linked: &HashSet<(NodeId, NodeId)>,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) {
    let count = bodies.ids.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let (a, b) = (bodies.ids[i], bodies.ids[j]);
            let same_component = matches!(
                (components.get(&a), components.get(&b)),
                (Some(x), Some(y)) if x == y
            );
            if !same_component {
                continue;
            }

            let delta = bodies.positions[j] - bodies.positions[i];
            let distance = delta.magnitude();

            if distance == 0.0 {
                let angle = rng.gen_range(0.0..TAU);
                let nudge = Vec2::new(angle.cos(), angle.sin()) * NUDGE_DISTANCE;
                bodies.forces[i] -= nudge;
                bodies.forces[j] += nudge;
                continue;
            }

            let direction = delta / distance;
            let evaluated_at = distance.max(config.min_distance);

            let mut magnitude = (config.repulsion)(evaluated_at);
            let key = if a <= b { (a, b) } else { (b, a) };
            if linked.contains(&key) {
                magnitude += (config.attraction)(evaluated_at);
            }

            if !magnitude.is_finite() {
                continue;
            }

            bodies.forces[i] -= direction * magnitude;
            bodies.forces[j] += direction * magnitude;
        }
    }
}
