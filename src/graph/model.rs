use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::truncate_label;
use crate::vector::Vec2;

/// Hit radius of a node, in world units.
pub const NODE_RADIUS: f64 = 1.0;

/// Number of label characters that fit inside a drawn node.
pub const LABEL_DISPLAY_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("self-loops are disabled (node {0})")]
    SelfLoopRejected(NodeId),
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("no node handles left")]
    HandlesExhausted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFlags {
    pub directed: bool,
    pub weighted: bool,
    pub multi: bool,
    pub show_labels: bool,
    #[serde(default)]
    pub self_loops: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Free,
    /// `offset` is pointer minus node position at drag start.
    Dragging { offset: Vec2 },
}

#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    position: Vec2,
    force: Vec2,
    label: String,
    drag: DragState,
    selected: bool,
}

impl Node {
    fn new(id: NodeId, position: Vec2) -> Self {
        Self {
            id,
            position,
            force: Vec2::ZERO,
            label: String::new(),
            drag: DragState::Free,
            selected: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn display_label(&self) -> &str {
        truncate_label(&self.label, LABEL_DISPLAY_LIMIT)
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_dragged(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub(crate) fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub(crate) fn clear_force(&mut self) {
        self.force = Vec2::ZERO;
    }

    /// Moves the node by its accumulated force, limited to `max_force`, and
    /// resets the accumulator.
    pub(crate) fn apply_force(&mut self, max_force: f64) {
        let magnitude = self.force.magnitude();
        let force = if magnitude > max_force {
            self.force * (max_force / magnitude)
        } else {
            self.force
        };

        self.position += force;
        self.force = Vec2::ZERO;
    }

    pub(crate) fn start_drag(&mut self, pointer: Vec2) {
        self.drag = DragState::Dragging {
            offset: pointer - self.position,
        };
    }

    pub(crate) fn stop_drag(&mut self) {
        self.drag = DragState::Free;
    }

    pub(crate) fn follow_pointer(&mut self, pointer: Vec2) {
        if let DragState::Dragging { offset } = self.drag {
            self.position = pointer - offset;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    weight: Option<f64>,
}

impl Edge {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    fn connects(&self, a: NodeId, b: NodeId, ignore_orientation: bool) -> bool {
        (self.source == a && self.target == b)
            || (ignore_orientation && self.source == b && self.target == a)
    }

    fn key(&self, directed: bool) -> (NodeId, NodeId) {
        if directed || self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }
}

/// The node/edge store. Structural flags are consulted by every edge mutation.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    edges: Vec<Edge>,
    flags: GraphFlags,
    root: Option<NodeId>,
    next_id: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: GraphFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn flags(&self) -> GraphFlags {
        self.flags
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.nodes.get(&id).map(Node::position)
    }

    fn require(&self, id: NodeId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    /// Every handed-out handle is below `next_id`, so a handle is never reused.
    pub fn add_node(&mut self, position: Vec2) -> Result<NodeId, GraphError> {
        let id = NodeId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or(GraphError::HandlesExhausted)?;
        self.nodes.insert(id, Node::new(id, position));
        Ok(id)
    }

    /// Inserts a node under a known handle; used when rebuilding a graph from
    /// its serialized form.
    pub(crate) fn restore_node(
        &mut self,
        id: u64,
        position: Vec2,
        label: String,
    ) -> Result<NodeId, GraphError> {
        let next_id = id.checked_add(1).ok_or(GraphError::HandlesExhausted)?;
        let id = NodeId(id);
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }

        let mut node = Node::new(id, position);
        node.label = label;
        self.nodes.insert(id, node);
        self.next_id = self.next_id.max(next_id);
        Ok(id)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.nodes.remove(&id).ok_or(GraphError::UnknownNode(id))?;
        self.edges.retain(|edge| edge.source != id && edge.target != id);
        if self.root == Some(id) {
            self.root = None;
        }
        Ok(())
    }

    pub fn set_label(&mut self, id: NodeId, label: &str) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        label.clone_into(&mut node.label);
        Ok(())
    }

    /// Orientation is ignored when the graph is undirected.
    pub fn edge_exists(&self, a: NodeId, b: NodeId, ignore_orientation: bool) -> bool {
        let ignore_orientation = ignore_orientation || !self.flags.directed;
        self.edges
            .iter()
            .any(|edge| edge.connects(a, b, ignore_orientation))
    }

    /// Adds an edge. Without multi-edges, re-adding an existing edge only
    /// replaces its weight when one is given.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: Option<f64>,
    ) -> Result<(), GraphError> {
        self.require(source)?;
        self.require(target)?;
        if source == target && !self.flags.self_loops {
            return Err(GraphError::SelfLoopRejected(source));
        }

        if !self.flags.multi {
            let ignore_orientation = !self.flags.directed;
            if let Some(existing) = self
                .edges
                .iter_mut()
                .find(|edge| edge.connects(source, target, ignore_orientation))
            {
                if weight.is_some() {
                    existing.weight = weight;
                }
                return Ok(());
            }
        }

        self.edges.push(Edge {
            source,
            target,
            weight,
        });
        Ok(())
    }

    /// Removes every edge from `source` to `target` (either way round when
    /// undirected). Returns whether anything was removed.
    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> Result<bool, GraphError> {
        self.require(source)?;
        self.require(target)?;

        let ignore_orientation = !self.flags.directed;
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.connects(source, target, ignore_orientation));
        Ok(self.edges.len() != before)
    }

    /// Returns whether the edge exists after the toggle.
    pub fn toggle_edge(&mut self, source: NodeId, target: NodeId) -> Result<bool, GraphError> {
        if self.edge_exists(source, target, false) {
            self.remove_edge(source, target)?;
            Ok(false)
        } else {
            self.add_edge(source, target, None)?;
            Ok(true)
        }
    }

    pub fn set_edge_weight(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: Option<f64>,
    ) -> Result<(), GraphError> {
        self.require(source)?;
        self.require(target)?;

        let ignore_orientation = !self.flags.directed;
        self.edges
            .iter_mut()
            .filter(|edge| edge.connects(source, target, ignore_orientation))
            .for_each(|edge| edge.weight = weight);
        Ok(())
    }

    /// Undirecting folds every (b, a) into an (a, b) seen before it, keeping
    /// the first weight.
    pub fn set_directed(&mut self, directed: bool) {
        self.flags.directed = directed;
        if directed {
            return;
        }

        if self.flags.multi {
            self.fold_opposite_edges();
        } else {
            self.collapse_parallel_edges();
        }
    }

    pub fn set_weighted(&mut self, weighted: bool) {
        self.flags.weighted = weighted;
    }

    pub fn set_multi(&mut self, multi: bool) {
        self.flags.multi = multi;
        if !multi {
            self.collapse_parallel_edges();
        }
    }

    pub fn set_show_labels(&mut self, show_labels: bool) {
        self.flags.show_labels = show_labels;
    }

    pub fn set_self_loops(&mut self, self_loops: bool) {
        self.flags.self_loops = self_loops;
        if !self_loops {
            self.edges.retain(|edge| edge.source != edge.target);
        }
    }

    /// Keeps the first edge of every group that the current flags consider
    /// the same edge.
    fn collapse_parallel_edges(&mut self) {
        let directed = self.flags.directed;
        let mut seen = HashSet::with_capacity(self.edges.len());
        self.edges.retain(|edge| seen.insert(edge.key(directed)));
    }

    /// Pairs each edge with an earlier one of opposite orientation and drops
    /// it. Copies left unpaired stay, so a multigraph keeps its true parallels.
    fn fold_opposite_edges(&mut self) {
        let mut counts: HashMap<(NodeId, NodeId), usize> = HashMap::new();
        self.edges.retain(|edge| {
            let opposite = counts.get(&(edge.target, edge.source)).copied().unwrap_or(0);
            let seen = counts.entry((edge.source, edge.target)).or_insert(0);
            *seen += 1;
            *seen > opposite
        });
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) -> Result<(), GraphError> {
        if let Some(id) = root {
            self.require(id)?;
        }
        self.root = root;
        Ok(())
    }

    pub fn select(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        node.selected = true;
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.selected = false;
        }
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.selected)
            .map(Node::id)
            .collect()
    }

    pub fn selected_positions(&self) -> Vec<Vec2> {
        self.nodes
            .values()
            .filter(|node| node.selected)
            .map(Node::position)
            .collect()
    }

    /// The node closest to `position` among those within `radius` of it.
    pub fn node_at(&self, position: Vec2, radius: f64) -> Option<NodeId> {
        self.nodes
            .values()
            .map(|node| (node.id, node.position.distance(position)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Replaces the edge set with its complement over the same nodes. Weights
    /// are dropped; self-loops are never produced.
    pub fn complement(&mut self) {
        let ids = self.node_ids();
        let directed = self.flags.directed;
        let mut complement = Vec::new();

        for (index, &a) in ids.iter().enumerate() {
            let candidates = if directed { &ids[..] } else { &ids[index + 1..] };

            for &b in candidates {
                if a != b && !self.edge_exists(a, b, false) {
                    complement.push(Edge {
                        source: a,
                        target: b,
                        weight: None,
                    });
                }
            }
        }

        self.edges = complement;
    }

    /// Reverses every edge of a directed graph.
    pub fn reorient(&mut self) {
        if !self.flags.directed {
            return;
        }

        for edge in &mut self.edges {
            std::mem::swap(&mut edge.source, &mut edge.target);
        }
    }
}
