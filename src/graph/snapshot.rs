use crate::vector::Vec2;

use super::model::{Graph, NODE_RADIUS};

/// Everything the painter needs for one frame, copied out of the graph.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub directed: bool,
    pub weighted: bool,
    pub show_labels: bool,
}

#[derive(Clone, Debug)]
pub struct NodeView {
    pub position: Vec2,
    pub radius: f64,
    pub label: String,
    pub selected: bool,
    pub root: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeView {
    pub from: Vec2,
    pub to: Vec2,
    pub weight: Option<f64>,
    pub self_loop: bool,
}

impl Graph {
    pub fn snapshot(&self) -> Snapshot {
        let flags = self.flags();
        let nodes = self
            .nodes()
            .map(|node| NodeView {
                position: node.position(),
                radius: NODE_RADIUS,
                label: node.display_label().to_owned(),
                selected: node.is_selected(),
                root: self.root() == Some(node.id()),
            })
            .collect();

        let edges = self
            .edges()
            .iter()
            .filter_map(|edge| {
                Some(EdgeView {
                    from: self.position(edge.source())?,
                    to: self.position(edge.target())?,
                    weight: edge.weight(),
                    self_loop: edge.source() == edge.target(),
                })
            })
            .collect();

        Snapshot {
            nodes,
            edges,
            directed: flags.directed,
            weighted: flags.weighted,
            show_labels: flags.show_labels,
        }
    }
}
