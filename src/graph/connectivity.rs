use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::model::{Graph, NodeId};

impl Graph {
    /// Neighbours of every node, ignoring edge direction.
    pub fn undirected_adjacency(&self) -> HashMap<NodeId, Vec<NodeId>> {
        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = self
            .nodes()
            .map(|node| (node.id(), Vec::new()))
            .collect();

        for edge in self.edges() {
            if let Some(neighbours) = adjacency.get_mut(&edge.source()) {
                neighbours.push(edge.target());
            }
            if let Some(neighbours) = adjacency.get_mut(&edge.target()) {
                neighbours.push(edge.source());
            }
        }

        adjacency
    }

    pub fn weakly_connected(&self, a: NodeId, b: NodeId) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }

        let adjacency = self.undirected_adjacency();
        let mut queue = VecDeque::from([a]);
        let mut visited = HashSet::from([a]);

        while let Some(current) = queue.pop_front() {
            if current == b {
                return true;
            }

            for &next in adjacency.get(&current).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        false
    }

    /// Union of the weak components containing `nodes`.
    pub fn weakly_connected_set(&self, nodes: &[NodeId]) -> BTreeSet<NodeId> {
        let adjacency = self.undirected_adjacency();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();

        for &start in nodes {
            if self.contains(start) && visited.insert(start) {
                queue.push_back(start);
            }
        }

        while let Some(current) = queue.pop_front() {
            for &next in adjacency.get(&current).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    /// Labels every node with the index of its weak component, so that two
    /// nodes are weakly connected iff their labels are equal.
    pub fn component_labels(&self) -> HashMap<NodeId, usize> {
        let adjacency = self.undirected_adjacency();
        let mut labels = HashMap::with_capacity(adjacency.len());
        let mut component = 0usize;

        for start in self.nodes().map(|node| node.id()) {
            if labels.contains_key(&start) {
                continue;
            }

            labels.insert(start, component);
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                for &next in adjacency.get(&current).into_iter().flatten() {
                    if !labels.contains_key(&next) {
                        labels.insert(next, component);
                        queue.push_back(next);
                    }
                }
            }

            component += 1;
        }

        labels
    }

    /// BFS layers over the undirected view: index `k` holds the nodes at
    /// distance `k` from `root`. Unreachable nodes are left out.
    pub fn distance_layers_from_root(&self, root: NodeId) -> Vec<Vec<NodeId>> {
        if !self.contains(root) {
            return Vec::new();
        }

        let adjacency = self.undirected_adjacency();
        let mut layers = vec![vec![root]];
        let mut visited = HashSet::from([root]);

        loop {
            let mut next_layer = Vec::new();
            for current in layers.last().into_iter().flatten() {
                for &next in adjacency.get(current).into_iter().flatten() {
                    if visited.insert(next) {
                        next_layer.push(next);
                    }
                }
            }

            if next_layer.is_empty() {
                break;
            }
            layers.push(next_layer);
        }

        layers
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::graph::GraphFlags;
    use crate::vector::Vec2;

    use super::*;

    fn chain(count: usize, flags: GraphFlags) -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::with_flags(flags);
        let ids = (0..count)
            .map(|index| graph.add_node(Vec2::new(index as f64, 0.0)).unwrap())
            .collect::<Vec<_>>();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1], None).unwrap();
        }
        (graph, ids)
    }

    fn arbitrary_graph() -> impl Strategy<Value = (Graph, Vec<NodeId>)> {
        (1usize..9, any::<bool>()).prop_flat_map(|(count, directed)| {
            proptest::collection::vec((0..count, 0..count), 0..12).prop_map(move |pairs| {
                let mut graph = Graph::with_flags(GraphFlags {
                    directed,
                    ..GraphFlags::default()
                });
                let ids = (0..count)
                    .map(|index| graph.add_node(Vec2::new(index as f64, 0.0)).unwrap())
                    .collect::<Vec<_>>();
                for (a, b) in pairs {
                    if a != b {
                        graph.add_edge(ids[a], ids[b], None).unwrap();
                    }
                }
                (graph, ids)
            })
        })
    }

    #[test]
    fn direction_does_not_matter_for_weak_connectivity() {
        let (graph, ids) = chain(
            3,
            GraphFlags {
                directed: true,
                ..GraphFlags::default()
            },
        );

        assert!(graph.weakly_connected(ids[2], ids[0]));
        assert!(graph.weakly_connected(ids[0], ids[2]));
    }

    #[test]
    fn separate_components_are_not_connected() {
        let (mut graph, ids) = chain(2, GraphFlags::default());
        let lonely = graph.add_node(Vec2::new(10.0, 10.0)).unwrap();

        assert!(!graph.weakly_connected(ids[0], lonely));
        assert_eq!(
            graph.weakly_connected_set(&[ids[1]]),
            BTreeSet::from([ids[0], ids[1]])
        );
        assert_eq!(graph.weakly_connected_set(&[ids[1], lonely]).len(), 3);
    }

    #[test]
    fn layers_of_a_chain_are_singletons() {
        let (graph, ids) = chain(4, GraphFlags::default());

        let layers = graph.distance_layers_from_root(ids[0]);

        assert_eq!(
            layers,
            vec![vec![ids[0]], vec![ids[1]], vec![ids[2]], vec![ids[3]]]
        );
    }

    #[test]
    fn unreachable_nodes_have_no_layer() {
        let (mut graph, ids) = chain(2, GraphFlags::default());
        let lonely = graph.add_node(Vec2::ZERO).unwrap();

        let layers = graph.distance_layers_from_root(ids[1]);

        assert_eq!(layers.len(), 2);
        assert!(layers.iter().flatten().all(|&id| id != lonely));
    }

    proptest! {
        #[test]
        fn weak_connectivity_is_an_equivalence((graph, ids) in arbitrary_graph()) {
            for &a in &ids {
                prop_assert!(graph.weakly_connected(a, a));
                for &b in &ids {
                    let ab = graph.weakly_connected(a, b);
                    prop_assert_eq!(ab, graph.weakly_connected(b, a));
                    for &c in &ids {
                        if ab && graph.weakly_connected(b, c) {
                            prop_assert!(graph.weakly_connected(a, c));
                        }
                    }
                }
            }
        }

        #[test]
        fn component_labels_agree_with_bfs((graph, ids) in arbitrary_graph()) {
            let labels = graph.component_labels();
            for &a in &ids {
                for &b in &ids {
                    prop_assert_eq!(labels[&a] == labels[&b], graph.weakly_connected(a, b));
                }
            }
        }

        #[test]
        fn every_layer_touches_the_previous_one((graph, ids) in arbitrary_graph()) {
            let root = ids[0];
            let layers = graph.distance_layers_from_root(root);
            let adjacency = graph.undirected_adjacency();

            prop_assert_eq!(&layers[0], &vec![root]);
            for window in layers.windows(2) {
                for node in &window[1] {
                    prop_assert!(adjacency[node].iter().any(|n| window[0].contains(n)));
                }
            }
        }
    }
}
