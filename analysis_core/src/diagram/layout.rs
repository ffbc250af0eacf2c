//! Layered layout for parsed flowcharts.
//!
//! Nodes are assigned to layers by longest path from the sources, then
//! spread evenly across each layer in first-appearance order. Positions are
//! normalized to the unit square so the front-end can scale them to whatever
//! surface it draws on.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::flowchart::{Direction, Flowchart};

/// Where one node sits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePlacement {
    pub layer: usize,
    /// Position within the layer, 0-based
    pub order: usize,
    /// Center, 0.0..=1.0
    pub x: f32,
    /// Center, 0.0..=1.0
    pub y: f32,
}

/// A flowchart plus a placement for each of its nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowchartLayout {
    pub chart: Flowchart,
    /// Parallel to `chart.nodes`
    pub placements: Vec<NodePlacement>,
    /// Parallel to `chart.edges`; true for edges that close a cycle
    pub back_edges: Vec<bool>,
    pub layer_count: usize,
    /// Node count of the widest layer
    pub max_layer_width: usize,
}

impl FlowchartLayout {
    /// Node indices grouped by layer, each group in order
    pub fn layers(&self) -> Vec<Vec<usize>> {
        let mut layers = vec![Vec::new(); self.layer_count];
        for (idx, placement) in self.placements.iter().enumerate() {
            layers[placement.layer].push((placement.order, idx));
        }
        layers
            .into_iter()
            .map(|mut layer: Vec<(usize, usize)>| {
                layer.sort_unstable();
                layer.into_iter().map(|(_, idx)| idx).collect()
            })
            .collect()
    }
}

/// Lay out a flowchart.
pub fn layout(chart: Flowchart) -> FlowchartLayout {
    let node_count = chart.nodes.len();
    let back_edges = find_back_edges(&chart);
    let layer_of = assign_layers(&chart, &back_edges);

    let layer_count = layer_of.iter().copied().max().map_or(0, |max| max + 1);
    let mut layer_sizes = vec![0usize; layer_count];
    let mut order_of = vec![0usize; node_count];
    for (idx, &layer) in layer_of.iter().enumerate() {
        order_of[idx] = layer_sizes[layer];
        layer_sizes[layer] += 1;
    }
    let max_layer_width = layer_sizes.iter().copied().max().unwrap_or(0);

    let placements = (0..node_count)
        .map(|idx| {
            let layer = layer_of[idx];
            let order = order_of[idx];
            let along = (layer as f32 + 0.5) / layer_count as f32;
            let across = (order as f32 + 0.5) / layer_sizes[layer] as f32;
            let (x, y) = match chart.direction {
                Direction::TopDown => (across, along),
                Direction::BottomUp => (across, 1.0 - along),
                Direction::LeftRight => (along, across),
                Direction::RightLeft => (1.0 - along, across),
            };
            NodePlacement { layer, order, x, y }
        })
        .collect();

    FlowchartLayout {
        chart,
        placements,
        back_edges,
        layer_count,
        max_layer_width,
    }
}

/// DFS in node order; an edge into a node still on the stack closes a cycle.
fn find_back_edges(chart: &Flowchart) -> Vec<bool> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut outgoing = vec![Vec::new(); chart.nodes.len()];
    for (edge_idx, edge) in chart.edges.iter().enumerate() {
        outgoing[edge.from].push(edge_idx);
    }

    let mut marks = vec![Mark::Unvisited; chart.nodes.len()];
    let mut back = vec![false; chart.edges.len()];

    for root in 0..chart.nodes.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        // (node, next outgoing edge to look at)
        let mut stack = vec![(root, 0usize)];
        marks[root] = Mark::OnStack;

        while let Some((node, cursor)) = stack.pop() {
            let Some(&edge_idx) = outgoing[node].get(cursor) else {
                marks[node] = Mark::Done;
                continue;
            };
            stack.push((node, cursor + 1));

            let target = chart.edges[edge_idx].to;
            match marks[target] {
                Mark::OnStack => back[edge_idx] = true,
                Mark::Unvisited => {
                    marks[target] = Mark::OnStack;
                    stack.push((target, 0));
                }
                Mark::Done => {}
            }
        }
    }

    back
}

/// Longest path from any source over the forward edges (Kahn order).
fn assign_layers(chart: &Flowchart, back_edges: &[bool]) -> Vec<usize> {
    let node_count = chart.nodes.len();
    let mut indegree = vec![0usize; node_count];
    let mut outgoing = vec![Vec::new(); node_count];

    for (edge, &is_back) in chart.edges.iter().zip(back_edges) {
        if is_back {
            continue;
        }
        indegree[edge.to] += 1;
        outgoing[edge.from].push(edge.to);
    }

    let mut layer = vec![0usize; node_count];
    let mut queue: VecDeque<usize> = (0..node_count).filter(|&idx| indegree[idx] == 0).collect();

    while let Some(node) = queue.pop_front() {
        for &target in &outgoing[node] {
            layer[target] = layer[target].max(layer[node] + 1);
            indegree[target] -= 1;
            if indegree[target] == 0 {
                queue.push_back(target);
            }
        }
    }

    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::flowchart::parse;

    #[test]
    fn test_chain_layers() {
        let layout = layout(parse("graph TD\nA --> B --> C").unwrap());
        let layers: Vec<_> = layout.placements.iter().map(|p| p.layer).collect();
        assert_eq!(layers, vec![0, 1, 2]);
        assert_eq!(layout.layer_count, 3);
        assert_eq!(layout.max_layer_width, 1);
        // Top-down: x centered, y increasing
        assert!(layout.placements.iter().all(|p| (p.x - 0.5).abs() < f32::EPSILON));
        assert!(layout.placements[0].y < layout.placements[2].y);
    }

    #[test]
    fn test_longest_path_wins() {
        // D is reachable in one step from A and in two via B
        let layout = layout(parse("graph TD\nA --> B\nB --> D\nA --> D").unwrap());
        assert_eq!(layout.chart.nodes[2].id, "D");
        assert_eq!(layout.placements[2].layer, 2);
    }

    #[test]
    fn test_branches_share_a_layer() {
        let layout = layout(parse("graph TD\nA --> B\nA --> C").unwrap());
        assert_eq!(layout.layers(), vec![vec![0], vec![1, 2]]);
        assert_eq!(layout.max_layer_width, 2);
        assert!(layout.placements[1].x < layout.placements[2].x);
    }

    #[test]
    fn test_cycle_is_broken() {
        let layout = layout(parse("graph TD\nA --> B --> C --> A").unwrap());
        assert_eq!(layout.back_edges, vec![false, false, true]);
        let layers: Vec<_> = layout.placements.iter().map(|p| p.layer).collect();
        assert_eq!(layers, vec![0, 1, 2]);
    }

    #[test]
    fn test_self_loop_is_back_edge() {
        let layout = layout(parse("graph TD\nA --> A").unwrap());
        assert_eq!(layout.back_edges, vec![true]);
        assert_eq!(layout.layer_count, 1);
    }

    #[test]
    fn test_left_right_swaps_axes() {
        let layout = layout(parse("graph LR\nA --> B").unwrap());
        assert!(layout.placements[0].x < layout.placements[1].x);
        assert!((layout.placements[0].y - 0.5).abs() < f32::EPSILON);

        let layout = super::layout(parse("graph RL\nA --> B").unwrap());
        assert!(layout.placements[0].x > layout.placements[1].x);
    }

    #[test]
    fn test_header_only_is_empty() {
        let layout = layout(parse("graph TD").unwrap());
        assert!(layout.placements.is_empty());
        assert_eq!(layout.layer_count, 0);
        assert!(layout.layers().is_empty());
    }
}
