use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use log::{debug, warn};

use crate::config::LayoutConfig;

use super::{Arquint, EngineInput, LayoutEngine, NodeBox};

/// Positions nodes with `dagre_rust`, top to bottom.
///
/// Node widths are 1 and heights are the height ratios, so boxes live in
/// the same layout space as the arquint engine. If dagre fails the layout
/// falls back to [`Arquint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dagre {
    pub node_separation: f32,
    pub rank_separation: f32,
    fallback: Arquint,
}

impl Dagre {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            node_separation: config.column_separation.max(0.0),
            rank_separation: config.inter_layer_separation.max(0.0),
            fallback: Arquint::from_config(config),
        }
    }
}

struct DagreInput {
    nodes: Vec<(String, f32, usize)>,
    edges: Vec<(String, String)>,
    node_separation: f32,
    rank_separation: f32,
}

fn node_key(index: usize) -> String {
    format!("n{index}")
}

fn run_dagre(input: DagreInput) -> Vec<Option<(f32, f32)>> {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some("tb".to_string());
    graph_config.nodesep = Some(input.node_separation);
    graph_config.ranksep = Some(input.rank_separation);
    graph_config.marginx = Some(0.0);
    graph_config.marginy = Some(0.0);
    dagre_graph.set_graph(graph_config);

    for (key, height, order) in &input.nodes {
        let mut node = DagreNode::default();
        node.width = 1.0;
        node.height = *height;
        node.order = Some(*order);
        dagre_graph.set_node(key.clone(), Some(node));
    }

    for (from, to) in &input.edges {
        let _ = dagre_graph.set_edge(from, to, Some(DagreEdge::default()), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    input
        .nodes
        .iter()
        .map(|(key, _, _)| dagre_graph.node(key).map(|node| (node.x, node.y)))
        .collect()
}

impl LayoutEngine for Dagre {
    fn name(&self) -> &'static str {
        "dagre"
    }

    fn place(&self, input: &EngineInput<'_>) -> Vec<NodeBox> {
        let ratios = input.height_ratios;
        let dagre_input = DagreInput {
            nodes: input
                .hierarchy
                .descendants()
                .map(|node| {
                    let index = node.index();
                    (node_key(index), ratios.get(index).copied().unwrap_or(1.0), index)
                })
                .collect(),
            edges: input
                .hierarchy
                .links()
                .into_iter()
                .map(|link| (node_key(link.source), node_key(link.target)))
                .collect(),
            node_separation: self.node_separation,
            rank_separation: self.rank_separation,
        };

        let centres = match std::panic::catch_unwind(move || run_dagre(dagre_input)) {
            Ok(centres) if centres.iter().all(Option::is_some) => centres,
            Ok(_) => {
                warn!("dagre did not position every node; falling back to arquint");
                return self.fallback.place(input);
            }
            Err(_) => {
                warn!("dagre layout panicked; falling back to arquint");
                return self.fallback.place(input);
            }
        };

        let tops = self.fallback.layer_tops(input.layers, ratios);
        let layer_of = |index: usize| input.layers.get(index).copied().unwrap_or(0);

        // Dagre ranks may differ from ours, so only its x order within each
        // of our layers is kept; y comes from the shared layer tops.
        let mut x0s: Vec<f32> = centres
            .iter()
            .map(|centre| centre.map_or(0.0, |(x, _)| x - 0.5))
            .collect();
        let mut by_layer: Vec<Vec<usize>> = vec![Vec::new(); tops.len()];
        for index in 0..x0s.len() {
            if let Some(members) = by_layer.get_mut(layer_of(index)) {
                members.push(index);
            }
        }
        for members in &mut by_layer {
            members.sort_by(|a, b| x0s[*a].total_cmp(&x0s[*b]).then(a.cmp(b)));
            let mut min_x0 = f32::NEG_INFINITY;
            for &index in members.iter() {
                x0s[index] = x0s[index].max(min_x0);
                min_x0 = x0s[index] + 1.0 + self.node_separation;
            }
        }

        let min_x = x0s.iter().copied().fold(f32::INFINITY, f32::min);
        let shift_x = if min_x.is_finite() { min_x } else { 0.0 };
        let boxes: Vec<NodeBox> = x0s
            .iter()
            .enumerate()
            .map(|(index, &x0)| {
                let height = ratios.get(index).copied().unwrap_or(1.0);
                let y0 = tops.get(layer_of(index)).copied().unwrap_or(0.0);
                NodeBox {
                    x0: x0 - shift_x,
                    y0,
                    x1: x0 - shift_x + 1.0,
                    y1: y0 + height,
                }
            })
            .collect();

        debug!(nodes = boxes.len(), layers = tops.len(), shift_x = shift_x; "Dagre placement done");
        boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Hierarchy;
    use crate::layout::layering::assign_layers;
    use crate::outline::HierarchyRecord;

    #[test]
    fn boxes_start_at_origin_and_keep_heights() {
        let hierarchy = Hierarchy::build(&[HierarchyRecord::with_children(
            "B",
            vec![HierarchyRecord::leaf("C"), HierarchyRecord::leaf("D")],
        )])
        .unwrap();
        let ratios = [1.0, 0.5, 0.25];
        let layers = assign_layers(hierarchy.len(), &hierarchy.links());
        let boxes = Dagre::from_config(&LayoutConfig::default()).place(&EngineInput {
            hierarchy: &hierarchy,
            layers: &layers,
            height_ratios: &ratios,
        });
        assert_eq!(boxes.len(), 3);
        let min_x = boxes.iter().map(|b| b.x0).fold(f32::INFINITY, f32::min);
        let min_y = boxes.iter().map(|b| b.y0).fold(f32::INFINITY, f32::min);
        assert!(min_x.abs() < 1e-4);
        assert!(min_y.abs() < 1e-4);
        for (b, ratio) in boxes.iter().zip(ratios) {
            assert!((b.x1 - b.x0 - 1.0).abs() < 1e-4);
            assert!((b.y1 - b.y0 - ratio).abs() < 1e-4);
        }
        // children below their parent
        assert!(boxes[1].y0 >= boxes[0].y1 - 1e-4);
        assert!(boxes[2].y0 >= boxes[0].y1 - 1e-4);
        assert_eq!(boxes[1].y0, boxes[2].y0);
        assert!((boxes[1].y0 - 1.2).abs() < 1e-4);
    }

    #[test]
    fn layers_stack_like_arquint() {
        let hierarchy = Hierarchy::build(&[
            HierarchyRecord::leaf("A"),
            HierarchyRecord::with_children(
                "B",
                vec![
                    HierarchyRecord::with_children("C", vec![HierarchyRecord::leaf("E")]),
                    HierarchyRecord::leaf("D"),
                ],
            ),
        ])
        .unwrap();
        let ratios = [0.3, 1.0, 0.6, 0.2, 0.9];
        let layers = assign_layers(hierarchy.len(), &hierarchy.links());
        let input = EngineInput {
            hierarchy: &hierarchy,
            layers: &layers,
            height_ratios: &ratios,
        };
        let config = LayoutConfig::default();
        let dagre = Dagre::from_config(&config).place(&input);
        let arquint = Arquint::from_config(&config).place(&input);
        for (index, (d, a)) in dagre.iter().zip(&arquint).enumerate() {
            assert!((d.y0 - a.y0).abs() < 1e-4, "node {index}");
            assert!((d.y1 - a.y1).abs() < 1e-4, "node {index}");
        }
        for link in hierarchy.links() {
            assert!(dagre[link.target].y0 >= dagre[link.source].y1 - 1e-4);
        }
        for (i, a) in dagre.iter().enumerate() {
            for (j, b) in dagre.iter().enumerate().skip(i + 1) {
                if layers[i] == layers[j] {
                    assert!(a.x1 <= b.x0 + 1e-4 || b.x1 <= a.x0 + 1e-4, "{i} overlaps {j}");
                }
            }
        }
    }
}
