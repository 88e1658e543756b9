//! Layered layout of a measured hierarchy.
//!
//! The pipeline is staged: [`measure_labels`] produces [`MeasuredNode`]s,
//! [`compute_layout`] turns them into [`LaidOutNode`]s and routes every
//! link. Layout space is abstract: layers are stacked along `y`, columns
//! run along `x`, and a node's extent along `y` is its height ratio.

mod arquint;
mod dagre;
pub mod layering;
mod measure;
pub mod routing;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::hierarchy::{Hierarchy, NodeIndex};

pub use arquint::Arquint;
pub use dagre::Dagre;
pub use measure::measure_labels;

/// Height ratio given to zero-width labels so they still get a visible box.
pub const MIN_HEIGHT_RATIO: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A node whose label has been measured but not yet placed.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredNode {
    pub index: NodeIndex,
    pub id: String,
    pub label_size: f32,
}

/// A placed node. `(x0, y0)`-`(x1, y1)` is its box in layout space and
/// `(x, y)` the box centre.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutNode {
    pub index: NodeIndex,
    pub id: String,
    pub label_size: f32,
    pub height_ratio: f32,
    pub layer: usize,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub x: f32,
    pub y: f32,
}

impl LaidOutNode {
    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x1, self.y1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLink {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub nodes: Vec<LaidOutNode>,
    pub links: Vec<LaidOutLink>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `(max x1, max y1)` over all nodes, `(0, 0)` when empty.
    pub fn extent(&self) -> (f32, f32) {
        self.nodes.iter().fold((0.0f32, 0.0f32), |(x, y), node| {
            (x.max(node.x1), y.max(node.y1))
        })
    }

    pub fn node(&self, index: NodeIndex) -> Option<&LaidOutNode> {
        self.nodes.get(index)
    }
}

/// A node box in layout space, as produced by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Everything an engine needs to position the nodes of one hierarchy.
#[derive(Debug)]
pub struct EngineInput<'a> {
    pub hierarchy: &'a Hierarchy,
    /// Layer of every node, indexed by [`NodeIndex`].
    pub layers: &'a [usize],
    /// Height ratio of every node, indexed by [`NodeIndex`].
    pub height_ratios: &'a [f32],
}

pub trait LayoutEngine {
    fn name(&self) -> &'static str;

    /// Returns one box per node, indexed by [`NodeIndex`].
    fn place(&self, input: &EngineInput<'_>) -> Vec<NodeBox>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EngineKind {
    #[default]
    Arquint,
    Dagre,
}

/// Where a parent sits relative to the columns of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlignment {
    /// Middle of the children's column span.
    #[default]
    Center,
    /// Column of the first child.
    Top,
}

pub fn engine_for(config: &LayoutConfig) -> Box<dyn LayoutEngine> {
    match config.engine {
        EngineKind::Arquint => Box::new(Arquint::from_config(config)),
        EngineKind::Dagre => Box::new(Dagre::from_config(config)),
    }
}

/// Label size of every node divided by the largest one.
///
/// A label that measures 0 gets [`MIN_HEIGHT_RATIO`]. When no label has a
/// positive width every ratio is 1.
pub fn height_ratios(measured: &[MeasuredNode]) -> Vec<f32> {
    let max_label_size = measured
        .iter()
        .map(|node| node.label_size)
        .fold(0.0f32, f32::max);
    if !(max_label_size.is_finite() && max_label_size > 0.0) {
        if !measured.is_empty() {
            warn!(
                nodes = measured.len();
                "No label has a measurable width; using uniform node sizes",
            );
        }
        return vec![1.0; measured.len()];
    }
    measured
        .iter()
        .map(|node| {
            if node.label_size > 0.0 {
                (node.label_size / max_label_size).min(1.0)
            } else {
                MIN_HEIGHT_RATIO
            }
        })
        .collect()
}

/// Places every node of `hierarchy` and routes every link.
///
/// `measured` must hold one entry per node, as returned by
/// [`measure_labels`].
pub fn compute_layout(
    hierarchy: &Hierarchy,
    measured: &[MeasuredNode],
    config: &LayoutConfig,
) -> Layout {
    if hierarchy.is_empty() {
        debug!("Empty hierarchy; nothing to lay out");
        return Layout::default();
    }

    let mut ordered = vec![None; hierarchy.len()];
    for node in measured {
        if let Some(slot) = ordered.get_mut(node.index) {
            *slot = Some(node.clone());
        }
    }
    let measured: Vec<MeasuredNode> = ordered
        .into_iter()
        .zip(hierarchy.descendants())
        .map(|(slot, node)| {
            slot.unwrap_or_else(|| MeasuredNode {
                index: node.index(),
                id: node.id().to_string(),
                label_size: 0.0,
            })
        })
        .collect();

    let ratios = height_ratios(&measured);
    let links = hierarchy.links();
    let layers = layering::assign_layers(hierarchy.len(), &links);

    let engine = engine_for(config);
    info!(engine = engine.name(), nodes = hierarchy.len(); "Running layout engine");
    let boxes = engine.place(&EngineInput {
        hierarchy,
        layers: &layers,
        height_ratios: &ratios,
    });

    let nodes: Vec<LaidOutNode> = measured
        .into_iter()
        .map(|node| {
            let index = node.index;
            let bx = boxes.get(index).copied().unwrap_or_default();
            LaidOutNode {
                index,
                id: node.id,
                label_size: node.label_size,
                height_ratio: ratios[index],
                layer: layers[index],
                x0: bx.x0,
                y0: bx.y0,
                x1: bx.x1,
                y1: bx.y1,
                x: (bx.x0 + bx.x1) / 2.0,
                y: (bx.y0 + bx.y1) / 2.0,
            }
        })
        .collect();

    let bands = routing::layer_bands(&nodes);
    let links = links
        .iter()
        .map(|link| LaidOutLink {
            source: link.source,
            target: link.target,
            points: routing::route_link(&nodes[link.source], &nodes[link.target], &bands),
        })
        .collect();

    let layout = Layout { nodes, links };
    let (max_x, max_y) = layout.extent();
    debug!(
        nodes = layout.nodes.len(),
        links = layout.links.len(),
        max_x1 = max_x,
        max_y1 = max_y;
        "Layout computed",
    );
    layout
}
