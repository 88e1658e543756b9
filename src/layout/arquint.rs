use log::debug;

use crate::config::LayoutConfig;
use crate::hierarchy::{Hierarchy, NodeIndex};

use super::{ColumnAlignment, EngineInput, LayoutEngine, NodeBox};

/// Layered layout with variable node heights.
///
/// Layers are stacked along layout `y`, each as deep as its tallest node
/// and separated by `inter_layer_separation`. Nodes are one unit wide and
/// sit in columns along layout `x`, `column_separation` apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arquint {
    pub column_separation: f32,
    pub inter_layer_separation: f32,
    pub alignment: ColumnAlignment,
}

impl Default for Arquint {
    fn default() -> Self {
        Self {
            column_separation: 1.0,
            inter_layer_separation: 0.2,
            alignment: ColumnAlignment::Center,
        }
    }
}

impl Arquint {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            column_separation: config.column_separation.max(0.0),
            inter_layer_separation: config.inter_layer_separation.max(0.0),
            alignment: config.column_alignment,
        }
    }

    /// Column of every node. Leaves take consecutive columns in preorder,
    /// parents are aligned on their children.
    fn columns(&self, hierarchy: &Hierarchy) -> Vec<f32> {
        let mut columns = vec![0.0f32; hierarchy.len()];
        let mut next_leaf = 0.0f32;
        for &root in hierarchy.roots() {
            self.place_subtree(hierarchy, root, &mut columns, &mut next_leaf);
        }
        columns
    }

    fn place_subtree(
        &self,
        hierarchy: &Hierarchy,
        index: NodeIndex,
        columns: &mut [f32],
        next_leaf: &mut f32,
    ) -> f32 {
        let children = hierarchy.children(index);
        let column = if children.is_empty() {
            let column = *next_leaf;
            *next_leaf += 1.0;
            column
        } else {
            let placed: Vec<f32> = children
                .iter()
                .map(|&child| self.place_subtree(hierarchy, child, columns, next_leaf))
                .collect();
            let first = placed[0];
            let last = placed[placed.len() - 1];
            match self.alignment {
                ColumnAlignment::Center => (first + last) / 2.0,
                ColumnAlignment::Top => first,
            }
        };
        columns[index] = column;
        column
    }

    /// Top of every layer: each layer is as deep as its tallest node and
    /// followed by `inter_layer_separation`.
    pub(super) fn layer_tops(&self, layers: &[usize], ratios: &[f32]) -> Vec<f32> {
        let layer_count = layers.iter().map(|layer| layer + 1).max().unwrap_or(0);
        let mut depths = vec![0.0f32; layer_count];
        for (&layer, &ratio) in layers.iter().zip(ratios) {
            depths[layer] = depths[layer].max(ratio);
        }
        let mut tops = Vec::with_capacity(layer_count);
        let mut top = 0.0f32;
        for depth in depths {
            tops.push(top);
            top += depth + self.inter_layer_separation;
        }
        tops
    }
}

impl LayoutEngine for Arquint {
    fn name(&self) -> &'static str {
        "arquint"
    }

    fn place(&self, input: &EngineInput<'_>) -> Vec<NodeBox> {
        let columns = self.columns(input.hierarchy);
        let tops = self.layer_tops(input.layers, input.height_ratios);
        let pitch = 1.0 + self.column_separation;

        let boxes: Vec<NodeBox> = columns
            .iter()
            .enumerate()
            .map(|(index, &column)| {
                let ratio = input.height_ratios.get(index).copied().unwrap_or(1.0);
                let layer = input.layers.get(index).copied().unwrap_or(0);
                let y0 = tops.get(layer).copied().unwrap_or(0.0);
                let x0 = column * pitch;
                NodeBox {
                    x0,
                    y0,
                    x1: x0 + 1.0,
                    y1: y0 + ratio,
                }
            })
            .collect();
        debug!(
            layers = tops.len(),
            columns = columns.iter().fold(0.0f32, |acc, c| acc.max(*c + 1.0));
            "Arquint placement done",
        );
        boxes
    }
}
