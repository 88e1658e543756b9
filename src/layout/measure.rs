use log::{debug, trace};

use crate::hierarchy::Hierarchy;
use crate::text_metrics::{Font, TextMeasurer};

use super::MeasuredNode;

/// Measures the label of every node in preorder.
///
/// All nodes are measured before anything is laid out, since the layout
/// needs the longest label up front.
pub fn measure_labels(
    hierarchy: &Hierarchy,
    measurer: &dyn TextMeasurer,
    font: &Font,
) -> Vec<MeasuredNode> {
    let measured: Vec<MeasuredNode> = hierarchy
        .descendants()
        .map(|node| {
            let width = measurer.measure(node.id(), font);
            let label_size = if width.is_finite() { width.max(0.0) } else { 0.0 };
            trace!(id = node.id(), label_size = label_size; "Measured label");
            MeasuredNode {
                index: node.index(),
                id: node.id().to_string(),
                label_size,
            }
        })
        .collect();
    debug!(
        nodes = measured.len(),
        font_family = font.family.as_str(),
        font_size = font.size;
        "Labels measured",
    );
    measured
}
