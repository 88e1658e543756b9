use crate::coords::{LayoutContext, LinearScale, NodeRect, ScreenCoord};
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub extent: [f32; 2],
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub layer: usize,
    pub label_size: f32,
    pub height_ratio: f32,
    /// `[x0, y0, x1, y1]` in layout space.
    pub bounds: [f32; 4],
    pub screen: NodeRect,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub points: Vec<[f32; 2]>,
    pub screen_points: Vec<ScreenCoord>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, ctx: &LayoutContext) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                layer: node.layer,
                label_size: node.label_size,
                height_ratio: node.height_ratio,
                bounds: [node.x0, node.y0, node.x1, node.y1],
                screen: ctx.node_rect(node),
            })
            .collect();

        let id = |index: usize| {
            layout
                .node(index)
                .map(|node| node.id.clone())
                .unwrap_or_default()
        };
        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                source: id(link.source),
                target: id(link.target),
                points: link.points.iter().map(|p| [p.x, p.y]).collect(),
                screen_points: link.points.iter().map(|p| ctx.get_coords(*p)).collect(),
            })
            .collect();

        let (max_x1, max_y1) = layout.extent();
        LayoutDump {
            canvas_width: ctx.canvas.width,
            canvas_height: ctx.canvas.height,
            extent: [max_x1, max_y1],
            x_scale: ctx.x_scale,
            y_scale: ctx.y_scale,
            nodes,
            links,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, ctx: &LayoutContext) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, ctx);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, RenderConfig};
    use crate::hierarchy::Hierarchy;
    use crate::layout::{compute_layout, measure_labels};
    use crate::outline::HierarchyRecord;
    use crate::text_metrics::{FixedWidthMeasurer, Font};

    #[test]
    fn dump_names_link_endpoints_by_id() {
        let hierarchy = Hierarchy::build(&[HierarchyRecord::with_children(
            "B",
            vec![HierarchyRecord::leaf("C"), HierarchyRecord::leaf("D")],
        )])
        .unwrap();
        let measured = measure_labels(&hierarchy, &FixedWidthMeasurer::new(6.0), &Font::new("mono", 12.0));
        let layout = compute_layout(&hierarchy, &measured, &LayoutConfig::default());
        let ctx = LayoutContext::from_config(&layout, &RenderConfig::default());
        let dump = LayoutDump::from_layout(&layout, &ctx);

        assert_eq!(dump.nodes.len(), 3);
        let ends: Vec<(&str, &str)> = dump
            .links
            .iter()
            .map(|link| (link.source.as_str(), link.target.as_str()))
            .collect();
        assert_eq!(ends, vec![("B", "C"), ("B", "D")]);

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["canvas_width"], 1600.0);
        assert!(json["nodes"][0]["screen"]["width"].as_f64().unwrap() > 0.0);
    }
}
