use std::path::Path;

use anyhow::Result;
use log::debug;

use crate::coords::LayoutContext;
use crate::curve::catmull_rom_path;
use crate::layout::Layout;
use crate::theme::Theme;

#[cfg(feature = "png")]
use crate::config::RenderConfig;

/// Chordal Catmull-Rom, as used for every link.
pub const LINK_CURVE_ALPHA: f32 = 1.0;

pub fn render_svg(layout: &Layout, ctx: &LayoutContext, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = ctx.canvas.width;
    let height = ctx.canvas.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));

    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<g class=\"linkLayer\">");
    for link in &layout.links {
        let points: Vec<_> = link.points.iter().map(|p| ctx.get_coords(*p)).collect();
        let d = catmull_rom_path(&points, LINK_CURVE_ALPHA);
        svg.push_str(&format!(
            "<g class=\"link\"><path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/></g>",
            d, theme.line_color, theme.line_width
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodeLayer\">");
    for node in &layout.nodes {
        let rect = ctx.node_rect(node);
        svg.push_str(&format!(
            "<g class=\"node\" transform=\"translate({:.2},{:.2})\">",
            rect.x, rect.y
        ));
        svg.push_str(&format!(
            "<rect width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            rect.width, rect.height, theme.node_fill, theme.node_stroke, theme.node_stroke_width
        ));
        svg.push_str(&format!(
            "<text x=\"0.5em\" y=\"1.5em\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&node.id)
        ));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    debug!(
        nodes = layout.nodes.len(),
        links = layout.links.len(),
        bytes = svg.len();
        "SVG rendered",
    );
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    use std::sync::Arc;

    // usvg drops every label when its font database is empty
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let mut opt = usvg::Options::default();
    opt.fontdb = Arc::new(db);
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid canvas size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, RenderConfig};
    use crate::hierarchy::Hierarchy;
    use crate::layout::{compute_layout, measure_labels};
    use crate::outline::HierarchyRecord;
    use crate::text_metrics::FixedWidthMeasurer;

    fn render(records: &[HierarchyRecord]) -> String {
        let hierarchy = Hierarchy::build(records).unwrap();
        let theme = Theme::modern();
        let measured = measure_labels(&hierarchy, &FixedWidthMeasurer::new(7.0), &theme.label_font());
        let layout = compute_layout(&hierarchy, &measured, &LayoutConfig::default());
        let ctx = LayoutContext::from_config(&layout, &RenderConfig::default());
        render_svg(&layout, &ctx, &theme)
    }

    #[test]
    fn render_svg_basic() {
        let svg = render(&[
            HierarchyRecord::leaf("Alpha"),
            HierarchyRecord::with_children(
                "Beta",
                vec![HierarchyRecord::leaf("Gamma"), HierarchyRecord::leaf("Delta")],
            ),
        ]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"1600\""));
        assert_eq!(svg.matches("<g class=\"node\"").count(), 4);
        assert_eq!(svg.matches("<g class=\"link\"").count(), 2);
        assert!(svg.contains(">Gamma</text>"));
        assert!(svg.contains("x=\"0.5em\" y=\"1.5em\""));
        // links are drawn below nodes
        let links_at = svg.find("linkLayer").unwrap();
        let nodes_at = svg.find("nodeLayer").unwrap();
        assert!(links_at < nodes_at);
    }

    #[test]
    fn labels_are_escaped() {
        let svg = render(&[HierarchyRecord::leaf("Q&A <draft>")]);
        assert!(svg.contains("Q&amp;A &lt;draft&gt;"));
        assert!(!svg.contains("<draft>"));
    }

    #[test]
    fn empty_layout_has_empty_layers() {
        let svg = render(&[]);
        assert!(svg.contains("<g class=\"linkLayer\"></g>"));
        assert!(svg.contains("<g class=\"nodeLayer\"></g>"));
    }
}
