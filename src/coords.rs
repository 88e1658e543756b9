//! Mapping from layout space to screen space.
//!
//! Layout space stacks layers along `y`. On screen the tree grows left to
//! right, so the axes are swapped: layout `y` drives screen `x` and layout
//! `x` drives screen `y`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::layout::{LaidOutNode, Layout, Point};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenCoord {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 100.0,
            top: 20.0,
            right: 300.0,
            bottom: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1600.0,
        }
    }
}

/// Which canvas dimension bounds the vertical screen range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalExtent {
    /// The canvas width, as the reference renderer does. Same result on a
    /// square canvas.
    #[default]
    Width,
    Height,
}

/// Affine map from `domain` to `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f32, f32),
    pub range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// A zero-width domain maps everything to the middle of the range.
    pub fn apply(&self, value: f32) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }
}

/// Screen rectangle of a node: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scales and margins shared by every drawing step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutContext {
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub canvas: Canvas,
    pub margins: Margins,
}

impl LayoutContext {
    pub fn new(
        layout: &Layout,
        canvas: Canvas,
        margins: Margins,
        vertical_extent: VerticalExtent,
    ) -> Self {
        let (max_x1, max_y1) = layout.extent();
        let vertical_bound = match vertical_extent {
            VerticalExtent::Width => canvas.width,
            VerticalExtent::Height => canvas.height,
        };
        let x_scale = LinearScale::new(
            (0.0, max_y1),
            (margins.left, canvas.width - margins.right),
        );
        let y_scale = LinearScale::new(
            (0.0, max_x1),
            (margins.top, vertical_bound - margins.bottom),
        );
        debug!(
            max_x1 = max_x1,
            max_y1 = max_y1,
            canvas_width = canvas.width,
            canvas_height = canvas.height,
            vertical_bound = vertical_bound;
            "Screen scales built",
        );
        Self {
            x_scale,
            y_scale,
            canvas,
            margins,
        }
    }

    pub fn from_config(layout: &Layout, config: &RenderConfig) -> Self {
        Self::new(
            layout,
            Canvas {
                width: config.width,
                height: config.height,
            },
            config.margins,
            config.vertical_extent,
        )
    }

    /// Screen position of a layout-space point.
    pub fn get_coords(&self, point: Point) -> ScreenCoord {
        ScreenCoord {
            x: self.x_scale.apply(point.y),
            y: self.y_scale.apply(point.x),
        }
    }

    pub fn node_rect(&self, node: &LaidOutNode) -> NodeRect {
        let c0 = self.get_coords(node.top_left());
        let c1 = self.get_coords(node.bottom_right());
        NodeRect {
            x: c0.x,
            y: c0.y,
            width: c1.x - c0.x,
            height: c1.y - c0.y,
        }
    }
}
