//! Link routing in layout space.
//!
//! Links leave the source through the far edge of its box, cross every
//! layer between source and target on a straight line and enter the target
//! through its near edge. Layers are horizontal bands along layout `y`.

use super::{LaidOutNode, Point};

/// Extent of one layer along layout `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerBand {
    pub top: f32,
    pub bottom: f32,
}

/// One band per layer, spanning every node box of that layer. Layers
/// without nodes get an empty band at the bottom of the previous one.
pub fn layer_bands(nodes: &[LaidOutNode]) -> Vec<LayerBand> {
    let layer_count = nodes.iter().map(|node| node.layer + 1).max().unwrap_or(0);
    let mut bands: Vec<Option<LayerBand>> = vec![None; layer_count];
    for node in nodes {
        let band = bands[node.layer].get_or_insert(LayerBand {
            top: node.y0,
            bottom: node.y1,
        });
        band.top = band.top.min(node.y0);
        band.bottom = band.bottom.max(node.y1);
    }

    let mut previous_bottom = 0.0f32;
    bands
        .into_iter()
        .map(|band| {
            let band = band.unwrap_or(LayerBand {
                top: previous_bottom,
                bottom: previous_bottom,
            });
            previous_bottom = band.bottom;
            band
        })
        .collect()
}

/// Routing points of the link `source → target`.
///
/// The first point is `(source.x, source.y1)` and the last one is
/// `(target.x, target.y0)`.
pub fn route_link(source: &LaidOutNode, target: &LaidOutNode, bands: &[LayerBand]) -> Vec<Point> {
    let start = Point::new(source.x, source.y1);
    let end = Point::new(target.x, target.y0);
    if target.layer <= source.layer {
        return dedup(vec![start, end]);
    }

    let mut points = vec![start];
    if let Some(band) = bands.get(source.layer) {
        points.push(Point::new(source.x, band.bottom.max(source.y1)));
    }

    let span = (target.layer - source.layer) as f32;
    for layer in source.layer + 1..target.layer {
        let Some(band) = bands.get(layer) else {
            continue;
        };
        let t = (layer - source.layer) as f32 / span;
        let x = source.x + (target.x - source.x) * t;
        points.push(Point::new(x, band.top));
        points.push(Point::new(x, band.bottom));
    }

    if let Some(band) = bands.get(target.layer) {
        points.push(Point::new(target.x, band.top.min(target.y0)));
    }
    points.push(end);
    dedup(points)
}

fn dedup(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup_by(|a, b| (a.x - b.x).abs() <= f32::EPSILON && (a.y - b.y).abs() <= f32::EPSILON);
    points
}
