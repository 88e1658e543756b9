//! Catmull-Rom spline through screen points, as SVG path data.
//!
//! `alpha` selects the parameterization: 0 uniform, 0.5 centripetal,
//! 1 chordal. Links use `alpha = 1`.

use crate::coords::ScreenCoord;

const EPSILON: f32 = 1e-12;

/// Path data for a Catmull-Rom spline through `points`.
///
/// No points gives an empty string, one point a closed zero-length path and
/// two points a straight segment.
pub fn catmull_rom_path(points: &[ScreenCoord], alpha: f32) -> String {
    let mut spline = Spline::new(alpha.clamp(0.0, 1.0));
    for point in points {
        spline.point(point.x, point.y);
    }
    spline.finish()
}

/// Streaming spline writer. Keeps the last three points and the chord
/// lengths between them raised to `alpha` (`l_a`) and `2 * alpha` (`l_2a`).
struct Spline {
    alpha: f32,
    path: String,
    count: usize,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    l01_a: f32,
    l12_a: f32,
    l23_a: f32,
    l01_2a: f32,
    l12_2a: f32,
    l23_2a: f32,
}

impl Spline {
    fn new(alpha: f32) -> Self {
        Self {
            alpha,
            path: String::new(),
            count: 0,
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            l01_a: 0.0,
            l12_a: 0.0,
            l23_a: 0.0,
            l01_2a: 0.0,
            l12_2a: 0.0,
            l23_2a: 0.0,
        }
    }

    fn point(&mut self, x: f32, y: f32) {
        if self.count > 0 {
            let dx = self.x2 - x;
            let dy = self.y2 - y;
            self.l23_2a = (dx * dx + dy * dy).powf(self.alpha);
            self.l23_a = self.l23_2a.sqrt();
        }

        match self.count {
            0 => {
                self.path.push_str(&format!("M {x:.2} {y:.2}"));
                self.count = 1;
            }
            1 => self.count = 2,
            _ => {
                self.count = 3;
                self.segment(x, y);
            }
        }

        self.l01_a = self.l12_a;
        self.l12_a = self.l23_a;
        self.l01_2a = self.l12_2a;
        self.l12_2a = self.l23_2a;
        self.x0 = self.x1;
        self.x1 = self.x2;
        self.x2 = x;
        self.y0 = self.y1;
        self.y1 = self.y2;
        self.y2 = y;
    }

    /// Cubic from `(x1, y1)` to `(x2, y2)`, with `(x, y)` as the next point.
    fn segment(&mut self, x: f32, y: f32) {
        let (mut c1x, mut c1y) = (self.x1, self.y1);
        let (mut c2x, mut c2y) = (self.x2, self.y2);

        if self.l01_a > EPSILON {
            let a = 2.0 * self.l01_2a + 3.0 * self.l01_a * self.l12_a + self.l12_2a;
            let n = 3.0 * self.l01_a * (self.l01_a + self.l12_a);
            c1x = (c1x * a - self.x0 * self.l12_2a + self.x2 * self.l01_2a) / n;
            c1y = (c1y * a - self.y0 * self.l12_2a + self.y2 * self.l01_2a) / n;
        }

        if self.l23_a > EPSILON {
            let b = 2.0 * self.l23_2a + 3.0 * self.l23_a * self.l12_a + self.l12_2a;
            let m = 3.0 * self.l23_a * (self.l23_a + self.l12_a);
            c2x = (c2x * b + self.x1 * self.l23_2a - x * self.l12_2a) / m;
            c2y = (c2y * b + self.y1 * self.l23_2a - y * self.l12_2a) / m;
        }

        self.path.push_str(&format!(
            " C {c1x:.2} {c1y:.2} {c2x:.2} {c2y:.2} {:.2} {:.2}",
            self.x2, self.y2
        ));
    }

    fn finish(mut self) -> String {
        match self.count {
            1 => self.path.push_str(" Z"),
            2 => self
                .path
                .push_str(&format!(" L {:.2} {:.2}", self.x2, self.y2)),
            3 => {
                let (x, y) = (self.x2, self.y2);
                self.point(x, y);
            }
            _ => {}
        }
        self.path
    }
}
