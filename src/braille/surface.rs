use glam::DVec2;

use crate::braille::draw::{draw_circle, draw_line, draw_ring, draw_thick_line};
use crate::braille::BrailleCanvas;
use crate::globe::surface::{gradient_alpha, GradientStop, Layer, Paint, Rgb, Stroke, Surface};
use crate::hash::pixel_noise;

/// Ocean disk, kept as geometry so the UI can paint cell backgrounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backdrop {
    /// Center in braille pixels
    pub center: DVec2,
    /// Radius in braille pixels
    pub radius: f64,
    pub color: Rgb,
}

/// Layered braille surface: one canvas and one color per paint layer.
///
/// Logical coordinates are multiplied by `pixel_ratio` to reach braille
/// pixels, so a ratio of 2 doubles the backing resolution without changing
/// the coordinates input handling works in.
pub struct BrailleSurface {
    layers: Vec<(BrailleCanvas, Option<Rgb>)>,
    backdrop: Option<Backdrop>,
    pixel_ratio: f64,
    cols: usize,
    rows: usize,
}

impl BrailleSurface {
    /// Surface covering `cols` x `rows` terminal cells
    pub fn new(cols: usize, rows: usize, pixel_ratio: f64) -> Self {
        Self {
            layers: Layer::ALL
                .iter()
                .map(|_| (BrailleCanvas::new(cols, rows), None))
                .collect(),
            backdrop: None,
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
            cols,
            rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Canvas and color of a layer, `None` if nothing was drawn on it
    pub fn layer(&self, layer: Layer) -> Option<(&BrailleCanvas, Rgb)> {
        let (canvas, color) = &self.layers[layer.index()];
        color.map(|c| (canvas, c))
    }

    pub fn backdrop(&self) -> Option<Backdrop> {
        self.backdrop
    }

    /// Backdrop color for a character cell, if the cell center lies on the disk
    pub fn backdrop_at(&self, col: usize, row: usize) -> Option<Rgb> {
        let b = self.backdrop?;
        let cell_center = DVec2::new(col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0);
        (cell_center.distance(b.center) <= b.radius).then_some(b.color)
    }

    #[inline(always)]
    fn to_pixels(&self, p: DVec2) -> (i32, i32) {
        let p = p * self.pixel_ratio;
        (p.x.round() as i32, p.y.round() as i32)
    }

    /// Braille dots are coarse; a 1.2 unit dot at ratio 1 maps to a single dot.
    #[inline(always)]
    fn pixel_radius(&self, radius: f64) -> i32 {
        (radius * self.pixel_ratio * 0.5).floor().max(0.0) as i32
    }

    fn canvas(&mut self, paint: Paint) -> &mut BrailleCanvas {
        let (canvas, color) = &mut self.layers[paint.layer.index()];
        if color.is_none() {
            *color = Some(paint.color.over_black(paint.alpha));
        }
        canvas
    }
}

impl Surface for BrailleSurface {
    fn size(&self) -> DVec2 {
        DVec2::new(self.cols as f64 * 2.0, self.rows as f64 * 4.0) / self.pixel_ratio
    }

    fn clear(&mut self) {
        for (canvas, color) in &mut self.layers {
            canvas.clear();
            *color = None;
        }
        self.backdrop = None;
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, paint: Paint) {
        if paint.layer == Layer::Backdrop {
            self.backdrop = Some(Backdrop {
                center: center * self.pixel_ratio,
                radius: radius * self.pixel_ratio,
                color: paint.color.over_black(paint.alpha),
            });
            return;
        }

        let (cx, cy) = self.to_pixels(center);
        let r = self.pixel_radius(radius);
        draw_circle(self.canvas(paint), cx, cy, r);
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, stroke: Stroke) {
        let (cx, cy) = self.to_pixels(center);
        let r = (radius * self.pixel_ratio).round() as i32;
        let thick = stroke.width * self.pixel_ratio >= 2.0;

        // The outline sits just outside whatever was filled
        let r = if stroke.paint.layer == Layer::Rim { r } else { self.pixel_radius(radius) + 1 };

        let canvas = self.canvas(stroke.paint);
        draw_ring(canvas, cx, cy, r);
        if thick && r > 1 {
            draw_ring(canvas, cx, cy, r - 1);
        }
    }

    fn stroke_polyline(&mut self, points: &[DVec2], stroke: Stroke) {
        let thick = stroke.width * self.pixel_ratio >= 1.5;
        let pixels: Vec<(i32, i32)> = points.iter().map(|&p| self.to_pixels(p)).collect();

        let canvas = self.canvas(stroke.paint);
        for pair in pixels.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            if thick {
                draw_thick_line(canvas, x0, y0, x1, y1);
            } else {
                draw_line(canvas, x0, y0, x1, y1);
            }
        }
    }

    /// Dithered: each pixel is lit with probability equal to the gradient's
    /// opacity there, using a fixed per-pixel threshold.
    fn fill_radial_gradient(&mut self, center: DVec2, radius: f64, paint: Paint, stops: &[GradientStop]) {
        let (cx, cy) = self.to_pixels(center);
        let r = radius * self.pixel_ratio;
        if r <= 0.0 {
            return;
        }
        let reach = r.ceil() as i32;
        let strength = paint.alpha;

        let canvas = self.canvas(paint);
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                if d > r {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if pixel_noise(x, y) < gradient_alpha(stops, d / r) * strength {
                    canvas.set_pixel_signed(x, y);
                }
            }
        }
    }
}
