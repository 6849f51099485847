use glam::DVec2;

/// Opaque RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    /// Composite over the black backdrop at the given opacity
    pub fn over_black(self, alpha: f64) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f64 * a).round() as u8;
        Rgb(mix(self.0), mix(self.1), mix(self.2))
    }
}

/// Paint layers, back to front
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Backdrop,
    Rim,
    Graticule,
    Land,
    Dots,
    Halo,
    Marker,
    MarkerOutline,
}

impl Layer {
    pub const ALL: [Layer; 8] = [
        Layer::Backdrop,
        Layer::Rim,
        Layer::Graticule,
        Layer::Land,
        Layer::Dots,
        Layer::Halo,
        Layer::Marker,
        Layer::MarkerOutline,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    pub layer: Layer,
    pub color: Rgb,
    pub alpha: f64,
}

impl Paint {
    pub const fn new(layer: Layer, color: Rgb) -> Self {
        Self { layer, color, alpha: 1.0 }
    }

    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f64,
}

impl Stroke {
    pub const fn new(paint: Paint, width: f64) -> Self {
        Self { paint, width }
    }
}

/// Radial gradient color stop; `offset` runs 0 (center) to 1 (edge)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub alpha: f64,
}

impl GradientStop {
    pub const fn new(offset: f64, alpha: f64) -> Self {
        Self { offset, alpha }
    }
}

/// Opacity of a gradient at `t` in [0, 1], linear between stops
pub fn gradient_alpha(stops: &[GradientStop], t: f64) -> f64 {
    let Some(first) = stops.first() else {
        return 0.0;
    };
    if t <= first.offset {
        return first.alpha;
    }

    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= 0.0 {
                return b.alpha;
            }
            return a.alpha + (b.alpha - a.alpha) * (t - a.offset) / span;
        }
    }

    stops.last().map_or(0.0, |s| s.alpha)
}

/// 2D drawing target in logical units.
///
/// Implementations map logical coordinates to their own backing resolution;
/// callers never see device pixels.
pub trait Surface {
    /// Logical width and height
    fn size(&self) -> DVec2;

    fn clear(&mut self);

    fn fill_circle(&mut self, center: DVec2, radius: f64, paint: Paint);

    fn stroke_circle(&mut self, center: DVec2, radius: f64, stroke: Stroke);

    fn stroke_polyline(&mut self, points: &[DVec2], stroke: Stroke);

    fn fill_radial_gradient(&mut self, center: DVec2, radius: f64, paint: Paint, stops: &[GradientStop]);
}
