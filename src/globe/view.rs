use glam::DVec2;

use super::projection::Rotation;

/// Zoom limits as multiples of the base radius
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;

/// Drawing area in logical units, plus the backing-resolution ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobeFrame {
    pub width: f64,
    pub height: f64,
    /// Backing pixels per logical unit
    pub pixel_ratio: f64,
}

impl GlobeFrame {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }

    /// Globe radius at zoom 1
    pub fn base_radius(&self) -> f64 {
        self.width.min(self.height) / 2.5
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive canvas bounds test
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        let base = self.base_radius();
        scale.clamp(base * MIN_ZOOM, base * MAX_ZOOM)
    }
}

/// Rotation and scale: the single mutable core of the globe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub rotation: Rotation,
    /// Sphere radius in logical units
    pub scale: f64,
}

impl ViewState {
    /// Unrotated globe at zoom 1
    pub fn initial(frame: &GlobeFrame) -> Self {
        Self {
            rotation: Rotation::default(),
            scale: frame.base_radius(),
        }
    }

    /// Scale relative to the base radius; stroke widths and radii multiply by this
    pub fn zoom_factor(&self, frame: &GlobeFrame) -> f64 {
        let base = frame.base_radius();
        if base > 0.0 {
            self.scale / base
        } else {
            1.0
        }
    }

    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    pub fn with_rotation(self, rotation: Rotation) -> Self {
        Self { rotation, ..self }
    }

    /// Add to the rotation, keeping phi out of a polar flip
    pub fn rotated_by(self, d_lambda: f64, d_phi: f64) -> Self {
        self.with_rotation(Rotation::new(
            self.rotation.lambda + d_lambda,
            (self.rotation.phi + d_phi).clamp(-90.0, 90.0),
        ))
    }
}
