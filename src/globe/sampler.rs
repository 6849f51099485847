use rayon::prelude::*;
use tracing::{debug, info};

use super::land::{Bounds, LandFeature};

/// Grid step in degrees per unit of dot spacing. Keeps dot density the same
/// whatever spacing the caller picks.
pub const DENSITY_FACTOR: f64 = 0.08;

/// Spacing used for the land layer (1.28° grid)
pub const DEFAULT_DOT_SPACING: f64 = 16.0;

/// One land-interior grid point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotSample {
    pub lon: f64,
    pub lat: f64,
}

/// Regular lon-major grid over a bounding box, edges inclusive
fn grid(bounds: Bounds, step: f64) -> impl Iterator<Item = DotSample> {
    let cols = ((bounds.max_lon - bounds.min_lon) / step).floor() as usize + 1;
    let rows = ((bounds.max_lat - bounds.min_lat) / step).floor() as usize + 1;

    (0..cols).flat_map(move |i| {
        let lon = bounds.min_lon + i as f64 * step;
        (0..rows).map(move |j| DotSample {
            lon,
            lat: bounds.min_lat + j as f64 * step,
        })
    })
}

/// Interior sample points of a land feature.
///
/// Walks a grid with step `spacing * DENSITY_FACTOR` over the feature's
/// bounding box and keeps the points inside it (holes excluded).
/// Unsupported geometry yields nothing.
pub fn sample_interior(feature: &LandFeature, spacing: f64) -> impl Iterator<Item = DotSample> + '_ {
    let step = spacing * DENSITY_FACTOR;
    let walk = feature
        .bounds()
        .filter(|_| step.is_finite() && step > 0.0)
        .map(|bounds| grid(bounds, step));

    walk.into_iter()
        .flatten()
        .filter(move |p| feature.contains(p.lon, p.lat))
}

/// Sample every feature, in parallel, preserving feature order
pub fn sample_all(features: &[LandFeature], spacing: f64) -> Vec<DotSample> {
    let per_feature: Vec<Vec<DotSample>> = features
        .par_iter()
        .map(|feature| {
            let dots: Vec<DotSample> = sample_interior(feature, spacing).collect();
            debug!(
                class = feature.class.as_deref().unwrap_or("Land"),
                count = dots.len(),
                "sampled land feature"
            );
            dots
        })
        .collect();

    let dots = per_feature.concat();
    info!(total = dots.len(), features = features.len(), "generated land dots");
    dots
}
