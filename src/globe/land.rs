use super::renderer::graticule;
use super::sampler::{sample_all, DotSample};

/// A closed ring of (lon, lat) degree pairs
pub type Ring = Vec<(f64, f64)>;

/// Polygonal land geometry. The first ring of each polygon is its outer
/// boundary, any following rings are holes.
#[derive(Clone, Debug, PartialEq)]
pub enum LandGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    /// Any other geometry type; kept so feature indices line up, but never sampled
    Unsupported,
}

/// Axis-aligned lon/lat bounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

#[derive(Clone, Debug)]
pub struct LandFeature {
    pub geometry: LandGeometry,
    /// Natural Earth `featurecla`, when present
    pub class: Option<String>,
}

impl LandFeature {
    pub fn new(geometry: LandGeometry) -> Self {
        Self { geometry, class: None }
    }

    pub fn polygon(rings: Vec<Ring>) -> Self {
        Self::new(LandGeometry::Polygon(rings))
    }

    /// Every ring of the feature, outer boundaries and holes alike
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match &self.geometry {
            LandGeometry::Polygon(rings) => Box::new(rings.iter()),
            LandGeometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten()),
            LandGeometry::Unsupported => Box::new(std::iter::empty()),
        }
    }

    /// Planar bounding box over all rings, `None` for empty geometry
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.rings().flatten().peekable();
        let &(lon, lat) = *points.peek()?;
        let init = Bounds { min_lon: lon, min_lat: lat, max_lon: lon, max_lat: lat };

        Some(points.fold(init, |b, &(lon, lat)| Bounds {
            min_lon: b.min_lon.min(lon),
            min_lat: b.min_lat.min(lat),
            max_lon: b.max_lon.max(lon),
            max_lat: b.max_lat.max(lat),
        }))
    }

    /// Interior test with hole handling.
    /// For multipolygons each part is tested on its own; first interior hit wins.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        match &self.geometry {
            LandGeometry::Polygon(rings) => polygon_contains(rings, lon, lat),
            LandGeometry::MultiPolygon(polygons) => {
                polygons.iter().any(|rings| polygon_contains(rings, lon, lat))
            }
            LandGeometry::Unsupported => false,
        }
    }
}

/// Even-odd ray casting against a single ring
#[inline]
pub fn point_in_ring(lon: f64, lat: f64, ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);

    for (i, &(xi, yi)) in ring.iter().enumerate() {
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[inline]
fn polygon_contains(rings: &[Ring], lon: f64, lat: f64) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    point_in_ring(lon, lat, outer) && !holes.iter().any(|hole| point_in_ring(lon, lat, hole))
}

/// Loaded land layer: outlines, their precomputed dot fill, and the graticule
pub struct Land {
    pub features: Vec<LandFeature>,
    pub dots: Vec<DotSample>,
    pub graticule: Vec<Ring>,
}

impl Land {
    /// Sample every feature once. Dots never change after this.
    pub fn new(features: Vec<LandFeature>, dot_spacing: f64) -> Self {
        let dots = sample_all(&features, dot_spacing);
        Self {
            features,
            dots,
            graticule: graticule(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }

    #[test]
    fn test_point_in_ring() {
        let ring = square(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_ring(5.0, 5.0, &ring));
        assert!(!point_in_ring(15.0, 5.0, &ring));
        assert!(!point_in_ring(5.0, -1.0, &ring));
        assert!(!point_in_ring(5.0, 5.0, &[]));
    }

    #[test]
    fn test_polygon_hole() {
        let feature = LandFeature::polygon(vec![
            square(0.0, 0.0, 10.0, 10.0),
            square(4.0, 4.0, 6.0, 6.0),
        ]);
        assert!(feature.contains(2.0, 2.0));
        assert!(!feature.contains(5.0, 5.0));
    }

    #[test]
    fn test_multipolygon_parts_are_independent() {
        // Second part sits inside the first part's hole
        let feature = LandFeature::new(LandGeometry::MultiPolygon(vec![
            vec![square(0.0, 0.0, 10.0, 10.0), square(3.0, 3.0, 7.0, 7.0)],
            vec![square(4.0, 4.0, 6.0, 6.0)],
        ]));
        assert!(feature.contains(1.0, 1.0));
        assert!(!feature.contains(3.5, 3.5));
        assert!(feature.contains(5.0, 5.0));
        assert!(!feature.contains(20.0, 20.0));
    }

    #[test]
    fn test_bounds() {
        let feature = LandFeature::new(LandGeometry::MultiPolygon(vec![
            vec![square(-5.0, 1.0, 0.0, 2.0)],
            vec![square(10.0, -3.0, 12.0, 0.0)],
        ]));
        let b = feature.bounds().unwrap();
        assert_eq!((b.min_lon, b.min_lat, b.max_lon, b.max_lat), (-5.0, -3.0, 12.0, 2.0));
        assert!(LandFeature::new(LandGeometry::Unsupported).bounds().is_none());
    }
}
