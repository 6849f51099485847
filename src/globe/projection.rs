use glam::{DVec2, DVec3};

use crate::geo::wrap_lon;

/// Globe orientation in degrees.
///
/// `lambda` spins the sphere about its polar axis and `phi` then tilts it
/// about the equatorial axis facing the viewer, so the point at
/// `(-lambda, -phi)` ends up at the center of the disk.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
}

impl Rotation {
    pub const fn new(lambda: f64, phi: f64) -> Self {
        Self { lambda, phi }
    }

    /// Rotation that centers (lon, lat) on the disk.
    pub fn facing(lon: f64, lat: f64) -> Self {
        Self::new(-lon, -lat)
    }
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
pub(crate) fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

#[inline(always)]
fn vec3_to_lonlat(p: DVec3) -> (f64, f64) {
    let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p.y.atan2(p.x).to_degrees();
    (lon, lat)
}

/// Rotate a geographic point into view space.
/// x = depth toward the viewer, y = screen right, z = screen up.
#[inline(always)]
fn to_view(lon: f64, lat: f64, rotation: Rotation) -> DVec3 {
    let p = lonlat_to_vec3(lon + rotation.lambda, lat);
    let (sin_t, cos_t) = rotation.phi.to_radians().sin_cos();
    DVec3::new(p.x * cos_t - p.z * sin_t, p.y, p.z * cos_t + p.x * sin_t)
}

/// Orthographic forward projection.
/// Returns `None` for points on the far hemisphere (and exactly on the horizon).
#[inline]
pub fn project(lon: f64, lat: f64, rotation: Rotation, scale: f64, center: DVec2) -> Option<DVec2> {
    let v = to_view(lon, lat, rotation);

    // Cosine of the angular distance from the view center
    if v.x <= 0.0 {
        return None;
    }

    Some(DVec2::new(center.x + v.y * scale, center.y - v.z * scale))
}

/// Inverse projection. Returns `None` outside the sphere disk.
pub fn unproject(point: DVec2, rotation: Rotation, scale: f64, center: DVec2) -> Option<(f64, f64)> {
    if scale <= 0.0 {
        return None;
    }

    let sx = (point.x - center.x) / scale;
    let sy = -(point.y - center.y) / scale;

    let r2 = sx * sx + sy * sy;
    if r2 > 1.0 {
        return None;
    }

    let depth = (1.0 - r2).sqrt();
    let (sin_t, cos_t) = rotation.phi.to_radians().sin_cos();
    let p = DVec3::new(depth * cos_t + sy * sin_t, sx, sy * cos_t - depth * sin_t);

    let (lon, lat) = vec3_to_lonlat(p);
    Some((wrap_lon(lon - rotation.lambda), lat))
}

/// Marker visibility test.
///
/// Ignores the observer latitude: the sub-observer point is taken as (0, 0)
/// of the shifted frame, so for any `rotation.phi != 0` this disagrees with
/// the horizon `project` clips against. A region centered by a high-latitude
/// fly-to can report hidden.
#[inline]
pub fn visible_side(lon: f64, lat: f64, rotation: Rotation) -> bool {
    let lambda = (lon + rotation.lambda).to_radians();
    let phi = (lat - rotation.phi).to_radians();
    let observer = 0.0_f64;

    let cos_c = phi.sin() * observer.sin() + phi.cos() * observer.cos() * lambda.cos();
    cos_c > 0.0
}

/// Interpolate along a great circle arc and call a visitor for each subdivision point.
/// Subdivides into ~2° segments, smooth enough at braille resolution.
/// The start point is not emitted.
#[inline]
pub fn walk_great_circle(
    lon0: f64, lat0: f64,
    lon1: f64, lat1: f64,
    mut visitor: impl FnMut(f64, f64),
) {
    let a = lonlat_to_vec3(lon0, lat0);
    let b = lonlat_to_vec3(lon1, lat1);

    let angle = a.dot(b).clamp(-1.0, 1.0).acos();
    let steps = ((angle.to_degrees() / 2.0).ceil() as usize).max(1);

    let sin_angle = angle.sin();
    if steps == 1 || sin_angle.abs() < 1e-10 {
        // Short segment, or endpoints identical/antipodal
        visitor(lon1, lat1);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        let (lon, lat) = vec3_to_lonlat(a * sa + b * sb);
        visitor(lon, lat);
    }
}

/// Project a geographic path, splitting it into screen-space runs wherever it
/// crosses behind the horizon. Runs shorter than two points are dropped.
pub fn project_path<F>(
    path: &[(f64, f64)],
    rotation: Rotation,
    scale: f64,
    center: DVec2,
    mut emit: F,
) where
    F: FnMut(&[DVec2]),
{
    let Some(&(lon0, lat0)) = path.first() else {
        return;
    };

    let mut run: Vec<DVec2> = Vec::with_capacity(path.len() * 2);
    let mut visit = |lon: f64, lat: f64, run: &mut Vec<DVec2>| match project(lon, lat, rotation, scale, center) {
        Some(p) => run.push(p),
        None => {
            if run.len() >= 2 {
                emit(run.as_slice());
            }
            run.clear();
        }
    };

    visit(lon0, lat0, &mut run);
    for pair in path.windows(2) {
        let ((lon_a, lat_a), (lon_b, lat_b)) = (pair[0], pair[1]);
        walk_great_circle(lon_a, lat_a, lon_b, lat_b, |lon, lat| visit(lon, lat, &mut run));
    }

    if run.len() >= 2 {
        emit(run.as_slice());
    }
}
