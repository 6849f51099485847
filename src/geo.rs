/// Wrap a longitude (or longitude difference) into [-180, 180)
#[inline(always)]
pub fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Human-readable coordinate, e.g. `37.0°N, 122.0°W`
pub fn format_coords(lon: f64, lat: f64) -> String {
    let lon = wrap_lon(lon);
    format!(
        "{:.1}°{}, {:.1}°{}",
        lat.abs(),
        if lat >= 0.0 { "N" } else { "S" },
        lon.abs(),
        if lon >= 0.0 { "E" } else { "W" }
    )
}
