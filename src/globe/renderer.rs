use crate::data::Region;

use super::land::{Land, Ring};
use super::projection::{project, project_path, visible_side};
use super::surface::{GradientStop, Layer, Paint, Rgb, Stroke, Surface};
use super::view::{GlobeFrame, ViewState};

pub const OCEAN: Rgb = Rgb::BLACK;
pub const OUTLINE: Rgb = Rgb::WHITE;
pub const DOT: Rgb = Rgb(0x99, 0x99, 0x99);
pub const MARKER: Rgb = Rgb(0x22, 0xd3, 0xee);

/// Sizes at zoom 1, in logical units
pub const RIM_WIDTH: f64 = 2.0;
pub const LINE_WIDTH: f64 = 1.0;
pub const DOT_RADIUS: f64 = 1.2;
pub const HALO_RADIUS: f64 = 12.0;
pub const MARKER_RADIUS: f64 = 5.0;
pub const MARKER_OUTLINE_WIDTH: f64 = 2.0;

pub const GRATICULE_ALPHA: f64 = 0.25;

const HALO_STOPS: [GradientStop; 3] = [
    GradientStop::new(0.0, 0.8),
    GradientStop::new(0.5, 0.4),
    GradientStop::new(1.0, 0.0),
];

/// Meridians and parallels every 10°.
/// Minor meridians stop at ±80°, the ones on multiples of 90° reach the poles.
pub fn graticule() -> Vec<Ring> {
    let mut lines = Vec::with_capacity(36 + 17);

    for i in 0..36 {
        let lon = -180.0 + i as f64 * 10.0;
        let extent = if i % 9 == 0 { 90 } else { 80 };
        let meridian = (-extent..=extent)
            .step_by(10)
            .map(|lat| (lon, lat as f64))
            .collect();
        lines.push(meridian);
    }

    for lat in (-80..=80).step_by(10) {
        let parallel = (0..=144)
            .map(|i| (-180.0 + i as f64 * 2.5, lat as f64))
            .collect();
        lines.push(parallel);
    }

    lines
}

/// Paint one frame, back to front.
///
/// Holds no state between calls. Without land only the ocean disk and its
/// rim are drawn.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &GlobeFrame,
    view: &ViewState,
    land: Option<&Land>,
    regions: &[Region],
) {
    let center = frame.center();
    let zoom = view.zoom_factor(frame);

    surface.clear();

    surface.fill_circle(center, view.scale, Paint::new(Layer::Backdrop, OCEAN));
    surface.stroke_circle(
        center,
        view.scale,
        Stroke::new(Paint::new(Layer::Rim, OUTLINE), RIM_WIDTH * zoom),
    );

    let Some(land) = land else {
        return;
    };

    draw_paths(
        surface,
        &land.graticule,
        view,
        frame,
        Stroke::new(
            Paint::new(Layer::Graticule, OUTLINE).with_alpha(GRATICULE_ALPHA),
            LINE_WIDTH * zoom,
        ),
    );

    let coast = Stroke::new(Paint::new(Layer::Land, OUTLINE), LINE_WIDTH * zoom);
    for feature in &land.features {
        for ring in feature.rings() {
            draw_path(surface, ring, view, frame, coast);
        }
    }

    draw_dots(surface, land, view, frame, zoom);
    draw_markers(surface, regions, view, frame, zoom);
}

fn draw_paths<S: Surface + ?Sized>(
    surface: &mut S,
    paths: &[Ring],
    view: &ViewState,
    frame: &GlobeFrame,
    stroke: Stroke,
) {
    for path in paths {
        draw_path(surface, path, view, frame, stroke);
    }
}

#[inline]
fn draw_path<S: Surface + ?Sized>(
    surface: &mut S,
    path: &[(f64, f64)],
    view: &ViewState,
    frame: &GlobeFrame,
    stroke: Stroke,
) {
    project_path(path, view.rotation, view.scale, frame.center(), |run| {
        surface.stroke_polyline(run, stroke)
    });
}

fn draw_dots<S: Surface + ?Sized>(
    surface: &mut S,
    land: &Land,
    view: &ViewState,
    frame: &GlobeFrame,
    zoom: f64,
) {
    let center = frame.center();
    let paint = Paint::new(Layer::Dots, DOT);
    let radius = DOT_RADIUS * zoom;

    for dot in &land.dots {
        let Some(p) = project(dot.lon, dot.lat, view.rotation, view.scale, center) else {
            continue;
        };
        if frame.contains(p) {
            surface.fill_circle(p, radius, paint);
        }
    }
}

fn draw_markers<S: Surface + ?Sized>(
    surface: &mut S,
    regions: &[Region],
    view: &ViewState,
    frame: &GlobeFrame,
    zoom: f64,
) {
    let center = frame.center();

    for region in regions {
        if !visible_side(region.lng, region.lat, view.rotation) {
            continue;
        }
        let Some(p) = project(region.lng, region.lat, view.rotation, view.scale, center) else {
            continue;
        };

        surface.fill_radial_gradient(p, HALO_RADIUS * zoom, Paint::new(Layer::Halo, MARKER), &HALO_STOPS);
        surface.fill_circle(p, MARKER_RADIUS * zoom, Paint::new(Layer::Marker, MARKER));
        surface.stroke_circle(
            p,
            MARKER_RADIUS * zoom,
            Stroke::new(Paint::new(Layer::MarkerOutline, OUTLINE), MARKER_OUTLINE_WIDTH * zoom),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::land::LandFeature;
    use crate::globe::projection::Rotation;
    use crate::globe::surface::recording::{DrawCall, RecordingSurface};

    fn frame() -> GlobeFrame {
        GlobeFrame::new(400.0, 300.0, 1.0)
    }

    fn region(code: &str, lng: f64, lat: f64) -> Region {
        Region {
            name: code.to_uppercase(),
            code: code.to_string(),
            lng,
            lat,
            ..Region::default()
        }
    }

    fn land() -> Land {
        Land::new(
            vec![LandFeature::polygon(vec![vec![
                (-10.0, -10.0),
                (10.0, -10.0),
                (10.0, 10.0),
                (-10.0, 10.0),
            ]])],
            16.0,
        )
    }

    #[test]
    fn test_degraded_render_paints_backdrop_only() {
        let frame = frame();
        let view = ViewState::initial(&frame);
        let mut surface = RecordingSurface::new(frame.width, frame.height);

        render(&mut surface, &frame, &view, None, &[region("a", 0.0, 0.0)]);

        assert_eq!(surface.calls.len(), 3);
        assert_eq!(surface.calls[0], DrawCall::Clear);
        assert!(matches!(surface.calls[1], DrawCall::FillCircle { layer: Layer::Backdrop, radius, .. } if radius == 120.0));
        assert!(matches!(surface.calls[2], DrawCall::StrokeCircle { layer: Layer::Rim, .. }));
    }

    #[test]
    fn test_full_render_layer_order() {
        let frame = frame();
        let view = ViewState::initial(&frame);
        let land = land();
        let mut surface = RecordingSurface::new(frame.width, frame.height);

        render(&mut surface, &frame, &view, Some(&land), &[region("a", 0.0, 0.0)]);

        let layers: Vec<Layer> = surface.calls.iter().filter_map(DrawCall::layer).collect();
        let mut sorted = layers.clone();
        sorted.sort();
        assert_eq!(layers, sorted, "layers drawn out of z-order");

        assert!(surface.count(Layer::Graticule) > 0);
        assert!(surface.count(Layer::Land) > 0);
        assert_eq!(surface.count(Layer::Dots), land.dots.len());
        assert_eq!(surface.count(Layer::Halo), 1);
        assert_eq!(surface.count(Layer::Marker), 1);
        assert_eq!(surface.count(Layer::MarkerOutline), 1);
    }

    #[test]
    fn test_far_side_is_culled() {
        let frame = frame();
        let view = ViewState::initial(&frame).with_rotation(Rotation::new(180.0, 0.0));
        let land = land();
        let mut surface = RecordingSurface::new(frame.width, frame.height);

        render(&mut surface, &frame, &view, Some(&land), &[region("a", 0.0, 0.0)]);

        assert_eq!(surface.count(Layer::Dots), 0);
        assert_eq!(surface.count(Layer::Land), 0);
        assert_eq!(surface.count(Layer::Marker), 0);
    }

    #[test]
    fn test_sizes_scale_with_zoom() {
        let frame = frame();
        let view = ViewState::initial(&frame).with_scale(frame.base_radius() * 2.0);
        let land = land();
        let mut surface = RecordingSurface::new(frame.width, frame.height);

        render(&mut surface, &frame, &view, Some(&land), &[region("a", 0.0, 0.0)]);

        for call in &surface.calls {
            match *call {
                DrawCall::StrokeCircle { layer: Layer::Rim, width, .. } => assert_eq!(width, 4.0),
                DrawCall::StrokeCircle { layer: Layer::MarkerOutline, width, radius, .. } => {
                    assert_eq!(width, 4.0);
                    assert_eq!(radius, 10.0);
                }
                DrawCall::FillCircle { layer: Layer::Dots, radius, .. } => assert_eq!(radius, 2.4),
                DrawCall::Gradient { radius, .. } => assert_eq!(radius, 24.0),
                DrawCall::Polyline { width, .. } => assert_eq!(width, 2.0),
                _ => {}
            }
        }
    }

    #[test]
    fn test_dots_outside_canvas_are_skipped() {
        let frame = frame();
        // Zoomed far in just past the square's corner so its far side leaves the canvas
        let view = ViewState::initial(&frame)
            .with_scale(frame.base_radius() * 3.0)
            .with_rotation(Rotation::facing(25.0, 25.0));
        let land = land();
        let mut surface = RecordingSurface::new(frame.width, frame.height);

        render(&mut surface, &frame, &view, Some(&land), &[]);

        let drawn = surface.count(Layer::Dots);
        assert!(drawn > 0);
        assert!(drawn < land.dots.len());
        for call in &surface.calls {
            if let DrawCall::FillCircle { layer: Layer::Dots, center, .. } = call {
                assert!(frame.contains(*center));
            }
        }
    }

    #[test]
    fn test_graticule_shape() {
        let lines = graticule();
        assert_eq!(lines.len(), 36 + 17);
        // Meridian at -180 reaches the pole, the next one stops at 80
        assert_eq!(lines[0].last(), Some(&(-180.0, 90.0)));
        assert_eq!(lines[1].last(), Some(&(-170.0, 80.0)));
    }
}
