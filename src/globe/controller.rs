use std::mem;
use std::time::{Duration, Instant};

use glam::DVec2;
use tracing::{debug, trace};

use crate::data::Region;
use crate::geo::wrap_lon;

use super::animation::{step_auto_rotate, step_fly_to, step_zoom, Animation, CancelToken};
use super::land::Land;
use super::projection::{project, unproject, visible_side, Rotation};
use super::renderer::render;
use super::surface::Surface;
use super::view::{GlobeFrame, ViewState};

/// Degrees of longitude per tick while idle
pub const AUTO_ROTATE_SPEED: f64 = 0.5;
/// Degrees of rotation per logical unit of pointer travel
pub const DRAG_SENSITIVITY: f64 = 0.25;
pub const ZOOM_OUT_FACTOR: f64 = 0.95;
pub const ZOOM_IN_FACTOR: f64 = 1.05;
pub const ZOOM_DURATION: Duration = Duration::from_millis(100);
pub const FLY_TO_DURATION: Duration = Duration::from_millis(800);
pub const HOVER_RADIUS: f64 = 15.0;
pub const CLICK_RADIUS: f64 = 12.0;
pub const HOVER_THROTTLE: Duration = Duration::from_millis(16);

/// Pointer affordance the host should display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Grab,
    Grabbing,
    Pointer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hover {
    pub region: Region,
    /// Where the pointer was when the hover was detected, in logical units
    pub pointer: DVec2,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GlobeEvent {
    /// Hovered region changed; `None` when the pointer left every marker
    Hover(Option<Hover>),
    Click(Region),
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    origin: DVec2,
    rotation: Rotation,
}

/// Owns the view state and turns pointer input and clock ticks into view
/// changes, events, and render requests.
pub struct GlobeController {
    view: ViewState,
    frame: GlobeFrame,
    land: Option<Land>,
    regions: Vec<Region>,
    auto_rotate: bool,
    rotate_speed: f64,
    drag: Option<Drag>,
    zoom: Option<Animation<f64>>,
    fly_to: Option<Animation<Rotation>>,
    hovered: Option<Hover>,
    last_hover_check: Option<Instant>,
    cursor: Cursor,
    events: Vec<GlobeEvent>,
    render_requested: bool,
}

impl GlobeController {
    pub fn new(frame: GlobeFrame, land: Option<Land>, regions: Vec<Region>) -> Self {
        Self {
            view: ViewState::initial(&frame),
            frame,
            land,
            regions,
            auto_rotate: true,
            rotate_speed: AUTO_ROTATE_SPEED,
            drag: None,
            zoom: None,
            fly_to: None,
            hovered: None,
            last_hover_check: None,
            cursor: Cursor::Grab,
            events: Vec::new(),
            render_requested: true,
        }
    }

    pub fn with_auto_rotate(mut self, enabled: bool, speed: f64) -> Self {
        self.auto_rotate = enabled;
        self.rotate_speed = speed;
        self
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn frame(&self) -> GlobeFrame {
        self.frame
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn land(&self) -> Option<&Land> {
        self.land.as_ref()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn hovered(&self) -> Option<&Hover> {
        self.hovered.as_ref()
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn set_view(&mut self, view: ViewState) {
        if view != self.view {
            self.view = view;
            self.render_requested = true;
        }
    }

    /// Advance animations and auto-rotation to `now`
    pub fn tick(&mut self, now: Instant) {
        if let Some(zoom) = self.zoom.take() {
            if !zoom.is_cancelled() {
                self.set_view(step_zoom(self.view, &zoom.tween, now));
                if !zoom.tween.is_finished(now) {
                    self.zoom = Some(zoom);
                }
            }
        }

        if let Some(fly) = self.fly_to.take() {
            if !fly.is_cancelled() {
                self.set_view(step_fly_to(self.view, &fly.tween, now));
                if !fly.tween.is_finished(now) {
                    self.fly_to = Some(fly);
                }
            }
            return;
        }

        if self.auto_rotate {
            self.set_view(step_auto_rotate(self.view, self.rotate_speed));
        }
    }

    /// Primary button pressed. A press on a marker is a click, anything else starts a drag.
    pub fn pointer_down(&mut self, pointer: DVec2) {
        if let Some(region) = self.hit_test(pointer, CLICK_RADIUS).cloned() {
            debug!(code = %region.code, "region clicked");
            self.events.push(GlobeEvent::Click(region));
            return;
        }

        self.auto_rotate = false;
        self.drag = Some(Drag {
            origin: pointer,
            rotation: self.view.rotation,
        });
        self.cursor = Cursor::Grabbing;
    }

    /// Pointer moved. Drags rotate the globe; otherwise hover is re-evaluated,
    /// at most once per throttle window.
    pub fn pointer_move(&mut self, pointer: DVec2, now: Instant) {
        if let Some(drag) = self.drag {
            let delta = pointer - drag.origin;
            let rotation = Rotation::new(
                drag.rotation.lambda + delta.x * DRAG_SENSITIVITY,
                (drag.rotation.phi - delta.y * DRAG_SENSITIVITY).clamp(-90.0, 90.0),
            );
            self.set_view(self.view.with_rotation(rotation));
            return;
        }

        if let Some(last) = self.last_hover_check {
            if now.saturating_duration_since(last) < HOVER_THROTTLE {
                return;
            }
        }
        self.last_hover_check = Some(now);

        let hover = self.hit_test(pointer, HOVER_RADIUS).cloned().map(|region| Hover { region, pointer });
        self.cursor = if hover.is_some() { Cursor::Pointer } else { Cursor::Grab };

        if hover != self.hovered {
            trace!(code = hover.as_ref().map(|h| h.region.code.as_str()), "hover changed");
            self.hovered = hover.clone();
            self.events.push(GlobeEvent::Hover(hover));
        }
    }

    pub fn pointer_up(&mut self) {
        if self.drag.take().is_some() {
            self.cursor = Cursor::Grab;
        }
    }

    /// Pointer left the globe. Clears hover; a drag keeps going until `pointer_up`.
    pub fn pointer_leave(&mut self) {
        if self.hovered.take().is_some() {
            self.events.push(GlobeEvent::Hover(None));
        }
        if self.drag.is_none() {
            self.cursor = Cursor::Grab;
        }
    }

    /// Start an eased zoom step. Positive `delta_y` zooms out.
    /// Any running zoom is cancelled and the new one starts from the current scale.
    pub fn wheel(&mut self, delta_y: f64, now: Instant) -> CancelToken {
        if let Some(previous) = self.zoom.take() {
            previous.cancel();
        }

        let factor = if delta_y > 0.0 { ZOOM_OUT_FACTOR } else { ZOOM_IN_FACTOR };
        let target = self.frame.clamp_scale(self.view.scale * factor);
        let (animation, token) = Animation::start(self.view.scale, target, now, ZOOM_DURATION);
        self.zoom = Some(animation);
        self.render_requested = true;
        token
    }

    /// Rotate so `region` ends up centered. Auto-rotation is suspended until
    /// the animation ends; a previous fly-to is cancelled.
    pub fn fly_to(&mut self, region: &Region, now: Instant) -> CancelToken {
        if let Some(previous) = self.fly_to.take() {
            previous.cancel();
        }

        let target = Rotation::facing(region.lng, region.lat);
        let current = self.view.rotation;
        // Shortest way round: shift the start by whole turns, not the target
        let from = Rotation::new(target.lambda + wrap_lon(current.lambda - target.lambda), current.phi);
        self.set_view(self.view.with_rotation(from));

        debug!(code = %region.code, lng = region.lng, lat = region.lat, "flying to region");
        let (animation, token) = Animation::start(from, target, now, FLY_TO_DURATION);
        self.fly_to = Some(animation);
        self.render_requested = true;
        token
    }

    /// Keyboard nudge. Stops auto-rotation like a drag does.
    pub fn rotate_by(&mut self, d_lambda: f64, d_phi: f64) {
        self.auto_rotate = false;
        self.set_view(self.view.rotated_by(d_lambda, d_phi));
    }

    /// Back to the initial rotation and zoom
    pub fn reset(&mut self) {
        if let Some(zoom) = self.zoom.take() {
            zoom.cancel();
        }
        if let Some(fly) = self.fly_to.take() {
            fly.cancel();
        }
        self.set_view(ViewState::initial(&self.frame));
    }

    /// New drawing area; keeps the zoom factor and re-clamps the scale
    pub fn resize(&mut self, frame: GlobeFrame) {
        let zoom = self.view.zoom_factor(&self.frame);
        self.frame = frame;
        if let Some(animation) = self.zoom.take() {
            animation.cancel();
        }
        let scale = frame.clamp_scale(frame.base_radius() * zoom);
        self.view = self.view.with_scale(scale);
        self.render_requested = true;
    }

    /// First visible region whose marker lies strictly within `radius` of `pointer`
    pub fn hit_test(&self, pointer: DVec2, radius: f64) -> Option<&Region> {
        let center = self.frame.center();
        let rotation = self.view.rotation;

        self.regions.iter().find(|region| {
            project(region.lng, region.lat, rotation, self.view.scale, center)
                .filter(|_| visible_side(region.lng, region.lat, rotation))
                .is_some_and(|p| p.distance(pointer) < radius)
        })
    }

    /// Geographic coordinate under the pointer, if it is over the globe
    pub fn pointer_geo(&self, pointer: DVec2) -> Option<(f64, f64)> {
        unproject(pointer, self.view.rotation, self.view.scale, self.frame.center())
    }

    pub fn take_events(&mut self) -> Vec<GlobeEvent> {
        mem::take(&mut self.events)
    }

    /// True once per batch of view changes
    pub fn take_render_request(&mut self) -> bool {
        mem::replace(&mut self.render_requested, false)
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        render(surface, &self.frame, &self.view, self.land.as_ref(), &self.regions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::surface::recording::RecordingSurface;
    use crate::globe::surface::Layer;

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

    fn controller(regions: Vec<Region>) -> GlobeController {
        GlobeController::new(frame(), None, regions)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_wheel_zoom_is_clamped() {
        let mut c = controller(vec![]);
        let base = frame().base_radius();
        let mut now = Instant::now();

        for _ in 0..200 {
            c.wheel(-1.0, now);
            now += ms(200);
            c.tick(now);
        }
        assert_eq!(c.view().scale, base * 3.0);

        for _ in 0..200 {
            c.wheel(1.0, now);
            now += ms(200);
            c.tick(now);
        }
        assert_eq!(c.view().scale, base * 0.5);
    }

    #[test]
    fn test_drag_clamps_latitude() {
        let mut c = controller(vec![]);
        let now = Instant::now();

        c.pointer_down(DVec2::new(10.0, 10.0));
        assert_eq!(c.cursor(), Cursor::Grabbing);
        c.pointer_move(DVec2::new(50.0, -1000.0), now);
        assert_eq!(c.view().rotation, Rotation::new(10.0, 90.0));

        c.pointer_move(DVec2::new(10.0, 5000.0), now);
        assert_eq!(c.view().rotation.phi, -90.0);

        c.pointer_up();
        assert_eq!(c.cursor(), Cursor::Grab);
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_drag_disables_auto_rotate() {
        let mut c = controller(vec![]);
        let now = Instant::now();
        c.tick(now);
        assert_eq!(c.view().rotation.lambda, AUTO_ROTATE_SPEED);

        c.pointer_down(DVec2::new(0.0, 0.0));
        c.pointer_up();
        c.tick(now + ms(16));
        c.tick(now + ms(32));
        assert!(!c.is_auto_rotating());
        assert_eq!(c.view().rotation.lambda, AUTO_ROTATE_SPEED);
    }

    #[test]
    fn test_fly_to_converges() {
        let target = region("us-west-1", -122.0, 37.0);
        let mut c = controller(vec![target.clone()]);
        let t0 = Instant::now();

        c.fly_to(&target, t0);
        c.tick(t0 + ms(400));
        let mid = c.view().rotation;
        assert!(mid.lambda > 0.0 && mid.lambda < 122.0);

        c.tick(t0 + FLY_TO_DURATION);
        assert_eq!(c.view().rotation, Rotation::new(122.0, -37.0));

        // Auto-rotation resumes afterwards
        c.tick(t0 + FLY_TO_DURATION + ms(16));
        assert_eq!(c.view().rotation.lambda, 122.0 + AUTO_ROTATE_SPEED);
    }

    #[test]
    fn test_fly_to_takes_short_way_round() {
        let target = region("a", 170.0, 0.0);
        let mut c = controller(vec![]).with_auto_rotate(false, 0.0);
        let t0 = Instant::now();

        // Currently facing lng -170; 170 is 20° away across the antimeridian
        c.rotate_by(170.0, 0.0);
        c.fly_to(&target, t0);
        c.tick(t0 + ms(400));
        let lambda = c.view().rotation.lambda;
        assert!(lambda < -170.0 && lambda > -190.0, "lambda {lambda}");
    }

    #[test]
    fn test_new_fly_to_cancels_previous() {
        let mut c = controller(vec![]);
        let t0 = Instant::now();
        let first = c.fly_to(&region("a", 10.0, 10.0), t0);
        let second = c.fly_to(&region("b", 20.0, 20.0), t0);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        c.tick(t0 + FLY_TO_DURATION);
        assert_eq!(c.view().rotation, Rotation::new(-20.0, -20.0));
    }

    #[test]
    fn test_new_wheel_cancels_previous_zoom() {
        let mut c = controller(vec![]);
        let t0 = Instant::now();
        let first = c.wheel(-1.0, t0);
        c.tick(t0 + ms(50));
        let mid = c.view().scale;

        let second = c.wheel(-1.0, t0 + ms(50));
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        c.tick(t0 + ms(150));
        assert!((c.view().scale - mid * ZOOM_IN_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_hover_picks_visible_region_only() {
        // Front and back regions both project near the center when culling is ignored
        let front = region("front", 0.0, 0.0);
        let back = region("back", 180.0, 0.0);
        let mut c = controller(vec![back, front.clone()]).with_auto_rotate(false, 0.0);
        let center = frame().center();

        c.pointer_move(center + DVec2::new(3.0, 0.0), Instant::now());

        assert_eq!(c.cursor(), Cursor::Pointer);
        assert_eq!(c.hovered().map(|h| &h.region), Some(&front));
        let events = c.take_events();
        assert!(matches!(&events[..], [GlobeEvent::Hover(Some(h))] if h.region.code == "front"));
    }

    #[test]
    fn test_hover_reports_only_the_nearby_region() {
        let a = region("a", 0.0, 0.0);
        let b = region("b", 20.0, 0.0);
        let mut c = controller(vec![a.clone(), b.clone()]).with_auto_rotate(false, 0.0);
        let (rotation, scale, center) = (c.view().rotation, c.view().scale, frame().center());

        let pa = project(a.lng, a.lat, rotation, scale, center).unwrap();
        let pb = project(b.lng, b.lat, rotation, scale, center).unwrap();
        assert!(pa.distance(pb) > 2.0 * HOVER_RADIUS);

        let pointer = pb + DVec2::new(0.0, 14.0);
        c.pointer_move(pointer, Instant::now());

        assert_eq!(c.hovered().map(|h| h.region.code.as_str()), Some("b"));
        let events = c.take_events();
        assert!(matches!(&events[..], [GlobeEvent::Hover(Some(h))] if h.region == b));
    }

    #[test]
    fn test_drag_survives_pointer_leave() {
        let mut c = controller(vec![]).with_auto_rotate(false, 0.0);
        let now = Instant::now();

        c.pointer_down(DVec2::new(10.0, 10.0));
        c.pointer_leave();
        assert!(c.is_dragging());
        assert_eq!(c.cursor(), Cursor::Grabbing);

        // Outside the drawing area the drag still rotates
        c.pointer_move(DVec2::new(-30.0, 10.0), now);
        assert_eq!(c.view().rotation, Rotation::new(-10.0, 0.0));

        c.pointer_up();
        assert!(!c.is_dragging());
        assert_eq!(c.cursor(), Cursor::Grab);
    }

    #[test]
    fn test_hover_is_throttled() {
        let mut c = controller(vec![region("a", 0.0, 0.0)]).with_auto_rotate(false, 0.0);
        let center = frame().center();
        let t0 = Instant::now();

        c.pointer_move(center + DVec2::new(100.0, 0.0), t0);
        c.pointer_move(center, t0 + ms(5));
        assert!(c.hovered().is_none());
        assert_eq!(c.cursor(), Cursor::Grab);

        c.pointer_move(center, t0 + ms(20));
        assert!(c.hovered().is_some());

        c.pointer_move(center + DVec2::new(100.0, 0.0), t0 + ms(40));
        assert!(c.hovered().is_none());
        let events = c.take_events();
        assert_eq!(events.last(), Some(&GlobeEvent::Hover(None)));
    }

    #[test]
    fn test_click_emits_event_without_drag() {
        let a = region("a", 0.0, 0.0);
        let mut c = controller(vec![a.clone()]);
        let center = frame().center();

        c.pointer_down(center + DVec2::new(0.0, 11.0));
        assert!(!c.is_dragging());
        assert!(c.is_auto_rotating());
        assert_eq!(c.take_events(), vec![GlobeEvent::Click(a)]);
        assert!(c.take_events().is_empty());

        // Just outside the click radius starts a drag instead
        c.pointer_down(center + DVec2::new(0.0, 12.0));
        assert!(c.is_dragging());
    }

    #[test]
    fn test_resize_keeps_zoom_factor() {
        let mut c = controller(vec![]);
        let t0 = Instant::now();
        c.wheel(-1.0, t0);
        c.tick(t0 + ZOOM_DURATION);
        let zoom = c.view().zoom_factor(&c.frame());

        c.resize(GlobeFrame::new(200.0, 200.0, 1.0));
        assert_eq!(c.frame().base_radius(), 80.0);
        assert!((c.view().zoom_factor(&c.frame()) - zoom).abs() < 1e-9);
    }

    #[test]
    fn test_render_requests_coalesce() {
        let mut c = controller(vec![]).with_auto_rotate(false, 0.0);
        assert!(c.take_render_request());
        assert!(!c.take_render_request());

        c.tick(Instant::now());
        assert!(!c.take_render_request());

        c.rotate_by(5.0, 0.0);
        c.rotate_by(5.0, 0.0);
        assert!(c.take_render_request());
        assert!(!c.take_render_request());
    }

    #[test]
    fn test_render_without_land_is_ocean_only() {
        let c = controller(vec![region("a", 0.0, 0.0)]);
        let mut surface = RecordingSurface::new(400.0, 300.0);
        c.render(&mut surface);
        assert_eq!(surface.count(Layer::Marker), 0);
        assert_eq!(surface.count(Layer::Backdrop), 1);
    }

    #[test]
    fn test_pointer_geo_at_center() {
        let c = controller(vec![]).with_auto_rotate(false, 0.0);
        let (lon, lat) = c.pointer_geo(frame().center()).unwrap();
        assert!(lon.abs() < 1e-9 && lat.abs() < 1e-9);
        assert!(c.pointer_geo(DVec2::new(0.0, 0.0)).is_none());
    }
}
