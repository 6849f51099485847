use std::time::{Duration, Instant};

use glam::DVec2;
use ratatui::layout::Rect;
use tracing::debug;

use crate::data::{LookupTables, Region, RegionDetails};
use crate::globe::controller::{GlobeController, GlobeEvent, Hover};
use crate::globe::GlobeFrame;

/// Degrees per key press
const NUDGE: f64 = 10.0;

/// One animation tick, ~60 fps
pub const FRAME: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailsTab {
    #[default]
    Overview,
    AvailabilityZones,
    LocalZones,
    Partition,
}

impl DetailsTab {
    pub const ALL: [DetailsTab; 4] = [
        DetailsTab::Overview,
        DetailsTab::AvailabilityZones,
        DetailsTab::LocalZones,
        DetailsTab::Partition,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Open detail popup
pub struct DetailsView {
    pub region: Region,
    pub details: RegionDetails,
    pub tab: DetailsTab,
}

/// Application state
pub struct App {
    pub controller: GlobeController,
    pub tables: LookupTables,
    /// Code of the region picked in the sidebar or on the globe
    pub selected: Option<String>,
    /// Cursor row in the filtered sidebar list
    pub list_cursor: usize,
    pub search: String,
    pub searching: bool,
    pub tooltip: Option<Hover>,
    pub details: Option<DetailsView>,
    /// Land load failure, shown in the status bar
    pub error: Option<String>,
    /// Last pointer position over the globe, in logical units
    pub pointer: Option<DVec2>,
    /// Inner globe pane in terminal cells
    pub globe_area: Rect,
    pixel_ratio: f64,
    last_tick: Option<Instant>,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: GlobeController, tables: LookupTables, error: Option<String>) -> Self {
        let pixel_ratio = controller.frame().pixel_ratio;
        Self {
            controller,
            tables,
            selected: None,
            list_cursor: 0,
            search: String::new(),
            searching: false,
            tooltip: None,
            details: None,
            error,
            pointer: None,
            globe_area: Rect::default(),
            pixel_ratio,
            last_tick: None,
            should_quit: false,
        }
    }

    /// Recompute the globe pane for a new terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        let area = crate::ui::globe_area(Rect::new(0, 0, width, height));
        if area == self.globe_area {
            return;
        }
        self.globe_area = area;
        self.controller.resize(GlobeFrame::new(
            area.width as f64 * 2.0 / self.pixel_ratio,
            area.height as f64 * 4.0 / self.pixel_ratio,
            self.pixel_ratio,
        ));
    }

    /// Terminal cell to logical globe coordinates (cell center), `None` outside the pane
    pub fn cell_to_logical(&self, col: u16, row: u16) -> Option<DVec2> {
        let area = self.globe_area;
        if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
            return None;
        }
        let x = (col - area.x) as f64 * 2.0 + 1.0;
        let y = (row - area.y) as f64 * 4.0 + 2.0;
        Some(DVec2::new(x, y) / self.pixel_ratio)
    }

    /// Like `cell_to_logical` but keeps going past the pane edges, for drags
    fn cell_to_logical_unbounded(&self, col: u16, row: u16) -> DVec2 {
        let area = self.globe_area;
        let x = (col as f64 - area.x as f64) * 2.0 + 1.0;
        let y = (row as f64 - area.y as f64) * 4.0 + 2.0;
        DVec2::new(x, y) / self.pixel_ratio
    }

    /// Logical globe coordinates back to a terminal cell
    pub fn logical_to_cell(&self, p: DVec2) -> (u16, u16) {
        let p = p * self.pixel_ratio;
        let col = (p.x / 2.0).max(0.0) as u16;
        let row = (p.y / 4.0).max(0.0) as u16;
        (self.globe_area.x + col, self.globe_area.y + row)
    }

    pub fn mouse_down(&mut self, col: u16, row: u16) {
        if self.details.is_some() {
            return;
        }
        if let Some(p) = self.cell_to_logical(col, row) {
            self.controller.pointer_down(p);
            self.drain_events(Instant::now());
        }
    }

    pub fn mouse_move(&mut self, col: u16, row: u16, now: Instant) {
        if self.controller.is_dragging() {
            self.pointer = self.cell_to_logical(col, row);
            let p = self.cell_to_logical_unbounded(col, row);
            self.controller.pointer_move(p, now);
            return;
        }
        match self.cell_to_logical(col, row) {
            Some(p) => {
                self.pointer = Some(p);
                self.controller.pointer_move(p, now);
            }
            None => {
                self.pointer = None;
                self.controller.pointer_leave();
            }
        }
        self.drain_events(now);
    }

    pub fn mouse_up(&mut self) {
        self.controller.pointer_up();
    }

    pub fn scroll(&mut self, delta_y: f64, now: Instant) {
        self.controller.wheel(delta_y, now);
    }

    pub fn zoom_in(&mut self) {
        self.controller.wheel(-1.0, Instant::now());
    }

    pub fn zoom_out(&mut self) {
        self.controller.wheel(1.0, Instant::now());
    }

    /// Keyboard rotation, in key-press steps
    pub fn nudge(&mut self, dx: i32, dy: i32) {
        self.controller.rotate_by(dx as f64 * NUDGE, dy as f64 * NUDGE);
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Advance the globe by one frame. Calls within `FRAME` of the last
    /// tick are dropped so input bursts do not speed up auto-rotation.
    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < FRAME {
                return;
            }
        }
        self.last_tick = Some(now);
        self.controller.tick(now);
        self.drain_events(now);
    }

    fn drain_events(&mut self, now: Instant) {
        for event in self.controller.take_events() {
            match event {
                GlobeEvent::Hover(hover) => self.tooltip = hover,
                GlobeEvent::Click(region) => {
                    self.select(&region, now);
                    self.open_details_for(region);
                }
            }
        }
    }

    /// Regions matching the search text by name or code, case-insensitive
    pub fn filtered_regions(&self) -> Vec<&Region> {
        let query = self.search.to_lowercase();
        self.controller
            .regions()
            .iter()
            .filter(|r| {
                query.is_empty()
                    || r.name.to_lowercase().contains(&query)
                    || r.code.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn selected_region(&self) -> Option<&Region> {
        let code = self.selected.as_deref()?;
        self.controller.regions().iter().find(|r| r.code == code)
    }

    fn select(&mut self, region: &Region, now: Instant) {
        debug!(code = %region.code, "region selected");
        self.selected = Some(region.code.clone());
        self.controller.fly_to(region, now);
    }

    /// Move the sidebar cursor and fly to the region under it
    pub fn move_selection(&mut self, delta: i32) {
        let list = self.filtered_regions();
        if list.is_empty() {
            return;
        }
        let len = list.len() as i32;
        let cursor = if self.selected.is_none() && delta > 0 {
            0
        } else {
            (self.list_cursor.min(list.len() - 1) as i32 + delta).rem_euclid(len)
        };
        let region = list[cursor as usize].clone();
        self.list_cursor = cursor as usize;
        self.select(&region, Instant::now());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn open_details(&mut self) {
        if let Some(region) = self.selected_region().cloned() {
            self.open_details_for(region);
        }
    }

    fn open_details_for(&mut self, region: Region) {
        let details = RegionDetails::resolve(&region, &self.tables);
        self.details = Some(DetailsView {
            region,
            details,
            tab: DetailsTab::Overview,
        });
        self.tooltip = None;
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    pub fn next_tab(&mut self) {
        if let Some(view) = &mut self.details {
            view.tab = view.tab.next();
        }
    }

    pub fn prev_tab(&mut self) {
        if let Some(view) = &mut self.details {
            view.tab = view.tab.prev();
        }
    }

    pub fn start_search(&mut self) {
        self.searching = true;
    }

    pub fn search_push(&mut self, c: char) {
        self.search.push(c);
        self.list_cursor = 0;
    }

    pub fn search_pop(&mut self) {
        self.search.pop();
        self.list_cursor = 0;
    }

    /// Leave search mode; `clear` also drops the query
    pub fn end_search(&mut self, clear: bool) {
        self.searching = false;
        if clear {
            self.search.clear();
            self.list_cursor = 0;
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        let view = self.controller.view();
        format!("{:.2}x", view.zoom_factor(&self.controller.frame()))
    }

    /// Geographic coordinate under the pointer, or the view center
    pub fn coords_text(&self) -> String {
        let geo = self
            .pointer
            .and_then(|p| self.controller.pointer_geo(p))
            .or_else(|| self.controller.pointer_geo(self.controller.frame().center()));
        match geo {
            Some((lon, lat)) => crate::geo::format_coords(lon, lat),
            None => "-".to_string(),
        }
    }
}
