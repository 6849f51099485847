use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Widget, Wrap},
    Frame,
};

use crate::app::{App, DetailsTab, DetailsView};
use crate::braille::BrailleSurface;
use crate::data::flag_glyph;
use crate::globe::controller::{Cursor, Hover};
use crate::globe::{Layer, Rgb};

const SIDEBAR_WIDTH: u16 = 36;
const ACCENT: Color = Color::Cyan;

fn split(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Sidebar and globe
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(4)])
        .split(rows[0]);
    (cols[0], cols[1], rows[1])
}

fn globe_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Globe ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
}

/// Inner area of the globe pane for a terminal of the given size
pub fn globe_area(area: Rect) -> Rect {
    let (_, globe, _) = split(area);
    globe_block().inner(globe)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let (sidebar, globe, status) = split(frame.area());

    render_sidebar(frame, app, sidebar);
    render_globe(frame, app, globe);
    render_status_bar(frame, app, status);

    if let Some(hover) = &app.tooltip {
        render_tooltip(frame, app, hover);
    }
    if let Some(details) = &app.details {
        render_details(frame, details);
    }
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.controller.regions().len();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Regions ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(format!(" {total} total ")).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let search_style = if app.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search = if app.search.is_empty() && !app.searching {
        Line::from(Span::styled("/ search regions…", search_style))
    } else {
        Line::from(vec![
            Span::styled("/ ", search_style),
            Span::styled(app.search.as_str(), Style::default().fg(Color::White)),
            Span::styled(if app.searching { "▏" } else { "" }, search_style),
        ])
    };
    frame.render_widget(Paragraph::new(search), chunks[0]);

    let regions = app.filtered_regions();
    if regions.is_empty() {
        let text = if app.search.is_empty() { "Loading regions..." } else { "No regions found" };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
            chunks[1],
        );
        return;
    }

    let selected = app.selected.as_deref();
    let items: Vec<ListItem> = regions
        .iter()
        .map(|region| {
            let glyph = flag_glyph(&region.country).unwrap_or_else(|| "◆ ".to_string());
            let name_style = if selected == Some(region.code.as_str()) {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(glyph),
                    Span::raw(" "),
                    Span::styled(region.name.as_str(), name_style),
                ]),
                Line::from(Span::styled(
                    format!("   {}", region.code),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let cursor = selected.and_then(|code| regions.iter().position(|r| r.code == code));
    let mut state = ListState::default().with_selected(cursor);
    let list = List::new(items).highlight_style(Style::default().bg(Color::Rgb(0x0e, 0x3a, 0x44)));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let block = globe_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut surface = BrailleSurface::new(
        inner.width as usize,
        inner.height as usize,
        app.controller.frame().pixel_ratio,
    );
    app.controller.render(&mut surface);
    frame.render_widget(GlobeWidget { surface }, inner);

    if let Some(region) = app.selected_region() {
        let label = Line::from(vec![
            Span::styled("● ", Style::default().fg(ACCENT)),
            Span::styled(region.name.as_str(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", region.code), Style::default().fg(Color::DarkGray)),
        ]);
        let badge = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), 1);
        frame.render_widget(Paragraph::new(label), badge);
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Paints the braille layers back to front; the ocean disk becomes cell background
struct GlobeWidget {
    surface: BrailleSurface,
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = (area.height as usize).min(self.surface.rows());
        let cols = (area.width as usize).min(self.surface.cols());

        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = (area.x + col as u16, area.y + row as u16);
                if let Some(bg) = self.surface.backdrop_at(col, row) {
                    buf[(x, y)].set_bg(color(bg));
                }
            }
        }

        for layer in Layer::ALL {
            let Some((canvas, fg)) = self.surface.layer(layer) else {
                continue;
            };
            for row in 0..rows {
                for col in 0..cols {
                    if let Some(ch) = canvas.cell(col, row) {
                        buf[(area.x + col as u16, area.y + row as u16)].set_char(ch).set_fg(color(fg));
                    }
                }
            }
        }
    }
}

fn render_tooltip(frame: &mut Frame, app: &App, hover: &Hover) {
    let region = &hover.region;
    let mut lines = vec![
        Line::from(Span::styled(
            region.name.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(region.code.as_str(), Style::default().fg(ACCENT))),
    ];
    if !region.info.is_empty() {
        lines.push(Line::from(Span::styled("Region Details:", Style::default().fg(Color::Gray))));
        lines.extend(region.info.iter().map(|item| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(ACCENT)),
                Span::raw(item.as_str()),
            ])
        }));
    }

    let screen = frame.area();
    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 4;
    let height = lines.len() as u16 + 2;
    let (col, row) = app.logical_to_cell(hover.pointer);
    let popup = place_near(screen, col + 3, row.saturating_sub(height / 2), width, height);

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        ),
        popup,
    );
}

/// Keep a popup of the given size on screen, preferring `(x, y)`
fn place_near(screen: Rect, x: u16, y: u16, width: u16, height: u16) -> Rect {
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    let x = x.min(screen.x + screen.width - width).max(screen.x);
    let y = y.min(screen.y + screen.height - height).max(screen.y);
    Rect::new(x, y, width, height)
}

fn centered(screen: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (screen.width as u32 * percent_x as u32 / 100) as u16;
    let height = (screen.height as u32 * percent_y as u32 / 100) as u16;
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

fn render_details(frame: &mut Frame, view: &DetailsView) {
    let area = centered(frame.area(), 80, 80);
    let region = &view.region;
    let details = &view.details;

    let flag = flag_glyph(&region.country).map(|f| format!("{f} ")).unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(
            format!(" {flag}{} ", region.name),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" ←/→ tabs · Esc close ").right_aligned());
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(region.code.as_str(), Style::default().fg(ACCENT)),
            Span::styled(" • ", Style::default().fg(Color::DarkGray)),
            Span::styled(region.city.as_str(), Style::default().fg(Color::Gray)),
        ])),
        chunks[0],
    );

    let titles = vec![
        "Overview".to_string(),
        format!("Availability Zones ({})", details.availability_zones.len()),
        format!("Local Zones ({})", details.local_zones.len()),
        "Partition".to_string(),
    ];
    let tabs = Tabs::new(titles)
        .select(view.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[1]);

    let body = match view.tab {
        DetailsTab::Overview => overview_lines(view),
        DetailsTab::AvailabilityZones => availability_zone_lines(view),
        DetailsTab::LocalZones => local_zone_lines(view),
        DetailsTab::Partition => partition_lines(view),
    };
    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), chunks[2]);
}

fn label<'a>(name: &'a str, value: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{name}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn empty(text: &str) -> Vec<Line<'_>> {
    vec![Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))]
}

fn overview_lines(view: &DetailsView) -> Vec<Line<'_>> {
    let region = &view.region;
    let azs = view.details.availability_zones.len();
    let local = view.details.local_zones.len();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Availability Zones ", Style::default().fg(Color::Gray)),
            Span::styled(azs.to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled("   Local Zones ", Style::default().fg(Color::Gray)),
            Span::styled(local.to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled("   Total Zones ", Style::default().fg(Color::Gray)),
            Span::styled((azs + local).to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ]),
        Line::default(),
    ];
    for item in &region.info {
        match item.split_once(':') {
            Some((name, value)) => lines.push(label(name.trim(), value.trim())),
            None => lines.push(Line::from(item.as_str())),
        }
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Latitude: {:.2}° • Longitude: {:.2}°", region.lat, region.lng),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn availability_zone_lines(view: &DetailsView) -> Vec<Line<'_>> {
    let zones = &view.details.availability_zones;
    if zones.is_empty() {
        return empty("No availability zones found");
    }
    let mut lines = Vec::with_capacity(zones.len() * 3);
    for az in zones {
        lines.push(Line::from(vec![
            Span::styled(az.name.as_str(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", az.id), Style::default().fg(ACCENT)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Status: ", Style::default().fg(Color::Gray)),
            Span::raw(az.parent_region_status.as_str()),
            Span::styled("   Data Centers: ", Style::default().fg(Color::Gray)),
            Span::raw(az.data_centers.as_str()),
        ]));
        lines.push(Line::default());
    }
    lines
}

fn local_zone_lines(view: &DetailsView) -> Vec<Line<'_>> {
    let zones = &view.details.local_zones;
    if zones.is_empty() {
        return empty("No local zones found");
    }
    let mut lines = Vec::with_capacity(zones.len() * 4);
    for lz in zones {
        lines.push(Line::from(vec![
            Span::styled(lz.external_name.as_str(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", lz.group_name), Style::default().fg(ACCENT)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Status: ", Style::default().fg(Color::Gray)),
            Span::raw(lz.status.as_str()),
            Span::styled("   City: ", Style::default().fg(Color::Gray)),
            Span::raw(lz.city.as_str()),
            Span::styled("   Zone ID: ", Style::default().fg(Color::Gray)),
            Span::raw(lz.titan_id.as_str()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Launched: ", Style::default().fg(Color::Gray)),
            Span::raw(lz.launch_date.as_str()),
            Span::styled("   Parent AZ: ", Style::default().fg(Color::DarkGray)),
            Span::raw(lz.parent_dimension.as_str()),
        ]));
        lines.push(Line::default());
    }
    lines
}

fn partition_lines(view: &DetailsView) -> Vec<Line<'_>> {
    let Some(p) = &view.details.partition else {
        return empty("No partition information");
    };
    vec![
        label("Partition", &p.name),
        label("Status", &p.status),
        label("Domain", &p.domain),
        label("Public DNS Suffix", &p.dns_suffix),
        label("Website Domain", &p.website_domain),
        label("Regions", &p.regions),
    ]
}

fn cursor_hint(cursor: Cursor) -> &'static str {
    match cursor {
        Cursor::Grab => "drag to rotate ",
        Cursor::Grabbing => "rotating ",
        Cursor::Pointer => "click for details ",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.coords_text(), Style::default().fg(ACCENT)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(cursor_hint(app.controller.cursor()), Style::default().fg(Color::Magenta)),
        Span::styled(
            if app.controller.is_auto_rotating() { "spinning " } else { "" },
            Style::default().fg(Color::Green),
        ),
    ];
    if let Some(error) = &app.error {
        spans.push(Span::styled(
            format!("{error} "),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(
        "hjkl:rotate +/-:zoom Tab:next /:search Enter:details r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::data::{LookupTables, Region};
    use crate::globe::controller::GlobeController;
    use crate::globe::GlobeFrame;

    #[test]
    fn test_globe_area_is_right_of_sidebar() {
        let area = globe_area(Rect::new(0, 0, 100, 30));
        assert_eq!(area, Rect::new(SIDEBAR_WIDTH + 1, 1, 100 - SIDEBAR_WIDTH - 2, 30 - 3));
    }

    #[test]
    fn test_place_near_stays_on_screen() {
        let screen = Rect::new(0, 0, 80, 24);
        assert_eq!(place_near(screen, 75, 20, 10, 6), Rect::new(70, 18, 10, 6));
        assert_eq!(place_near(screen, 5, 5, 10, 6), Rect::new(5, 5, 10, 6));
        assert_eq!(place_near(screen, 0, 0, 200, 50), screen);
    }

    #[test]
    fn test_draws_without_land() {
        let regions = vec![Region {
            name: "Europe (Ireland)".to_string(),
            code: "eu-west-1".to_string(),
            country: "IE".to_string(),
            ..Region::default()
        }];
        let controller = GlobeController::new(GlobeFrame::new(1.0, 1.0, 1.0), None, regions);
        let mut app = App::new(controller, LookupTables::default(), Some("land data unavailable".to_string()));
        app.resize(100, 30);
        app.move_selection(1);
        app.open_details();

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Regions"));
        assert!(text.contains("eu-west-1"));
        assert!(text.contains("Availability Zones (0)"));
        assert!(text.contains("land data unavailable"));
    }
}
