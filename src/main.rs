use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use globe_regions::app::{App, FRAME};
use globe_regions::config::Config;
use globe_regions::data;
use globe_regions::globe::{GlobeController, GlobeFrame, Land};
use globe_regions::ui;

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;
    init_logging(&config.log_file)?;

    // Load and sample before taking over the terminal
    let data = data::load_all(&config.land_path(), &config.regions_path(), &config.data_dir);
    let (land, load_error) = match data.land {
        Ok(features) => (Some(Land::new(features, config.dot_spacing)), None),
        Err(e) => (None, Some(format!("Failed to load land map data: {e}"))),
    };

    let controller = GlobeController::new(GlobeFrame::new(0.0, 0.0, config.pixel_ratio), land, data.regions)
        .with_auto_rotate(!config.no_auto_rotate, config.rotate_speed);
    let mut app = App::new(controller, data.tables, load_error);

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &mut app);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        error!(error = %e, "exited with error");
    }
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll(-1.0, now),
        MouseEventKind::ScrollDown => app.scroll(1.0, now),
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            app.mouse_move(mouse.column, mouse.row, now)
        }
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if app.details.is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.close_details(),
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => app.next_tab(),
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => app.prev_tab(),
            _ => {}
        }
        return;
    }

    if app.searching {
        match key.code {
            KeyCode::Esc => app.end_search(true),
            KeyCode::Enter => app.end_search(false),
            KeyCode::Backspace => app.search_pop(),
            KeyCode::Down | KeyCode::Tab => app.move_selection(1),
            KeyCode::Up | KeyCode::BackTab => app.move_selection(-1),
            KeyCode::Char(c) => app.search_push(c),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc if app.selected.is_some() => app.clear_selection(),
        KeyCode::Esc => app.quit(),

        // Rotate with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.nudge(1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.nudge(-1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.nudge(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.nudge(0, 1),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Sidebar
        KeyCode::Tab | KeyCode::Char('n') => app.move_selection(1),
        KeyCode::BackTab | KeyCode::Char('p') => app.move_selection(-1),
        KeyCode::Enter => app.open_details(),
        KeyCode::Char('/') => app.start_search(),

        KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.resize(size.width, size.height);
    info!(width = size.width, height = size.height, "terminal ready");

    let mut redraw = true;
    loop {
        let requested = app.controller.take_render_request();
        if redraw || requested {
            terminal.draw(|frame| ui::render(frame, app))?;
        }
        redraw = false;

        if event::poll(FRAME)? {
            let now = Instant::now();
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Mouse(mouse) => handle_mouse(app, mouse, now),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
            redraw = true;
        }

        // Paced to one step per FRAME however many events arrived
        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
