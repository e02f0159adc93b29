use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::{info, warn};

use sensorwatch::app::{App, View};
use sensorwatch::config::{ConfigOverrides, DashboardConfig};
use sensorwatch::{events, export, logging, ui, Backend, ConfigStore, HttpBackend, Poller};

#[derive(Parser, Debug)]
#[command(name = "sensorwatch")]
#[command(about = "Terminal dashboard for environmental sensor readings")]
struct Args {
    /// Base URL of the backend REST API
    #[arg(short, long)]
    backend: Option<String>,

    /// Settings file (TOML). Defaults to sensorwatch.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Latest-readings poll interval (e.g., "30s", "1m")
    #[arg(short, long)]
    poll: Option<String>,

    /// Live sensor poll interval (e.g., "5s", "500ms")
    #[arg(long)]
    live_poll: Option<String>,

    /// Hours of history shown in the chart
    #[arg(long)]
    hours: Option<u32>,

    /// Log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export current state to JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        backend_url: args.backend,
        poll_interval: args.poll,
        live_poll_interval: args.live_poll,
        history_hours: args.hours,
        log_file: args.log_file,
    };
    let settings = DashboardConfig::load(args.config.as_deref(), &overrides)?;
    logging::init(&settings.log_file)?;
    info!(?settings, "Starting sensorwatch");

    let rt = tokio::runtime::Runtime::new()?;
    let backend = HttpBackend::builder()
        .endpoint(settings.backend_url.as_str())
        .timeout(settings.request_timeout)
        .build()?;

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        let report = rt.block_on(export::export_once(&backend, &export_path))?;
        println!(
            "Exported {} sensors to {}",
            report.summary.total_sensors,
            export_path.display()
        );
        return Ok(());
    }

    let mut store = ConfigStore::builtin();
    if let Err(e) = rt.block_on(store.load(&backend)) {
        warn!(error = %e, "Continuing with built-in sensor configuration");
    }

    let backend: Arc<dyn Backend> = Arc::new(backend);
    let (poller, poll_events) = Poller::new(backend, rt.handle().clone(), settings.history_hours);
    let app = App::new(store, poller, poll_events, settings, ui::Theme::auto_detect());

    let result = run_tui(app);

    // Timers hold no terminal state; drop them with the runtime.
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.start();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 80;
    const MIN_HEIGHT: u16 = 24;

    while app.running {
        // Apply whatever the poller finished since the last frame
        app.drain_events();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(app.theme.alert));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Map => ui::map::render(frame, app, chunks[2]),
                View::Sensors => ui::sensors::render(frame, app, chunks[2]),
                View::Detail => ui::detail::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.pending_admin.is_some() {
                ui::common::render_confirm(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
