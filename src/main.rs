use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, Level};

use fleetwatch::config::Settings;
use fleetwatch::data::{export, filter_and_sort, rederive_fleet, AircraftHealth};
use fleetwatch::repository::FleetRepository;
use fleetwatch::ui::common::{format_hours, hours_note};
use fleetwatch::{
    events, ui, ApiSource, App, DataSource, FileSource, FilterCriteria, SortKey, Theme,
};
use fleetwatch_adapters::http::HttpFleetClient;
use fleetwatch_types::{AlertState, FleetSummary};

#[derive(Parser, Debug)]
#[command(name = "fleetwatch")]
#[command(about = "Terminal dashboard for aircraft fleet maintenance alerts")]
struct Args {
    /// Base URL of the monitoring API (overrides the config file)
    #[arg(long, conflicts_with = "file")]
    api_url: Option<String>,

    /// Read a saved fleet summary JSON file instead of the API
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only aircraft with overdue or upcoming alerts
    #[arg(long)]
    only_alerts: bool,

    /// Only aircraft whose worst alert state is this (ok, proximo, vencido); repeatable
    #[arg(long = "state")]
    states: Vec<AlertState>,

    /// Only aircraft with an alert of this type; repeatable
    #[arg(long = "alert-type")]
    alert_types: Vec<String>,

    /// Minimum flight hours
    #[arg(long)]
    min_hours: Option<f64>,

    /// Maximum flight hours
    #[arg(long)]
    max_hours: Option<f64>,

    /// Sort key: alphabetic, criticality or hours
    #[arg(short, long, default_value = "alphabetic")]
    sort: SortKey,

    /// Export the filtered fleet to CSV and exit
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Export statistics and the filtered fleet to JSON and exit
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Print the detail of one aircraft and exit
    #[arg(long, value_name = "REGISTRATION", conflicts_with = "file")]
    aircraft: Option<String>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new()
            .only_with_alerts(self.only_alerts)
            .states(self.states.iter().copied())
            .alert_types(self.alert_types.iter().cloned())
            .hours_between(self.min_hours, self.max_hours)
    }

    fn is_interactive(&self) -> bool {
        self.export_csv.is_none() && self.export_json.is_none() && self.aircraft.is_none()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref url) = args.api_url {
        settings.api_url = url.clone();
    }
    settings.debug |= args.debug;

    let criteria = args.criteria();
    criteria.validate()?;

    init_logging(&settings, args.is_interactive())?;

    let runtime = tokio::runtime::Runtime::new()?;

    if let Some(ref registration) = args.aircraft {
        let repository = build_repository(&settings)?;
        return runtime.block_on(print_aircraft(&repository, registration));
    }

    if !args.is_interactive() {
        let summary = runtime.block_on(load_summary(&args, &settings))?;
        return export_to_files(&args, &criteria, &summary);
    }

    // Subscription tasks are spawned onto this runtime from the UI thread
    let _guard = runtime.enter();

    let source: Box<dyn DataSource> = match args.file {
        Some(ref path) => Box::new(FileSource::new(path)),
        None => Box::new(ApiSource::start(
            build_repository(&settings)?,
            settings.subscription_options(),
        )),
    };

    let app = App::new(source, settings.thresholds())
        .with_criteria(criteria, args.sort)
        .with_rederive(settings.rederive_alerts)
        .with_theme(Theme::auto_detect());

    run_tui(app)
}

/// Logs go to a file while the TUI owns the terminal, to stderr otherwise.
fn init_logging(settings: &Settings, interactive: bool) -> Result<()> {
    let level = if settings.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    if interactive {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)
            .with_context(|| format!("Failed to open log file {}", settings.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn build_repository(settings: &Settings) -> Result<FleetRepository> {
    let mut client = HttpFleetClient::builder()
        .endpoint(settings.api_url.clone())
        .timeout(settings.request_timeout());
    if let Some(ref token) = settings.api_token {
        client = client.token(token.clone());
    }
    let client = client.build()?;

    Ok(FleetRepository::builder(Arc::new(client))
        .ttl(settings.cache_ttl())
        .retry_policy(settings.retry_policy())
        .build())
}

/// One-shot load for the export modes.
async fn load_summary(args: &Args, settings: &Settings) -> Result<FleetSummary> {
    let summary = match args.file {
        Some(ref path) => FileSource::load(path)?,
        None => {
            let repository = build_repository(settings)?;
            let state = repository.get_fleet_summary(false).await;
            if let Some(ref err) = state.error {
                tracing::warn!(code = err.code(), "{}", err);
            }
            match (state.data, state.error) {
                (Some(data), _) => (*data).clone(),
                (None, Some(err)) => return Err(err.into()),
                (None, None) => anyhow::bail!("No fleet data available"),
            }
        }
    };

    if settings.rederive_alerts {
        Ok(rederive_fleet(&summary, &settings.thresholds()))
    } else {
        Ok(summary)
    }
}

fn export_to_files(args: &Args, criteria: &FilterCriteria, summary: &FleetSummary) -> Result<()> {
    let aircraft = filter_and_sort(summary, criteria, args.sort)?;

    if let Some(ref path) = args.export_csv {
        export::write_csv(path, &aircraft)?;
        report_export(aircraft.len(), path);
    }
    if let Some(ref path) = args.export_json {
        export::write_json(path, &aircraft)?;
        report_export(aircraft.len(), path);
    }
    Ok(())
}

fn report_export(rows: usize, path: &Path) {
    info!(rows, path = %path.display(), "export written");
    println!("Exported {} aircraft to: {}", rows, path.display());
}

async fn print_aircraft(repository: &FleetRepository, registration: &str) -> Result<()> {
    let detail = repository.get_aircraft_detail(registration).await?;
    let aircraft = &detail.summary;
    let health = AircraftHealth::of(aircraft);

    println!(
        "{}  {} h  health {}%  {} {}",
        aircraft.registration,
        format_hours(aircraft.flight_hours),
        health.health_percent,
        health.overall.symbol(),
        health.summary_text
    );
    for alert in &detail.alerts {
        println!(
            "  {:<5} {:<40} {:<12} {:>5.1}%  {}",
            alert.state.symbol(),
            alert.code_description,
            alert.alert_type,
            alert.display_percent(),
            hours_note(alert)
        );
    }
    Ok(())
}

fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.reload_data();
    let result = run_app(&mut terminal, &mut app);

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
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5u16.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::draw(frame, app);
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Table header sits on row 3, below header, tabs and the top border
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 3),
                _ => {}
            }
        }

        // Sources are non-blocking; pick up whatever arrived since the last frame
        app.reload_data();
    }

    Ok(())
}
