use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use hostscan::app::App;
use hostscan::config::{Config, load_config, load_config_from_path};
use hostscan::event::{Event, EventHandler};
use hostscan::logging;
use hostscan::system::collector::{Collector, ProbeSettings};
use hostscan::system::host::HostSource;
use hostscan::system::probe::{HttpProbe, cancel_on};
use hostscan::system::snapshot::TelemetrySnapshot;
use hostscan::ui;

#[derive(Parser)]
#[command(
    name = "hostscan",
    about = "One-shot host telemetry snapshot in a tabbed TUI"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the snapshot as JSON and exit instead of opening the UI.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Skip the network speed test.
    #[arg(long, default_value_t = false)]
    no_speed_test: bool,

    /// Speed test timeout in seconds
    #[arg(long)]
    probe_timeout: Option<u64>,

    /// Theme: dark, light, mono
    #[arg(long)]
    theme: Option<String>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if let Some(path) = config.logging.resolved_file()
        && let Err(err) = logging::init_tracing(&path, &config.logging.level)
    {
        eprintln!("hostscan: logging disabled: {err}");
    }

    let snapshot = collect_snapshot(&config).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    // init() also installs a panic hook that restores the terminal
    let mut terminal = ratatui::init();
    let result = run(&mut terminal, App::new(snapshot, &config)).await;

    ratatui::restore();

    result
}

async fn collect_snapshot(config: &Config) -> Result<TelemetrySnapshot> {
    let settings = ProbeSettings {
        enabled: config.probe.enabled,
        timeout: config.probe.timeout(),
    };

    // Listen before the first section so Ctrl+C never kills the process mid-collection
    let cancel = cancel_on(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("speed test cancelled by user"),
            // No signal handler: never cancel, rely on the timeout
            Err(_) => std::future::pending::<()>().await,
        }
    })
    .await;

    if settings.enabled {
        eprintln!(
            "Collecting host telemetry (speed test up to {}s, Ctrl+C skips it)...",
            settings.timeout.as_secs()
        );
    } else {
        eprintln!("Collecting host telemetry...");
    }

    let probe = HttpProbe::from_config(&config.probe)?;
    let collector = Collector::new(HostSource::new(), probe, settings);

    Ok(collector.collect(cancel).await)
}

async fn run(terminal: &mut ratatui::DefaultTerminal, mut app: App) -> Result<()> {
    let mut events = EventHandler::new();

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                if key.kind == crossterm::event::KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                }
            }
            Event::Resize => {}
        }
        terminal.draw(|frame| ui::draw(frame, &app))?;
    }

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if cli.no_speed_test {
        config.probe.enabled = false;
    }
    if let Some(secs) = cli.probe_timeout {
        config.probe.timeout_secs = secs;
    }
    if let Some(ref theme) = cli.theme {
        config.general.theme = theme.clone();
    }
    if let Some(ref path) = cli.log_file {
        config.logging.file = Some(path.clone());
    }

    config
}
