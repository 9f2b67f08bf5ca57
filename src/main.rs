use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use fanwatch::{
    ConnectConfig, DashboardEngine, DashboardHandle, DashboardState, HttpApi, PushChannel,
    UpdateStatus,
};

#[derive(Parser, Debug)]
#[command(name = "fanwatch")]
#[command(about = "Telemetry watcher and threshold control for a networked fan controller")]
struct Args {
    /// Controller base URL (overrides the config file and environment)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a new fan threshold in degrees Celsius and exit
    #[arg(long, value_name = "DEGREES")]
    set_threshold: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut settings = ConnectConfig::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.base_url = url.trim_end_matches('/').to_string();
    }

    let api = Arc::new(
        HttpApi::builder()
            .base_url(settings.base_url.as_str())
            .timeout(settings.request_timeout())
            .build(),
    );
    let push = PushChannel::connect(&settings.push_url());
    let (dashboard, engine) = DashboardEngine::spawn(api, push);

    let result = match args.set_threshold {
        Some(value) => set_threshold(&dashboard, value).await,
        None => watch_dashboard(&dashboard).await,
    };

    dashboard.shutdown();
    let _ = engine.await;
    result
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Follow the read model and print each update until interrupted.
async fn watch_dashboard(dashboard: &DashboardHandle) -> Result<()> {
    let mut updates = dashboard.subscribe();
    println!("Watching fan controller (press Ctrl-C to exit)");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    anyhow::bail!("Dashboard engine stopped unexpectedly");
                }
                print_state(&updates.borrow());
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
        }
    }
}

/// Submit one threshold change and wait for the controller's verdict.
async fn set_threshold(dashboard: &DashboardHandle, value: f64) -> Result<()> {
    let mut updates = dashboard.subscribe();

    dashboard.set_pending(value);
    dashboard.submit();

    loop {
        if updates.changed().await.is_err() {
            anyhow::bail!("Dashboard engine stopped unexpectedly");
        }
        let threshold = updates.borrow().threshold;
        match threshold.status {
            UpdateStatus::Success => {
                println!("Threshold set to {:.1} C", threshold.applied);
                return Ok(());
            }
            UpdateStatus::Error => anyhow::bail!("Controller rejected the threshold write"),
            _ => {}
        }
    }
}

fn print_state(state: &DashboardState) {
    let time = state
        .current
        .timestamp
        .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms as i64))
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let status = match state.threshold.status {
        UpdateStatus::Idle => "",
        UpdateStatus::Updating => " [updating]",
        UpdateStatus::Success => " [saved]",
        UpdateStatus::Error => " [write failed]",
    };

    println!(
        "{}  {:5.1} C  fan {:3}%  threshold {:.1} C{}",
        time, state.current.temperature, state.current.fan_speed, state.threshold.applied, status
    );
}
