use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use flood_dashboard::config::{Config, DEFAULT_CONFIG_FILE};
use flood_dashboard::dashboard::Dashboard;
use flood_dashboard::dev_mode::DevMode;
use flood_dashboard::ingest::SharedReading;
use flood_dashboard::ingest::mqtt::IngestListener;
use flood_dashboard::logging::{self, Component};
use flood_dashboard::render::{render_dashboard, render_json};
use flood_dashboard::verify::{VerificationStatus, format_report, verify_broker};

/// Ticks between ingest summary log lines.
const SUMMARY_EVERY_TICKS: u64 = 12;

#[derive(Parser, Debug)]
#[command(name = "flood-dashboard")]
#[command(about = "Live flood monitoring dashboard fed by an MQTT river sensor")]
struct Args {
    /// Path to the TOML config file (falls back to $FLOOD_DASHBOARD_CONFIG, then flood_dashboard.toml)
    config: Option<PathBuf>,

    /// Feed the dashboard with synthetic payloads instead of the broker
    #[arg(long, conflicts_with = "verify")]
    dev: bool,

    /// Check broker connectivity and subscription, then exit
    #[arg(long)]
    verify: bool,

    /// Seconds to wait for the broker when verifying
    #[arg(long, default_value = "10")]
    verify_timeout: u64,

    /// Print one JSON object per tick instead of the text dashboard
    #[arg(long)]
    json: bool,

    /// Stop after this many ticks (runs forever when omitted)
    #[arg(long)]
    ticks: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let named_path = args
        .config
        .clone()
        .or_else(|| std::env::var("FLOOD_DASHBOARD_CONFIG").ok().map(PathBuf::from));
    let explicit = named_path.is_some();
    let config_path = named_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let (config, from_file) = Config::load_with_env(&config_path, explicit)?;
    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
        args.json,
    );

    if from_file {
        logging::info(
            Component::Config,
            None,
            &format!("loaded {}", config_path.display()),
        );
    } else {
        logging::info(
            Component::Config,
            None,
            &format!("{} not found, using defaults", config_path.display()),
        );
    }

    if args.verify {
        return run_verify(&config, Duration::from_secs(args.verify_timeout), args.json);
    }

    if !args.json {
        let source = if from_file {
            config_path.display().to_string()
        } else {
            "defaults".to_string()
        };
        config.print_summary(&source);
    }

    let shared = Arc::new(SharedReading::new());

    if args.dev {
        DevMode::new(config.tick_interval()).spawn(Arc::clone(&shared))?;
    } else {
        IngestListener::new(config.broker(), Arc::clone(&shared)).spawn()?;
    }

    let mut dashboard = Dashboard::new(
        shared,
        config.history_capacity,
        config.alerts,
        config.stale_after_seconds,
    );

    let mut tick: u64 = 0;
    loop {
        let view = dashboard.tick();
        if args.json {
            println!("{}", render_json(&view)?);
        } else {
            print!("{}", render_dashboard(&view, &dashboard.history_vec()));
        }

        tick += 1;
        if tick % SUMMARY_EVERY_TICKS == 0 {
            logging::log_ingest_summary(view.accepted, view.rejected);
        }
        if args.ticks.is_some_and(|limit| tick >= limit) {
            break;
        }

        thread::sleep(config.tick_interval());
    }

    Ok(())
}

fn run_verify(config: &Config, timeout: Duration, json: bool) -> Result<(), Box<dyn Error>> {
    let report = verify_broker(&config.broker(), timeout);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }

    if report.status == VerificationStatus::Failed {
        return Err(format!(
            "broker {}:{} failed verification",
            report.host, report.port
        )
        .into());
    }
    Ok(())
}
