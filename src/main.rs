//! US2400 GW - Rust implementation
//!
//! Drives a Tascam US-2400 control surface against the built-in simulated
//! mixer: one engine tick per cycle, MIDI input drained at the start of
//! each tick, host notifications forwarded at its end.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use us2400_gw::config::{AppConfig, ConfigWatcher, EngineConfig, MidiConfig};
use us2400_gw::engine::Engine;
use us2400_gw::host::SimHost;
use us2400_gw::paths::AppPaths;
use us2400_gw::sniffer;
use us2400_gw::surface::device::discovery;
use us2400_gw::surface::Us2400Device;

/// US2400 Gateway - Tascam US-2400 control surface for a host mixer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: ./config.yaml, else the platform config directory)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,

    /// Print decoded surface input instead of running the gateway
    #[arg(long)]
    sniffer: bool,

    /// Input port index for the sniffer (default: every physical input)
    #[arg(long)]
    sniffer_port: Option<usize>,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    print_schema: bool,

    /// Devices as a "0 0 <in> <out>" string, overriding the configuration
    #[arg(long)]
    devices: Option<String>,

    /// Use the first MIDI ports that look like a US-2400
    #[arg(long)]
    auto_detect: bool,

    /// Write the effective configuration back to the configuration file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if args.print_schema {
        println!("{}", AppConfig::json_schema()?);
        return Ok(());
    }

    init_logging(&args.log_level, args.log_json)?;

    info!("Starting US2400 GW v{}...", env!("CARGO_PKG_VERSION"));

    if args.list_ports {
        sniffer::list_ports_formatted();
        return Ok(());
    }

    if args.sniffer {
        sniffer::run_sniffer(args.sniffer_port).await?;
        return Ok(());
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => {
            let paths = AppPaths::detect();
            paths.ensure_directories()?;
            paths.config_str()
        }
    };
    info!("Configuration file: {}", config_path);

    // hot reload only for a file that exists
    let (watcher, mut config) = if Path::new(&config_path).exists() {
        let (watcher, config) = ConfigWatcher::new(config_path.clone()).await?;
        info!("Configuration loaded with hot-reload enabled");
        (Some(watcher), (*config).clone())
    } else {
        (None, AppConfig::load_or_default(&config_path).await?)
    };

    if let Some(devices) = &args.devices {
        config.midi = MidiConfig::from_config_string(devices);
    }
    if args.auto_detect {
        match discovery::find_us2400_ports() {
            Some((input, output)) => {
                info!("🔍 Auto-detected US-2400 on ports {}/{}", input, output);
                config.midi.input_device = Some(input);
                config.midi.output_device = Some(output);
            }
            None => warn!("⚠️  No US-2400 ports detected"),
        }
    }
    if args.save_config {
        config.save(&config_path).await?;
        info!("💾 Configuration saved to {}", config_path);
    }

    run_gateway(config, watcher, shutdown_signal()).await?;

    info!("US2400 GW shutdown complete");
    Ok(())
}

async fn run_gateway(
    config: AppConfig,
    mut watcher: Option<ConfigWatcher>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    info!(
        "Surface: {} [{}]",
        config.midi.description(),
        config.midi.to_config_string()
    );

    let (mut device, status) = Us2400Device::open(&config.midi);
    if !status.is_ok() {
        warn!(
            "⚠️  Surface partially connected (input failed: {}, output failed: {})",
            status.input_failed, status.output_failed
        );
    }
    info!(
        "🎛️  Surface ports - input: {}, output: {}",
        device.input_name().unwrap_or("none"),
        device.output_name().unwrap_or("none")
    );
    let output = device.take_output();

    let mut host = SimHost::from_config(&config.simulation);
    host.set_aux_send_prefix(config.engine.aux_send_prefix.clone());
    let mut engine = Engine::new(host, output, config.engine.clone());

    let mut cycle = tokio::time::interval(Duration::from_millis(config.cycle_ms));
    cycle.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Ready, cycle {} ms", config.cycle_ms);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = cycle.tick() => {
                engine.tick(device.drain_input());
                for event in engine.host_mut().take_events() {
                    engine.on_host_event(event);
                }
            }

            Some(engine_config) = next_reload(&mut watcher) => {
                info!("📝 Engine configuration changed, applying");
                engine
                    .host_mut()
                    .set_aux_send_prefix(engine_config.aux_send_prefix.clone());
                engine.set_config(engine_config);
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    if !engine.shutdown() {
        warn!("⚠️  Surface output was released before it drained");
    }
    Ok(())
}

/// Next reloaded engine section; never resolves without a watcher
async fn next_reload(watcher: &mut Option<ConfigWatcher>) -> Option<EngineConfig> {
    match watcher {
        Some(watcher) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init();
    }

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
