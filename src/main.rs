use color_eyre::{eyre::eyre, Result};
use padbridge::bridge::{Bridge, BridgeSettings};
use padbridge::config::BridgeConfig;
use padbridge::controller::{GilrsSource, InputSource};
use padbridge::injection::{InjectionSink, LogSink};
use padbridge::mapping::Translator;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup()?;

    let config = BridgeConfig::load()
        .await
        .map_err(|e| eyre!("Failed to load configuration: {}", e))?;
    setup_logging(config.level()?);
    info!("Starting padbridge with config: {:?}", config);

    // Acquire the controller first, it is released last
    let source = GilrsSource::create()
        .and_then(|source| source.acquire())
        .map_err(|e| eyre!("Failed to acquire controller: {}", e))?;
    info!("Controller acquired: {}", source.device_name());

    let sink = create_sink(&config)?;

    let bridge = Bridge::create(
        Box::new(source),
        sink,
        Translator::new(config.translator_settings()),
        BridgeSettings::from(&config),
    )
    .activate();

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
        signal_token.cancel();
    });

    let stopped = bridge.run_until_shutdown(shutdown).await;
    stopped.shutdown();

    info!("padbridge stopped");
    Ok(())
}

#[cfg(target_os = "linux")]
fn create_sink(config: &BridgeConfig) -> Result<Box<dyn InjectionSink>> {
    if config.dry_run {
        info!("Dry run: logging batches instead of injecting");
        return Ok(Box::new(LogSink::new()));
    }
    let sink = padbridge::injection::UinputSink::create()
        .map_err(|e| eyre!("Failed to set up input injection: {}", e))?;
    Ok(Box::new(sink))
}

#[cfg(not(target_os = "linux"))]
fn create_sink(config: &BridgeConfig) -> Result<Box<dyn InjectionSink>> {
    if !config.dry_run {
        warn!("No input injection backend on this platform, logging batches instead");
    }
    Ok(Box::new(LogSink::new()))
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    Ok(())
}

fn setup_logging(level: Level) {
    let result = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .try_init();

    if let Err(e) = result {
        warn!("Logging already initialized: {}", e);
    }
}
