//! # Sunup — sunrise & sunset notification engine
//!
//! Reads per-chat locations from the state store, schedules one-shot
//! notifications for the day's sun events, and re-installs everything
//! once a day at UTC midnight.
//!
//! Usage:
//!   sunup                          # Run with ~/.sunup/config.toml
//!   sunup --config ./sunup.toml    # Custom config
//!   sunup --bot-token 123:abc -v   # Token override, verbose logging

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sunup_channels::TelegramSender;
use sunup_core::{ChatStateStore, Clock, MessageDelivery, SunTimesService, SunupConfig, SystemClock};
use sunup_notifier::{Notifier, NotifierDispatcher};
use sunup_scheduler::{RetryPolicy, Scheduler};
use sunup_store::FileStateStore;
use sunup_suntimes::RemoteSunApi;

#[derive(Parser)]
#[command(
    name = "sunup",
    version,
    about = "🌅 Sunup — sunrise & sunset notification engine"
)]
struct Cli {
    /// Path to config file (default ~/.sunup/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chat state directory (default ~/.sunup)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Telegram bot token (overrides config and SUNUP_TELEGRAM_TOKEN)
    #[arg(long)]
    bot_token: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => SunupConfig::load_from(path)?,
        None => SunupConfig::load()?,
    };

    if let Some(token) = cli.bot_token {
        config.telegram.bot_token = token;
    } else if let Ok(token) = std::env::var("SUNUP_TELEGRAM_TOKEN") {
        if !token.is_empty() {
            config.telegram.bot_token = token;
        }
    }

    let store_dir = cli.store_dir.unwrap_or_else(|| config.store.dir());
    tracing::info!("Starting up (state in {})", store_dir.display());

    // Explicit wiring: every component receives its collaborators.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn ChatStateStore> = Arc::new(FileStateStore::new(&store_dir));
    let sun_times: Arc<dyn SunTimesService> = Arc::new(RemoteSunApi::new(&config.suntimes));
    let scheduler = Arc::new(Scheduler::new(clock.clone()));
    let retry = RetryPolicy::new(
        config.scheduler.retry_attempts,
        Duration::from_secs(config.scheduler.retry_backoff_secs),
    );
    let notifier = Arc::new(Notifier::new(
        store.clone(),
        sun_times,
        scheduler.clone(),
        clock,
        retry,
        Duration::from_secs(config.scheduler.reinstall_period_hours * 3600),
    ));

    let telegram = TelegramSender::new(config.telegram.clone());
    if config.telegram.enabled && !config.telegram.bot_token.is_empty() {
        match telegram.get_me().await {
            Ok(me) => tracing::info!(
                "Telegram bot: @{} ({})",
                me.username.as_deref().unwrap_or("unknown"),
                me.first_name
            ),
            Err(e) => tracing::warn!("Telegram token check failed: {e}"),
        }
    } else {
        tracing::warn!("Telegram delivery not configured — sends will fail until a token is set");
    }
    let delivery: Arc<dyn MessageDelivery> = Arc::new(telegram);

    let dispatcher = Arc::new(NotifierDispatcher::new(
        notifier.clone(),
        delivery,
        store.clone(),
    ));

    // Same startup as every later midnight: sweep, then keep sweeping daily.
    let installed = notifier.install_all_notifiers().await;
    tracing::info!("Startup sweep installed notifiers for {installed} chat(s)");
    notifier.register_daily_reinstall().await?;

    let firing_loop = sunup_scheduler::spawn(
        scheduler.clone(),
        dispatcher,
        Duration::from_secs(config.scheduler.tick_interval_secs),
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    scheduler.close().await;
    firing_loop.await?;

    Ok(())
}
