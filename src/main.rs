//! # SirenHub — Alert Dispatch Daemon
//!
//! Watches the alert spool, resolves which contacts and buzzers must react,
//! sends SMS / relay commands, and schedules delayed buzzer shutoffs.
//!
//! Usage:
//!   sirenhub run                          # Start the dispatch daemon
//!   sirenhub check                        # Validate config, stores, queue
//!   sirenhub send-test --phone N --message M

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sirenhub_core::config::{SirenConfig, expand_path};
use sirenhub_core::traits::{ContactStore, DeviceStore, Transport};
use sirenhub_dispatch::{AlertTrigger, Dispatcher};
use sirenhub_scheduler::{RelayScheduler, SqliteTaskQueue, spawn_worker};
use sirenhub_store::{FileContactStore, FileDeviceStore, SpoolSource};
use sirenhub_transport::SmsGateway;

#[derive(Parser)]
#[command(name = "sirenhub", version, about = "🚨 SirenHub — alert dispatch engine")]
struct Cli {
    /// Config file (default: ~/.sirenhub/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the dispatch daemon
    Run,
    /// Validate config, stores, and queue health
    Check,
    /// Send a single SMS through the configured gateway
    SendTest {
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "SirenHub test message")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SirenConfig::load_from(path)?,
        None => SirenConfig::load()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with_target(false)
        .init();

    match cli.command {
        Command::Run => run(config).await,
        Command::Check => check(config).await,
        Command::SendTest { phone, message } => send_test(config, &phone, &message).await,
    }
}

async fn run(config: SirenConfig) -> Result<()> {
    tracing::info!("🚨 Starting SirenHub dispatch daemon...");

    let transport: Arc<dyn Transport> = Arc::new(SmsGateway::new(config.sms.clone()));

    let data_dir = expand_path(&config.store.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let contacts: Arc<dyn ContactStore> = Arc::new(FileContactStore::new(&data_dir));
    let devices: Arc<dyn DeviceStore> = Arc::new(FileDeviceStore::new(&data_dir));

    // Prefer the durable queue; degrade to in-process timers when it is
    // disabled or unhealthy.
    let scheduler = if config.scheduler.durable {
        let queue_path = expand_path(&config.scheduler.queue_path);
        match SqliteTaskQueue::open(&queue_path) {
            Ok(queue) => {
                let queue = Arc::new(queue);
                spawn_worker(queue.clone(), transport.clone(), config.scheduler.tick_secs);
                RelayScheduler::with_queue(queue, transport.clone()).await
            }
            Err(e) => {
                tracing::warn!("⚠️ Task queue unavailable ({e}) — degraded to in-process timers");
                RelayScheduler::in_process(transport.clone())
            }
        }
    } else {
        RelayScheduler::in_process(transport.clone())
    };

    let dispatcher = Dispatcher::new(transport, contacts, devices, scheduler)
        .with_maps_link(config.dispatch.maps_link);
    let trigger = AlertTrigger::new(Arc::new(dispatcher));

    let spool_dir = expand_path(&config.store.spool_dir);
    let source = SpoolSource::new(&spool_dir, Duration::from_secs(config.store.poll_secs.max(1)))?;
    tracing::info!("📥 Watching spool at {}", spool_dir.display());

    tokio::select! {
        _ = trigger.run(source) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }
    Ok(())
}

async fn check(config: SirenConfig) -> Result<()> {
    println!("🚨 SirenHub — configuration check\n");
    println!("SMS gateway:   {}", config.sms.api_url);
    println!("  sender id:   {}", config.sms.sender_id);
    println!("  timeout:     {}s", config.sms.timeout_secs);
    if config.sms.api_key.is_empty() {
        println!("  ⚠️  api_key is empty — sends will be rejected by the provider");
    }

    let data_dir = expand_path(&config.store.data_dir);
    let contacts = FileContactStore::new(&data_dir);
    let devices = FileDeviceStore::new(&data_dir);
    // Institute 0 never matches; this only proves the files parse.
    match (contacts.list_contacts(0).await, devices.list_buzzers(0).await) {
        (Ok(_), Ok(_)) => println!("Stores:        ok ({})", data_dir.display()),
        (Err(e), _) | (_, Err(e)) => println!("Stores:        ❌ {e}"),
    }

    if config.scheduler.durable {
        let queue_path = expand_path(&config.scheduler.queue_path);
        match SqliteTaskQueue::open(&queue_path) {
            Ok(queue) => {
                let pending = queue.pending_count().await.unwrap_or(0);
                println!("Queue:         ok, {pending} pending task(s) ({})", queue_path.display());
            }
            Err(e) => println!("Queue:         ❌ {e} — daemon would run degraded"),
        }
    } else {
        println!("Queue:         disabled — in-process timers only");
    }

    println!("Spool:         {}", expand_path(&config.store.spool_dir).display());
    Ok(())
}

async fn send_test(config: SirenConfig, phone: &str, message: &str) -> Result<()> {
    let gateway = SmsGateway::new(config.sms);
    let receipt = gateway.send(phone, message).await;
    if receipt.success {
        println!("✅ Sent. Provider ref: {}", receipt.provider_ref.unwrap_or_default());
    } else {
        println!("❌ Failed: {}", receipt.error.unwrap_or_default());
    }
    Ok(())
}
