//! trace-client binary: positive list sync CLI
//!
//! Run with:
//! ```bash
//! cargo run -p trace-client --bin trace-client -- --store-url http://localhost:3001 --once
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use trace_client::{
    metrics, DeepContactLog, HttpObjectStore, MemoryDeepContactLog, MemoryTempIdStore,
    ObjectStore, SyncOutcome, SyncService, TempIdStore,
};
use trace_core::SyncConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "trace-client")]
#[command(about = "Sync the positive list and check for exposure")]
struct Args {
    /// JSON config file (flags override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Object store base URL
    #[arg(long)]
    store_url: Option<String>,

    /// Object key of the positive list
    #[arg(long)]
    object_key: Option<String>,

    /// JSON file with own temp ID records
    #[arg(long)]
    temp_ids: Option<PathBuf>,

    /// JSON file with deep contact records
    #[arg(long)]
    contacts: Option<PathBuf>,

    /// Milliseconds between background syncs
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,

    /// Sync once, print the exposure status and exit
    #[arg(long)]
    once: bool,

    /// Just fetch the positive list metadata and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trace_client=info".parse()?))
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    if args.check {
        let store = HttpObjectStore::from_config(&config)?;
        let meta = store.metadata(&config.object_key).await?;
        println!(
            "[OK] {} at generation {} ({} bytes)",
            config.object_key, meta.generation, meta.size
        );
        return Ok(());
    }

    if let Some(addr) = args.metrics_addr {
        metrics::init_prometheus_exporter(addr)?;
        tracing::info!(%addr, "Serving metrics");
    }

    let temp_ids: Arc<dyn TempIdStore> = match &config.temp_ids_path {
        Some(path) => Arc::new(MemoryTempIdStore::from_file(path)?),
        None => Arc::new(MemoryTempIdStore::default()),
    };
    let contacts: Arc<dyn DeepContactLog> = match &config.contacts_path {
        Some(path) => Arc::new(MemoryDeepContactLog::from_file(path)?),
        None => Arc::new(MemoryDeepContactLog::default()),
    };

    let service = SyncService::from_config(config, temp_ids, contacts)?;

    if args.once {
        let (outcome, status) = service.refresh().await;
        println!("{}", serde_json::to_string_pretty(&status)?);
        return match outcome {
            SyncOutcome::Failed(e) => Err(e.into()),
            SyncOutcome::TimedOut => anyhow::bail!("Positive list sync timed out"),
            _ => Ok(()),
        };
    }

    service
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<SyncConfig> {
    let mut config = match &args.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };

    if let Some(url) = &args.store_url {
        config.store_url = url.clone();
    }
    if let Some(key) = &args.object_key {
        config.object_key = key.clone();
    }
    if let Some(path) = &args.temp_ids {
        config.temp_ids_path = Some(path.clone());
    }
    if let Some(path) = &args.contacts {
        config.contacts_path = Some(path.clone());
    }
    if let Some(ms) = args.poll_interval_ms {
        config = config.with_poll_interval(Duration::from_millis(ms));
    }

    config.validate()?;
    Ok(config)
}
