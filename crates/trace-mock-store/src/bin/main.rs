//! trace-mock-store binary: local object store for the sync client

use std::path::PathBuf;

use clap::Parser;
use trace_core::constants::POSITIVE_LIST_OBJECT;
use trace_core::PositiveContactList;
use trace_mock_store::MockStoreBuilder;

#[derive(Parser, Debug)]
#[command(name = "trace-mock-store")]
#[command(about = "Serve a positive list from an in-memory object store")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Positive list JSON to publish on startup
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Object key for the seeded list
    #[arg(long, default_value = POSITIVE_LIST_OBJECT)]
    key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let mut builder = MockStoreBuilder::new().port(args.port);
    if let Some(path) = &args.seed {
        let bytes = std::fs::read(path)?;
        let list = PositiveContactList::from_slice(&bytes)?;
        tracing::info!(path = %path.display(), entries = list.len(), "Seeding positive list");
        builder = builder.seed(args.key.clone(), bytes);
    }

    let server = builder.build().await?;
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
