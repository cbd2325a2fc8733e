mod cli;
mod telemetry;

use clap::Parser;
use cli::CliArgs;
use primeseq_populate::{MemoryStore, PopulateConfig, PopulationOutcome, Populator};
use std::sync::Arc;
use telemetry::init_telemetry;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better throughput when many chunks allocate their marks
// concurrently, especially in musl environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = PopulateConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let store = Arc::new(MemoryStore::new());
    let populator = Populator::new(Arc::clone(&store), config);
    tokio::spawn(shutdown_signal(populator.cancellation_token()));

    match populator.populate().await? {
        PopulationOutcome::Skipped { largest: _largest } => {
            #[cfg(feature = "tracing")]
            tracing::info!("Nothing to do, store already populated up to {_largest}");
        }
        PopulationOutcome::Completed(_report) => {
            #[cfg(feature = "tracing")]
            tracing::info!(
                "Stored {} primes in {:?}; store holds {} values, largest {:?}",
                _report.primes_stored,
                _report.elapsed,
                store.len(),
                _report.largest
            );
        }
    }

    Ok(())
}

fn log_startup_info(_config: &PopulateConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!("Starting population with full config: {:#?}", _config);
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Populating [{}, {}] in batches of {} with {} workers",
            _config.populate_from(),
            _config.populate_up_to(),
            _config.batch_size(),
            _config.num_workers()
        );
    }
}

#[allow(clippy::used_underscore_binding)]
async fn shutdown_signal(token: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Failed to install SIGTERM handler: {_e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(_e) = signal::ctrl_c().await {
            #[cfg(feature = "tracing")]
            tracing::error!("Failed to install Ctrl+C handler: {_e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Cancelling remaining chunks...");
    token.cancel();
}
