//! Console logging for the `primeseq-populate` binary.
//!
//! Events are printed through `tracing_subscriber::fmt` with a local RFC 3339
//! timer. Verbosity is taken from `RUST_LOG` and defaults to `info`.
//!
//! ```bash
//! RUST_LOG=primeseq=trace,primeseq_populate=debug cargo run --bin primeseq-populate
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;
    Ok(())
}
