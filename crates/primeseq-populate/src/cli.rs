use clap::Parser;
use core::time::Duration;
use primeseq_populate::{
    DEFAULT_BATCH_SIZE, DEFAULT_POPULATE_FROM, DEFAULT_POPULATE_UP_TO, PopulateConfig,
};

/// Runtime configuration for the `primeseq-populate` binary.
///
/// All values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "primeseq-populate",
    version,
    about = "Populate a prime store with a pool of parallel sieve workers"
)]
pub struct CliArgs {
    /// Number of candidate values sieved by one worker per chunk.
    ///
    /// Each chunk allocates one bit per candidate, so this bounds the memory
    /// of every in-flight chunk.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long, env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE.get())]
    pub batch_size: u64,

    /// Lower bound of the population range (inclusive, at least 2).
    ///
    /// Environment variable: `POPULATE_FROM`
    #[arg(long, env = "POPULATE_FROM", default_value_t = DEFAULT_POPULATE_FROM)]
    pub populate_from: u64,

    /// Upper bound of the population range (inclusive).
    ///
    /// Environment variable: `POPULATE_UP_TO`
    #[arg(long, env = "POPULATE_UP_TO", default_value_t = DEFAULT_POPULATE_UP_TO)]
    pub populate_up_to: u64,

    /// Number of concurrent sieve workers. Defaults to the number of
    /// available CPUs.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS")]
    pub num_workers: Option<usize>,

    /// Wall-clock budget for the whole run, in seconds.
    ///
    /// Environment variable: `POPULATE_TIMEOUT_SECS`
    #[arg(long, env = "POPULATE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl TryFrom<CliArgs> for PopulateConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let config = Self::new(args.populate_from, args.populate_up_to, args.batch_size)?
            .with_timeout(args.timeout_secs.map(Duration::from_secs));
        match args.num_workers {
            Some(num_workers) => Ok(config.with_num_workers(num_workers)?),
            None => Ok(config),
        }
    }
}
