use anyhow::{Context, bail};
use clap::Parser;
use idgen::{DEFAULT_CAPACITY_PER_WORKER, PoolConfig};

/// Runtime configuration for the `idgen` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "idgen",
    version,
    about = "Print node-unique 128-bit identifiers, one hex string per line"
)]
pub struct CliArgs {
    /// Number of identifiers to generate.
    ///
    /// Environment variable: `IDGEN_COUNT`
    #[arg(short = 'n', long, env = "IDGEN_COUNT", default_value_t = 10)]
    pub count: u64,

    /// Number of producer threads. Defaults to the number of logical CPUs.
    ///
    /// Each producer is assigned a distinct worker index that is mixed into
    /// its identifiers' digest.
    ///
    /// Environment variable: `IDGEN_NUM_WORKERS`
    #[arg(short, long, env = "IDGEN_NUM_WORKERS")]
    pub workers: Option<usize>,

    /// Output channel slots per producer.
    ///
    /// Higher values let producers run further ahead of the single consumer.
    /// Zero makes every hand-off a rendezvous.
    ///
    /// Environment variable: `IDGEN_CAPACITY_PER_WORKER`
    #[arg(long, env = "IDGEN_CAPACITY_PER_WORKER", default_value_t = DEFAULT_CAPACITY_PER_WORKER)]
    pub capacity_per_worker: usize,

    /// Sort the batch by embedded creation time before printing.
    #[arg(short, long, default_value_t = false)]
    pub sort: bool,

    /// Print the embedded nanosecond timestamp after each identifier.
    #[arg(short, long, default_value_t = false)]
    pub timestamps: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub count: u64,
    pub pool: PoolConfig,
    pub sort: bool,
    pub timestamps: bool,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let num_workers = args.workers.unwrap_or_else(num_cpus::get);
        if num_workers == 0 {
            bail!("IDGEN_NUM_WORKERS must be greater than 0");
        }

        if usize::try_from(args.count).is_err() {
            bail!(
                "IDGEN_COUNT ({}) exceeds what this platform can hold in memory",
                args.count
            );
        }

        let pool = PoolConfig {
            num_workers,
            capacity_per_worker: args.capacity_per_worker,
        };
        pool.validate().context("invalid producer pool settings")?;

        Ok(Self {
            count: args.count,
            pool,
            sort: args.sort,
            timestamps: args.timestamps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("idgen").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn flags_map_onto_pool_config() {
        let config = AppConfig::try_from(parse(&[
            "--count",
            "42",
            "--workers",
            "3",
            "--capacity-per-worker",
            "16",
            "--sort",
        ]))
        .unwrap();

        assert_eq!(config.count, 42);
        assert_eq!(config.pool.num_workers, 3);
        assert_eq!(config.pool.capacity_per_worker, 16);
        assert!(config.sort);
        assert!(!config.timestamps);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = AppConfig::try_from(parse(&["--workers", "0"])).unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn overflowing_capacity_is_rejected() {
        let workers = usize::MAX.to_string();
        let args = parse(&["--workers", &workers, "--capacity-per-worker", "2"]);
        assert!(AppConfig::try_from(args).is_err());
    }
}
