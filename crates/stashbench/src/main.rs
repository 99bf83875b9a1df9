//! stashbench - load driver for stashcache
//!
//! Builds a cache (optionally two-tier) from flags, runs worker threads that
//! read keys through the memoizing wrapper, and reports statistics.

mod workload;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use stashcache::{Cache, CacheConfig, TieredCache};
use tracing::info;

use crate::workload::{Report, Workload};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maximum entries in the (L1) cache
    #[arg(long, default_value_t = stashcache::DEFAULT_MAX_SIZE)]
    max_size: usize,

    /// Default entry TTL in milliseconds
    #[arg(long, default_value_t = 5_000)]
    default_ttl_ms: u64,

    /// Sweeper period in milliseconds
    #[arg(long, default_value_t = 1_000)]
    cleanup_interval_ms: u64,

    /// Disable the background sweeper
    #[arg(long)]
    no_sweeper: bool,

    /// Add an L2 tier of this many entries
    #[arg(long)]
    l2: Option<usize>,

    /// Worker threads
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Size of the key space
    #[arg(short, long, default_value_t = 10_000)]
    keys: usize,

    /// Run time in seconds
    #[arg(short, long, default_value_t = 10)]
    duration_secs: u64,

    /// Simulated factory cost in microseconds
    #[arg(long, default_value_t = 50)]
    compute_us: u64,

    /// Print final statistics as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn cache_config(&self) -> CacheConfig {
        let config = CacheConfig::new()
            .max_size(self.max_size)
            .default_ttl(Duration::from_millis(self.default_ttl_ms))
            .cleanup_interval(Duration::from_millis(self.cleanup_interval_ms));

        if self.no_sweeper {
            config.without_sweeper()
        } else {
            config
        }
    }

    fn workload(&self) -> Workload {
        Workload {
            threads: self.threads.max(1),
            keys: self.keys.max(1),
            duration: Duration::from_secs(self.duration_secs),
            compute: Duration::from_micros(self.compute_us),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = args.cache_config();
    let workload = args.workload();

    info!("Starting stashbench v{}", env!("CARGO_PKG_VERSION"));
    info!(
        max_size = config.max_size,
        default_ttl = ?config.default_ttl,
        cleanup_interval = ?config.cleanup_interval,
        sweeper = config.sweeper,
        "cache config"
    );
    info!(
        threads = workload.threads,
        keys = workload.keys,
        duration = ?workload.duration,
        "workload"
    );

    let report = match args.l2 {
        Some(l2_size) => {
            let l2_config = args.cache_config().max_size(l2_size);
            let cache = Arc::new(TieredCache::with_configs(config, Some(l2_config))?);
            let report = workload.run_tiered(Arc::clone(&cache))?;
            let stats = cache.stats()?;
            cache.close();
            report.with_tiered(stats)
        }
        None => {
            let cache = Arc::new(Cache::new(config)?);
            let report = workload.run(Arc::clone(&cache))?;
            let stats = cache.stats()?;
            let metrics = cache.metrics();
            let report = report.with_single(stats, metrics.hit_ratio(), metrics.evictions());
            cache.close();
            report
        }
    };

    print_report(&report, args.json)?;
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\nstashbench results");
    println!("  operations:      {}", report.operations);
    println!("  factory calls:   {}", report.factory_calls);
    println!("  throughput:      {:.0} ops/s", report.ops_per_sec);
    if let Some(ratio) = report.lookup_hit_ratio {
        println!("  lookup hit rate: {:.1}%", ratio * 100.0);
    }
    if let Some(evictions) = report.evictions {
        println!("  evictions:       {}", evictions);
    }
    if let Some(stats) = &report.cache {
        println!(
            "  cache:           {}/{} entries, {} hits, {} expired pending",
            stats.size, stats.max_size, stats.total_hits, stats.expired_count
        );
    }
    if let Some(tiered) = &report.tiered {
        println!(
            "  l1:              {}/{} entries, {} hits",
            tiered.l1.size, tiered.l1.max_size, tiered.l1.total_hits
        );
        if let Some(l2) = &tiered.l2 {
            println!(
                "  l2:              {}/{} entries, {} hits",
                l2.size, l2.max_size, l2.total_hits
            );
        }
    }
    Ok(())
}
