//! gs-glob CLI
//!
//! Streams the S3 objects whose keys match a set of glob patterns.

use clap::Parser;
use gs_cli_common::{format_bytes, format_number, init_logging};

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    init_logging(args.log_level)?;

    let summary = run::execute(args).await?;
    let stats = &summary.stats;

    eprintln!();
    eprintln!("Glob completed:");
    eprintln!("  Pages fetched:    {}", format_number(stats.pages_fetched as u64));
    eprintln!("  Entries listed:   {}", format_number(stats.entries_listed as u64));
    eprintln!("  Entries filtered: {}", format_number(stats.entries_filtered as u64));
    eprintln!("  Duplicates:       {}", format_number(stats.duplicates_skipped as u64));
    eprintln!("  Entries output:   {}", format_number(summary.written as u64));
    eprintln!("  Bytes matched:    {}", format_bytes(summary.bytes_matched));

    if let Some(duration) = stats.duration() {
        eprintln!(
            "  Duration:         {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        );

        if let Some(eps) = stats.entries_per_second() {
            eprintln!("  Throughput:       {:.1} entries/sec", eps);
        }
    }

    if let Some(error) = &summary.error {
        eprintln!("  Error ({}): {}", error.category(), error);
        std::process::exit(4);
    }

    Ok(())
}
