//! Main execution logic for gs-glob CLI.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use gs_error::GsError;
use gs_glob::{
    GlobOutput, GlobStream, GlobStreamOptions, S3Config, S3ListingClient, StreamStats,
    create_s3_client,
};
use tracing::{info, warn};

use crate::args::{Cli, OutputFormatArg};

/// Outcome of one CLI run.
#[derive(Debug)]
pub struct RunSummary {
    pub stats: StreamStats,
    /// Outputs written to stdout
    pub written: usize,
    /// Total size of the written objects, when known
    pub bytes_matched: u64,
    /// Error that ended the stream early
    pub error: Option<GsError>,
}

/// Execute a glob run with the provided arguments.
pub async fn execute(args: Cli) -> Result<RunSummary> {
    let s3_config = build_s3_config(&args);
    let client = create_s3_client(&s3_config)
        .await
        .context("Failed to create S3 client")?;

    let options = build_options(&args);
    let mut stream = GlobStream::new(
        args.patterns.iter().cloned(),
        options,
        Arc::new(S3ListingClient::new(client)),
    )
    .context("Invalid patterns")?;

    info!(patterns = args.patterns.len(), "Starting glob");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = write_outputs(&mut stream, &mut out, args.output_format, args.max_results).await?;

    Ok(RunSummary {
        stats: stream.stats().clone(),
        written: outcome.written,
        bytes_matched: outcome.bytes_matched,
        error: outcome.error,
    })
}

fn build_s3_config(args: &Cli) -> S3Config {
    let mut config = S3Config::new()
        .with_region(&args.region)
        .with_timeout(args.timeout);

    if let Some(endpoint) = &args.s3_endpoint {
        config = config.with_endpoint(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        config = config.with_credentials(access_key, secret_key);
    }

    if let Some(profile) = &args.profile {
        config = config.with_profile(profile);
    }

    config
}

fn build_options(args: &Cli) -> GlobStreamOptions {
    let mut options = GlobStreamOptions::new()
        .with_high_water_mark(args.page_size)
        .with_format(args.format.into())
        .with_unique(!args.allow_duplicates);

    if let Some(bucket) = &args.bucket {
        options = options.with_bucket(bucket);
    }

    for (name, value) in &args.params {
        options = options.with_param(name, value.as_str());
    }

    options
}

/// Encode one output as a JSON document.
pub fn encode_output(output: &GlobOutput, format: OutputFormatArg) -> gs_error::Result<String> {
    let encoded = match format {
        OutputFormatArg::Jsonl => serde_json::to_string(output),
        OutputFormatArg::Json => serde_json::to_string_pretty(output),
    };
    encoded.map_err(|e| GsError::serialization(format!("Failed to encode output: {e}")))
}

/// What [`write_outputs`] produced.
#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub written: usize,
    pub bytes_matched: u64,
    pub error: Option<GsError>,
}

/// Drain `stream` into `out`, one JSON document per output.
///
/// A stream error stops the run and is returned in the outcome; outputs
/// written before it stay written. I/O failures are returned as errors.
pub async fn write_outputs<S, W>(
    stream: &mut S,
    out: &mut W,
    format: OutputFormatArg,
    max_results: usize,
) -> Result<WriteOutcome>
where
    S: Stream<Item = gs_error::Result<GlobOutput>> + Unpin,
    W: Write,
{
    let mut outcome = WriteOutcome::default();

    while let Some(item) = stream.next().await {
        let output = match item {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, written = outcome.written, "Stream ended with an error");
                outcome.error = Some(e);
                break;
            }
        };

        let json = encode_output(&output, format)?;
        writeln!(out, "{json}")?;

        if let GlobOutput::Object(entry) = &output {
            outcome.bytes_matched += entry.size.unwrap_or(0);
        }
        outcome.written += 1;

        if max_results > 0 && outcome.written >= max_results {
            info!(max_results, "Result limit reached");
            break;
        }
    }

    out.flush()?;
    Ok(outcome)
}
