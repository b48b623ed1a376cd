//! CLI argument definitions for gs-glob.

use clap::{Parser, ValueEnum};
use gs_cli_common::{LogLevel, parse_key_value, parse_positive_usize};
use gs_glob::{DEFAULT_HIGH_WATER_MARK, OutputFormat};

/// Glob discovery over S3 listings.
///
/// Lists the objects whose keys match the given patterns and writes them to
/// stdout, one JSON document per object. Patterns starting with `!` exclude
/// keys matched by the others.
///
/// ## Examples
///
/// Keys in a default bucket:
///   gs-glob -b my-bucket "logs/{2024,2025}/*.json" "!logs/*/tmp-*"
///
/// Fully qualified patterns:
///   gs-glob "s3://bucket-a/data/**/*.parquet" "s3://bucket-b/data/*.parquet"
///
/// Request parameters for follow-up GetObject calls:
///   gs-glob -b my-bucket --format query --param RequestPayer=requester "data/*"
#[derive(Parser, Debug)]
#[command(name = "gs-glob")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Glob patterns (`key/glob`, `s3://bucket/key/glob` or `!exclude`)
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Bucket for patterns without an `s3://` location
    #[arg(short, long, env = "GS_S3_BUCKET")]
    pub bucket: Option<String>,

    /// Shape of each output
    #[arg(long, value_enum, default_value = "object")]
    pub format: FormatArg,

    /// Emit an object every time it is listed
    #[arg(long)]
    pub allow_duplicates: bool,

    /// Entries requested per listing page (must be >= 1)
    #[arg(long, default_value_t = DEFAULT_HIGH_WATER_MARK, value_parser = parse_positive_usize)]
    pub page_size: usize,

    /// Extra listing request parameter (can be specified multiple times)
    #[arg(long = "param", short = 'P', value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Stop after this many outputs (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_results: usize,

    /// Output encoding
    #[arg(long, value_enum, default_value = "jsonl")]
    pub output_format: OutputFormatArg,

    // === S3 Configuration ===
    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "GS_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

/// Output shape argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// The listed object with its metadata
    Object,
    /// Request parameters addressing the object
    Query,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Object => OutputFormat::Object,
            FormatArg::Query => OutputFormat::Query,
        }
    }
}

/// Output encoding argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// JSON Lines (one JSON object per line)
    Jsonl,
    /// Pretty-printed JSON
    Json,
}
