//! Command-line argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    DEFAULT_ALL_DAYS_LABEL, DEFAULT_API_BASE_URL, DEFAULT_PLACEHOLDER_SPACE_ID,
    DEFAULT_PLATFORM_QUESTION_ID, DEFAULT_UPLOAD_ENDPOINT,
};
use crate::report::DuplicatePolicy;

/// Guestlist - Turn event registrations into per-day guest lists
#[derive(Parser, Debug)]
#[command(name = "guestlist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Where registrants come from: "api" to fetch from the registration API,
    /// or a path to a registration export CSV
    pub source: String,

    /// Output format: "csv" (one guest list per day) or "json" (upload documents plus cmds.sh)
    #[arg(value_enum)]
    pub destination: Destination,

    /// Output directory. Defaults to guestlist.csv / guestlist.json in the temp directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Day configuration file (overrides GATHERBOT_CONF)
    #[arg(long)]
    pub conf: Option<PathBuf>,

    /// Ticket type whose holders attend every day
    #[arg(long, default_value = DEFAULT_ALL_DAYS_LABEL)]
    pub all_days_label: String,

    /// Custom question id whose answer holds the platform login email
    #[arg(long, default_value = DEFAULT_PLATFORM_QUESTION_ID)]
    pub platform_question_id: String,

    /// Space id marking an unprovisioned day; no upload command is written for it
    #[arg(long, default_value = DEFAULT_PLACEHOLDER_SPACE_ID)]
    pub placeholder_space_id: String,

    /// Endpoint the upload commands post guest lists to
    #[arg(long, default_value = DEFAULT_UPLOAD_ENDPOINT)]
    pub upload_endpoint: String,

    /// Base URL of the registration API
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Per-request timeout in seconds for API page fetches
    #[arg(long, default_value = "5", value_parser = validate_timeout)]
    pub timeout_secs: u64,

    /// Fail unless exactly this many day buckets are found
    #[arg(long)]
    pub expect_days: Option<usize>,

    /// How to handle the same email appearing twice in one day's JSON guest list
    #[arg(long, value_enum, default_value = "warn")]
    pub on_duplicate: DuplicatePolicy,

    /// Skip the confirmation prompt before writing into an existing directory
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Destination {
    Csv,
    Json,
}

impl Destination {
    pub fn extension(self) -> &'static str {
        match self {
            Destination::Csv => "csv",
            Destination::Json => "json",
        }
    }
}

impl Cli {
    /// True when registrants should be fetched from the API.
    pub fn is_api_source(&self) -> bool {
        self.source == "api"
    }

    /// Get the output directory, deriving it from the destination if not explicitly provided.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            std::env::temp_dir().join(format!("guestlist.{}", self.destination.extension()))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Validator for timeout_secs parameter
fn validate_timeout(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number of seconds", s))?;

    if value == 0 {
        Err("timeout must be at least 1 second".to_string())
    } else {
        Ok(value)
    }
}
