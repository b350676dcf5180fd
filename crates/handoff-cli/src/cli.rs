use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::{StatusCode, Url};

#[derive(Clone, Debug, Parser)]
#[command(name = "handoff", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// URL to download
    pub url: Url,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Reject any response whose status differs from CODE
    #[arg(long, value_name = "CODE", value_parser = parse_status)]
    pub expect_status: Option<StatusCode>,

    /// Seconds allowed for receiving the body (0 = default)
    #[arg(long, value_name = "S", env = "HANDOFF_READ_TIMEOUT", default_value_t = 0)]
    pub read_timeout: u64,

    /// Seconds allowed for writing the output (0 = default)
    #[arg(long, value_name = "S", env = "HANDOFF_COPY_TIMEOUT", default_value_t = 0)]
    pub copy_timeout: u64,

    /// Overall limit in seconds for the whole download
    #[arg(long, value_name = "S", env = "HANDOFF_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Directory for the staging file
    #[arg(long, value_name = "DIR", env = "HANDOFF_STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl App {
    pub fn read_timeout(&self) -> Duration { Duration::from_secs(self.read_timeout) }

    pub fn copy_timeout(&self) -> Duration { Duration::from_secs(self.copy_timeout) }

    pub fn timeout(&self) -> Option<Duration> { self.timeout.map(Duration::from_secs) }
}

fn parse_status(s: &str) -> Result<StatusCode, String> {
    let code: u16 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    StatusCode::from_u16(code).map_err(|e| e.to_string())
}
