use anyhow::{bail, Context, Result};

const DEFAULT_API_BASE: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_EXPORT_FILENAME: &str = "tailored-resume.pdf";

/// Client configuration loaded from environment variables.
/// Every key has a default, so an empty environment yields a usable local setup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the scoring/tailoring service, without a trailing slash.
    pub api_base: String,
    pub timeout_secs: u64,
    pub export_filename: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base: normalize_base(&env_or("TAILOR_API_BASE", DEFAULT_API_BASE)),
            timeout_secs: parse_timeout(std::env::var("TAILOR_TIMEOUT_SECS").ok())?,
            export_filename: env_or("TAILOR_EXPORT_FILENAME", DEFAULT_EXPORT_FILENAME),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(mut self, api_base: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(base) = api_base {
            self.api_base = normalize_base(&base);
        }
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
            rust_log: "info".to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Blank reads as unset. Zero is rejected since every request would time out.
fn parse_timeout(raw: Option<String>) -> Result<u64> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(DEFAULT_TIMEOUT_SECS);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .context("TAILOR_TIMEOUT_SECS must be a whole number of seconds")?;
    if secs == 0 {
        bail!("TAILOR_TIMEOUT_SECS must be at least 1 second");
    }
    Ok(secs)
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}
