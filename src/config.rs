use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

pub const ENV_API_URL: &str = "CATALOG_API_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "CATALOG_REQUEST_TIMEOUT_MS";
pub const ENV_DEBUG: &str = "CATALOG_DEBUG";

/// Pacing of the synthetic upload progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub tick_ms: u64,
    pub increment: u8,
    /// Where the estimator starts counting from once the upload is on the wire.
    pub start_percent: u8,
    /// The estimator never reports more than this; only settlement reaches 100.
    pub ceiling_percent: u8,
    /// Pause between the "preparing" / "connecting" / "uploading" stages.
    pub stage_delay_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_ms: 3_000,
            increment: 5,
            start_percent: 15,
            ceiling_percent: 90,
            stage_delay_ms: 200,
        }
    }
}

impl ProgressConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    pub request_timeout_ms: u64,
    pub save_timeout_ms: u64,
    pub jpeg_quality: u8,
    pub voice_confirmation: bool,
    pub list_limit: u32,
    pub progress: ProgressConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".into(),
            request_timeout_ms: 120_000,
            save_timeout_ms: 30_000,
            jpeg_quality: 95,
            voice_confirmation: true,
            list_limit: 100,
            progress: ProgressConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file. A missing file or unparsable contents fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(
                    "Ignoring invalid config at {} ({err}); using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Layer `CATALOG_*` environment overrides on top of the current values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.api_url = trimmed.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.request_timeout_ms = raw
                .trim()
                .parse()
                .with_context(|| {
                    format!("{ENV_REQUEST_TIMEOUT_MS} must be milliseconds, got '{raw}'")
                })?;
        }

        let debug_mode = lookup(ENV_DEBUG)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            self.progress.tick_ms = 1_000;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        if self.progress.tick_ms == 0 {
            bail!("progress.tick_ms must be greater than zero");
        }
        if self.progress.increment == 0 {
            bail!("progress.increment must be greater than zero");
        }
        if self.progress.ceiling_percent >= 100 {
            bail!("progress.ceiling_percent must stay below 100");
        }
        if self.progress.start_percent > self.progress.ceiling_percent {
            bail!("progress.start_percent must not exceed progress.ceiling_percent");
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            bail!("jpeg_quality must be between 1 and 100");
        }
        Ok(())
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }

    /// `api_url` joined with an endpoint path, without doubling the slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
