use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FastNormError, Result};

/// How the run report is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Plain text, one row per line followed by the usage blocks.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    /// Log filter directive, e.g. `warn` or `fastnorm=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,

    /// Report output format
    #[serde(default)]
    pub report_format: ReportFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            report_format: ReportFormat::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from an optional file. The format follows the
    /// file extension (`toml`, `yaml`/`yml`, `json`). No environment
    /// variables are consulted.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let config: RunConfig = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            return Err(FastNormError::Config("log_level must not be empty".into()));
        }
        Ok(())
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
