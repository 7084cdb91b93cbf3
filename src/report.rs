//! Run driver and report rendering.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::normalize::{Method, Normalizer};
use crate::usage::ResourceUsage;

/// Outcome of one normalization run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub method: Method,
    pub features: FeatureMatrix,
    /// Sampled right before the first row is normalized.
    pub start_usage: ResourceUsage,
    /// Sampled right after the last row is normalized.
    pub end_usage: ResourceUsage,
}

/// Load `path` and normalize every row with `method`.
pub fn run(method: Method, path: impl AsRef<Path>) -> Result<RunReport> {
    let features = FeatureMatrix::from_path(path)?;
    Ok(run_matrix(method, features))
}

/// Normalize every row of an in-memory matrix.
///
/// Resource usage brackets only the normalization loop. The shared lookup
/// table is forced beforehand so its one-time construction stays outside
/// the measured interval.
pub fn run_matrix(method: Method, mut features: FeatureMatrix) -> RunReport {
    let normalizer = Normalizer::new(method);
    tracing::debug!(
        method = method.name(),
        rows = features.len(),
        dims = features.dims(),
        "normalizing rows"
    );

    let start_usage = ResourceUsage::sample();
    normalizer.normalize_rows(&mut features);
    let end_usage = ResourceUsage::sample();

    tracing::debug!(
        cpu_us = end_usage.cpu_time_since(&start_usage).as_micros() as u64,
        "normalization finished"
    );

    RunReport {
        method,
        features,
        start_usage,
        end_usage,
    }
}

impl RunReport {
    /// JSON rendering. Non-finite values become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<&[f32]> = self.features.rows().collect();
        serde_json::json!({
            "method": self.method,
            "method_name": self.method.name(),
            "rows": self.features.len(),
            "dims": self.features.dims(),
            "features": rows,
            "start_usage": UsageJson::from(&self.start_usage),
            "end_usage": UsageJson::from(&self.end_usage),
        })
    }
}

#[derive(Serialize)]
struct UsageJson {
    user_time_us: u128,
    system_time_us: u128,
    max_rss_kb: u64,
}

impl From<&ResourceUsage> for UsageJson {
    fn from(u: &ResourceUsage) -> Self {
        Self {
            user_time_us: u.user_time.as_micros(),
            system_time_us: u.system_time.as_micros(),
            max_rss_kb: u.max_rss_kb,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Normalized features:")?;
        for row in self.features.rows() {
            for value in row {
                write!(f, "{value:.6} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Method: {}", self.method)?;
        writeln!(f, "Execution time and resource usage:")?;
        write!(f, "{}", self.start_usage.display_with_label("Start Usage"))?;
        write!(f, "{}", self.end_usage.display_with_label("End Usage"))
    }
}
