//! Process resource usage sampling.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// CPU time and peak resident set size of the current process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceUsage {
    pub user_time: Duration,
    pub system_time: Duration,
    /// Peak resident set size in kilobytes.
    pub max_rss_kb: u64,
}

impl ResourceUsage {
    /// Sample `getrusage(RUSAGE_SELF)`.
    #[cfg(unix)]
    pub fn sample() -> Self {
        // SAFETY: `rusage` is plain old data and getrusage only writes into it.
        let mut raw: libc::rusage = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut raw) };
        if result != 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "getrusage failed; reporting zero usage"
            );
            return Self::default();
        }

        Self {
            user_time: timeval_to_duration(raw.ru_utime),
            system_time: timeval_to_duration(raw.ru_stime),
            max_rss_kb: max_rss_kb(raw.ru_maxrss),
        }
    }

    #[cfg(not(unix))]
    pub fn sample() -> Self {
        tracing::warn!("resource usage is only sampled on unix targets");
        Self::default()
    }

    /// CPU time consumed since `start`.
    pub fn cpu_time_since(&self, start: &ResourceUsage) -> Duration {
        (self.user_time + self.system_time)
            .saturating_sub(start.user_time + start.system_time)
    }

    /// Render as a labelled block, one field per line.
    pub fn display_with_label<'a>(&'a self, label: &'a str) -> LabelledUsage<'a> {
        LabelledUsage { label, usage: self }
    }
}

#[cfg(unix)]
fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}

// macOS reports bytes, everything else kilobytes.
#[cfg(all(unix, target_os = "macos"))]
fn max_rss_kb(raw: libc::c_long) -> u64 {
    raw.max(0) as u64 / 1024
}

#[cfg(all(unix, not(target_os = "macos")))]
fn max_rss_kb(raw: libc::c_long) -> u64 {
    raw.max(0) as u64
}

/// [`ResourceUsage`] paired with a heading for text output.
pub struct LabelledUsage<'a> {
    label: &'a str,
    usage: &'a ResourceUsage,
}

impl fmt::Display for LabelledUsage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = self.usage;
        writeln!(f, "{}", self.label)?;
        writeln!(
            f,
            "User time: {}.{:06} seconds",
            u.user_time.as_secs(),
            u.user_time.subsec_micros()
        )?;
        writeln!(
            f,
            "System time: {}.{:06} seconds",
            u.system_time.as_secs(),
            u.system_time.subsec_micros()
        )?;
        writeln!(f, "Maximum resident set size: {} kilobytes", u.max_rss_kb)
    }
}
