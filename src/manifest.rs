//! Builds the list of remote files for a date range and writes it to a manifest file.
//!
//! Files on the GSMaP server are named by their UTC hour, so local timestamps are
//! converted before the path is rendered.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
    #[error("invalid frequency `{0}` (expected e.g. `h`, `3h`, `30min`, `D`)")]
    InvalidFrequency(String),
    #[error("invalid timestamp `{0}` (expected YYYY-MM-DD[THH:MM[:SS]])")]
    InvalidTimestamp(String),
    #[error("unknown timezone `{0}`")]
    UnknownTimezone(String),
    #[error("`{0}` does not exist in timezone {1}")]
    NonexistentLocalTime(NaiveDateTime, Tz),
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Step between consecutive files, e.g. `h` or `3h`.
pub struct Frequency(TimeDelta);

impl Frequency {
    pub fn step(&self) -> TimeDelta {
        self.0
    }
}

impl FromStr for Frequency {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ManifestError::InvalidFrequency(s.to_string());

        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        let (count, unit) = s.split_at(split);
        let count: i64 = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| invalid())?
        };
        if count <= 0 {
            return Err(invalid());
        }

        let step = match unit {
            "min" | "T" => TimeDelta::try_minutes(count),
            "h" | "H" => TimeDelta::try_hours(count),
            "D" | "d" => TimeDelta::try_days(count),
            _ => None,
        };

        step.map(Frequency).ok_or_else(invalid)
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, ManifestError> {
    name.parse::<Tz>()
        .map_err(|_| ManifestError::UnknownTimezone(name.to_string()))
}

/// Parses a naive timestamp and places it in `tz`.
///
/// Ambiguous local times (a repeated hour when clocks go back) resolve to the earlier instant.
pub fn parse_timestamp(s: &str, tz: Tz) -> Result<DateTime<Tz>, ManifestError> {
    let naive = parse_naive(s.trim()).ok_or_else(|| ManifestError::InvalidTimestamp(s.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or(ManifestError::NonexistentLocalTime(naive, tz))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Every instant from `start` to `end` inclusive, `freq` apart, in UTC.
pub fn date_range<T: TimeZone>(
    start: &DateTime<T>,
    end: &DateTime<T>,
    freq: Frequency,
) -> Vec<DateTime<Utc>> {
    let end = end.with_timezone(&Utc);
    let mut current = start.with_timezone(&Utc);
    let mut instants = vec![];

    while current <= end {
        instants.push(current);
        match current.checked_add_signed(freq.step()) {
            Some(next) => current = next,
            None => break,
        }
    }

    instants
}

/// Remote path of the hourly file for `timestamp`.
pub fn file_url(base_url: &str, timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}/{}/gsmap_gauge.{}.dat.gz",
        base_url,
        timestamp.format("%Y/%m/%d"),
        timestamp.format("%Y%m%d.%H00")
    )
}

pub fn generate_file_urls(base_url: &str, timestamps: &[DateTime<Utc>]) -> Vec<String> {
    timestamps.iter().map(|t| file_url(base_url, t)).collect()
}

#[derive(Debug)]
/// A newline-delimited list of URLs on disk. The file is removed when the value is dropped.
pub struct Manifest {
    path: PathBuf,
    urls: Vec<String>,
}

impl Manifest {
    /// Writes `urls` to `path`, replacing any file already there.
    pub fn create(path: &Path, urls: Vec<String>) -> io::Result<Self> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Built before writing so a failed write still cleans up.
        let manifest = Manifest {
            path: path.to_path_buf(),
            urls,
        };

        let mut writer = BufWriter::new(File::create(&manifest.path)?);
        for url in &manifest.urls {
            writeln!(writer, "{}", url)?;
        }
        writer.flush()?;

        debug!(path = %manifest.path.display(), entries = manifest.urls.len(), "manifest written");

        Ok(manifest)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl Drop for Manifest {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "manifest removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not remove manifest"),
        }
    }
}

// -- Tests -------------------------------------------------------------------
