//! Stacks decoded grids into a time-indexed precipitation dataset.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use glob::{glob, Pattern};

use crate::grid::GridArray;

pub const MISSING_VALUE: f32 = -99.0;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Inclusive longitude/latitude rectangle.
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    /// The Philippine region kept in converted files.
    pub fn philippines() -> Self {
        BoundingBox {
            lon_min: 115.0,
            lon_max: 129.0,
            lat_min: 4.8,
            lat_max: 21.0,
        }
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::philippines()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// File and variable attributes written alongside the data.
pub struct Metadata {
    pub conventions: String,
    pub source: String,
    pub long_name: String,
    pub units: String,
    pub missing_value: f32,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            conventions: "CF-1.7".to_string(),
            source: "gsmap_gauge".to_string(),
            long_name: "hourly averaged rain rate [mm/hr]".to_string(),
            units: "mm/hr".to_string(),
            missing_value: MISSING_VALUE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// `name(time, lat, lon)` with integer hour offsets from `epoch`.
pub struct Dataset {
    pub name: String,
    pub epoch: DateTime<Utc>,
    pub time: Vec<i64>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Row-major over `time`, `lat`, `lon`.
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

impl Dataset {
    /// Joins grids along a new leading time axis numbered from zero.
    pub fn concat(grids: Vec<GridArray>, epoch: DateTime<Utc>) -> Result<Self> {
        let first = grids.first().ok_or_else(|| anyhow!("no grids to concatenate"))?;
        let name = first.name.clone();
        let lat = first.lat.clone();
        let lon = first.lon.clone();

        let steps = grids.len() as i64;

        let mut values = Vec::with_capacity(grids.len() * lat.len() * lon.len());
        for (idx, grid) in grids.into_iter().enumerate() {
            if grid.lat != lat || grid.lon != lon {
                bail!(
                    "grid {} has coordinates {:?}, expected {:?}",
                    idx,
                    grid.shape(),
                    (lat.len(), lon.len())
                );
            }
            values.extend(grid.values);
        }

        Ok(Dataset {
            name,
            epoch,
            time: (0..steps).collect(),
            lat,
            lon,
            values,
            metadata: Metadata::default(),
        })
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.lat.len(), self.lon.len())
    }

    #[cfg(test)]
    pub fn get(&self, t: usize, lat_idx: usize, lon_idx: usize) -> Option<f32> {
        let (nt, nlat, nlon) = self.shape();
        if t >= nt || lat_idx >= nlat || lon_idx >= nlon {
            return None;
        }
        self.values.get((t * nlat + lat_idx) * nlon + lon_idx).copied()
    }

    /// Spatial slice for one time step.
    pub fn step(&self, t: usize) -> Option<&[f32]> {
        let size = self.lat.len() * self.lon.len();
        self.values.get(t * size..(t + 1) * size)
    }

    /// Keeps only the points whose coordinates fall inside `bbox`.
    pub fn crop(&self, bbox: &BoundingBox) -> Self {
        let lat_idx: Vec<usize> = (0..self.lat.len())
            .filter(|&i| bbox.contains_lat(self.lat[i]))
            .collect();
        let lon_idx: Vec<usize> = (0..self.lon.len())
            .filter(|&i| bbox.contains_lon(self.lon[i]))
            .collect();

        let nlon = self.lon.len();
        let mut values = Vec::with_capacity(self.time.len() * lat_idx.len() * lon_idx.len());
        for t in 0..self.time.len() {
            if let Some(step) = self.step(t) {
                for &i in &lat_idx {
                    let row = &step[i * nlon..(i + 1) * nlon];
                    values.extend(lon_idx.iter().map(|&j| row[j]));
                }
            }
        }

        Dataset {
            name: self.name.clone(),
            epoch: self.epoch,
            time: self.time.clone(),
            lat: lat_idx.iter().map(|&i| self.lat[i]).collect(),
            lon: lon_idx.iter().map(|&j| self.lon[j]).collect(),
            values,
            metadata: self.metadata.clone(),
        }
    }

    pub fn time_units(&self) -> String {
        format!("hours since {}", self.epoch.format("%Y-%m-%d %H:00:00"))
    }

    pub fn output_file_name(&self) -> String {
        output_file_name(&self.epoch)
    }
}

pub fn output_file_name(epoch: &DateTime<Utc>) -> String {
    format!("gsmap_{}.nc", epoch.format("%Y-%m-%d_%H"))
}

/// Compressed grids in `dir`, in name order.
pub fn find_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| anyhow!("input directory is not valid UTF-8: {}", dir.display()))?;
    let pattern = format!("{}/*.dat.gz", Pattern::escape(dir_str));

    let mut files = glob(&pattern)?
        .collect::<Result<Vec<PathBuf>, _>>()
        .with_context(|| format!("failed to list {}", dir.display()))?;
    files.sort();

    Ok(files)
}

/// Reads the UTC hour from a name like `gsmap_gauge.20241021.0300.dat.gz`.
pub fn epoch_from_file_name(file_name: &str) -> Result<DateTime<Utc>> {
    let parts: Vec<&str> = file_name.split('.').collect();
    if parts.len() < 3 {
        bail!("cannot read a timestamp from `{}`", file_name);
    }

    let stamp = format!("{}-{}", parts[1], parts[2]);
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d-%H%M")
        .with_context(|| format!("cannot read a timestamp from `{}`", file_name))?;
    if naive.minute() != 0 {
        bail!("`{}` is not on the hour", file_name);
    }

    Ok(naive.and_utc())
}

// -- Tests -------------------------------------------------------------------
