//! Decodes gzip-compressed GSMaP grids.
//!
//! A raw file is a flat, row-major buffer of little-endian `f32` covering the
//! globe between 60°S and 60°N at 0.1° resolution. Rows are stored north to
//! south; decoded grids are always returned south to north.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use flate2::read::GzDecoder;
use thiserror::Error;

const F32_SIZE: usize = std::mem::size_of::<f32>();

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("decoded {actual} bytes, expected {expected} for a {rows}x{cols} f32 grid")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
/// Latitude ordering of the rows in the raw buffer.
pub enum LatOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
/// Shape and coordinate endpoints of the raw buffer.
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    /// Latitude of the first and last raw row.
    pub lat_range: (f64, f64),
    /// Longitude of the first and last column.
    pub lon_range: (f64, f64),
    pub lat_order: LatOrder,
}

impl GridLayout {
    /// The 0.1° hourly gauge product.
    pub fn gsmap() -> Self {
        GridLayout {
            rows: 1200,
            cols: 3600,
            lat_range: (59.95, -59.95),
            lon_range: (0.05, 359.95),
            lat_order: LatOrder::Descending,
        }
    }

    /// Same grid with rows stored in `order`.
    pub fn with_lat_order(self, order: LatOrder) -> Self {
        let (a, b) = self.lat_range;
        let lat_range = match order {
            LatOrder::Ascending => (a.min(b), a.max(b)),
            LatOrder::Descending => (a.max(b), a.min(b)),
        };

        GridLayout {
            lat_range,
            lat_order: order,
            ..self
        }
    }

    pub fn byte_len(&self) -> usize {
        self.rows * self.cols * F32_SIZE
    }

    pub fn longitudes(&self) -> Vec<f64> {
        linspace(self.lon_range.0, self.lon_range.1, self.cols)
    }

    /// Latitudes of the raw rows, in file order.
    pub fn raw_latitudes(&self) -> Vec<f64> {
        linspace(self.lat_range.0, self.lat_range.1, self.rows)
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::gsmap()
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One decoded time step with its coordinate axes. Latitude is ascending.
pub struct GridArray {
    pub name: String,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Row-major, `lat.len()` rows by `lon.len()` columns.
    pub values: Vec<f32>,
}

impl GridArray {
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    #[cfg(test)]
    pub fn get(&self, lat_idx: usize, lon_idx: usize) -> Option<f32> {
        if lat_idx >= self.lat.len() || lon_idx >= self.lon.len() {
            return None;
        }
        self.values.get(lat_idx * self.lon.len() + lon_idx).copied()
    }
}

/// Reads and decodes one compressed grid file.
pub fn decode_file(path: &Path, name: &str, layout: &GridLayout) -> Result<GridArray> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut decoder = GzDecoder::new(BufReader::new(file));

    let mut bytes = Vec::with_capacity(layout.byte_len());
    decoder
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to decompress {}", path.display()))?;

    let grid = decode_bytes(&bytes, name, layout)
        .with_context(|| format!("failed to decode {}", path.display()))?;

    Ok(grid)
}

/// Interprets an uncompressed buffer as a grid.
pub fn decode_bytes(bytes: &[u8], name: &str, layout: &GridLayout) -> Result<GridArray, GridError> {
    if bytes.len() != layout.byte_len() {
        return Err(GridError::ShapeMismatch {
            rows: layout.rows,
            cols: layout.cols,
            expected: layout.byte_len(),
            actual: bytes.len(),
        });
    }

    let raw: Vec<f32> = bytes
        .chunks_exact(F32_SIZE)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let mut lat = layout.raw_latitudes();
    let values = match layout.lat_order {
        LatOrder::Ascending => raw,
        LatOrder::Descending => {
            lat.reverse();
            raw.chunks_exact(layout.cols)
                .rev()
                .flatten()
                .copied()
                .collect()
        }
    };

    Ok(GridArray {
        name: name.to_string(),
        lat,
        lon: layout.longitudes(),
        values,
    })
}

/// `n` evenly spaced points from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

// -- Tests -------------------------------------------------------------------
