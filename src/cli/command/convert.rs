//! Converts a directory of downloaded grids into one NetCDF file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::{
    cli::create_progress_bar,
    dataset::{epoch_from_file_name, find_input_files, BoundingBox, Dataset},
    grid::{decode_file, GridLayout},
    netcdf_io::write_dataset,
};

pub const VARIABLE_NAME: &str = "precip";

/// Decodes every `*.dat.gz` in `in_dir`, stacks them in name order, crops to `bbox` and
/// writes `gsmap_{YYYY-MM-DD_HH}.nc` into `out_dir`. Returns the path written.
pub fn convert(
    in_dir: &Path,
    out_dir: &Path,
    layout: &GridLayout,
    bbox: &BoundingBox,
) -> Result<PathBuf> {
    fs::create_dir_all(in_dir).with_context(|| format!("failed to create {}", in_dir.display()))?;
    fs::create_dir_all(out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

    let files = find_input_files(in_dir)?;
    let first = files
        .first()
        .ok_or_else(|| anyhow!("no input files found in {}", in_dir.display()))?;
    let first_name = first
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let epoch = epoch_from_file_name(&first_name)?;
    info!(files = files.len(), %epoch, "converting");

    let pb = create_progress_bar(files.len() as u64, "Converting to grids...".to_string());
    let mut grids = Vec::with_capacity(files.len());
    for file in &files {
        grids.push(decode_file(file, VARIABLE_NAME, layout)?);
        pb.inc(1);
    }
    pb.finish_with_message("Grids decoded");

    let dataset = Dataset::concat(grids, epoch)?.crop(bbox);

    println!("Saving as NetCDF...");
    let out_file = out_dir.join(dataset.output_file_name());
    write_dataset(&dataset, &out_file)?;

    Ok(out_file)
}

// -- Tests -------------------------------------------------------------------
