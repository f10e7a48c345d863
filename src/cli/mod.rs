//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{config::DEFAULT_HOST, grid::LatOrder};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download hourly gauge files for a date range
    Download {
        /// First timestamp, e.g. 2024-10-21T00:00:00
        #[arg(long)]
        start: String,
        /// Last timestamp (inclusive)
        #[arg(long)]
        end: String,
        /// Step between files, e.g. h, 3h, D
        #[arg(long, default_value = "h")]
        freq: String,
        /// Timezone the timestamps are given in
        #[arg(long, default_value = "UTC")]
        tz: String,
        /// Directory the files are downloaded to
        #[arg(long, default_value = "data/gsmap/raw")]
        out_dir: PathBuf,
        /// Where the temporary URL list is written
        #[arg(long, default_value = ".gsmap_dl.txt")]
        manifest: PathBuf,
        #[arg(long, env = "GSMAP_HOST", default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "GSMAP_USER")]
        user: Option<String>,
        #[arg(long, env = "GSMAP_PASS", hide_env_values = true)]
        pass: Option<String>,
    },
    /// Convert downloaded files to a single NetCDF file
    Convert {
        /// Directory holding the downloaded .dat.gz files
        #[arg(long, default_value = "data/gsmap/raw")]
        in_dir: PathBuf,
        /// Directory the NetCDF file is written to
        #[arg(long, default_value = "data/gsmap")]
        out_dir: PathBuf,
        /// Latitude order of the rows in the raw files
        #[arg(long, value_enum, default_value_t = LatOrder::Descending)]
        raw_lat_order: LatOrder,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn should_have_valid_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn should_parse_download_defaults() {
        let cli = Cli::try_parse_from([
            "gsmap",
            "download",
            "--start",
            "2024-10-21T00:00:00",
            "--end",
            "2024-10-21T02:00:00",
            "--user",
            "rain",
            "--pass",
            "s3cret",
        ])
        .unwrap();

        match cli.command {
            Commands::Download {
                freq, tz, out_dir, manifest, ..
            } => {
                assert_eq!(freq, "h");
                assert_eq!(tz, "UTC");
                assert_eq!(out_dir, PathBuf::from("data/gsmap/raw"));
                assert_eq!(manifest, PathBuf::from(".gsmap_dl.txt"));
            }
            _ => panic!("expected the download command"),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn should_parse_raw_lat_order() {
        let cli = Cli::try_parse_from(["gsmap", "convert"]).unwrap();
        match cli.command {
            Commands::Convert { raw_lat_order, .. } => assert_eq!(raw_lat_order, LatOrder::Descending),
            _ => panic!("expected the convert command"),
        }

        let cli = Cli::try_parse_from(["gsmap", "convert", "--raw-lat-order", "ascending"]).unwrap();
        match cli.command {
            Commands::Convert { raw_lat_order, .. } => assert_eq!(raw_lat_order, LatOrder::Ascending),
            _ => panic!("expected the convert command"),
        }
    }

    #[test]
    fn should_create_progress_bar_with_length() {
        let pb = create_progress_bar(3, "Decoding grids...".to_string());
        pb.inc(2);

        assert_eq!(pb.length(), Some(3));
        assert_eq!(pb.position(), 2);
    }
}
