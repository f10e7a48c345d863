mod cli;
mod config;
mod dataset;
mod grid;
mod manifest;
mod netcdf_io;
mod retrieve;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};
use config::{Credentials, FtpSource};
use dataset::BoundingBox;
use grid::GridLayout;
use retrieve::{Aria2c, RetrievalStatus};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Download {
            start,
            end,
            freq,
            tz,
            out_dir,
            manifest,
            host,
            user,
            pass,
        } => {
            let request = command::DownloadRequest::parse(&start, &end, &freq, &tz, &out_dir, &manifest)?;
            let source = FtpSource::new(&host, Credentials::new(user, pass)?);

            match command::download(&request, &source, &Aria2c::new()).await? {
                RetrievalStatus::Completed => println!("Files saved to `{}`", out_dir.display()),
                RetrievalStatus::Failed { code: Some(code) } => {
                    eprintln!("Error during download: downloader exited with status {}", code)
                }
                RetrievalStatus::Failed { code: None } => {
                    eprintln!("Error during download: downloader could not be run")
                }
            }
        }
        Commands::Convert {
            in_dir,
            out_dir,
            raw_lat_order,
        } => {
            let layout = GridLayout::gsmap().with_lat_order(raw_lat_order);
            let filename = command::convert(&in_dir, &out_dir, &layout, &BoundingBox::philippines())?;
            println!("File saved to `{}`", filename.display());
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
