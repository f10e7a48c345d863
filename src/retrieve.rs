//! Hands a manifest to a bulk download tool.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

use crate::manifest::Manifest;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrievalStatus {
    Completed,
    /// The tool exited unsuccessfully, or could not be run at all (`code` is `None`).
    Failed { code: Option<i32> },
}

/// Something that fetches every URL in a manifest into a directory.
pub trait BulkRetriever {
    async fn retrieve(&self, manifest: &Manifest, dest: &Path) -> Result<RetrievalStatus>;
}

/// Runs `aria2c`, resuming partial files and skipping pre-allocation.
pub struct Aria2c {
    program: String,
}

impl Aria2c {
    pub fn new() -> Self {
        Aria2c {
            program: "aria2c".to_string(),
        }
    }

    fn command(&self, manifest: &Path, dest: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-i")
            .arg(manifest)
            .arg("-d")
            .arg(dest)
            .arg("-c")
            .arg("--file-allocation=none");

        command
    }
}

impl Default for Aria2c {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkRetriever for Aria2c {
    async fn retrieve(&self, manifest: &Manifest, dest: &Path) -> Result<RetrievalStatus> {
        let mut command = self.command(manifest.path(), dest);
        debug!(command = ?command.as_std(), "launching downloader");

        let status = command
            .status()
            .await
            .with_context(|| format!("failed to run `{}`", self.program))?;
        info!(%status, "{} exited", self.program);

        if status.success() {
            Ok(RetrievalStatus::Completed)
        } else {
            Ok(RetrievalStatus::Failed {
                code: status.code(),
            })
        }
    }
}

// -- Tests -------------------------------------------------------------------
