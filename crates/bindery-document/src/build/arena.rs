// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-build scratch arena. Owns every intermediate artifact a build creates,
// inside a private directory, and removes all of it when released or dropped.

use std::path::PathBuf;

use bindery_core::BuildId;
use bindery_core::error::{BuildError, Result};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::pdf::IntermediateArtifact;

/// Scratch space for one build.
///
/// The directory is only created once something needs it, so builds without
/// image items never touch the scratch location.
#[derive(Debug)]
pub struct ScratchArena {
    root: PathBuf,
    build_id: BuildId,
    dir: Option<TempDir>,
    artifacts: Vec<IntermediateArtifact>,
}

impl ScratchArena {
    pub fn new(root: impl Into<PathBuf>, build_id: BuildId) -> Self {
        Self {
            root: root.into(),
            build_id,
            dir: None,
            artifacts: Vec::new(),
        }
    }

    /// The build's private scratch directory, created on first use.
    pub fn dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.path().to_path_buf());
        }

        let dir = tempfile::Builder::new()
            .prefix(&format!("bindery-{}-", self.build_id))
            .tempdir_in(&self.root)
            .map_err(|err| {
                BuildError::Render(format!(
                    "cannot create scratch directory in {}: {}",
                    self.root.display(),
                    err
                ))
            })?;
        debug!(dir = %dir.path().display(), "Scratch directory created");

        let path = dir.path().to_path_buf();
        self.dir = Some(dir);
        Ok(path)
    }

    /// Take ownership of an artifact, returning its path.
    pub fn adopt(&mut self, artifact: IntermediateArtifact) -> PathBuf {
        let path = artifact.path().to_path_buf();
        self.artifacts.push(artifact);
        path
    }

    /// Number of artifacts currently owned.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Delete every artifact and the scratch directory.
    ///
    /// Returns how many removals failed. Failures are logged, not raised.
    pub fn release(mut self) -> usize {
        self.release_all()
    }

    fn release_all(&mut self) -> usize {
        let mut failures = 0;
        let released = self.artifacts.len();

        for artifact in self.artifacts.drain(..) {
            let path = artifact.path().to_path_buf();
            if let Err(err) = artifact.release() {
                failures += 1;
                warn!(path = %path.display(), %err, "Failed to remove intermediate page");
            }
        }

        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                failures += 1;
                warn!(path = %path.display(), %err, "Failed to remove scratch directory");
            }
        }

        if released > 0 {
            debug!(released, failures, "Scratch arena released");
        }
        failures
    }
}

impl Drop for ScratchArena {
    fn drop(&mut self) {
        if !self.artifacts.is_empty() || self.dir.is_some() {
            self.release_all();
        }
    }
}
