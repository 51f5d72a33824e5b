// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembler configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::types::PaperSize;

/// What the merge engine does with a source that no longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSourcePolicy {
    /// Abort the build with `NotFound`.
    #[default]
    Fail,
    /// Log and leave the source out of the output.
    Skip,
}

/// Settings shared by every build an assembler runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblyConfig {
    /// Reference page for the Standard and Stretch formats.
    pub reference_paper: PaperSize,
    /// Parent directory for per-build scratch space. `None` uses the system
    /// temporary directory.
    pub scratch_dir: Option<PathBuf>,
    /// Policy for sources that vanished before merging.
    pub missing_sources: MissingSourcePolicy,
    /// Title embedded in rendered image pages.
    pub document_title: Option<String>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            reference_paper: PaperSize::A4,
            scratch_dir: None,
            missing_sources: MissingSourcePolicy::Fail,
            document_title: None,
        }
    }
}

impl AssemblyConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            BuildError::InvalidConfig(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no build could honour.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.reference_paper.dimensions_mm();
        if w == 0 || h == 0 {
            return Err(BuildError::InvalidConfig(format!(
                "reference paper must have non-zero dimensions, got {w}x{h} mm"
            )));
        }
        Ok(())
    }

    /// Directory under which per-build scratch directories are created.
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_a4_and_fail() {
        let config = AssemblyConfig::default();
        assert_eq!(config.reference_paper, PaperSize::A4);
        assert_eq!(config.missing_sources, MissingSourcePolicy::Fail);
        assert_eq!(config.scratch_root(), std::env::temp_dir());
    }

    #[test]
    fn loads_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindery.json");
        std::fs::write(
            &path,
            r#"{ "reference_paper": "Letter", "missing_sources": "skip" }"#,
        )
        .unwrap();

        let config = AssemblyConfig::from_json_file(&path).unwrap();
        assert_eq!(config.reference_paper, PaperSize::Letter);
        assert_eq!(config.missing_sources, MissingSourcePolicy::Skip);
        assert!(config.scratch_dir.is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindery.json");
        std::fs::write(&path, r#"{ "retries": 3 }"#).unwrap();

        let err = AssemblyConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, BuildError::Serialization(_)));
    }

    #[test]
    fn rejects_zero_sized_custom_paper() {
        let config = AssemblyConfig {
            reference_paper: PaperSize::Custom {
                width_mm: 0,
                height_mm: 297,
            },
            ..AssemblyConfig::default()
        };
        assert!(matches!(config.validate(), Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_is_invalid_config() {
        let err = AssemblyConfig::from_json_file("/nonexistent/bindery.json").unwrap_err();
        assert!(matches!(err, BuildError::InvalidConfig(_)));
    }
}
