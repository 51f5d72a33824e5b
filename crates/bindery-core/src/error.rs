// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bindery.
//
// Every variant is terminal for the build that raised it. The engine never
// retries; callers decide whether to invoke again.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Bindery operations.
#[derive(Debug, Error)]
pub enum BuildError {
    // -- Request errors --
    #[error("build request contains no items")]
    EmptyRequest,

    #[error("source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    // -- Pipeline errors --
    #[error("unreadable image {}: {reason}", path.display())]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("document merge failed: {0}")]
    Merge(String),

    #[error("cannot write output {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BuildError {
    /// Build a `NotFound` for `path`.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Build an `UnreadableImage` for `path` with a displayable reason.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::UnreadableImage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `WriteFailure` for `path`.
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BuildError>;
