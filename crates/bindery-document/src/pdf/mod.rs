// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: rendering single-image pages and merging existing PDFs.

pub mod merge;
pub mod writer;

pub use merge::{DocumentMerger, MergeSummary};
pub use writer::{IntermediateArtifact, PageRenderer};
