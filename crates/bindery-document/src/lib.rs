// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bindery-document: the document assembly engine.
//
// Normalises raster images (orientation, colour model), computes page layout,
// renders single-image pages, merges PDFs in order, and drives whole builds
// with guaranteed cleanup of intermediate files.

pub mod build;
pub mod image;
pub mod integrity;
pub mod layout;
pub mod output;
pub mod pdf;

// Re-export the primary structs so callers can use `bindery_document::Assembler` etc.
pub use build::assembler::{Assembler, build};
pub use self::image::normalizer::{ImageNormalizer, NormalizedImage};
pub use layout::compositor::{PageGeometry, PageSize, compose};
pub use pdf::merge::{DocumentMerger, MergeSummary};
pub use pdf::writer::{IntermediateArtifact, PageRenderer};
