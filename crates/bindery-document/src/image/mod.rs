// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decoding, orientation correction and colour normalisation.

pub mod normalizer;

pub use normalizer::{ImageNormalizer, NormalizedImage};
