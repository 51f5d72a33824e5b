// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout module: page size and image placement for each page format.

pub mod compositor;

pub use compositor::{PageGeometry, PageSize, compose};
