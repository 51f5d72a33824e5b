// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Build module: the orchestrator and its per-build scratch arena.

pub mod arena;
pub mod assembler;

pub use arena::ScratchArena;
pub use assembler::{Assembler, build};
