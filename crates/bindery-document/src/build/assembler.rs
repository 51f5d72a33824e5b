// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Build orchestrator.
//
// Validating → Converting → Merging → Done, with Failed reachable from the
// first three. A request holding exactly one document skips straight to a
// byte-for-byte copy. Whatever the exit path, the scratch arena is released
// before `build` returns.

use std::path::{Path, PathBuf};

use bindery_core::error::{BuildError, Result};
use bindery_core::{
    AssemblyConfig, BuildId, BuildReport, BuildRequest, BuildStage, Item, MissingSourcePolicy,
    PageFormat,
};
use chrono::Utc;
use tracing::{debug, info, info_span, warn};

use crate::build::arena::ScratchArena;
use crate::image::ImageNormalizer;
use crate::integrity;
use crate::layout::{PageSize, compose};
use crate::output;
use crate::pdf::merge::{self, DocumentMerger};
use crate::pdf::PageRenderer;

/// Assemble a document with the default configuration.
pub fn build(items: Vec<Item>, format: PageFormat, output_path: impl Into<PathBuf>) -> Result<BuildReport> {
    Assembler::new(AssemblyConfig::default())?.build(&BuildRequest::new(items, format, output_path))
}

/// Runs builds. Holds no per-build state, so one assembler may serve
/// concurrent builds as long as they target different output paths.
#[derive(Debug, Clone)]
pub struct Assembler {
    config: AssemblyConfig,
    normalizer: ImageNormalizer,
    renderer: PageRenderer,
    merger: DocumentMerger,
}

impl Assembler {
    pub fn new(config: AssemblyConfig) -> Result<Self> {
        config.validate()?;

        let renderer = match &config.document_title {
            Some(title) => PageRenderer::new().with_title(title.clone()),
            None => PageRenderer::new(),
        };

        Ok(Self {
            normalizer: ImageNormalizer::new(),
            renderer,
            merger: DocumentMerger::new(config.missing_sources),
            config,
        })
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Run one build to completion.
    pub fn build(&self, request: &BuildRequest) -> Result<BuildReport> {
        let build_id = BuildId::new();
        let span = info_span!(
            "build",
            build_id = %build_id,
            items = request.items.len(),
            format = %request.format,
            output = %request.output_path.display()
        );
        let _entered = span.enter();

        let mut stage = BuildStage::Validating;
        let mut arena = ScratchArena::new(self.config.scratch_root(), build_id);

        let outcome = self.run(request, build_id, &mut stage, &mut arena);

        let cleanup_failures = arena.release();
        if cleanup_failures > 0 {
            warn!(cleanup_failures, "Some intermediate files could not be removed");
        }

        match &outcome {
            Ok(report) => {
                advance(&mut stage, BuildStage::Done);
                info!(
                    pages = ?report.page_count,
                    bytes = report.size_bytes,
                    fast_path = report.fast_path,
                    "Build done"
                );
            }
            Err(err) => {
                warn!(failed_in = ?stage, %err, "Build failed");
                advance(&mut stage, BuildStage::Failed);
            }
        }
        outcome
    }

    fn run(
        &self,
        request: &BuildRequest,
        build_id: BuildId,
        stage: &mut BuildStage,
        arena: &mut ScratchArena,
    ) -> Result<BuildReport> {
        if request.items.is_empty() {
            return Err(BuildError::EmptyRequest);
        }

        if let Some(source) = request.single_document() {
            return self.pass_through(source, request, build_id);
        }

        advance(stage, BuildStage::Converting);
        let sources = self.convert(request, arena)?;

        advance(stage, BuildStage::Merging);
        let summary = self.merger.merge(&sources, &request.output_path)?;
        if !summary.skipped.is_empty() {
            warn!(skipped = summary.skipped.len(), "Output is missing vanished sources");
        }

        self.report(request, build_id, summary.page_count, false)
    }

    /// The single-document route: copy the source unchanged.
    fn pass_through(&self, source: &Path, request: &BuildRequest, build_id: BuildId) -> Result<BuildReport> {
        debug!(source = %source.display(), "Single document, copying through");
        output::copy_atomically(source, &request.output_path)?;
        self.report(request, build_id, None, true)
    }

    /// Turn every item into a PDF path, rendering images into the arena.
    fn convert(&self, request: &BuildRequest, arena: &mut ScratchArena) -> Result<Vec<PathBuf>> {
        let reference = PageSize::from(self.config.reference_paper);
        let mut sources = Vec::with_capacity(request.items.len());

        for (position, item) in request.items.iter().enumerate() {
            match item {
                Item::Document(path) => {
                    if !path.exists() && self.config.missing_sources == MissingSourcePolicy::Fail {
                        return Err(BuildError::not_found(path));
                    }
                    debug!(position, path = %path.display(), "Document passed through");
                    sources.push(path.clone());
                }
                Item::Image(path) => {
                    if !path.exists() && self.config.missing_sources == MissingSourcePolicy::Skip {
                        warn!(position, path = %path.display(), "Image vanished, skipping");
                        continue;
                    }
                    let image = self.normalizer.normalize_file(path)?;
                    let geometry = compose(image.width(), image.height(), request.format, reference);
                    let dir = arena.dir()?;
                    let artifact = self.renderer.render_to_artifact(&image, &geometry, &dir)?;
                    let page = arena.adopt(artifact);
                    debug!(position, path = %path.display(), page = %page.display(), "Image rendered");
                    sources.push(page);
                }
            }
        }

        Ok(sources)
    }

    /// Describe the finished output. If the output cannot be read back it is
    /// removed, so a failed build never leaves a document behind.
    fn report(
        &self,
        request: &BuildRequest,
        build_id: BuildId,
        page_count: Option<usize>,
        fast_path: bool,
    ) -> Result<BuildReport> {
        let output_path = &request.output_path;
        let (sha256, size_bytes) = match integrity::hash_file(output_path) {
            Ok(fingerprint) => fingerprint,
            Err(err) => {
                if let Err(remove_err) = std::fs::remove_file(output_path) {
                    warn!(%remove_err, "Could not remove unreadable output");
                }
                return Err(err);
            }
        };

        let page_count = page_count.or_else(|| match merge::page_count(output_path) {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(%err, "Output page count unavailable");
                None
            }
        });

        Ok(BuildReport {
            build_id,
            output_path: output_path.clone(),
            size_bytes,
            page_count,
            sha256,
            format: request.format,
            fast_path,
            finished_at: Utc::now(),
        })
    }
}

fn advance(stage: &mut BuildStage, next: BuildStage) {
    debug_assert!(!stage.is_terminal(), "no transition out of {stage:?}");
    debug!(from = ?*stage, to = ?next, "Build stage");
    *stage = next;
}
