// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renderer: turn one normalised image into a standalone one-page PDF
// using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::io::Write;
use std::path::Path;

use bindery_core::error::{BuildError, Result};
use bindery_core::pt_to_mm;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tempfile::TempPath;
use tracing::{debug, instrument, warn};

use crate::image::NormalizedImage;
use crate::layout::PageGeometry;

/// At 72 DPI one image pixel is one PDF point, so the transform's scale
/// factors are exactly the compositor's pixel-to-point scales.
const PLACEMENT_DPI: f32 = 72.0;

/// A one-page PDF written to scratch space for the duration of a build.
///
/// The file is deleted when the artifact is released or dropped.
#[derive(Debug)]
pub struct IntermediateArtifact {
    path: TempPath,
}

impl IntermediateArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, reporting any failure.
    pub fn release(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// Renders single images onto single pages.
#[derive(Debug, Clone, Default)]
pub struct PageRenderer {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a title for the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Render `image` onto one page laid out by `geometry`, returning PDF bytes.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn render(&self, image: &NormalizedImage, geometry: &PageGeometry) -> Result<Vec<u8>> {
        let title = self.title.as_deref().unwrap_or("Bindery Page");
        let mut doc = PdfDocument::new(title);

        let raw = RawImage {
            pixels: RawImageData::U8(image.as_rgb().as_raw().clone()),
            width: image.width() as usize,
            height: image.height() as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(geometry.draw_x)),
                translate_y: Some(Pt(geometry.draw_y)),
                scale_x: Some(geometry.scale_x),
                scale_y: Some(geometry.scale_y),
                dpi: Some(PLACEMENT_DPI),
                rotate: None,
            },
        }];

        let page = PdfPage::new(
            Mm(pt_to_mm(geometry.page_width)),
            Mm(pt_to_mm(geometry.page_height)),
            ops,
        );
        doc.with_pages(vec![page]);

        // printpdf's default optimisation downsamples large images; pages
        // must carry every source pixel.
        let options = PdfSaveOptions {
            image_optimization: None,
            ..PdfSaveOptions::default()
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&options, &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings while saving");
        }
        if output.is_empty() {
            return Err(BuildError::Render("printpdf produced an empty document".into()));
        }

        debug!(
            page_w = geometry.page_width,
            page_h = geometry.page_height,
            draw_w = geometry.draw_width,
            draw_h = geometry.draw_height,
            bytes = output.len(),
            "Image page rendered"
        );
        Ok(output)
    }

    /// Render and write the page to a uniquely named file inside `dir`.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn render_to_artifact(
        &self,
        image: &NormalizedImage,
        geometry: &PageGeometry,
        dir: &Path,
    ) -> Result<IntermediateArtifact> {
        let bytes = self.render(image, geometry)?;

        let mut file = tempfile::Builder::new()
            .prefix("page-")
            .suffix(".pdf")
            .tempfile_in(dir)
            .map_err(|err| {
                BuildError::Render(format!("cannot create page file in {}: {}", dir.display(), err))
            })?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|err| {
                BuildError::Render(format!("cannot write {}: {}", file.path().display(), err))
            })?;

        let artifact = IntermediateArtifact {
            path: file.into_temp_path(),
        };
        debug!(path = %artifact.path().display(), "Intermediate page written");
        Ok(artifact)
    }
}
