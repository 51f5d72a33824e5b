// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page compositor: pure geometry. Given an image's pixel size and a page
// format, decide the page size and where the image is drawn on it.
//
// All lengths are PDF points with the origin at the bottom-left corner of the
// page. For the Native format one pixel maps to one point.

use bindery_core::{PageFormat, PaperSize};

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl From<PaperSize> for PageSize {
    fn from(paper: PaperSize) -> Self {
        let (width, height) = paper.dimensions_pt();
        Self { width, height }
    }
}

/// Where one image lands on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub draw_x: f32,
    pub draw_y: f32,
    pub draw_width: f32,
    pub draw_height: f32,
    /// Horizontal scale from image pixels to drawn points.
    pub scale_x: f32,
    /// Vertical scale from image pixels to drawn points.
    pub scale_y: f32,
}

/// Compute the page and placement for a `width` x `height` pixel image.
///
/// Both dimensions must be non-zero; the normaliser rejects empty images
/// before they get here.
pub fn compose(width: u32, height: u32, format: PageFormat, reference: PageSize) -> PageGeometry {
    debug_assert!(width > 0 && height > 0, "compose called with an empty image");

    let w = width as f32;
    let h = height as f32;

    match format {
        PageFormat::Standard => {
            let scale = (reference.width / w).min(reference.height / h);
            let draw_width = w * scale;
            let draw_height = h * scale;
            PageGeometry {
                page_width: reference.width,
                page_height: reference.height,
                draw_x: (reference.width - draw_width) / 2.0,
                draw_y: (reference.height - draw_height) / 2.0,
                draw_width,
                draw_height,
                scale_x: scale,
                scale_y: scale,
            }
        }
        PageFormat::Native => PageGeometry {
            page_width: w,
            page_height: h,
            draw_x: 0.0,
            draw_y: 0.0,
            draw_width: w,
            draw_height: h,
            scale_x: 1.0,
            scale_y: 1.0,
        },
        PageFormat::Stretch => PageGeometry {
            page_width: reference.width,
            page_height: reference.height,
            draw_x: 0.0,
            draw_y: 0.0,
            draw_width: reference.width,
            draw_height: reference.height,
            scale_x: reference.width / w,
            scale_y: reference.height / h,
        },
    }
}
