// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bindery document assembler.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BuildError, Result};

/// Millimetres per PDF point (1 pt = 1/72 inch).
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Unique identifier for one build invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildId(pub Uuid);

impl BuildId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One input unit of a build.
///
/// The position of an item inside [`BuildRequest::items`] is its page order in
/// the assembled output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum Item {
    /// A raster image; contributes exactly one page.
    Image(PathBuf),
    /// An existing paginated document; contributes all of its pages.
    Document(PathBuf),
}

impl Item {
    /// Infer the item kind from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(Self::Document(path)),
            // HEIC is left out: no decoder for it is linked in.
            "jpg" | "jpeg" | "png" | "webp" | "tif" | "tiff" | "bmp" | "gif" => {
                Ok(Self::Image(path))
            }
            _ => Err(BuildError::UnsupportedSource(format!(
                "cannot tell whether {} is an image or a PDF",
                path.display()
            ))),
        }
    }

    /// Path of the underlying source file.
    pub fn path(&self) -> &Path {
        match self {
            Self::Image(path) | Self::Document(path) => path,
        }
    }
}

/// Page layout policy applied to image items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// Reference page size, image centred and scaled preserving aspect ratio.
    #[default]
    Standard,
    /// Page is exactly the image's pixel size; no scaling, no offset.
    Native,
    /// Reference page size, image scaled per axis to fill the whole page.
    /// The aspect ratio is intentionally not preserved.
    Stretch,
}

impl PageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Native => "native",
            Self::Stretch => "stretch",
        }
    }
}

impl std::fmt::Display for PageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageFormat {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "a4" => Ok(Self::Standard),
            "native" | "original" => Ok(Self::Native),
            "stretch" | "fill" => Ok(Self::Stretch),
            other => Err(BuildError::InvalidConfig(format!(
                "unknown page format '{other}' (expected standard, native or stretch)"
            ))),
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (width, height).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w_mm, h_mm) = self.dimensions_mm();
        (w_mm as f32 / MM_PER_PT, h_mm as f32 / MM_PER_PT)
    }
}

/// Convert PDF points to millimetres.
pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

/// A validated-on-build request: ordered items, layout policy and target path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub items: Vec<Item>,
    pub format: PageFormat,
    pub output_path: PathBuf,
}

impl BuildRequest {
    pub fn new(items: Vec<Item>, format: PageFormat, output_path: impl Into<PathBuf>) -> Self {
        Self {
            items,
            format,
            output_path: output_path.into(),
        }
    }

    /// The lone document of a request that takes the pass-through route.
    pub fn single_document(&self) -> Option<&Path> {
        match self.items.as_slice() {
            [Item::Document(path)] => Some(path),
            _ => None,
        }
    }
}

/// Stages of a build. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStage {
    Validating,
    Converting,
    Merging,
    Done,
    Failed,
}

impl BuildStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Metadata about a finished build, handed to whatever persists file records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub build_id: BuildId,
    pub output_path: PathBuf,
    pub size_bytes: u64,
    /// `None` only when a pass-through document could not be inspected.
    pub page_count: Option<usize>,
    /// SHA-256 of the output bytes, lowercase hex.
    pub sha256: String,
    pub format: PageFormat,
    /// True when the single-document pass-through was taken.
    pub fast_path: bool,
    pub finished_at: DateTime<Utc>,
}

/// Automatic name for a document the user did not name.
pub fn default_document_name(now: DateTime<Local>) -> String {
    format!("Document {}", now.format("%Y-%m-%d %H:%M"))
}
