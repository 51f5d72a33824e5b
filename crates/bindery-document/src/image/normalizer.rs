// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image normaliser: decode any supported raster source, apply the EXIF
// orientation so pixels are stored upright, and force RGB8.
//
// Palette, greyscale, 16-bit and CMYK sources are all expanded to RGB8 by the
// `image` decoders; alpha is flattened onto a white background.

use std::io::Cursor;
use std::path::Path;

use bindery_core::error::{BuildError, Result};
use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, instrument};

/// A decoded, upright RGB8 image ready for layout.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pixels: RgbImage,
}

impl NormalizedImage {
    /// Wrap an already-upright RGB buffer.
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }
}

/// Turns raw image files into [`NormalizedImage`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNormalizer;

impl ImageNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Read and normalise an image file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn normalize_file(&self, path: &Path) -> Result<NormalizedImage> {
        let data = std::fs::read(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => BuildError::not_found(path),
            _ => BuildError::unreadable(path, err),
        })?;
        self.normalize_bytes(&data, path)
    }

    /// Normalise encoded image bytes. `origin` is only used in error messages.
    #[instrument(skip_all, fields(data_len = data.len(), origin = %origin.display()))]
    pub fn normalize_bytes(&self, data: &[u8], origin: &Path) -> Result<NormalizedImage> {
        let decoded =
            image::load_from_memory(data).map_err(|err| BuildError::unreadable(origin, err))?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(BuildError::unreadable(origin, "image has zero width or height"));
        }

        let orientation = read_exif_orientation(data);
        let color = decoded.color();
        let upright = apply_orientation(decoded, orientation);
        let pixels = flatten_to_rgb(upright);

        debug!(
            width = pixels.width(),
            height = pixels.height(),
            orientation,
            source_color = ?color,
            "Image normalised"
        );

        Ok(NormalizedImage { pixels })
    }
}

/// Read the EXIF orientation tag (0x0112) from raw image bytes.
///
/// Returns 1 (upright) when there is no EXIF block or no orientation tag.
pub fn read_exif_orientation(data: &[u8]) -> u32 {
    let mut cursor = Cursor::new(data);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(_) => return 1,
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply an EXIF orientation value so the result is upright.
///
/// 1 = upright, 2 = mirrored, 3 = 180°, 4 = flipped vertically,
/// 5 = mirrored + 90° CW, 6 = 90° CW, 7 = mirrored + 270° CW, 8 = 270° CW.
/// Unknown values leave the image untouched.
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Convert to RGB8, compositing any alpha channel over white.
fn flatten_to_rgb(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = a as u32;
        let over_white = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}
