// this_file: src/compose.rs
//! Cropping surface pairs and reading unit boxes back out of label masks.

use crate::color::Rgb;
use crate::index::decode;
use crate::layout::Orientation;
use crate::render::SurfacePair;
use image::{imageops, RgbaImage};
use serde::Serialize;
use std::collections::BTreeMap;

/// Pixel rectangle, `x`/`y` inclusive, `width`/`height` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    fn point(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            width: 1,
            height: 1,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        let right = (self.x + self.width).max(x + 1);
        let bottom = (self.y + self.height).max(y + 1);
        self.x = self.x.min(x);
        self.y = self.y.min(y);
        self.width = right - self.x;
        self.height = bottom - self.y;
    }
}

/// Tight box around pixels with non-zero alpha, or `None` for a blank image.
pub fn content_bbox(image: &RgbaImage) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        match bbox.as_mut() {
            Some(b) => b.include(x, y),
            None => bbox = Some(BoundingBox::point(x, y)),
        }
    }
    bbox
}

/// Crop both surfaces to the color surface's content box.
///
/// Returns the pair unchanged with `None` when there is nothing to crop to.
pub fn crop_to_content(surfaces: SurfacePair) -> (SurfacePair, Option<BoundingBox>) {
    let Some(bbox) = content_bbox(&surfaces.image) else {
        return (surfaces, None);
    };
    if (bbox.x, bbox.y) == (0, 0) && (bbox.width, bbox.height) == surfaces.dimensions() {
        return (surfaces, Some(bbox));
    }

    let image = imageops::crop_imm(&surfaces.image, bbox.x, bbox.y, bbox.width, bbox.height)
        .to_image();
    let mask =
        imageops::crop_imm(&surfaces.mask, bbox.x, bbox.y, bbox.width, bbox.height).to_image();
    (SurfacePair { image, mask }, Some(bbox))
}

/// Per-unit boxes recovered from a label surface.
///
/// Transparent pixels are background; opaque colors are decoded with the
/// layout's orientation.
pub fn unit_boxes(mask: &RgbaImage, orientation: Orientation) -> BTreeMap<usize, BoundingBox> {
    let mut boxes: BTreeMap<usize, BoundingBox> = BTreeMap::new();
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        let Some(ordinal) = decode(Rgb([pixel.0[0], pixel.0[1], pixel.0[2]]), orientation) else {
            continue;
        };
        boxes
            .entry(ordinal)
            .and_modify(|b| b.include(x, y))
            .or_insert_with(|| BoundingBox::point(x, y));
    }
    boxes
}
