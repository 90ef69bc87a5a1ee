// this_file: src/provider.rs
//! Glyph source capability used by the layout planner and the renderer.
//!
//! A source answers two questions about a run of text at a pixel size: how
//! much room it needs, and which pixels it covers. Coverage is expressed in
//! the run's own coordinate space (origin at the top-left of its layout box),
//! so the renderer can place the same raster on every surface it paints.

use crate::error::Result;

/// Layout box of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

/// 8-bit coverage of a rasterized run.
///
/// `fill` is the glyph body, `footprint` is body plus stroke band. Both
/// share the same rectangle; `footprint >= fill` at every pixel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Coverage {
    /// Left edge relative to the run origin
    pub left: i32,
    /// Top edge relative to the run origin
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub fill: Vec<u8>,
    pub footprint: Vec<u8>,
}

impl Coverage {
    /// Coverage that paints nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.footprint.iter().all(|&a| a == 0)
    }

    /// Allocate a zeroed raster for the given rectangle.
    pub fn blank(left: i32, top: i32, width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            left,
            top,
            width,
            height,
            fill: vec![0; len],
            footprint: vec![0; len],
        }
    }

    /// Row-major index of a local pixel.
    pub fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Number of pixels the run touches.
    pub fn footprint_area(&self) -> usize {
        self.footprint.iter().filter(|&&a| a > 0).count()
    }
}

/// Font metrics and rasterization needed to lay out and draw text.
pub trait GlyphSource {
    /// Measure `text` at `size` pixels per em.
    fn measure(&self, text: &str, size: u32) -> Result<Extent>;

    /// Rasterize `text` at `size`, outlined by `stroke_width` pixels.
    fn rasterize(&self, text: &str, size: u32, stroke_width: u32) -> Result<Coverage>;
}

impl<T: GlyphSource + ?Sized> GlyphSource for &T {
    fn measure(&self, text: &str, size: u32) -> Result<Extent> {
        (**self).measure(text, size)
    }

    fn rasterize(&self, text: &str, size: u32, stroke_width: u32) -> Result<Coverage> {
        (**self).rasterize(text, size, stroke_width)
    }
}

/// Deterministic source where every non-space glyph is a solid box.
///
/// Advance is `ceil(0.6 * size)`; the box leaves one pixel free on each
/// side and spans from a quarter em down to the baseline at `size`.
/// Descender letters extend a further quarter em. Useful for tests, benches
/// and dry runs where no font file is at hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockGlyphSource;

impl BlockGlyphSource {
    pub fn new() -> Self {
        Self
    }

    pub fn advance(size: u32) -> u32 {
        (size * 6).div_ceil(10)
    }

    fn has_descender(ch: char) -> bool {
        matches!(ch, 'g' | 'j' | 'p' | 'q' | 'y')
    }

    fn descent(size: u32) -> u32 {
        size / 4
    }
}

impl GlyphSource for BlockGlyphSource {
    fn measure(&self, text: &str, size: u32) -> Result<Extent> {
        let advance = Self::advance(size);
        let width = advance * text.chars().count() as u32;
        let height = if text.chars().any(Self::has_descender) {
            size + Self::descent(size)
        } else {
            size
        };
        Ok(Extent { width, height })
    }

    fn rasterize(&self, text: &str, size: u32, stroke_width: u32) -> Result<Coverage> {
        let advance = Self::advance(size) as i32;
        let stroke = stroke_width as i32;
        let boxes: Vec<(i32, i32, i32, i32)> = text
            .chars()
            .enumerate()
            .filter(|(_, ch)| !ch.is_whitespace())
            .map(|(i, ch)| {
                let x0 = i as i32 * advance + 1;
                let x1 = (i as i32 + 1) * advance - 1;
                let y0 = size as i32 / 4;
                let y1 = if Self::has_descender(ch) {
                    (size + Self::descent(size)) as i32
                } else {
                    size as i32
                };
                (x0, y0, x1.max(x0 + 1), y1.max(y0 + 1))
            })
            .collect();

        if boxes.is_empty() {
            return Ok(Coverage::empty());
        }

        let left = boxes.iter().map(|b| b.0).min().unwrap_or(0) - stroke;
        let top = boxes.iter().map(|b| b.1).min().unwrap_or(0) - stroke;
        let right = boxes.iter().map(|b| b.2).max().unwrap_or(0) + stroke;
        let bottom = boxes.iter().map(|b| b.3).max().unwrap_or(0) + stroke;

        let mut coverage = Coverage::blank(left, top, (right - left) as u32, (bottom - top) as u32);
        for &(x0, y0, x1, y1) in &boxes {
            for y in (y0 - stroke)..(y1 + stroke) {
                for x in (x0 - stroke)..(x1 + stroke) {
                    let idx = coverage.offset((x - left) as u32, (y - top) as u32);
                    coverage.footprint[idx] = 255;
                    if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                        coverage.fill[idx] = 255;
                    }
                }
            }
        }
        Ok(coverage)
    }
}
