// this_file: src/rasterize.rs
//! CPU font measurement and rasterization using skrifa and zeno

use crate::error::{Error, Result};
use crate::provider::{Coverage, Extent, GlyphSource};
use log::{debug, warn};
use read_fonts::types::GlyphId;
use read_fonts::FileRef;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, MetadataProvider};
use zeno::{Command, Join, Mask, Stroke};

/// Glyph source backed by an OpenType font.
///
/// Runs are laid out with the font's nominal advances (no shaping). The
/// layout box of a run starts at the ascender and extends down to the lowest
/// ink point below the baseline, so runs without descenders are only
/// `ascent` tall.
pub struct SkrifaGlyphSource<'a> {
    font: FontRef<'a>,
}

/// Glyph positions of a run, in pixels, y up from the baseline.
struct PlacedRun {
    glyphs: Vec<(GlyphId, f32)>,
    advance: f32,
}

impl<'a> SkrifaGlyphSource<'a> {
    /// Parse font data, taking face `index` from collections.
    pub fn new(data: &'a [u8], index: u32) -> Result<Self> {
        let file = FileRef::new(data)
            .map_err(|e| Error::Font(format!("Failed to parse font file: {}", e)))?;
        let font = match file {
            FileRef::Font(f) => {
                if index != 0 {
                    warn!("Face index {} ignored for a single-font file", index);
                }
                f
            }
            FileRef::Collection(c) => c.get(index).map_err(|e| {
                Error::Font(format!("Failed to get face {} from collection: {}", index, e))
            })?,
        };
        Ok(Self { font })
    }

    fn ascent(&self, size: u32) -> f32 {
        self.font
            .metrics(Size::new(size as f32), LocationRef::default())
            .ascent
    }

    fn place(&self, text: &str, size: u32) -> PlacedRun {
        let charmap = self.font.charmap();
        let metrics = self
            .font
            .glyph_metrics(Size::new(size as f32), LocationRef::default());

        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen_x = 0.0f32;
        for ch in text.chars() {
            let glyph_id = charmap.map(ch).unwrap_or_else(|| {
                debug!("No glyph for {:?}, using .notdef", ch);
                GlyphId::NOTDEF
            });
            glyphs.push((glyph_id, pen_x));
            pen_x += metrics.advance_width(glyph_id).unwrap_or(0.0);
        }
        PlacedRun {
            glyphs,
            advance: pen_x,
        }
    }

    /// Outline commands for a run, y down with the baseline at `baseline`.
    fn outline(&self, run: &PlacedRun, size: u32, baseline: f32) -> Result<Vec<Command>> {
        let outlines = self.font.outline_glyphs();
        let settings = || DrawSettings::unhinted(Size::new(size as f32), LocationRef::default());

        let mut commands = Vec::new();
        for &(glyph_id, x) in &run.glyphs {
            let Some(glyph) = outlines.get(glyph_id) else {
                continue;
            };
            let mut pen = ZenoPen::new(&mut commands, x, baseline);
            glyph.draw(settings(), &mut pen).map_err(|e| {
                Error::Rendering(format!("Failed to draw glyph {}: {}", glyph_id, e))
            })?;
        }
        Ok(commands)
    }

    /// Lowest ink point of a run below the baseline, in pixels.
    fn ink_depth(&self, run: &PlacedRun, size: u32) -> f32 {
        let outlines = self.font.outline_glyphs();
        let mut pen = BoundsPen::new();
        for &(glyph_id, _) in &run.glyphs {
            if let Some(glyph) = outlines.get(glyph_id) {
                let settings =
                    DrawSettings::unhinted(Size::new(size as f32), LocationRef::default());
                let _ = glyph.draw(settings, &mut pen);
            }
        }
        pen.min_y().map(|y| (-y).max(0.0)).unwrap_or(0.0)
    }
}

impl GlyphSource for SkrifaGlyphSource<'_> {
    fn measure(&self, text: &str, size: u32) -> Result<Extent> {
        let run = self.place(text, size);
        let height = self.ascent(size) + self.ink_depth(&run, size);
        Ok(Extent {
            width: run.advance.ceil().max(0.0) as u32,
            height: height.ceil().max(0.0) as u32,
        })
    }

    fn rasterize(&self, text: &str, size: u32, stroke_width: u32) -> Result<Coverage> {
        let run = self.place(text, size);
        let commands = self.outline(&run, size, self.ascent(size))?;
        if commands.is_empty() {
            return Ok(Coverage::empty());
        }

        let fill_mask = Mask::new(&commands);
        let (fill_data, fill_place) = fill_mask.render();

        if stroke_width == 0 {
            return Ok(Coverage {
                left: fill_place.left,
                top: fill_place.top,
                width: fill_place.width,
                height: fill_place.height,
                footprint: fill_data.clone(),
                fill: fill_data,
            });
        }

        // Stroke is centered on the outline, so double it to extend
        // stroke_width pixels outside the glyph.
        let mut stroke = Stroke::new(stroke_width as f32 * 2.0);
        stroke.join(Join::Round);
        let mut stroke_mask = Mask::new(&commands);
        stroke_mask.style(stroke);
        let (stroke_data, stroke_place) = stroke_mask.render();

        let left = fill_place.left.min(stroke_place.left);
        let top = fill_place.top.min(stroke_place.top);
        let right = (fill_place.left + fill_place.width as i32)
            .max(stroke_place.left + stroke_place.width as i32);
        let bottom = (fill_place.top + fill_place.height as i32)
            .max(stroke_place.top + stroke_place.height as i32);

        let mut coverage = Coverage::blank(left, top, (right - left) as u32, (bottom - top) as u32);
        for y in 0..fill_place.height {
            for x in 0..fill_place.width {
                let src = (y * fill_place.width + x) as usize;
                let dst = coverage.offset(
                    (fill_place.left - left) as u32 + x,
                    (fill_place.top - top) as u32 + y,
                );
                coverage.fill[dst] = fill_data[src];
                coverage.footprint[dst] = fill_data[src];
            }
        }
        for y in 0..stroke_place.height {
            for x in 0..stroke_place.width {
                let src = (y * stroke_place.width + x) as usize;
                let dst = coverage.offset(
                    (stroke_place.left - left) as u32 + x,
                    (stroke_place.top - top) as u32 + y,
                );
                coverage.footprint[dst] = coverage.footprint[dst].max(stroke_data[src]);
            }
        }
        Ok(coverage)
    }
}

/// Pen tracking the lowest point of drawn outlines
struct BoundsPen {
    min_y: f32,
    has_points: bool,
}

impl BoundsPen {
    fn new() -> Self {
        Self {
            min_y: f32::INFINITY,
            has_points: false,
        }
    }

    fn min_y(&self) -> Option<f32> {
        self.has_points.then_some(self.min_y)
    }

    fn update(&mut self, y: f32) {
        self.min_y = self.min_y.min(y);
        self.has_points = true;
    }
}

impl OutlinePen for BoundsPen {
    fn move_to(&mut self, _x: f32, y: f32) {
        self.update(y);
    }

    fn line_to(&mut self, _x: f32, y: f32) {
        self.update(y);
    }

    fn quad_to(&mut self, _cx: f32, cy: f32, _x: f32, y: f32) {
        self.update(cy);
        self.update(y);
    }

    fn curve_to(&mut self, _cx0: f32, cy0: f32, _cx1: f32, cy1: f32, _x: f32, y: f32) {
        self.update(cy0);
        self.update(cy1);
        self.update(y);
    }

    fn close(&mut self) {}
}

/// Adapter from skrifa outlines to zeno commands, flipping y and moving the
/// glyph to its pen position.
struct ZenoPen<'a> {
    commands: &'a mut Vec<Command>,
    dx: f32,
    baseline: f32,
}

impl<'a> ZenoPen<'a> {
    fn new(commands: &'a mut Vec<Command>, dx: f32, baseline: f32) -> Self {
        Self {
            commands,
            dx,
            baseline,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (x + self.dx, self.baseline - y)
    }
}

impl OutlinePen for ZenoPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.commands.push(Command::MoveTo(p.into()));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.commands.push(Command::LineTo(p.into()));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let c = self.point(cx0, cy0);
        let p = self.point(x, y);
        self.commands.push(Command::QuadTo(c.into(), p.into()));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let c0 = self.point(cx0, cy0);
        let c1 = self.point(cx1, cy1);
        let p = self.point(x, y);
        self.commands
            .push(Command::CurveTo(c0.into(), c1.into(), p.into()));
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage_data() {
        assert!(matches!(
            SkrifaGlyphSource::new(b"not a font at all", 0),
            Err(Error::Font(_))
        ));
        assert!(SkrifaGlyphSource::new(&[], 0).is_err());
    }

    #[test]
    fn test_bounds_pen_tracks_lowest_point() {
        let mut pen = BoundsPen::new();
        assert_eq!(pen.min_y(), None);
        pen.move_to(0.0, 5.0);
        pen.line_to(1.0, -3.0);
        pen.quad_to(2.0, -4.5, 3.0, 0.0);
        assert_eq!(pen.min_y(), Some(-4.5));
    }

    #[test]
    fn test_zeno_pen_flips_and_offsets() {
        let mut commands = Vec::new();
        let mut pen = ZenoPen::new(&mut commands, 10.0, 20.0);
        pen.move_to(1.0, 2.0);
        pen.close();
        assert_eq!(commands.len(), 2);
        match commands[0] {
            Command::MoveTo(p) => assert_eq!((p.x, p.y), (11.0, 18.0)),
            _ => panic!("expected move_to"),
        }
    }
}
