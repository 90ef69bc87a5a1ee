// this_file: src/render.rs

//! Painting planned layouts onto the color and label surfaces.
//!
//! Each unit is rasterized once. The same coverage is then composited onto
//! the color surface and stamped onto the label surface at the same origin,
//! so a unit's visible pixels and its label region never drift apart.

use crate::color::{ResolvedColors, Rgb};
use crate::error::{Error, Result};
use crate::index::index_color;
use crate::layout::LayoutResult;
use crate::provider::{Coverage, GlyphSource};
use image::{Rgba, RgbaImage};
use log::trace;

/// How coverage turns into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    /// Antialiased stroke then fill, straight-alpha source-over
    Blend,
    /// Opaque label color wherever the footprint is non-zero
    Label,
}

/// Composite `coverage` onto `surface` with its origin at `origin`.
///
/// Pixels falling outside the surface are clipped.
pub fn paint_coverage(
    surface: &mut RgbaImage,
    coverage: &Coverage,
    origin: (i32, i32),
    fill: Rgb,
    stroke: Rgb,
    mode: PaintMode,
) {
    if coverage.is_empty() {
        return;
    }

    let (width, height) = surface.dimensions();
    let left = origin.0 as i64 + coverage.left as i64;
    let top = origin.1 as i64 + coverage.top as i64;

    for cy in 0..coverage.height {
        let py = top + cy as i64;
        if py < 0 || py >= height as i64 {
            continue;
        }
        for cx in 0..coverage.width {
            let px = left + cx as i64;
            if px < 0 || px >= width as i64 {
                continue;
            }

            let idx = coverage.offset(cx, cy);
            let footprint = coverage.footprint[idx];
            if footprint == 0 {
                continue;
            }
            let pixel = surface.get_pixel_mut(px as u32, py as u32);

            match mode {
                PaintMode::Label => {
                    *pixel = Rgba([fill.r(), fill.g(), fill.b(), 255]);
                }
                PaintMode::Blend => {
                    let body = coverage.fill[idx].min(footprint);
                    let color = mix(stroke, fill, body, footprint);
                    blend_over(pixel, color, footprint);
                }
            }
        }
    }
}

/// Stroke and fill shares of one pixel: `fill` weighted `body / footprint`.
///
/// A pixel whose footprint is all body takes the fill color unchanged, so
/// unstroked edges never pick up the stroke color.
fn mix(stroke: Rgb, fill: Rgb, body: u8, footprint: u8) -> Rgb {
    if body >= footprint {
        return fill;
    }
    let (w, total) = (body as u32, footprint as u32);
    let mut out = [0u8; 3];
    for (c, channel) in out.iter_mut().enumerate() {
        let v = fill.0[c] as u32 * w + stroke.0[c] as u32 * (total - w);
        *channel = ((v + total / 2) / total) as u8;
    }
    Rgb(out)
}

/// Straight-alpha source-over of `color` at `alpha` onto `dst`.
fn blend_over(dst: &mut Rgba<u8>, color: Rgb, alpha: u8) {
    let sa = alpha as u32;
    let da = dst.0[3] as u32;
    // out_a = sa + da * (1 - sa), kept in 0..=255 * 255
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        return;
    }
    for c in 0..3 {
        let src = color.0[c] as u32 * sa * 255;
        let dst_c = dst.0[c] as u32 * da * (255 - sa);
        dst.0[c] = ((src + dst_c + out_a / 2) / out_a) as u8;
    }
    dst.0[3] = ((out_a + 127) / 255) as u8;
}

/// Color and label surfaces of equal size.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfacePair {
    pub image: RgbaImage,
    pub mask: RgbaImage,
}

impl SurfacePair {
    /// Two fully transparent surfaces.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            mask: RgbaImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Draws layouts with a glyph source.
pub struct Renderer<'a, S: GlyphSource + ?Sized> {
    source: &'a S,
    stroke_width: u32,
}

impl<'a, S: GlyphSource + ?Sized> Renderer<'a, S> {
    pub fn new(source: &'a S, stroke_width: u32) -> Self {
        Self {
            source,
            stroke_width,
        }
    }

    /// Render every unit of `layout` onto a fresh surface pair.
    pub fn render(&self, layout: &LayoutResult, colors: &ResolvedColors) -> Result<SurfacePair> {
        let mut surfaces = SurfacePair::new(layout.width, layout.height);

        for unit in &layout.units {
            let label = index_color(unit.index, layout.orientation).ok_or_else(|| {
                Error::Rendering(format!(
                    "Unit {} exceeds the label color range for {} text",
                    unit.index, layout.orientation
                ))
            })?;

            let coverage = self.source.rasterize(
                &unit.text,
                unit.font_size(layout.font_size),
                self.stroke_width,
            )?;
            let origin = unit.origin();
            trace!(
                "Unit {} {:?} at {:?}, label {}",
                unit.index,
                unit.text,
                origin,
                label
            );

            paint_coverage(
                &mut surfaces.image,
                &coverage,
                origin,
                colors.fill,
                colors.stroke,
                PaintMode::Blend,
            );
            paint_coverage(
                &mut surfaces.mask,
                &coverage,
                origin,
                label,
                label,
                PaintMode::Label,
            );
        }

        Ok(surfaces)
    }
}
