// this_file: src/color.rs
//! Color specification parsing and per-call fill sampling.
//!
//! A color spec holds one or two comma-separated tokens. The first and last
//! token bound an inclusive per-channel range; a single token degenerates to
//! a fixed color.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_color_token(s)
    }
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("silver", [192, 192, 192]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("darkgray", [169, 169, 169]),
    ("darkgrey", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
    ("lightgrey", [211, 211, 211]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("navy", [0, 0, 128]),
    ("purple", [128, 0, 128]),
    ("teal", [0, 128, 128]),
    ("orange", [255, 165, 0]),
    ("brown", [165, 42, 42]),
    ("pink", [255, 192, 203]),
    ("gold", [255, 215, 0]),
    ("indigo", [75, 0, 130]),
    ("violet", [238, 130, 238]),
    ("crimson", [220, 20, 60]),
    ("darkblue", [0, 0, 139]),
    ("darkred", [139, 0, 0]),
    ("darkgreen", [0, 100, 0]),
];

/// Parse a single color token (`#rgb`, `#rrggbb`, `#rrggbbaa` or a CSS name).
pub fn parse_color_token(token: &str) -> Result<Rgb> {
    let token = token.trim();
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| Error::Color(format!("unparsable color '{}'", token)));
    }

    let lower = token.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgb)| Rgb(*rgb))
        .ok_or_else(|| Error::Color(format!("unknown color '{}'", token)))
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgb([nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17])),
        6 | 8 => Some(Rgb([byte(0)?, byte(2)?, byte(4)?])),
        _ => None,
    }
}

/// Parse a comma-separated color spec into its tokens' colors.
pub fn parse_color_spec(spec: &str) -> Result<Vec<Rgb>> {
    if spec.trim().is_empty() {
        return Err(Error::Color("empty color specification".into()));
    }
    spec.split(',').map(parse_color_token).collect()
}

/// Inclusive per-channel range between two endpoint colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    min: Rgb,
    max: Rgb,
}

impl ColorRange {
    /// Build a range from two endpoints in either order.
    pub fn new(a: Rgb, b: Rgb) -> Self {
        let mut min = [0u8; 3];
        let mut max = [0u8; 3];
        for c in 0..3 {
            min[c] = a.0[c].min(b.0[c]);
            max[c] = a.0[c].max(b.0[c]);
        }
        Self {
            min: Rgb(min),
            max: Rgb(max),
        }
    }

    /// Range from a spec string; the first and last token are the endpoints.
    pub fn parse(spec: &str) -> Result<Self> {
        let colors = parse_color_spec(spec)?;
        let (first, last) = match (colors.first(), colors.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(Error::Color(format!("no colors in '{}'", spec))),
        };
        Ok(Self::new(first, last))
    }

    pub fn min(&self) -> Rgb {
        self.min
    }

    pub fn max(&self) -> Rgb {
        self.max
    }

    pub fn contains(&self, color: Rgb) -> bool {
        (0..3).all(|c| (self.min.0[c]..=self.max.0[c]).contains(&color.0[c]))
    }

    /// Draw one color, each channel uniform within its bound.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        let mut out = [0u8; 3];
        for (c, channel) in out.iter_mut().enumerate() {
            *channel = rng.gen_range(self.min.0[c]..=self.max.0[c]);
        }
        Rgb(out)
    }
}

/// The main fill and stroke ranges of one render call.
#[derive(Debug, Clone, Copy)]
pub struct ColorResolver {
    fill: ColorRange,
    stroke: ColorRange,
}

/// Colors sampled for a single render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedColors {
    pub fill: Rgb,
    pub stroke: Rgb,
}

impl ColorResolver {
    pub fn parse(fill_spec: &str, stroke_spec: &str) -> Result<Self> {
        Ok(Self {
            fill: ColorRange::parse(fill_spec)?,
            stroke: ColorRange::parse(stroke_spec)?,
        })
    }

    /// Sample fill then stroke, once each.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> ResolvedColors {
        let fill = self.fill.sample(rng);
        let stroke = self.stroke.sample(rng);
        ResolvedColors { fill, stroke }
    }
}
