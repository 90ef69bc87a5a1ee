// this_file: src/layout.rs

//! Glyph layout planning.
//!
//! Turns a string into an ordered list of [`RenderUnit`]s with their boxes
//! and draw positions. Horizontal layouts support word-level units and the
//! randomization knobs in [`RandomOptions`]; vertical layouts stack single
//! characters with deterministic geometry.
//!
//! All randomness comes from the caller's generator, so a seeded generator
//! reproduces a layout exactly.

use crate::error::{Error, Result};
use crate::provider::GlyphSource;
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction units are stacked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Orientation {
    /// Left to right along a single line
    #[default]
    Horizontal,
    /// Top to bottom, one character per row
    Vertical,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" | "h" | "0" => Ok(Self::Horizontal),
            "vertical" | "v" | "1" => Ok(Self::Vertical),
            _ => Err(Error::InvalidParameter(format!("Unknown orientation {}", s))),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Orientation> for String {
    fn from(value: Orientation) -> Self {
        value.as_str().to_string()
    }
}

/// Random vertical offset per unit.
///
/// Deserializes from either a single number (symmetric bound) or a
/// two-element `[low, high]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerticalJitter {
    /// Uniform in `[-bound, bound]`
    Bound(i32),
    /// Uniform in `[low, high]`
    Range([i32; 2]),
}

impl VerticalJitter {
    /// A zero bound disables jitter.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Bound(0))
    }

    fn bounds(&self) -> (i32, i32) {
        match *self {
            Self::Bound(b) => {
                let b = b.saturating_abs();
                (-b, b)
            }
            Self::Range([low, high]) => (low, high),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Self::Range([low, high]) = *self {
            if low > high {
                return Err(Error::Config(format!(
                    "random_y_pos range [{}, {}] has low above high",
                    low, high
                )));
            }
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let (low, high) = self.bounds();
        rng.gen_range(low..=high)
    }
}

/// Randomization knobs for horizontal layouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomOptions {
    /// Pad the unit sequence with randomly placed spaces
    pub random_spacing: bool,
    /// Unit count random spacing pads up to; required with `random_spacing`
    pub random_spacing_target: Option<usize>,
    /// Draw each unit at a random size
    pub random_font_size: bool,
    /// Smallest random size; required with `random_font_size`
    pub min_font_size: Option<u32>,
    /// Randomly tighten runs of digits by one character spacing
    pub random_number_char_spacing: bool,
    /// Random per-unit vertical offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_y_pos: Option<VerticalJitter>,
}

impl RandomOptions {
    /// Check companion options before any layout work starts.
    pub fn validate(&self, font_size: u32) -> Result<()> {
        if self.random_spacing && self.random_spacing_target.is_none() {
            return Err(Error::Config(
                "random_spacing_target must be specified when random_spacing is enabled".into(),
            ));
        }
        if self.random_font_size {
            let min = self.min_font_size.ok_or_else(|| {
                Error::Config(
                    "min_font_size must be specified when random_font_size is enabled".into(),
                )
            })?;
            if min == 0 || min > font_size {
                return Err(Error::Config(format!(
                    "min_font_size {} must be within 1..={}",
                    min, font_size
                )));
            }
        }
        if let Some(jitter) = &self.random_y_pos {
            jitter.validate()?;
        }
        Ok(())
    }

    /// True when any knob is switched on.
    pub fn is_enabled(&self) -> bool {
        self.random_spacing
            || self.random_font_size
            || self.random_number_char_spacing
            || self.random_y_pos.is_some_and(|j| j.is_active())
    }
}

/// Geometry inputs shared by both orientations.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Base size in pixels per em
    pub font_size: u32,
    /// Multiplier applied to the measured space
    pub space_width: f32,
    /// Extra pixels between units
    pub character_spacing: i32,
    /// Treat whole words as units
    pub word_split: bool,
    pub random: RandomOptions,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            font_size: 32,
            space_width: 1.0,
            character_spacing: 0,
            word_split: false,
            random: RandomOptions::default(),
        }
    }
}

/// One positioned piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderUnit {
    /// Ordinal within the layout
    pub index: usize,
    /// Character or word chunk
    pub text: String,
    pub width: u32,
    pub height: u32,
    /// Cumulative offset including inter-unit spacing
    pub x: i32,
    pub y: i32,
    /// Size drawn at when random sizing is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Accumulated digit-pair shift subtracted from `x` when drawing
    pub shift: i32,
    /// Added by random spacing, not part of the input text
    pub inserted: bool,
}

impl RenderUnit {
    /// Where the unit is drawn on both surfaces.
    pub fn origin(&self) -> (i32, i32) {
        (self.x - self.shift, self.y)
    }

    /// Size to rasterize at, given the layout's base size.
    pub fn font_size(&self, base: u32) -> u32 {
        self.size.unwrap_or(base)
    }
}

/// Surface size and ordered units of one layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutResult {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
    /// Base font size the layout was planned at
    pub font_size: u32,
    pub units: Vec<RenderUnit>,
}

impl LayoutResult {
    /// Concatenate unit text, skipping padding spaces.
    pub fn source_text(&self) -> String {
        self.units
            .iter()
            .filter(|u| !u.inserted)
            .map(|u| u.text.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Split text into unit fragments.
///
/// With `word_split`, words are separated by a single explicit `" "` unit;
/// runs of spaces yield one space unit per gap and empty words are dropped.
pub fn split_units(text: &str, word_split: bool) -> Vec<String> {
    if !word_split {
        return text.chars().map(String::from).collect();
    }

    let mut units = Vec::new();
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            units.push(" ".to_string());
        }
        if !word.is_empty() {
            units.push(word.to_string());
        }
    }
    units
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_numeric)
}

fn is_space(text: &str) -> bool {
    text == " "
}

/// Plans layouts against a glyph source.
pub struct LayoutPlanner<'a, S: GlyphSource + ?Sized> {
    source: &'a S,
    params: &'a LayoutParams,
}

impl<'a, S: GlyphSource + ?Sized> LayoutPlanner<'a, S> {
    pub fn new(source: &'a S, params: &'a LayoutParams) -> Self {
        Self { source, params }
    }

    /// Plan `text` in the requested orientation.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        text: &str,
        orientation: Orientation,
        rng: &mut R,
    ) -> Result<LayoutResult> {
        if text.is_empty() {
            return Err(Error::InvalidParameter("Text must not be empty".into()));
        }
        if self.params.font_size == 0 {
            return Err(Error::InvalidParameter("Font size must be positive".into()));
        }

        let layout = match orientation {
            Orientation::Horizontal => self.plan_horizontal(text, rng)?,
            Orientation::Vertical => self.plan_vertical(text)?,
        };

        debug!(
            "Planned {} layout: {} units, {}x{} px",
            layout.orientation,
            layout.units.len(),
            layout.width,
            layout.height
        );
        Ok(layout)
    }

    /// Scaled space size at the base font size, truncated toward zero.
    fn space_extent(&self) -> Result<(u32, u32)> {
        let space = self.source.measure(" ", self.params.font_size)?;
        let scale = self.params.space_width.max(0.0);
        Ok((
            (space.width as f32 * scale) as u32,
            (space.height as f32 * scale) as u32,
        ))
    }

    fn plan_horizontal<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Result<LayoutResult> {
        let params = self.params;
        let random = &params.random;
        random.validate(params.font_size)?;

        let mut fragments: Vec<(String, bool)> = split_units(text, params.word_split)
            .into_iter()
            .map(|f| (f, false))
            .collect();

        if random.random_spacing {
            let target = random.random_spacing_target.unwrap_or(0);
            while fragments.len() < target {
                let at = rng.gen_range(0..=fragments.len());
                fragments.insert(at, (" ".to_string(), true));
            }
        }

        let sizes: Vec<Option<u32>> = match (random.random_font_size, random.min_font_size) {
            (true, Some(min)) => fragments
                .iter()
                .map(|_| Some(rng.gen_range(min..=params.font_size)))
                .collect(),
            _ => vec![None; fragments.len()],
        };

        let (space_width, _) = self.space_extent()?;
        let mut extents = Vec::with_capacity(fragments.len());
        for ((fragment, _), size) in fragments.iter().zip(&sizes) {
            let measured = self
                .source
                .measure(fragment, size.unwrap_or(params.font_size))?;
            let width = if is_space(fragment) {
                space_width
            } else {
                measured.width
            };
            extents.push((width, measured.height));
        }

        let offsets: Vec<i32> = match random.random_y_pos {
            Some(jitter) if jitter.is_active() => {
                fragments.iter().map(|_| jitter.sample(rng)).collect()
            }
            _ => vec![0; fragments.len()],
        };

        let spacing = if params.word_split {
            0
        } else {
            params.character_spacing
        };

        // Fold over units carrying (cursor, shift, previous fragment)
        let mut units = Vec::with_capacity(fragments.len());
        let mut cursor: i64 = 0;
        let mut shift: i32 = 0;
        let mut previous: Option<&str> = None;
        for (i, ((fragment, inserted), &(width, height))) in
            fragments.iter().zip(&extents).enumerate()
        {
            if random.random_number_char_spacing
                && previous.is_some_and(is_numeric)
                && is_numeric(fragment)
                && rng.gen_bool(0.5)
            {
                shift += params.character_spacing;
            }

            let x = cursor + i as i64 * spacing as i64;
            units.push(RenderUnit {
                index: i,
                text: fragment.clone(),
                width,
                height,
                x: clamp_i32(x),
                y: offsets[i],
                size: sizes[i],
                shift,
                inserted: *inserted,
            });

            cursor += width as i64;
            previous = Some(fragment.as_str());
        }

        let gaps = units.len().saturating_sub(1) as i64;
        let total_width = cursor + gaps * spacing as i64;
        let total_height = units.iter().map(|u| u.height).max().unwrap_or(0);

        Ok(LayoutResult {
            orientation: Orientation::Horizontal,
            width: clamp_dimension(total_width),
            height: total_height.max(1),
            font_size: params.font_size,
            units,
        })
    }

    fn plan_vertical(&self, text: &str) -> Result<LayoutResult> {
        let params = self.params;
        if params.random.is_enabled() {
            warn!("Random layout options only apply to horizontal text; ignoring them");
        }

        let (_, space_height) = self.space_extent()?;
        let spacing = params.character_spacing as i64;

        let mut units = Vec::new();
        let mut cursor: i64 = 0;
        for (i, ch) in text.chars().enumerate() {
            let fragment = ch.to_string();
            let measured = self.source.measure(&fragment, params.font_size)?;
            let height = if ch == ' ' {
                space_height
            } else {
                measured.height
            };

            let y = cursor + i as i64 * spacing;
            units.push(RenderUnit {
                index: i,
                text: fragment,
                width: measured.width,
                height,
                x: 0,
                y: clamp_i32(y),
                size: None,
                shift: 0,
                inserted: false,
            });
            cursor += height as i64;
        }

        let total_width = units.iter().map(|u| u.width).max().unwrap_or(0);
        let total_height = cursor + spacing * units.len() as i64;

        Ok(LayoutResult {
            orientation: Orientation::Vertical,
            width: total_width.max(1),
            height: clamp_dimension(total_height),
            font_size: params.font_size,
            units,
        })
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn clamp_dimension(value: i64) -> u32 {
    value.clamp(1, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BlockGlyphSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plan(text: &str, params: &LayoutParams, orientation: Orientation, seed: u64) -> Result<LayoutResult> {
        let source = BlockGlyphSource::new();
        let mut rng = StdRng::seed_from_u64(seed);
        LayoutPlanner::new(&source, params).plan(text, orientation, &mut rng)
    }

    fn params(font_size: u32) -> LayoutParams {
        LayoutParams {
            font_size,
            ..LayoutParams::default()
        }
    }

    #[test]
    fn test_two_characters_abut() {
        let layout = plan("AB", &params(20), Orientation::Horizontal, 0).unwrap();
        assert_eq!(layout.units.len(), 2);
        assert_eq!(layout.units[0].x, 0);
        assert_eq!(layout.units[1].x, 12);
        assert_eq!(layout.width, 24);
        assert_eq!(layout.height, 20);
    }

    #[test]
    fn test_character_spacing_between_characters() {
        let mut p = params(20);
        p.character_spacing = 3;
        let layout = plan("ABC", &p, Orientation::Horizontal, 0).unwrap();
        let xs: Vec<i32> = layout.units.iter().map(|u| u.x).collect();
        assert_eq!(xs, vec![0, 15, 30]);
        assert_eq!(layout.width, 36 + 2 * 3);
    }

    #[test]
    fn test_word_split_ignores_character_spacing() {
        let mut p = params(10);
        p.word_split = true;
        p.character_spacing = 5;
        let layout = plan("ab cd", &p, Orientation::Horizontal, 0).unwrap();
        let texts: Vec<&str> = layout.units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["ab", " ", "cd"]);
        assert_eq!(layout.units[1].x, 12);
        assert_eq!(layout.units[2].x, 18);
        assert_eq!(layout.width, 30);
    }

    #[test]
    fn test_split_units_keeps_every_gap() {
        assert_eq!(split_units("a b", true), vec!["a", " ", "b"]);
        assert_eq!(split_units("a  b", true), vec!["a", " ", " ", "b"]);
        assert_eq!(split_units(" a", true), vec![" ", "a"]);
        assert_eq!(split_units("ab", false), vec!["a", "b"]);
        for text in ["a  b ", " lead", "x", "  "] {
            assert_eq!(split_units(text, true).concat(), text);
        }
    }

    #[test]
    fn test_space_width_multiplier_truncates() {
        let mut p = params(10);
        p.space_width = 1.5;
        let layout = plan("a b", &p, Orientation::Horizontal, 0).unwrap();
        // measured space is 6px, 6 * 1.5 = 9
        assert_eq!(layout.units[1].width, 9);
        p.space_width = 0.3;
        let layout = plan("a b", &p, Orientation::Horizontal, 0).unwrap();
        assert_eq!(layout.units[1].width, 1);
    }

    #[test]
    fn test_random_spacing_requires_target() {
        let mut p = params(10);
        p.random.random_spacing = true;
        let err = plan("abc", &p, Orientation::Horizontal, 0).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_random_spacing_pads_to_target() {
        let mut p = params(10);
        p.random.random_spacing = true;
        p.random.random_spacing_target = Some(5);
        for seed in 0..20 {
            let layout = plan("abc", &p, Orientation::Horizontal, seed).unwrap();
            assert_eq!(layout.units.len(), 5);
            assert_eq!(layout.units.iter().filter(|u| u.inserted).count(), 2);
            assert!(layout.units.iter().filter(|u| u.inserted).all(|u| u.text == " "));
            assert_eq!(layout.source_text(), "abc");
        }
    }

    #[test]
    fn test_random_spacing_leaves_long_text_alone() {
        let mut p = params(10);
        p.random.random_spacing = true;
        p.random.random_spacing_target = Some(2);
        let layout = plan("abcd", &p, Orientation::Horizontal, 3).unwrap();
        assert_eq!(layout.units.len(), 4);
        assert!(layout.units.iter().all(|u| !u.inserted));
    }

    #[test]
    fn test_random_font_size_requires_minimum() {
        let mut p = params(20);
        p.random.random_font_size = true;
        assert!(matches!(
            plan("ab", &p, Orientation::Horizontal, 0).unwrap_err(),
            Error::Config(_)
        ));
        p.random.min_font_size = Some(30);
        assert!(matches!(
            plan("ab", &p, Orientation::Horizontal, 0).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_random_font_size_measures_each_unit() {
        let mut p = params(20);
        p.random.random_font_size = true;
        p.random.min_font_size = Some(10);
        let layout = plan("abcdefgh", &p, Orientation::Horizontal, 11).unwrap();
        for unit in &layout.units {
            let size = unit.size.unwrap();
            assert!((10..=20).contains(&size));
            assert_eq!(unit.width, BlockGlyphSource::advance(size));
        }
        let tallest = layout.units.iter().map(|u| u.height).max().unwrap();
        assert_eq!(layout.height, tallest);
    }

    #[test]
    fn test_symmetric_jitter_bounds() {
        let mut p = params(10);
        p.random.random_y_pos = Some(VerticalJitter::Bound(4));
        let layout = plan("abcdefghijkl", &p, Orientation::Horizontal, 5).unwrap();
        assert!(layout.units.iter().all(|u| (-4..=4).contains(&u.y)));
    }

    #[test]
    fn test_range_jitter_bounds_and_validation() {
        let mut p = params(10);
        p.random.random_y_pos = Some(VerticalJitter::Range([2, 6]));
        let layout = plan("abcdefghijkl", &p, Orientation::Horizontal, 5).unwrap();
        assert!(layout.units.iter().all(|u| (2..=6).contains(&u.y)));

        p.random.random_y_pos = Some(VerticalJitter::Range([6, 2]));
        assert!(plan("ab", &p, Orientation::Horizontal, 5).is_err());
    }

    #[test]
    fn test_extreme_jitter_bound_saturates() {
        let options: RandomOptions =
            serde_json::from_str(r#"{"random_y_pos": -2147483648}"#).unwrap();
        assert!(options.validate(10).is_ok());
        let jitter = options.random_y_pos.unwrap();
        assert_eq!(jitter.bounds(), (-i32::MAX, i32::MAX));
        let mut rng = StdRng::seed_from_u64(1);
        let offset = jitter.sample(&mut rng);
        assert!(offset > i32::MIN);
    }

    #[test]
    fn test_zero_jitter_is_disabled() {
        let mut p = params(10);
        p.random.random_y_pos = Some(VerticalJitter::Bound(0));
        let layout = plan("abc", &p, Orientation::Horizontal, 5).unwrap();
        assert!(layout.units.iter().all(|u| u.y == 0));
        assert!(!p.random.is_enabled());
    }

    #[test]
    fn test_digit_shift_is_a_ratchet() {
        let mut p = params(10);
        p.character_spacing = 2;
        p.random.random_number_char_spacing = true;
        for seed in 0..30 {
            let layout = plan("12a345", &p, Orientation::Horizontal, seed).unwrap();
            let shifts: Vec<i32> = layout.units.iter().map(|u| u.shift).collect();
            assert_eq!(shifts[0], 0);
            assert!(shifts.windows(2).all(|w| w[1] == w[0] || w[1] == w[0] + 2));
            // 'a' and the digit after it never add a step
            assert_eq!(shifts[2], shifts[1]);
            assert_eq!(shifts[3], shifts[2]);
            assert!(shifts[5] <= shifts[3] + 4);
            for unit in &layout.units {
                assert_eq!(unit.origin().0, unit.x - unit.shift);
            }
        }
    }

    #[test]
    fn test_digit_shift_off_by_default() {
        let mut p = params(10);
        p.character_spacing = 2;
        let layout = plan("123456", &p, Orientation::Horizontal, 9).unwrap();
        assert!(layout.units.iter().all(|u| u.shift == 0));
    }

    #[test]
    fn test_vertical_stacks_with_spacing() {
        let mut p = params(10);
        p.character_spacing = 2;
        let layout = plan("XY", &p, Orientation::Vertical, 0).unwrap();
        assert_eq!(layout.units[0].y, 0);
        assert_eq!(layout.units[1].y, 10 + 2);
        assert_eq!(layout.height, 20 + 2 * 2);
        assert_eq!(layout.width, 6);
    }

    #[test]
    fn test_vertical_space_uses_scaled_height() {
        let mut p = params(10);
        p.space_width = 0.5;
        let layout = plan("a b", &p, Orientation::Vertical, 0).unwrap();
        assert_eq!(layout.units[1].height, 5);
        assert_eq!(layout.units[2].y, 15);
    }

    #[test]
    fn test_vertical_ignores_word_split_and_randomness() {
        let mut p = params(10);
        p.word_split = true;
        p.random.random_spacing = true;
        p.random.random_spacing_target = Some(10);
        let layout = plan("ab cd", &p, Orientation::Vertical, 0).unwrap();
        assert_eq!(layout.units.len(), 5);
        assert!(layout.units.iter().all(|u| u.x == 0 && u.shift == 0));
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(
            plan("", &params(10), Orientation::Horizontal, 0).unwrap_err(),
            Error::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_orientation_parsing() {
        assert_eq!("Horizontal".parse::<Orientation>().unwrap(), Orientation::Horizontal);
        assert_eq!("1".parse::<Orientation>().unwrap(), Orientation::Vertical);
        assert_eq!("h".parse::<Orientation>().unwrap(), Orientation::Horizontal);
        let err = "diagonal".parse::<Orientation>().unwrap_err();
        assert!(err.to_string().contains("diagonal"));
        assert!("2".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_random_options_deserialize_both_jitter_forms() {
        let bound: RandomOptions = serde_json::from_str(r#"{"random_y_pos": 3}"#).unwrap();
        assert_eq!(bound.random_y_pos, Some(VerticalJitter::Bound(3)));
        let range: RandomOptions =
            serde_json::from_str(r#"{"random_y_pos": [-1, 4]}"#).unwrap();
        assert_eq!(range.random_y_pos, Some(VerticalJitter::Range([-1, 4])));
    }
}
