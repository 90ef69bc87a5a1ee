// this_file: src/generator.rs
//! Single-call text image generation.
//!
//! Validates options, plans the layout, samples colors, renders both
//! surfaces and optionally crops them. All configuration errors surface
//! before any pixel is drawn.

use crate::color::{ColorResolver, ResolvedColors};
use crate::compose::{crop_to_content, unit_boxes, BoundingBox};
use crate::error::Result;
use crate::layout::{LayoutParams, LayoutPlanner, LayoutResult, Orientation, RandomOptions};
use crate::logging::Timer;
use crate::provider::GlyphSource;
use crate::render::Renderer;
use crate::security;
use image::RgbaImage;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default fill and stroke color.
pub const DEFAULT_COLOR: &str = "#282828";

/// Everything that shapes one rendered sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// One or two comma-separated colors bounding the fill
    pub text_color: String,
    /// Pixels per em
    pub font_size: u32,
    pub orientation: Orientation,
    /// Multiplier on the font's space width (height when vertical)
    pub space_width: f32,
    /// Extra pixels between characters
    pub character_spacing: i32,
    /// Crop both surfaces to the inked area
    pub fit: bool,
    /// Lay out whole words instead of characters
    pub word_split: bool,
    pub stroke_width: u32,
    /// One or two comma-separated colors bounding the stroke
    pub stroke_fill: String,
    #[serde(flatten)]
    pub random: RandomOptions,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            text_color: DEFAULT_COLOR.to_string(),
            font_size: 32,
            orientation: Orientation::Horizontal,
            space_width: 1.0,
            character_spacing: 0,
            fit: false,
            word_split: false,
            stroke_width: 0,
            stroke_fill: DEFAULT_COLOR.to_string(),
            random: RandomOptions::default(),
        }
    }
}

impl GenerateOptions {
    /// Layout inputs derived from these options.
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            font_size: self.font_size,
            space_width: self.space_width,
            character_spacing: self.character_spacing,
            word_split: self.word_split,
            random: self.random.clone(),
        }
    }

    /// Check everything that can be checked without a font.
    pub fn validate(&self) -> Result<()> {
        security::validate_font_pixels(self.font_size)?;
        if self.orientation == Orientation::Horizontal {
            self.random.validate(self.font_size)?;
        }
        ColorResolver::parse(&self.text_color, &self.stroke_fill)?;
        Ok(())
    }
}

/// A rendered sample: color image, label mask and the layout behind them.
#[derive(Debug, Clone)]
pub struct TextImage {
    pub image: RgbaImage,
    pub mask: RgbaImage,
    pub layout: LayoutResult,
    pub colors: ResolvedColors,
    /// Crop applied to both surfaces, in uncropped coordinates
    pub crop: Option<BoundingBox>,
}

impl TextImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Per-unit boxes read back from the mask.
    pub fn unit_boxes(&self) -> BTreeMap<usize, BoundingBox> {
        unit_boxes(&self.mask, self.layout.orientation)
    }

    /// Write `<stem>.png` and `<stem>_mask.png` into `dir`.
    pub fn save(&self, dir: &Path, stem: &str) -> Result<(PathBuf, PathBuf)> {
        security::validate_output_name(stem)?;
        std::fs::create_dir_all(dir)?;
        let image_path = dir.join(format!("{}.png", stem));
        let mask_path = dir.join(format!("{}_mask.png", stem));
        self.image.save(&image_path)?;
        self.mask.save(&mask_path)?;
        debug!(
            "Saved {} and {}",
            image_path.display(),
            mask_path.display()
        );
        Ok((image_path, mask_path))
    }
}

/// Render `text` with `source` according to `options`.
pub fn generate<S, R>(text: &str, source: &S, options: &GenerateOptions, rng: &mut R) -> Result<TextImage>
where
    S: GlyphSource + ?Sized,
    R: Rng + ?Sized,
{
    let mut timer = Timer::new(format!("generate {:?}", text));

    security::validate_text_input(text)?;
    security::validate_font_pixels(options.font_size)?;
    let resolver = ColorResolver::parse(&options.text_color, &options.stroke_fill)?;

    let params = options.layout_params();
    let layout = LayoutPlanner::new(source, &params).plan(text, options.orientation, rng)?;
    let colors = resolver.resolve(rng);
    timer.lap("layout");

    let surfaces = Renderer::new(source, options.stroke_width).render(&layout, &colors)?;
    timer.lap("render");
    let (surfaces, crop) = if options.fit {
        crop_to_content(surfaces)
    } else {
        (surfaces, None)
    };
    debug!(
        "{} units, {}x{} px",
        layout.len(),
        surfaces.image.width(),
        surfaces.image.height()
    );

    Ok(TextImage {
        image: surfaces.image,
        mask: surfaces.mask,
        layout,
        colors,
        crop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::provider::BlockGlyphSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(text: &str, options: &GenerateOptions) -> Result<TextImage> {
        let mut rng = StdRng::seed_from_u64(99);
        generate(text, &BlockGlyphSource, options, &mut rng)
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let options = GenerateOptions::default();
        assert_eq!(options.text_color, "#282828");
        assert_eq!(options.stroke_fill, "#282828");
        assert_eq!(options.font_size, 32);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_bad_color_fails_before_render() {
        let options = GenerateOptions {
            text_color: "#000000,nope".into(),
            ..GenerateOptions::default()
        };
        assert!(matches!(run("abc", &options).unwrap_err(), Error::Color(_)));
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_missing_companion_option_is_config_error() {
        let mut options = GenerateOptions::default();
        options.random.random_font_size = true;
        assert!(matches!(run("abc", &options).unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_fit_crops_to_ink() {
        let options = GenerateOptions {
            font_size: 20,
            fit: true,
            ..GenerateOptions::default()
        };
        let sample = run("AB", &options).unwrap();
        // blocks span x 1..23, y 5..20
        assert_eq!(sample.dimensions(), (22, 15));
        assert_eq!(sample.mask.dimensions(), (22, 15));
        assert_eq!(sample.crop.map(|c| (c.x, c.y)), Some((1, 5)));
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut options = GenerateOptions {
            text_color: "#000000,#ffffff".into(),
            ..GenerateOptions::default()
        };
        options.random.random_y_pos = Some(crate::layout::VerticalJitter::Bound(3));
        let a = run("seeded 123", &options).unwrap();
        let b = run("seeded 123", &options).unwrap();
        assert_eq!(a.image, b.image);
        assert_eq!(a.mask, b.mask);
        assert_eq!(a.colors, b.colors);
    }

    #[test]
    fn test_options_from_json() {
        let options: GenerateOptions = serde_json::from_str(
            r#"{"font_size": 24, "orientation": "vertical", "random_y_pos": [0, 2]}"#,
        )
        .unwrap();
        assert_eq!(options.font_size, 24);
        assert_eq!(options.orientation, Orientation::Vertical);
        assert!(options.random.random_y_pos.is_some());

        let bad = serde_json::from_str::<GenerateOptions>(r#"{"orientation": "sideways"}"#);
        assert!(bad.unwrap_err().to_string().contains("sideways"));
    }

    #[test]
    fn test_save_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let sample = run("ok", &GenerateOptions::default()).unwrap();
        let (image_path, mask_path) = sample.save(dir.path(), "sample").unwrap();
        assert!(image_path.exists());
        assert!(mask_path.ends_with("sample_mask.png"));
        assert!(sample.save(dir.path(), "../escape").is_err());
    }
}
