// this_file: src/lib.rs
//! Glyphmask - text line images with pixel-aligned per-glyph label masks
//!
//! This library provides functionality for:
//! - Glyph layout with randomized spacing, size and vertical jitter
//! - Rendering a color image and an index-encoded label mask in one pass
//! - Recovering per-glyph bounding boxes from the mask
//! - Font loading and rasterization with skrifa and zeno
//! - Batch generation via JSON job specifications

pub mod color;
pub mod compose;
pub mod error;
pub mod font_loader;
pub mod generator;
pub mod index;
pub mod json_parser;
pub mod layout;
pub mod logging;
pub mod orchestrator;
pub mod provider;
pub mod rasterize;
pub mod render;
pub mod security;

// Re-export commonly used types
pub use color::{ColorRange, ColorResolver, Rgb};
pub use compose::BoundingBox;
pub use error::{Error, Result};
pub use font_loader::FontLoader;
pub use generator::{generate, GenerateOptions, TextImage};
pub use json_parser::{Job, JobResult, JobSpec};
pub use layout::{
    LayoutParams, LayoutPlanner, LayoutResult, Orientation, RandomOptions, RenderUnit,
    VerticalJitter,
};
pub use orchestrator::{BatchStats, JobOrchestrator};
pub use provider::{BlockGlyphSource, Coverage, Extent, GlyphSource};
pub use rasterize::SkrifaGlyphSource;
pub use render::{Renderer, SurfacePair};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
