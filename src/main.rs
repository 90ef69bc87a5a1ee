// this_file: src/main.rs
//! Glyphmask CLI - render text images with per-glyph label masks

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glyphmask::json_parser::{self, JobResult, TimingInfo, UnitBox};
use glyphmask::logging::LogConfig;
use glyphmask::{
    generate, logging, BlockGlyphSource, FontLoader, GenerateOptions, GlyphSource,
    JobOrchestrator, Orientation, RandomOptions, VerticalJitter,
};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

/// Glyphmask - text images with pixel-aligned glyph label masks
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: String,

    /// Enable quiet mode (only errors)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single text to an image and its label mask
    Render(RenderArgs),

    /// Process a JSON job specification (file or stdin), one JSON line per job
    Process {
        /// Input file (uses stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for rendered results
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Process jobs one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Validate JSON job specification
    Validate {
        /// Input file (uses stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct RenderArgs {
    /// Text to render
    text: String,

    /// Font file (TTF/OTF/TTC)
    #[arg(short, long, required_unless_present = "block_glyphs")]
    font: Option<PathBuf>,

    /// Face index inside a font collection
    #[arg(long, default_value_t = 0)]
    face_index: u32,

    /// Draw solid boxes instead of font glyphs (no font needed)
    #[arg(long)]
    block_glyphs: bool,

    /// Output directory
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Output file stem
    #[arg(short, long, default_value = "sample")]
    name: String,

    /// Random seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Fill color, one or two comma-separated colors
    #[arg(long, default_value = glyphmask::generator::DEFAULT_COLOR)]
    color: String,

    /// Font size in pixels per em
    #[arg(short = 's', long, default_value_t = 32)]
    font_size: u32,

    /// horizontal or vertical
    #[arg(long, default_value = "horizontal")]
    orientation: Orientation,

    /// Multiplier on the space width
    #[arg(long, default_value_t = 1.0)]
    space_width: f32,

    /// Extra pixels between characters
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    character_spacing: i32,

    /// Crop to the inked area
    #[arg(long)]
    fit: bool,

    /// Lay out whole words instead of characters
    #[arg(long)]
    word_split: bool,

    /// Stroke width in pixels
    #[arg(long, default_value_t = 0)]
    stroke_width: u32,

    /// Stroke color, one or two comma-separated colors
    #[arg(long, default_value = glyphmask::generator::DEFAULT_COLOR)]
    stroke_fill: String,

    /// Pad the text with randomly placed spaces
    #[arg(long)]
    random_spacing: bool,

    /// Unit count to pad up to with --random-spacing
    #[arg(long)]
    random_spacing_target: Option<usize>,

    /// Draw each unit at a random size
    #[arg(long)]
    random_font_size: bool,

    /// Smallest size with --random-font-size
    #[arg(long)]
    min_font_size: Option<u32>,

    /// Randomly tighten digit runs by one character spacing
    #[arg(long)]
    random_number_char_spacing: bool,

    /// Vertical jitter: one bound, or low and high
    #[arg(long, num_args = 1..=2, allow_hyphen_values = true)]
    random_y_pos: Vec<i32>,

    /// Also write <name>_boxes.json with per-unit boxes
    #[arg(long)]
    boxes: bool,
}

impl RenderArgs {
    fn options(&self) -> GenerateOptions {
        let random_y_pos = match self.random_y_pos.as_slice() {
            [bound] => Some(VerticalJitter::Bound(*bound)),
            [low, high] => Some(VerticalJitter::Range([*low, *high])),
            _ => None,
        };
        GenerateOptions {
            text_color: self.color.clone(),
            font_size: self.font_size,
            orientation: self.orientation,
            space_width: self.space_width,
            character_spacing: self.character_spacing,
            fit: self.fit,
            word_split: self.word_split,
            stroke_width: self.stroke_width,
            stroke_fill: self.stroke_fill.clone(),
            random: RandomOptions {
                random_spacing: self.random_spacing,
                random_spacing_target: self.random_spacing_target,
                random_font_size: self.random_font_size,
                min_font_size: self.min_font_size,
                random_number_char_spacing: self.random_number_char_spacing,
                random_y_pos,
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(LogConfig::from_flags(&cli.log_level, cli.quiet));

    match cli.command {
        Commands::Render(args) => render(&args)?,
        Commands::Process {
            input,
            output,
            sequential,
        } => process_jobs(input, output, sequential)?,
        Commands::Validate { input } => validate_spec(input)?,
        Commands::Version => {
            println!("glyphmask version {}", glyphmask::VERSION);
            println!("Text image and glyph mask generator");
        }
    }

    Ok(())
}

fn read_input(input: Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Render one text and print its result line
fn render(args: &RenderArgs) -> Result<()> {
    let options = args.options();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let start = Instant::now();
    let sample = if args.block_glyphs {
        render_with(&args.text, &BlockGlyphSource, &options, &mut rng)?
    } else {
        let path = args
            .font
            .as_ref()
            .context("--font is required unless --block-glyphs is set")?;
        let loader = FontLoader::new();
        let data = loader.load_font_data(path)?;
        let source = loader.glyph_source(&data, args.face_index)?;
        render_with(&args.text, &source, &options, &mut rng)?
    };
    let render_ms = start.elapsed().as_secs_f64() * 1000.0;

    let (image_path, mask_path) = sample.save(&args.output, &args.name)?;
    info!(
        "Wrote {} and {}",
        image_path.display(),
        mask_path.display()
    );

    let boxes = sample.unit_boxes();
    let units: Vec<UnitBox> = sample
        .layout
        .units
        .iter()
        .map(|u| UnitBox::new(u.index, u.text.clone(), boxes.get(&u.index).copied()))
        .collect();
    let (width, height) = sample.dimensions();
    let result = JobResult {
        id: args.name.clone(),
        status: "success".to_string(),
        width: Some(width),
        height: Some(height),
        units,
        error: None,
        timing: TimingInfo {
            render_ms,
            total_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    };

    if args.boxes {
        let path = args.output.join(format!("{}_boxes.json", args.name));
        std::fs::write(&path, serde_json::to_string_pretty(&result.units)?)?;
        info!("Wrote {}", path.display());
    }

    println!("{}", json_parser::serialize_job_result(&result)?);
    Ok(())
}

fn render_with<S: GlyphSource + ?Sized>(
    text: &str,
    source: &S,
    options: &GenerateOptions,
    rng: &mut StdRng,
) -> Result<glyphmask::TextImage> {
    generate(text, source, options, rng).map_err(|e| {
        error!("Failed to render {:?}: {}", text, e);
        e.into()
    })
}

/// Process jobs from a spec file or stdin
fn process_jobs(input: Option<PathBuf>, output: PathBuf, sequential: bool) -> Result<()> {
    let json = read_input(input)?;

    let job_spec = match json_parser::parse_job_spec(&json) {
        Ok(spec) => spec,
        Err(e) => {
            error!("Failed to parse job specification: {}", e);
            return Err(e.into());
        }
    };

    info!("Processing {} jobs", job_spec.jobs.len());

    let mut orchestrator = JobOrchestrator::new(output);
    if sequential {
        orchestrator = orchestrator.sequential();
    }
    let (results, stats) = orchestrator.run(&job_spec)?;

    for result in &results {
        println!("{}", json_parser::serialize_job_result(result)?);
    }

    info!(
        "Finished processing {} jobs ({} succeeded, {} failed)",
        stats.total, stats.succeeded, stats.failed
    );
    Ok(())
}

/// Validate job specification
fn validate_spec(input: Option<PathBuf>) -> Result<()> {
    let json = read_input(input)?;

    match json_parser::parse_job_spec(&json) {
        Ok(spec) => {
            println!("✓ Valid job specification");
            println!("  Version: {}", spec.version);
            println!("  Jobs: {}", spec.jobs.len());
            if let Some(seed) = spec.seed {
                println!("  Seed: {}", seed);
            }
            Ok(())
        }
        Err(e) => {
            println!("✗ Invalid job specification: {}", e);
            Err(e.into())
        }
    }
}
