// this_file: src/orchestrator.rs
//! Batch execution of job specifications
//!
//! Jobs are independent: each one gets its own generator seeded from the
//! spec seed and its position, and its own glyph source over font bytes
//! shared through the [`FontLoader`] cache. Jobs run in parallel on the
//! rayon pool and results come back in spec order.

use crate::error::{Error, Result};
use crate::font_loader::FontLoader;
use crate::generator::{generate, TextImage};
use crate::json_parser::{Job, JobResult, JobSpec, TimingInfo, UnitBox};
use crate::logging::Timer;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Seed used when a spec does not name one
pub const DEFAULT_SEED: u64 = 0;

/// Summary of a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs job specifications against an output directory
pub struct JobOrchestrator {
    loader: FontLoader,
    output_dir: PathBuf,
    parallel: bool,
}

impl JobOrchestrator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader: FontLoader::new(),
            output_dir: output_dir.into(),
            parallel: true,
        }
    }

    /// Process jobs one after another on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Run every job, returning results in spec order
    pub fn run(&self, spec: &JobSpec) -> Result<(Vec<JobResult>, BatchStats)> {
        let _timer = Timer::new(format!("batch of {} jobs", spec.jobs.len()));
        std::fs::create_dir_all(&self.output_dir)?;

        let base_seed = spec.seed.unwrap_or(DEFAULT_SEED);
        let done = AtomicUsize::new(0);
        let total = spec.jobs.len();

        let process = |(i, job): (usize, &Job)| {
            let result = self.process_job(job, base_seed.wrapping_add(i as u64));
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % 100 == 0 || finished == total {
                info!("Processed {}/{} jobs", finished, total);
            }
            result
        };

        let results: Vec<JobResult> = if self.parallel {
            spec.jobs.par_iter().enumerate().map(process).collect()
        } else {
            spec.jobs.iter().enumerate().map(process).collect()
        };

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let stats = BatchStats {
            total,
            succeeded,
            failed: total - succeeded,
        };
        Ok((results, stats))
    }

    /// Process one job, converting any failure into an error result
    pub fn process_job(&self, job: &Job, seed: u64) -> JobResult {
        let start = Instant::now();
        match self.render_job(job, seed) {
            Ok((sample, render_ms)) => {
                let boxes = sample.unit_boxes();
                let units = sample
                    .layout
                    .units
                    .iter()
                    .map(|u| UnitBox::new(u.index, u.text.clone(), boxes.get(&u.index).copied()))
                    .collect();
                let (width, height) = sample.dimensions();
                JobResult {
                    id: job.id.clone(),
                    status: "success".to_string(),
                    width: Some(width),
                    height: Some(height),
                    units,
                    error: None,
                    timing: TimingInfo {
                        render_ms,
                        total_ms: start.elapsed().as_secs_f64() * 1000.0,
                    },
                }
            }
            Err(e) => {
                warn!("Job '{}' failed: {}", job.id, e);
                JobResult::failure(&job.id, e, start.elapsed().as_secs_f64() * 1000.0)
            }
        }
    }

    fn render_job(&self, job: &Job, seed: u64) -> Result<(TextImage, f64)> {
        let data = self
            .loader
            .load_font_data(job.font.path.as_std_path())
            .map_err(|e| match e {
                Error::Font(msg) if !job.font.path.exists() => Error::NotFound(msg),
                other => other,
            })?;
        let source = self.loader.glyph_source(&data, job.font.index)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let render_start = Instant::now();
        let sample = generate(&job.text, &source, &job.options, &mut rng)?;
        let render_ms = render_start.elapsed().as_secs_f64() * 1000.0;

        sample.save(&self.output_dir, &job.id)?;
        Ok((sample, render_ms))
    }
}
