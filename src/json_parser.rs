// this_file: src/json_parser.rs
//! JSON job specification parser for batch generation
//!
//! A job spec lists texts to render, each with its own font and options.
//! Results are emitted one JSON object per line.

use crate::compose::BoundingBox;
use crate::error::{Error, Result};
use crate::generator::GenerateOptions;
use crate::security;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Supported specification version
pub const SPEC_VERSION: &str = "1.0";

/// Main job specification containing multiple generation jobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobSpec {
    /// Specification version (expected: "1.0")
    pub version: String,
    /// Base seed; job `i` uses `seed + i`
    #[serde(default)]
    pub seed: Option<u64>,
    /// List of jobs to process
    pub jobs: Vec<Job>,
}

/// Individual generation job
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Job {
    /// Unique job identifier, also the output file stem
    pub id: String,
    /// Text to render on a single line
    pub text: String,
    /// Font configuration
    pub font: FontConfig,
    /// Rendering options
    #[serde(default)]
    pub options: GenerateOptions,
}

/// Font configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FontConfig {
    /// Path to font file (TTF/OTF/TTC)
    pub path: Utf8PathBuf,
    /// Face index inside a collection
    #[serde(default)]
    pub index: u32,
}

/// Box of one unit in the written mask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitBox {
    /// Unit ordinal
    pub index: usize,
    /// Unit text
    pub text: String,
    /// Pixel box, absent when the unit left no ink
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<(u32, u32, u32, u32)>,
}

impl UnitBox {
    pub fn new(index: usize, text: String, bbox: Option<BoundingBox>) -> Self {
        Self {
            index,
            text,
            bbox: bbox.map(|b| (b.x, b.y, b.width, b.height)),
        }
    }
}

/// Result for a single job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Job identifier (matches input job.id)
    pub id: String,
    /// Processing status ("success" or "error")
    pub status: String,
    /// Output image width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Output image height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Per-unit boxes recovered from the mask
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<UnitBox>,
    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Timing information
    pub timing: TimingInfo,
}

impl JobResult {
    /// Result for a job that failed before producing output
    pub fn failure(id: impl Into<String>, error: impl ToString, total_ms: f64) -> Self {
        Self {
            id: id.into(),
            status: "error".to_string(),
            width: None,
            height: None,
            units: Vec::new(),
            error: Some(error.to_string()),
            timing: TimingInfo {
                render_ms: 0.0,
                total_ms,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Timing information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingInfo {
    /// Layout and rendering time in milliseconds
    pub render_ms: f64,
    /// Total processing time in milliseconds
    pub total_ms: f64,
}

/// Parse job specification from JSON string
pub fn parse_job_spec(json: &str) -> Result<JobSpec> {
    security::validate_json_size(json)?;
    let spec: JobSpec = serde_json::from_str(json)
        .map_err(|e| Error::InvalidParameter(format!("JSON parse error: {}", e)))?;

    validate_job_spec(&spec)?;
    Ok(spec)
}

/// Serialize a job result as one JSON line
pub fn serialize_job_result(result: &JobResult) -> Result<String> {
    Ok(serde_json::to_string(result)?)
}

/// Validate job specification
fn validate_job_spec(spec: &JobSpec) -> Result<()> {
    if spec.version != SPEC_VERSION {
        return Err(Error::InvalidParameter(format!(
            "Unsupported specification version: '{}' (expected '{}')",
            spec.version, SPEC_VERSION
        )));
    }

    if spec.jobs.is_empty() {
        return Err(Error::InvalidParameter(
            "Job specification must contain at least one job".into(),
        ));
    }

    if spec.jobs.len() > security::MAX_JOBS_PER_SPEC {
        return Err(Error::InvalidParameter(format!(
            "Too many jobs: {} (max: {})",
            spec.jobs.len(),
            security::MAX_JOBS_PER_SPEC
        )));
    }

    let mut seen = HashSet::new();
    for job in &spec.jobs {
        validate_job(job)?;
        if !seen.insert(job.id.as_str()) {
            return Err(Error::InvalidParameter(format!(
                "Duplicate job id '{}'",
                job.id
            )));
        }
    }

    Ok(())
}

/// Validate individual job
fn validate_job(job: &Job) -> Result<()> {
    security::validate_output_name(&job.id)
        .map_err(|e| Error::InvalidParameter(format!("Job '{}': {}", job.id, e)))?;

    security::validate_text_input(&job.text)
        .map_err(|e| Error::InvalidParameter(format!("Job '{}': {}", job.id, e)))?;

    if !job.font.path.is_file() {
        return Err(Error::NotFound(format!(
            "Job '{}': Font file not found: {}",
            job.id, job.font.path
        )));
    }

    job.options
        .validate()
        .map_err(|e| Error::InvalidParameter(format!("Job '{}': {}", job.id, e)))?;

    Ok(())
}
