// this_file: src/security.rs
//! Input limits and validation

use crate::error::{Error, Result};
use log::warn;

/// Maximum allowed JSON input size (10MB)
pub const MAX_JSON_SIZE: usize = 10 * 1024 * 1024;

/// Maximum allowed number of jobs in a single spec
pub const MAX_JOBS_PER_SPEC: usize = 10_000;

/// Maximum allowed text length in characters
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Maximum allowed font file size (50MB)
pub const MAX_FONT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Maximum font size in pixels per em
pub const MAX_FONT_PIXELS: u32 = 2048;

/// Validate JSON input size
pub fn validate_json_size(json: &str) -> Result<()> {
    if json.len() > MAX_JSON_SIZE {
        return Err(Error::InvalidParameter(format!(
            "JSON input too large: {} bytes (max: {} bytes)",
            json.len(),
            MAX_JSON_SIZE
        )));
    }
    Ok(())
}

/// Validate text input for rendering
pub fn validate_text_input(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(Error::InvalidParameter("Text must not be empty".into()));
    }

    let count = text.chars().count();
    if count > MAX_TEXT_LENGTH {
        return Err(Error::InvalidParameter(format!(
            "Text too long: {} characters (max: {} characters)",
            count, MAX_TEXT_LENGTH
        )));
    }

    // Single-line renderer: newlines and tabs are rejected too
    if text.chars().any(char::is_control) {
        return Err(Error::InvalidParameter(
            "Text contains control characters".into(),
        ));
    }

    Ok(())
}

/// Validate font file size in bytes
pub fn validate_font_file_size(size: u64) -> Result<()> {
    if size > MAX_FONT_FILE_SIZE {
        return Err(Error::InvalidParameter(format!(
            "Font file too large: {} bytes (max: {} bytes)",
            size, MAX_FONT_FILE_SIZE
        )));
    }
    Ok(())
}

/// Validate a pixel font size
pub fn validate_font_pixels(size: u32) -> Result<()> {
    if size == 0 || size > MAX_FONT_PIXELS {
        return Err(Error::InvalidParameter(format!(
            "Font size {} out of range (1..={})",
            size, MAX_FONT_PIXELS
        )));
    }
    Ok(())
}

/// Check that a job id can be used as a file stem
pub fn validate_output_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.chars().any(char::is_control);
    if bad {
        warn!("Rejected output name {:?}", name);
        return Err(Error::InvalidParameter(format!(
            "Invalid output name {:?}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_input() {
        assert!(validate_text_input("Hello, World!").is_ok());
        assert!(validate_text_input("12 345").is_ok());
        assert!(validate_text_input("").is_err());
        assert!(validate_text_input("a\nb").is_err());
        assert!(validate_text_input("bell\x07").is_err());
        assert!(validate_text_input(&"x".repeat(MAX_TEXT_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_json_size() {
        assert!(validate_json_size("{}").is_ok());
        assert!(validate_json_size(&" ".repeat(MAX_JSON_SIZE + 1)).is_err());
    }

    #[test]
    fn test_validate_font_limits() {
        assert!(validate_font_file_size(1024).is_ok());
        assert!(validate_font_file_size(MAX_FONT_FILE_SIZE + 1).is_err());
        assert!(validate_font_pixels(32).is_ok());
        assert!(validate_font_pixels(0).is_err());
        assert!(validate_font_pixels(MAX_FONT_PIXELS + 1).is_err());
    }

    #[test]
    fn test_validate_output_name() {
        assert!(validate_output_name("sample_001").is_ok());
        assert!(validate_output_name("").is_err());
        assert!(validate_output_name("..").is_err());
        assert!(validate_output_name("a/b").is_err());
        assert!(validate_output_name("a\\b").is_err());
    }
}
