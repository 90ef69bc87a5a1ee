// this_file: src/font_loader.rs
//! Font file loading with a shared byte cache
//!
//! Batch jobs tend to reuse a handful of fonts, so bytes are read once per
//! canonical path and handed out as `Arc<Vec<u8>>`. Each caller builds its
//! own [`SkrifaGlyphSource`] over them.

use crate::error::{Error, Result};
use crate::rasterize::SkrifaGlyphSource;
use crate::security;
use log::{debug, info, warn};
use read_fonts::FileRef;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Container format recognized from the first four bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    TrueType,
    OpenType,
    Collection,
}

impl FontKind {
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data.get(..4)? {
            b"\x00\x01\x00\x00" | b"true" => Some(Self::TrueType),
            b"OTTO" => Some(Self::OpenType),
            b"ttcf" => Some(Self::Collection),
            _ => None,
        }
    }
}

impl fmt::Display for FontKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TrueType => "TrueType",
            Self::OpenType => "OpenType/CFF",
            Self::Collection => "font collection",
        })
    }
}

#[derive(Default)]
struct ByteCache {
    fonts: HashMap<PathBuf, Arc<Vec<u8>>>,
    bytes: usize,
}

/// Loads and validates font files, caching bytes up to a size limit.
pub struct FontLoader {
    cache: Mutex<ByteCache>,
    max_cache_bytes: usize,
}

impl FontLoader {
    /// Loader with a 100MB cache
    pub fn new() -> Self {
        Self::with_cache_size(100 * 1024 * 1024)
    }

    pub fn with_cache_size(max_cache_bytes: usize) -> Self {
        Self {
            cache: Mutex::new(ByteCache::default()),
            max_cache_bytes,
        }
    }

    fn cache(&self) -> MutexGuard<'_, ByteCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read, check and cache the font at `path`.
    ///
    /// Rejects files over the size limit, files without a TrueType,
    /// OpenType or collection header, and files read-fonts cannot parse.
    pub fn load_font_data<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Vec<u8>>> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| {
            Error::Font(format!("Failed to resolve path {}: {}", path.display(), e))
        })?;

        if let Some(data) = self.cache().fonts.get(&canonical) {
            debug!("Using cached font: {}", canonical.display());
            return Ok(Arc::clone(data));
        }

        let read_err =
            |e: std::io::Error| Error::Font(format!("Failed to read {}: {}", canonical.display(), e));
        security::validate_font_file_size(fs::metadata(&canonical).map_err(read_err)?.len())?;
        let data = fs::read(&canonical).map_err(read_err)?;

        let kind = FontKind::sniff(&data).ok_or_else(|| {
            Error::Font(format!(
                "{} is not a TTF, OTF or TTC file",
                canonical.display()
            ))
        })?;
        FileRef::new(&data).map_err(|e| Error::Font(format!("Failed to parse font: {}", e)))?;
        info!(
            "Loaded {} ({}, {} bytes)",
            canonical.display(),
            kind,
            data.len()
        );

        let data = Arc::new(data);
        self.remember(canonical, Arc::clone(&data));
        Ok(data)
    }

    /// Build a glyph source over loaded font bytes
    pub fn glyph_source<'a>(&self, data: &'a [u8], index: u32) -> Result<SkrifaGlyphSource<'a>> {
        SkrifaGlyphSource::new(data, index)
    }

    fn remember(&self, path: PathBuf, data: Arc<Vec<u8>>) {
        let mut cache = self.cache();
        if cache.bytes + data.len() > self.max_cache_bytes {
            warn!(
                "Font cache full ({} of {} bytes), not caching {}",
                cache.bytes,
                self.max_cache_bytes,
                path.display()
            );
            return;
        }
        cache.bytes += data.len();
        if let Some(previous) = cache.fonts.insert(path, data) {
            // another thread loaded the same file first
            cache.bytes -= previous.len();
        }
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache();
        cache.fonts.clear();
        cache.bytes = 0;
    }

    /// Cached bytes
    pub fn cache_size(&self) -> usize {
        self.cache().bytes
    }

    pub fn cache_count(&self) -> usize {
        self.cache().fonts.len()
    }
}

impl Default for FontLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_known_headers() {
        assert_eq!(FontKind::sniff(b"\x00\x01\x00\x00rest"), Some(FontKind::TrueType));
        assert_eq!(FontKind::sniff(b"OTTOrest"), Some(FontKind::OpenType));
        assert_eq!(FontKind::sniff(b"ttcfrest"), Some(FontKind::Collection));
    }

    #[test]
    fn test_sniff_rejects_others() {
        assert_eq!(FontKind::sniff(b""), None);
        assert_eq!(FontKind::sniff(b"OTT"), None);
        assert_eq!(FontKind::sniff(b"wOFF2..."), None);
    }

    #[test]
    fn test_missing_file_is_font_error() {
        let loader = FontLoader::new();
        let err = loader.load_font_data("definitely-missing.ttf").unwrap_err();
        assert!(matches!(err, Error::Font(_)));
    }

    #[test]
    fn test_empty_and_garbage_files_are_rejected() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.ttf");
        let garbage = dir.path().join("garbage.ttf");
        fs::write(&empty, b"").unwrap();
        fs::write(&garbage, b"This is not a font file").unwrap();

        let loader = FontLoader::new();
        assert!(matches!(loader.load_font_data(&empty), Err(Error::Font(_))));
        assert!(matches!(loader.load_font_data(&garbage), Err(Error::Font(_))));
        assert_eq!(loader.cache_count(), 0);
    }

    #[test]
    fn test_header_only_file_fails_to_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("truncated.ttf");
        fs::write(&path, [0x00, 0x01, 0x00, 0x00]).unwrap();

        let loader = FontLoader::new();
        let err = loader.load_font_data(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_cache_accounting() {
        let loader = FontLoader::with_cache_size(10);
        loader.remember(PathBuf::from("a"), Arc::new(vec![0; 6]));
        loader.remember(PathBuf::from("b"), Arc::new(vec![0; 6]));
        assert_eq!(loader.cache_count(), 1);
        assert_eq!(loader.cache_size(), 6);

        loader.remember(PathBuf::from("a"), Arc::new(vec![0; 3]));
        assert_eq!(loader.cache_size(), 3);

        loader.clear_cache();
        assert_eq!(loader.cache_size(), 0);
    }
}
