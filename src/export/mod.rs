// ============================================================================
// EXPORT — binary container writers for composited sprites
// ============================================================================
//
// Each encoder is an independent writer with two entry points: a pure
// `encode` producing the byte stream, and an `export` wrapper that resolves
// the target path (directory + stem, extension appended here), writes the
// bytes, and reports the outcome. On a write failure a partial file may
// remain; nothing is retried.

pub mod bmp;
pub mod gif;
pub mod png;
pub mod sequence;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::palette::Palette;

/// Error type for export operations.
#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    /// The sprite has no occupied frame to composite.
    NoFrames,
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "I/O error: {}", e),
            ExportError::NoFrames => write!(f, "sprite has no frames to export"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

/// Assemble `dir/stem.ext`. The caller resolves the writable directory; the
/// encoder owns the extension.
pub(crate) fn output_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, extension))
}

pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    fs::write(path, bytes)?;
    Ok(())
}

/// Map a composited `0xAARRGGBB` buffer back to palette indices: a fully
/// transparent pixel becomes index 0, everything else the nearest palette
/// entry to its RGB value.
pub(crate) fn quantize(composite: &[u32], palette: &Palette) -> Vec<u8> {
    composite
        .iter()
        .map(|&argb| {
            if argb == 0 {
                0
            } else {
                palette.find_nearest_color(argb & 0x00FF_FFFF)
            }
        })
        .collect()
}
