use std::path::{Path, PathBuf};

use crate::sprite::Sprite;

use super::{ExportError, output_path, write_bytes};

// ============================================================================
// BMP — uncompressed 24-bit container
// ============================================================================

/// File header (14 bytes) + BITMAPINFOHEADER (40 bytes).
const HEADER_SIZE: u32 = 54;
/// 2835 pixels per meter ≈ 72 DPI.
const RESOLUTION_PPM: u32 = 2835;

/// Padded byte length of one pixel row.
#[inline]
pub fn row_size(width: u32) -> u32 {
    (width * 3 + 3) & !3
}

/// Encode a composited frame as an uncompressed 24-bit BMP.
///
/// Rows are written bottom-to-top, channels B,G,R, each row padded to a
/// 4-byte boundary. The format stores no transparency: fully transparent
/// composite pixels are re-mapped to opaque white.
pub fn encode(composite: &[u32], width: u32, height: u32) -> Vec<u8> {
    let row = row_size(width);
    let image_size = row * height;
    let file_size = HEADER_SIZE + image_size;

    let mut out = Vec::with_capacity(file_size as usize);

    // -- file header ----------------------------------------------------
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&[0; 4]); // reserved
    out.extend_from_slice(&HEADER_SIZE.to_le_bytes()); // pixel data offset

    // -- info header ----------------------------------------------------
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&[0; 4]); // no compression
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&RESOLUTION_PPM.to_le_bytes());
    out.extend_from_slice(&RESOLUTION_PPM.to_le_bytes());
    out.extend_from_slice(&[0; 4]); // colors used
    out.extend_from_slice(&[0; 4]); // important colors

    // -- pixel rows, bottom to top --------------------------------------
    let mut row_buffer = vec![0u8; row as usize];
    for y in (0..height).rev() {
        let mut i = 0;
        for x in 0..width {
            let argb = composite[(y * width + x) as usize];
            let rgb = if argb == 0 { 0x00FF_FFFF } else { argb };
            row_buffer[i] = (rgb & 0xFF) as u8;
            row_buffer[i + 1] = ((rgb >> 8) & 0xFF) as u8;
            row_buffer[i + 2] = ((rgb >> 16) & 0xFF) as u8;
            i += 3;
        }
        // padding bytes stay zero
        out.extend_from_slice(&row_buffer);
    }

    out
}

/// Export the sprite's current frame to `dir/stem.bmp`.
pub fn export(sprite: &Sprite, dir: &Path, stem: &str) -> Result<PathBuf, ExportError> {
    let composite = sprite
        .composite_current_frame()
        .ok_or(ExportError::NoFrames)?;
    let bytes = encode(&composite, sprite.width(), sprite.height());
    let path = output_path(dir, stem, "bmp");
    write_bytes(&path, &bytes)?;
    Ok(path)
}
