use std::path::{Path, PathBuf};

use crate::palette::Palette;
use crate::sprite::Sprite;

use super::{ExportError, output_path, quantize, write_bytes};

// ============================================================================
// PNG — indexed-color chunk container
// ============================================================================
//
// The IDAT payload is stored uncompressed: one "no filter" byte per scanline
// followed by literal palette-index bytes. That omission is part of the
// format contract this writer implements — adding DEFLATE would change every
// output byte.

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// CRC-32 over chunk type + chunk data: reflected IEEE polynomial
/// 0xEDB88320, computed bit by bit (no lookup table).
pub fn crc32(type_bytes: &[u8], data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in type_bytes.iter().chain(data) {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = 0xEDB8_8320 ^ (crc >> 1);
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

/// Append one chunk: `{length BE}{type}{data}{CRC BE}`.
fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32(chunk_type, data).to_be_bytes());
}

fn ihdr(width: u32, height: u32) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = 3; // color type: indexed
    // compression, filter, interlace all 0
    data
}

fn plte(palette: &Palette) -> Vec<u8> {
    let mut data = Vec::with_capacity(palette.len() * 3);
    for &color in palette.colors() {
        data.push(((color >> 16) & 0xFF) as u8);
        data.push(((color >> 8) & 0xFF) as u8);
        data.push((color & 0xFF) as u8);
    }
    data
}

/// Per scanline: one zero filter byte, then the row's index bytes.
fn idat(indices: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let mut data = Vec::with_capacity(height as usize * (w + 1));
    for row in indices.chunks(w).take(height as usize) {
        data.push(0);
        data.extend_from_slice(row);
    }
    data
}

/// Encode a composited frame as an indexed-color PNG stream.
pub fn encode(composite: &[u32], width: u32, height: u32, palette: &Palette) -> Vec<u8> {
    let indices = quantize(composite, palette);
    let mut out = Vec::new();
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr(width, height));
    write_chunk(&mut out, b"PLTE", &plte(palette));
    write_chunk(&mut out, b"IDAT", &idat(&indices, width, height));
    write_chunk(&mut out, b"IEND", &[]);
    out
}

/// Export the sprite's current frame to `dir/stem.png`.
pub fn export(sprite: &Sprite, dir: &Path, stem: &str) -> Result<PathBuf, ExportError> {
    let composite = sprite
        .composite_current_frame()
        .ok_or(ExportError::NoFrames)?;
    let bytes = encode(&composite, sprite.width(), sprite.height(), sprite.palette());
    let path = output_path(dir, stem, "png");
    write_bytes(&path, &bytes)?;
    Ok(path)
}
