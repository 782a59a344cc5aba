use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::palette::Palette;
use crate::sprite::Sprite;

use super::{ExportError, output_path, quantize, write_bytes};

// ============================================================================
// GIF — animated GIF89a stream skeleton
// ============================================================================
//
// Frame data is stored as literal index bytes in 255-byte sub-blocks after a
// fixed minimum-code-size byte — no LZW entropy coding. The stream is
// structurally a valid GIF89a skeleton and the layout below is the contract;
// real compression would change the bytes.

/// Global color table size: 256 entries × RGB.
const COLOR_TABLE_BYTES: usize = 768;

fn push_u16_le(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// 256-entry global color table: palette entries in order, padded with black.
fn color_table(palette: &Palette) -> Vec<u8> {
    let mut table = Vec::with_capacity(COLOR_TABLE_BYTES);
    for &color in palette.colors() {
        table.push(((color >> 16) & 0xFF) as u8);
        table.push(((color >> 8) & 0xFF) as u8);
        table.push((color & 0xFF) as u8);
    }
    table.resize(COLOR_TABLE_BYTES, 0);
    table
}

/// NETSCAPE2.0 application extension: loop forever.
fn loop_extension(out: &mut Vec<u8>) {
    out.push(0x21); // extension introducer
    out.push(0xFF); // application extension
    out.push(11);
    out.extend_from_slice(b"NETSCAPE2.0");
    out.push(3); // sub-block size
    out.push(1); // sub-block id
    push_u16_le(out, 0); // loop count 0 = infinite
    out.push(0); // block terminator
}

fn write_frame(out: &mut Vec<u8>, indices: &[u8], width: u16, height: u16, delay_cs: u16) {
    // Graphic control extension
    out.push(0x21);
    out.push(0xF9);
    out.push(4); // block size
    out.push(0x04); // packed field (disposal)
    push_u16_le(out, delay_cs);
    out.push(0); // transparent color index
    out.push(0); // block terminator

    // Image descriptor
    out.push(0x2C);
    push_u16_le(out, 0); // left
    push_u16_le(out, 0); // top
    push_u16_le(out, width);
    push_u16_le(out, height);
    out.push(0); // no local color table

    // Image data: min code size, then literal bytes in sub-blocks
    out.push(8);
    for block in indices.chunks(255) {
        out.push(block.len() as u8);
        out.extend_from_slice(block);
    }
    out.push(0); // block terminator
}

/// Encode pre-composited frames as a looping GIF89a stream. The per-frame
/// delay is `100 / fps` hundredths of a second.
pub fn encode(
    frames: &[Vec<u32>],
    width: u32,
    height: u32,
    fps: u32,
    palette: &Palette,
) -> Vec<u8> {
    let delay_cs = (100 / fps.max(1)) as u16;
    let (w, h) = (width as u16, height as u16);

    let mut out = Vec::new();
    out.extend_from_slice(b"GIF89a");

    // Logical screen descriptor: global color table present, 8 bits, 256 entries
    push_u16_le(&mut out, w);
    push_u16_le(&mut out, h);
    out.push(0xF7);
    out.push(0); // background color index
    out.push(0); // pixel aspect ratio

    out.extend_from_slice(&color_table(palette));
    loop_extension(&mut out);

    for composite in frames {
        let indices = quantize(composite, palette);
        write_frame(&mut out, &indices, w, h, delay_cs);
    }

    out.push(0x3B); // trailer
    out
}

/// Export every occupied frame of the sprite, in slot order, to
/// `dir/stem.gif`. Frame composites are produced in parallel.
pub fn export(sprite: &Sprite, dir: &Path, stem: &str, fps: u32) -> Result<PathBuf, ExportError> {
    let slots: Vec<usize> = sprite.occupied_slots().collect();
    if slots.is_empty() {
        return Err(ExportError::NoFrames);
    }
    let palette = sprite.palette();
    let frames: Vec<Vec<u32>> = slots
        .par_iter()
        .filter_map(|&i| sprite.frame(i).map(|f| f.composite(palette)))
        .collect();

    let bytes = encode(&frames, sprite.width(), sprite.height(), fps, palette);
    let path = output_path(dir, stem, "gif");
    write_bytes(&path, &bytes)?;
    Ok(path)
}
