// Byte-exact checks of the exported container formats, driven through the
// public Sprite + export APIs.

use pretty_assertions::assert_eq;

use spritecel::export::{bmp, gif, png};
use spritecel::sprite::Sprite;

/// White in the stock 32-color palette.
const WHITE_INDEX: u8 = 1;

fn filled_sprite(w: u32, h: u32, color: u8) -> Sprite {
    let mut sprite = Sprite::new(w, h).unwrap();
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            sprite.set_pixel(x, y, color);
        }
    }
    sprite
}

#[test]
fn bmp_file_size_follows_the_formula() {
    // Encoder-level check with the canonical 2×2 fully-white example
    let composite = vec![0xFFFF_FFFFu32; 4];
    let bytes = bmp::encode(&composite, 2, 2);
    assert_eq!(bytes.len(), (54 + ((2 * 3 + 3) & !3) * 2) as usize);

    // Full pipeline: an 8×8 sprite exports 54 + row(24) * 8 bytes
    let tmp = tempfile::tempdir().unwrap();
    let sprite = filled_sprite(8, 8, WHITE_INDEX);
    let path = bmp::export(&sprite, tmp.path(), "white").unwrap();
    assert_eq!(path.file_name().unwrap(), "white.bmp");
    let written = std::fs::read(&path).unwrap();
    assert_eq!(written.len(), 54 + 24 * 8);
    // All-white image data (rows of 8×3 bytes, no padding at width 8)
    assert!(written[54..].iter().all(|&b| b == 0xFF));
}

#[test]
fn bmp_white_equals_transparent_white_remap() {
    // A fully transparent sprite and a fully white sprite encode identically:
    // the format maps transparency to opaque white.
    let transparent = Sprite::new(8, 8).unwrap();
    let white = filled_sprite(8, 8, WHITE_INDEX);
    let a = bmp::encode(&transparent.composite_current_frame().unwrap(), 8, 8);
    let b = bmp::encode(&white.composite_current_frame().unwrap(), 8, 8);
    assert_eq!(a, b);
}

#[test]
fn png_export_walks_as_valid_chunks() {
    let tmp = tempfile::tempdir().unwrap();
    let mut sprite = Sprite::new(16, 16).unwrap();
    sprite.set_pixel(3, 4, 5);
    let path = png::export(&sprite, tmp.path(), "dot").unwrap();
    let bytes = std::fs::read(&path).unwrap();

    assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

    let mut offset = 8;
    let mut seen = Vec::new();
    while offset < bytes.len() {
        let len = u32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap()) as usize;
        let ty = bytes[offset + 4..offset + 8].to_vec();
        let data = &bytes[offset + 8..offset + 8 + len];
        let stored_crc =
            u32::from_be_bytes(bytes[offset + 8 + len..offset + 12 + len].try_into().unwrap());
        assert_eq!(stored_crc, png::crc32(&ty, data), "bad CRC for {:?}", ty);
        seen.push((ty, len));
        offset += 12 + len;
    }
    assert_eq!(offset, bytes.len());

    let types: Vec<&[u8]> = seen.iter().map(|(t, _)| t.as_slice()).collect();
    assert_eq!(types, [b"IHDR".as_slice(), b"PLTE", b"IDAT", b"IEND"]);
    // IHDR is 13 bytes; PLTE holds 32 RGB triples; IDAT is h * (1 + w) literal
    // bytes (no compression); IEND is empty.
    assert_eq!(seen[0].1, 13);
    assert_eq!(seen[1].1, 32 * 3);
    assert_eq!(seen[2].1, 16 * (1 + 16));
    assert_eq!(seen[3].1, 0);
}

#[test]
fn png_idat_stores_the_drawn_index() {
    let mut sprite = Sprite::new(8, 8).unwrap();
    sprite.set_pixel(2, 1, 7);
    let bytes = png::encode(
        &sprite.composite_current_frame().unwrap(),
        8,
        8,
        sprite.palette(),
    );
    // IDAT data starts after signature + IHDR chunk (25) + PLTE chunk (12 + 96)
    // + IDAT length/type (8)
    let idat = 8 + 25 + 12 + 96 + 8;
    // Row 1 begins at 1 filter byte + 8 pixels + 1 filter byte
    assert_eq!(bytes[idat + (1 + 8) + 1 + 2], 7);
    // Every other pixel stays index 0
    assert_eq!(bytes[idat], 0); // filter byte of row 0
    assert_eq!(bytes[idat + 1], 0);
}

#[test]
fn gif_five_frames_five_control_pairs_one_trailer() {
    let tmp = tempfile::tempdir().unwrap();
    let mut sprite = Sprite::new(8, 8).unwrap();
    for _ in 0..4 {
        sprite.add_frame();
    }
    assert_eq!(sprite.frame_count(), 5);

    let path = gif::export(&sprite, tmp.path(), "anim", 8).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    assert_eq!(&bytes[0..6], b"GIF89a");
    let gce_count = bytes
        .windows(3)
        .filter(|w| w == &[0x21, 0xF9, 0x04])
        .count();
    let descriptor_count = count_image_descriptors(&bytes);
    assert_eq!(gce_count, 5);
    assert_eq!(descriptor_count, 5);
    assert_eq!(*bytes.last().unwrap(), 0x3B);
    assert_eq!(bytes.iter().filter(|&&b| b == 0x3B).count(), countable_trailers(&bytes));
}

/// Image descriptors for a full-size frame: 0x2C, left=0, top=0, w, h, flags=0.
fn count_image_descriptors(bytes: &[u8]) -> usize {
    bytes
        .windows(10)
        .filter(|w| {
            w[0] == 0x2C
                && w[1..5] == [0, 0, 0, 0]
                && u16::from_le_bytes([w[5], w[6]]) == 8
                && u16::from_le_bytes([w[7], w[8]]) == 8
                && w[9] == 0
        })
        .count()
}

/// All-transparent 8×8 frames quantize to index 0, so no 0x3B appears inside
/// pixel data — the only 0x3B byte is the trailer itself (palette entries can
/// still contain it, so count those too).
fn countable_trailers(bytes: &[u8]) -> usize {
    // Global color table occupies bytes 13..781
    1 + bytes[13..781].iter().filter(|&&b| b == 0x3B).count()
}

#[test]
fn gif_respects_slot_order_with_holes() {
    let tmp = tempfile::tempdir().unwrap();
    let mut sprite = Sprite::new(8, 8).unwrap();
    sprite.add_frame(); // slot 1
    sprite.add_frame(); // slot 2
    sprite.delete_frame(1);

    let path = gif::export(&sprite, tmp.path(), "holes", 8).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let gce_count = bytes
        .windows(3)
        .filter(|w| w == &[0x21, 0xF9, 0x04])
        .count();
    assert_eq!(gce_count, 2);
}
