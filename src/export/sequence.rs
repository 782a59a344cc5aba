use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::sprite::Sprite;

use super::{ExportError, png, write_bytes};

// ============================================================================
// FRAME SEQUENCE — numbered per-frame stills for video assembly
// ============================================================================

/// Export every occupied frame as `frame_001.png`, `frame_002.png`, … into a
/// `{stem}_sequence/` directory under `dir`, plus a `README.txt` with the
/// ffmpeg invocation that assembles the sequence into a video. Returns the
/// sequence directory.
pub fn export(sprite: &Sprite, dir: &Path, stem: &str, fps: u32) -> Result<PathBuf, ExportError> {
    let slots: Vec<usize> = sprite.occupied_slots().collect();
    if slots.is_empty() {
        return Err(ExportError::NoFrames);
    }

    let sequence_dir = dir.join(format!("{}_sequence", stem));
    fs::create_dir_all(&sequence_dir)?;

    let palette = sprite.palette();
    let encoded: Vec<Vec<u8>> = slots
        .par_iter()
        .filter_map(|&i| sprite.frame(i).map(|f| f.composite(palette)))
        .map(|composite| png::encode(&composite, sprite.width(), sprite.height(), palette))
        .collect();

    for (n, bytes) in encoded.iter().enumerate() {
        let path = sequence_dir.join(format!("frame_{:03}.png", n + 1));
        write_bytes(&path, bytes)?;
    }

    write_bytes(
        &sequence_dir.join("README.txt"),
        readme(encoded.len(), fps).as_bytes(),
    )?;

    Ok(sequence_dir)
}

fn readme(frame_count: usize, fps: u32) -> String {
    format!(
        "SpriteCel Image Sequence Export\n\
         ===============================\n\n\
         Frames: {count}\n\
         FPS: {fps}\n\n\
         To create an MP4 video, use FFmpeg:\n\n\
         ffmpeg -framerate {fps} -i frame_%03d.png -c:v libx264 -pix_fmt yuv420p output.mp4\n\n\
         Or import the sequence into your video editor as an image sequence.\n\
         The sequence will play at {fps} FPS.\n",
        count = frame_count,
        fps = fps
    )
}
