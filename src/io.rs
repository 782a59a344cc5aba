use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, MAX_LAYERS};
use crate::layer::{Layer, PixelLayer};
use crate::palette::{MAX_COLORS, Palette};
use crate::sprite::{MAX_DIMENSION, MAX_FRAMES, MIN_DIMENSION, Sprite};

// ============================================================================
// SCL PROJECT FILE FORMAT
// ============================================================================

/// Magic header for the v1 format.
const SCL_MAGIC_V1: &str = "SCL1";

/// Serializable project file structure.
#[derive(Serialize, Deserialize)]
pub struct SpriteFile {
    magic: String,
    width: u32,
    height: u32,
    current_frame: u32,
    /// Playback speed carried alongside the raster data.
    fps: u32,
    palette: PaletteData,
    /// Sparse slots — holes are preserved across save/load.
    frames: Vec<Option<FrameData>>,
}

#[derive(Serialize, Deserialize)]
struct PaletteData {
    name: String,
    colors: Vec<u32>,
}

#[derive(Serialize, Deserialize)]
struct FrameData {
    duration: u32,
    active_layer: u32,
    layers: Vec<LayerData>,
}

#[derive(Serialize, Deserialize)]
struct LayerData {
    name: String,
    visible: bool,
    locked: bool,
    opacity: u8,
    pixels: Vec<u8>,
    alpha_mask: Option<Vec<u8>>,
}

/// Error type for project file operations.
#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::Io(e) => write!(f, "I/O error: {}", e),
            ProjectError::Serialize(e) => write!(f, "Serialization error: {}", e),
            ProjectError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<std::io::Error> for ProjectError {
    fn from(e: std::io::Error) -> Self {
        ProjectError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for ProjectError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        ProjectError::Serialize(e.to_string())
    }
}

/// Save a sprite as a .scl project file.
pub fn save_sprite(sprite: &Sprite, fps: u32, path: &Path) -> Result<(), ProjectError> {
    let file = build_sprite_file(sprite, fps);
    write_sprite_file(&file, path)
}

/// Build the serializable project data from a sprite. This copies all pixel
/// payloads — take it under whatever lock guards the sprite, then move the
/// result to a background thread for serialization.
pub fn build_sprite_file(sprite: &Sprite, fps: u32) -> SpriteFile {
    let frames = (0..MAX_FRAMES)
        .map(|i| {
            sprite.frame(i).map(|frame| FrameData {
                duration: frame.duration(),
                active_layer: frame.active_layer_index() as u32,
                layers: frame
                    .layers()
                    .iter()
                    .map(|layer| match layer {
                        Layer::Pixel(l) => LayerData {
                            name: l.name.clone(),
                            visible: l.visible,
                            locked: l.locked,
                            opacity: l.opacity,
                            pixels: l.raw_pixels().to_vec(),
                            alpha_mask: l.alpha_mask().map(|m| m.to_vec()),
                        },
                    })
                    .collect(),
            })
        })
        .collect();

    SpriteFile {
        magic: SCL_MAGIC_V1.to_string(),
        width: sprite.width(),
        height: sprite.height(),
        current_frame: sprite.current_frame_index() as u32,
        fps,
        palette: PaletteData {
            name: sprite.palette().name().to_string(),
            colors: sprite.palette().colors().to_vec(),
        },
        frames,
    }
}

/// Serialize + write a pre-built SpriteFile to disk.
/// Safe to call on a background thread.
pub fn write_sprite_file(file: &SpriteFile, path: &Path) -> Result<(), ProjectError> {
    let out = File::create(path)?;
    let writer = BufWriter::new(out);
    bincode::serialize_into(writer, file)?;
    Ok(())
}

/// Load a .scl project file, returning the sprite and its stored FPS.
pub fn load_sprite(path: &Path) -> Result<(Sprite, u32), ProjectError> {
    let raw = std::fs::read(path)?;
    if raw.len() < 12 {
        return Err(ProjectError::InvalidFormat("File too small".into()));
    }

    // bincode encodes a String as an 8-byte length prefix + UTF-8 data, so
    // the 4-char magic sits at bytes 8..12.
    let magic = std::str::from_utf8(&raw[8..12]).unwrap_or("");
    if magic != SCL_MAGIC_V1 {
        return Err(ProjectError::InvalidFormat(format!(
            "Unknown magic '{}'",
            magic
        )));
    }

    let file: SpriteFile = bincode::deserialize(&raw)?;
    reconstruct(file)
}

fn reconstruct(file: SpriteFile) -> Result<(Sprite, u32), ProjectError> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&file.width)
        || !(MIN_DIMENSION..=MAX_DIMENSION).contains(&file.height)
    {
        return Err(ProjectError::InvalidFormat(format!(
            "Sprite size {}x{} outside the allowed {}-{} range",
            file.width, file.height, MIN_DIMENSION, MAX_DIMENSION
        )));
    }
    if file.frames.len() > MAX_FRAMES {
        return Err(ProjectError::InvalidFormat(format!(
            "Project contains {} frame slots, maximum is {}",
            file.frames.len(),
            MAX_FRAMES
        )));
    }
    if file.frames.iter().all(|f| f.is_none()) {
        return Err(ProjectError::InvalidFormat(
            "Project contains no frames".into(),
        ));
    }
    if file.palette.colors.len() > MAX_COLORS {
        return Err(ProjectError::InvalidFormat(format!(
            "Palette holds {} colors, maximum is {}",
            file.palette.colors.len(),
            MAX_COLORS
        )));
    }

    let expected_pixels = (file.width * file.height) as usize;

    let mut sprite = Sprite::new(file.width, file.height)
        .map_err(|e| ProjectError::InvalidFormat(e.to_string()))?;
    sprite.clear_frames();
    sprite.set_palette(Palette::from_raw_colors(file.palette.name, file.palette.colors));

    for (slot, frame_data) in file.frames.into_iter().enumerate() {
        let Some(fd) = frame_data else { continue };
        if fd.layers.is_empty() || fd.layers.len() > MAX_LAYERS {
            return Err(ProjectError::InvalidFormat(format!(
                "Frame {} has {} layers, expected 1-{}",
                slot,
                fd.layers.len(),
                MAX_LAYERS
            )));
        }
        let mut layers = Vec::with_capacity(fd.layers.len());
        for ld in fd.layers {
            if ld.pixels.len() != expected_pixels {
                return Err(ProjectError::InvalidFormat(format!(
                    "Layer '{}' in frame {} has {} pixel bytes, expected {}",
                    ld.name,
                    slot,
                    ld.pixels.len(),
                    expected_pixels
                )));
            }
            let mut layer = PixelLayer::new(file.width, file.height, ld.name.clone());
            layer.set_raw_pixels(ld.pixels);
            if let Some(mask) = ld.alpha_mask
                && !layer.set_alpha_mask(mask)
            {
                return Err(ProjectError::InvalidFormat(format!(
                    "Layer '{}' in frame {} has a mismatched alpha mask",
                    ld.name, slot
                )));
            }
            layer.visible = ld.visible;
            layer.locked = ld.locked;
            layer.opacity = ld.opacity.min(100);
            layers.push(Layer::Pixel(layer));
        }
        let mut frame = Frame::new(file.width, file.height);
        frame.set_layers(layers, fd.active_layer as usize);
        frame.set_duration(fd.duration);
        sprite.install_frame(slot, frame);
    }

    let current = file.current_frame as usize;
    if sprite.frame(current).is_none() {
        return Err(ProjectError::InvalidFormat(format!(
            "Current frame index {} points at an empty slot",
            current
        )));
    }
    sprite.set_current_frame_index_unchecked(current);

    Ok((sprite, file.fps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_sprite() -> Sprite {
        let mut sprite = Sprite::new(16, 16).unwrap();
        sprite.set_pixel(3, 3, 5);
        sprite.current_frame_mut().unwrap().add_pixel_layer("Inks");
        sprite.set_pixel(4, 4, 7);
        sprite.add_frame();
        sprite.set_pixel(8, 8, 2);
        sprite.current_frame_mut().unwrap().set_duration(120);
        sprite
    }

    #[test]
    fn roundtrip_preserves_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scratch.scl");
        let sprite = scratch_sprite();
        save_sprite(&sprite, 12, &path).unwrap();

        let (loaded, fps) = load_sprite(&path).unwrap();
        assert_eq!(fps, 12);
        assert_eq!(loaded.width(), 16);
        assert_eq!(loaded.frame_count(), 2);
        assert_eq!(loaded.current_frame_index(), 1);
        assert_eq!(loaded.current_frame().unwrap().duration(), 120);
        assert_eq!(loaded.get_pixel(8, 8), 2);

        let frame0 = loaded.frame(0).unwrap();
        assert_eq!(frame0.layer_count(), 2);
        assert_eq!(frame0.layer(0).unwrap().get_pixel(3, 3), 5);
        assert_eq!(frame0.layer(1).unwrap().name(), "Inks");
        assert_eq!(frame0.layer(1).unwrap().get_pixel(4, 4), 7);
        assert_eq!(loaded.palette().colors(), sprite.palette().colors());
    }

    #[test]
    fn holes_survive_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("holes.scl");
        let mut sprite = Sprite::new(8, 8).unwrap();
        sprite.add_frame(); // 1
        sprite.add_frame(); // 2
        sprite.delete_frame(1);
        save_sprite(&sprite, 8, &path).unwrap();

        let (loaded, _) = load_sprite(&path).unwrap();
        assert_eq!(loaded.frame_count(), 2);
        assert!(loaded.frame(0).is_some());
        assert!(loaded.frame(1).is_none());
        assert!(loaded.frame(2).is_some());
    }

    #[test]
    fn rejects_unknown_magic() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bogus.scl");
        // bincode string framing with a wrong tag
        let mut raw = Vec::new();
        raw.extend_from_slice(&4u64.to_le_bytes());
        raw.extend_from_slice(b"NOPE");
        raw.extend_from_slice(&[0u8; 32]);
        std::fs::write(&path, &raw).unwrap();
        match load_sprite(&path) {
            Err(ProjectError::InvalidFormat(msg)) => assert!(msg.contains("NOPE")),
            _ => panic!("expected InvalidFormat"),
        }
    }

    #[test]
    fn rejects_truncated_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tiny.scl");
        std::fs::write(&path, [0u8; 4]).unwrap();
        assert!(matches!(
            load_sprite(&path),
            Err(ProjectError::InvalidFormat(_))
        ));
    }

    #[test]
    fn alpha_mask_roundtrips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mask.scl");
        let mut sprite = Sprite::new(8, 8).unwrap();
        sprite.set_pixel(1, 1, 3);
        if let Some(layer) = sprite
            .current_frame_mut()
            .and_then(|f| f.active_layer_mut())
            .and_then(|l| l.as_pixel_mut())
        {
            layer.set_pixel_alpha(1, 1, 0);
        }
        save_sprite(&sprite, 8, &path).unwrap();
        let (loaded, _) = load_sprite(&path).unwrap();
        // Masked-out cell still reads transparent after the roundtrip
        assert_eq!(loaded.get_pixel(1, 1), 0);
    }
}
