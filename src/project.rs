use std::path::PathBuf;
use uuid::Uuid;

use crate::history::UndoManager;
use crate::sprite::{Sprite, SpriteError};

/// Default animation playback speed for new projects.
pub const DEFAULT_FPS: u32 = 8;

/// Single open document: the sprite, its undo history, and file state.
pub struct Project {
    pub id: Uuid,
    pub sprite: Sprite,
    pub undo: UndoManager,
    /// `None` for unsaved/untitled projects.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,

    /// Display name (derived from path or "Untitled-X")
    pub name: String,

    /// Animation playback/export speed in frames per second.
    pub fps: u32,
}

impl Project {
    pub fn new_untitled(
        untitled_counter: usize,
        width: u32,
        height: u32,
    ) -> Result<Self, SpriteError> {
        let name = format!("Untitled-{}", untitled_counter);

        Ok(Self {
            id: Uuid::new_v4(),
            sprite: Sprite::new(width, height)?,
            undo: UndoManager::default(),
            path: None,
            is_dirty: false,
            name,
            fps: DEFAULT_FPS,
        })
    }

    pub fn from_file(path: PathBuf, sprite: Sprite, fps: u32) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            id: Uuid::new_v4(),
            sprite,
            undo: UndoManager::default(),
            path: Some(path),
            is_dirty: false,
            name,
            fps,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    /// File stem used when exporting without an explicit name.
    pub fn export_stem(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }
}
