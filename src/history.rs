use std::collections::VecDeque;

use crate::sprite::Sprite;

// ============================================================================
// UNDO MANAGER — bounded ring of single-layer pixel snapshots
// ============================================================================

/// Default number of undo states kept.
pub const DEFAULT_UNDO_STATES: usize = 10;

/// A captured copy of one layer's raw index bytes plus the dimensions they
/// were taken at. Layer flags and the alpha mask are not part of a snapshot.
struct LayerSnapshot {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

/// Bounded undo stack for the active layer of whatever sprite it is handed.
/// When full, the oldest snapshot is evicted. Undo consumes snapshots; there
/// is no redo.
///
/// The manager holds no reference back to the sprite — callers pass it in at
/// save/undo time.
pub struct UndoManager {
    snapshots: VecDeque<LayerSnapshot>,
    max_states: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_STATES)
    }
}

impl UndoManager {
    pub fn new(max_states: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(max_states),
            max_states,
        }
    }

    /// Capture the current frame's active layer before a mutation. Evicts
    /// the oldest snapshot when the stack is at capacity. A sprite whose
    /// active layer is not a pixel layer is ignored.
    pub fn save_state(&mut self, sprite: &Sprite) {
        let Some(layer) = sprite
            .current_frame()
            .and_then(|f| f.active_layer())
            .and_then(|l| l.as_pixel())
        else {
            return;
        };
        if self.snapshots.len() >= self.max_states {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(LayerSnapshot {
            pixels: layer.raw_pixels().to_vec(),
            width: layer.width(),
            height: layer.height(),
        });
    }

    /// Restore the most recent snapshot into the sprite's active layer and
    /// discard it. Returns false when no snapshot is available.
    pub fn undo(&mut self, sprite: &mut Sprite) -> bool {
        let Some(snapshot) = self.snapshots.pop_back() else {
            return false;
        };
        if let Some(layer) = sprite
            .current_frame_mut()
            .and_then(|f| f.active_layer_mut())
            .and_then(|l| l.as_pixel_mut())
        {
            layer.restore_raw_pixels(&snapshot.pixels);
        }
        true
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn max_states(&self) -> usize {
        self.max_states
    }

    /// Dimensions captured with the newest snapshot, if any.
    pub fn latest_dimensions(&self) -> Option<(u32, u32)> {
        self.snapshots.back().map(|s| (s.width, s.height))
    }
}
