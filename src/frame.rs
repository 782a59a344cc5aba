use crate::layer::{Layer, PixelLayer};
use crate::palette::Palette;

// ============================================================================
// FRAME — one animation cel: an ordered stack of layers
// ============================================================================

/// Maximum number of layers a frame can hold.
pub const MAX_LAYERS: usize = 8;

/// Minimum per-frame display duration in milliseconds.
const MIN_DURATION_MS: u32 = 16;

/// A fixed-size animation cel owning up to [`MAX_LAYERS`] layers plus an
/// active-layer index. A frame always contains at least one layer.
///
/// Compositing iterates from the highest layer index down to index 0, each
/// layer overwriting or opacity-blending against whatever the higher indices
/// already produced. This accumulation order is a documented behavior of the
/// format, not standard alpha compositing — keep it exactly.
#[derive(Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    active_layer_index: usize,
    /// Display duration in milliseconds.
    duration: u32,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let mut frame = Self {
            width,
            height,
            layers: Vec::new(),
            active_layer_index: 0,
            duration: 100,
        };
        frame.add_layer(Layer::Pixel(PixelLayer::new(width, height, "Layer 1")));
        frame
    }

    /// Append a layer and make it active. Fails at capacity.
    pub fn add_layer(&mut self, layer: Layer) -> bool {
        if self.layers.len() >= MAX_LAYERS {
            return false;
        }
        self.layers.push(layer);
        self.active_layer_index = self.layers.len() - 1;
        true
    }

    /// Append a fresh transparent pixel layer and make it active.
    pub fn add_pixel_layer(&mut self, name: impl Into<String>) -> bool {
        self.add_layer(Layer::Pixel(PixelLayer::new(self.width, self.height, name)))
    }

    /// Remove the layer at `index`, shifting later layers down one slot.
    /// Fails for invalid indices or when only one layer remains.
    pub fn delete_layer(&mut self, index: usize) -> bool {
        if index >= self.layers.len() || self.layers.len() <= 1 {
            return false;
        }
        self.layers.remove(index);
        if self.active_layer_index >= self.layers.len() {
            self.active_layer_index = self.layers.len() - 1;
        }
        true
    }

    /// Swap the layer at `index` with the one at `index - 1`. The active
    /// index follows the moved layer.
    pub fn move_layer_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.layers.len() {
            return false;
        }
        self.layers.swap(index, index - 1);
        if self.active_layer_index == index {
            self.active_layer_index -= 1;
        } else if self.active_layer_index == index - 1 {
            self.active_layer_index += 1;
        }
        true
    }

    /// Swap the layer at `index` with the one at `index + 1`.
    pub fn move_layer_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.layers.len() {
            return false;
        }
        self.layers.swap(index, index + 1);
        if self.active_layer_index == index {
            self.active_layer_index += 1;
        } else if self.active_layer_index == index + 1 {
            self.active_layer_index -= 1;
        }
        true
    }

    /// Copy the active layer's non-transparent pixels onto the layer at the
    /// next-higher index (straight overwrite, no opacity blend), then delete
    /// the active layer. Fails when the active layer is already at the
    /// bottom of the stack.
    pub fn merge_layer_down(&mut self) -> bool {
        if self.active_layer_index + 1 >= self.layers.len() {
            return false;
        }
        let upper_idx = self.active_layer_index;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let px = self.layers[upper_idx].get_pixel(x, y);
                if px != 0 {
                    self.layers[upper_idx + 1].set_pixel(x, y, px);
                }
            }
        }
        self.delete_layer(upper_idx)
    }

    /// Replace the whole stack with a single layer holding the composite,
    /// re-quantized through `palette`. Opacity and visibility distinctions
    /// are discarded permanently.
    pub fn flatten(&mut self, palette: &Palette) {
        let composited = self.composite(palette);
        let mut flat = PixelLayer::new(self.width, self.height, "Flattened");
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let argb = composited[y as usize * self.width as usize + x as usize];
                if argb != 0 {
                    flat.set_pixel(x, y, palette.find_nearest_color(argb & 0x00FF_FFFF));
                }
            }
        }
        self.layers = vec![Layer::Pixel(flat)];
        self.active_layer_index = 0;
    }

    /// Produce the packed `0xAARRGGBB` composite of all visible layers.
    ///
    /// Iteration runs from the highest layer index down to 0. Each visible,
    /// non-transparent source pixel resolves its palette color, then either
    /// overwrites the accumulated value (opacity 100) or mixes with it:
    /// `(new * opacity + existing * (100 - opacity)) / 100` per channel.
    /// The alpha byte is forced opaque wherever any pixel lands; untouched
    /// cells stay 0.
    pub fn composite(&self, palette: &Palette) -> Vec<u32> {
        let mut result = vec![0u32; self.width as usize * self.height as usize];
        for layer_idx in (0..self.layers.len()).rev() {
            let layer = &self.layers[layer_idx];
            if !layer.is_visible() {
                continue;
            }
            let opacity = layer.opacity() as u32;
            for y in 0..self.height as i32 {
                for x in 0..self.width as i32 {
                    let px = layer.get_pixel(x, y);
                    if px == 0 {
                        continue;
                    }
                    let idx = y as usize * self.width as usize + x as usize;
                    let color = palette.color(px);
                    if opacity < 100 {
                        let existing = result[idx];
                        let er = (existing >> 16) & 0xFF;
                        let eg = (existing >> 8) & 0xFF;
                        let eb = existing & 0xFF;
                        let nr = (color >> 16) & 0xFF;
                        let ng = (color >> 8) & 0xFF;
                        let nb = color & 0xFF;
                        let br = (nr * opacity + er * (100 - opacity)) / 100;
                        let bg = (ng * opacity + eg * (100 - opacity)) / 100;
                        let bb = (nb * opacity + eb * (100 - opacity)) / 100;
                        result[idx] = 0xFF00_0000 | (br << 16) | (bg << 8) | bb;
                    } else {
                        result[idx] = color | 0xFF00_0000;
                    }
                }
            }
        }
        result
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.get(self.active_layer_index)
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        self.layers.get_mut(self.active_layer_index)
    }

    pub fn active_layer_index(&self) -> usize {
        self.active_layer_index
    }

    pub fn set_active_layer_index(&mut self, index: usize) {
        if index < self.layers.len() {
            self.active_layer_index = index;
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn set_duration(&mut self, ms: u32) {
        self.duration = ms.max(MIN_DURATION_MS);
    }

    /// Install a layer stack wholesale (frame duplication, project loading).
    /// Rejected when `layers` is empty or over capacity; the active index is
    /// clamped into range.
    pub(crate) fn set_layers(&mut self, layers: Vec<Layer>, active: usize) -> bool {
        if layers.is_empty() || layers.len() > MAX_LAYERS {
            return false;
        }
        self.active_layer_index = active.min(layers.len() - 1);
        self.layers = layers;
        true
    }
}
