// ============================================================================
// PALETTE — fixed-capacity indexed color table
// ============================================================================

/// Maximum number of entries a palette can hold. Pixel data stores palette
/// indices as single bytes, so this bound is load-bearing.
pub const MAX_COLORS: usize = 256;

/// Returned by `color()` for out-of-range indices.
const OPAQUE_BLACK: u32 = 0xFF00_0000;

/// The stock 32-color palette new sprites start with.
pub const PALETTE_32: [u32; 32] = [
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF,
    0x808080, 0xC0C0C0, 0x800000, 0x808000, 0x008000, 0x800080, 0x008080, 0x000080,
    0xFFA500, 0xFFC0CB, 0xA020F0, 0xFFD700, 0xA52A2A, 0x228B22, 0x4169E1, 0x20B2AA,
    0x4B0082, 0xDC143C, 0xFF1493, 0x2F4F4F, 0x00CED1, 0x9400D3, 0x87CEEB, 0x696969,
];

/// Ordered color table, insertion order = palette index. Colors are stored
/// packed as `0xFFRRGGBB`; the alpha byte of inputs is ignored. Index 0 is
/// treated as transparent by the encoders, not by the palette itself.
#[derive(Clone, Debug)]
pub struct Palette {
    name: String,
    colors: Vec<u32>,
}

impl Palette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colors: Vec::new(),
        }
    }

    /// Add a color, returning its index. If the RGB value (alpha ignored) is
    /// already present, the existing index is returned instead of appending.
    /// Returns `None` once the palette holds [`MAX_COLORS`] entries.
    pub fn add_color(&mut self, rgb: u32) -> Option<u8> {
        if let Some(existing) = self.find_color(rgb) {
            return Some(existing);
        }
        if self.colors.len() >= MAX_COLORS {
            return None;
        }
        self.colors.push(rgb | OPAQUE_BLACK);
        Some((self.colors.len() - 1) as u8)
    }

    /// Remove the entry at `index`, shifting later entries down one slot.
    /// Note that pixel data referencing shifted indices is not rewritten.
    pub fn remove_color(&mut self, index: usize) -> bool {
        if index >= self.colors.len() {
            return false;
        }
        self.colors.remove(index);
        true
    }

    /// Overwrite the entry at `index` in place.
    pub fn set_color(&mut self, index: usize, rgb: u32) -> bool {
        if index >= self.colors.len() {
            return false;
        }
        self.colors[index] = rgb | OPAQUE_BLACK;
        true
    }

    /// Packed `0xFFRRGGBB` value of the entry at `index`; opaque black for
    /// indices past the current count.
    pub fn color(&self, index: u8) -> u32 {
        self.colors
            .get(index as usize)
            .copied()
            .unwrap_or(OPAQUE_BLACK)
    }

    /// Exact-match lookup (alpha ignored).
    pub fn find_color(&self, rgb: u32) -> Option<u8> {
        let target = rgb | OPAQUE_BLACK;
        self.colors
            .iter()
            .position(|&c| c == target)
            .map(|i| i as u8)
    }

    /// Index of the entry minimizing squared RGB distance to `rgb`.
    /// Ties resolve to the lowest index (stable linear scan). Returns 0 for
    /// an empty palette.
    pub fn find_nearest_color(&self, rgb: u32) -> u8 {
        let (r, g, b) = channels(rgb);
        let mut best_index = 0u8;
        let mut best_distance = i32::MAX;
        for (i, &c) in self.colors.iter().enumerate() {
            let (cr, cg, cb) = channels(c);
            let (dr, dg, db) = (r - cr, g - cg, b - cb);
            let distance = dr * dr + dg * dg + db * db;
            if distance < best_distance {
                best_distance = distance;
                best_index = i as u8;
            }
        }
        best_index
    }

    /// Append `steps` entries linearly interpolated from `start` to `end`,
    /// each channel independently. Entries go through [`add_color`], so
    /// duplicates collapse onto existing indices.
    ///
    /// [`add_color`]: Palette::add_color
    pub fn generate_gradient(&mut self, start: u32, end: u32, steps: u32) {
        if steps == 0 {
            return;
        }
        let (sr, sg, sb) = channels(start);
        let (er, eg, eb) = channels(end);
        for i in 0..steps as i32 {
            if self.colors.len() >= MAX_COLORS {
                break;
            }
            let r = sr + (er - sr) * i / steps as i32;
            let g = sg + (eg - sg) * i / steps as i32;
            let b = sb + (eb - sb) * i / steps as i32;
            let color = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
            self.add_color(color);
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// All entries in index order, packed `0xFFRRGGBB`.
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Rebuild a palette from stored entries without de-duplication, so
    /// saved index assignments survive a load intact. Truncates past
    /// [`MAX_COLORS`].
    pub(crate) fn from_raw_colors(name: impl Into<String>, colors: Vec<u32>) -> Self {
        let mut colors: Vec<u32> = colors.into_iter().map(|c| c | OPAQUE_BLACK).collect();
        colors.truncate(MAX_COLORS);
        Self {
            name: name.into(),
            colors,
        }
    }

    // ---- factory presets ----------------------------------------------------

    pub fn default_32() -> Self {
        let mut pal = Self::new("Default 32");
        for &c in &PALETTE_32 {
            pal.add_color(c);
        }
        pal
    }

    pub fn game_boy() -> Self {
        let mut pal = Self::new("GameBoy");
        pal.add_color(0x0F380F);
        pal.add_color(0x306230);
        pal.add_color(0x8BAC0F);
        pal.add_color(0x9BBC0F);
        pal
    }

    pub fn nes() -> Self {
        let mut pal = Self::new("NES");
        const NES_COLORS: [u32; 56] = [
            0x7C7C7C, 0x0000FC, 0x0000BC, 0x4428BC, 0x940084, 0xA80020, 0xA81000, 0x881400,
            0x503000, 0x007800, 0x006800, 0x005800, 0x004058, 0x000000, 0x000000, 0x000000,
            0xBCBCBC, 0x0078F8, 0x0058F8, 0x6844FC, 0xD800CC, 0xE40058, 0xF83800, 0xE45C10,
            0xAC7C00, 0x00B800, 0x00A800, 0x00A844, 0x008888, 0x000000, 0x000000, 0x000000,
            0xF8F8F8, 0x3CBCFC, 0x6888FC, 0x9878F8, 0xF878F8, 0xF85898, 0xF87858, 0xFCA044,
            0xF8B800, 0xB8F818, 0x58D854, 0x58F898, 0x00E8D8, 0x787878, 0x000000, 0x000000,
            0xFCFCFC, 0xA4E4FC, 0xB8B8F8, 0xD8B8F8, 0xF8B8F8, 0xF8A4C0, 0xF0D0B0, 0xFCE0A8,
        ];
        for &c in &NES_COLORS {
            pal.add_color(c);
        }
        pal
    }

    pub fn cga() -> Self {
        let mut pal = Self::new("CGA");
        const CGA_COLORS: [u32; 16] = [
            0x000000, 0x0000AA, 0x00AA00, 0x00AAAA,
            0xAA0000, 0xAA00AA, 0xAA5500, 0xAAAAAA,
            0x555555, 0x5555FF, 0x55FF55, 0x55FFFF,
            0xFF5555, 0xFF55FF, 0xFFFF55, 0xFFFFFF,
        ];
        for &c in &CGA_COLORS {
            pal.add_color(c);
        }
        pal
    }
}

/// Split a packed color into (R, G, B) as i32 for distance math.
#[inline]
fn channels(c: u32) -> (i32, i32, i32) {
    (
        ((c >> 16) & 0xFF) as i32,
        ((c >> 8) & 0xFF) as i32,
        (c & 0xFF) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_color_dedupes() {
        let mut pal = Palette::new("test");
        let a = pal.add_color(0x112233).unwrap();
        let b = pal.add_color(0x445566).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        // Re-adding returns the existing index; alpha byte is ignored
        assert_eq!(pal.add_color(0x112233), Some(0));
        assert_eq!(pal.add_color(0xCC112233), Some(0));
        assert_eq!(pal.len(), 2);
    }

    #[test]
    fn add_color_fails_at_capacity() {
        let mut pal = Palette::new("full");
        for i in 0..MAX_COLORS as u32 {
            assert!(pal.add_color(i).is_some());
        }
        assert_eq!(pal.len(), MAX_COLORS);
        assert_eq!(pal.add_color(0xABCDEF), None);
        // An already-present color still resolves at capacity
        assert_eq!(pal.add_color(5), Some(5));
    }

    #[test]
    fn nearest_color_exact_match_is_identity() {
        let pal = Palette::default_32();
        for (i, &c) in pal.colors().iter().enumerate() {
            let idx = pal.find_nearest_color(c);
            assert_eq!(idx as usize, i);
            // Idempotent: looking up the resolved color again gives the same index
            assert_eq!(pal.find_nearest_color(pal.color(idx)), idx);
        }
    }

    #[test]
    fn nearest_color_ties_pick_lowest_index() {
        let mut pal = Palette::new("ties");
        pal.add_color(0x000000);
        pal.add_color(0x000004); // same distance from 0x000002 as index 0
        assert_eq!(pal.find_nearest_color(0x000002), 0);
    }

    #[test]
    fn gradient_appends_interpolated_steps() {
        let mut pal = Palette::new("grad");
        pal.generate_gradient(0x000000, 0x0000FF, 4);
        assert_eq!(pal.len(), 4);
        assert_eq!(pal.color(0), 0xFF000000);
        assert_eq!(pal.color(1), 0xFF00003F);
        assert_eq!(pal.color(2), 0xFF00007F);
        assert_eq!(pal.color(3), 0xFF0000BF);
    }

    #[test]
    fn gradient_of_constant_color_collapses() {
        let mut pal = Palette::new("flat");
        pal.generate_gradient(0x808080, 0x808080, 10);
        assert_eq!(pal.len(), 1);
    }

    #[test]
    fn presets_have_expected_sizes() {
        assert_eq!(Palette::default_32().len(), 32);
        assert_eq!(Palette::game_boy().len(), 4);
        assert_eq!(Palette::cga().len(), 16);
        // The NES table contains duplicate blacks which collapse on insert
        assert!(Palette::nes().len() < 56);
    }

    #[test]
    fn remove_color_shifts_entries() {
        let mut pal = Palette::cga();
        assert!(pal.remove_color(0));
        assert_eq!(pal.len(), 15);
        assert_eq!(pal.color(0), 0xFF0000AA);
        assert!(!pal.remove_color(99));
    }

    #[test]
    fn color_out_of_range_is_opaque_black() {
        let pal = Palette::game_boy();
        assert_eq!(pal.color(200), 0xFF000000);
    }
}
