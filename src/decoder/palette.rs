use crate::color::Rgb;

/// Maximum number of entries in a GIF color table
pub const MAX_PALETTE_SIZE: usize = 256;

const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Ordered color table addressed by palette index
///
/// Indices past the declared length resolve to black, the same as an unset
/// hardware palette slot.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: [Rgb; MAX_PALETTE_SIZE],
    len: usize,
}

impl Palette {
    /// Create an empty palette
    pub const fn new() -> Self {
        Self {
            colors: [BLACK; MAX_PALETTE_SIZE],
            len: 0,
        }
    }

    /// Build a palette from a list of colors, keeping at most 256 entries
    pub fn from_colors(colors: &[Rgb]) -> Self {
        let mut palette = Self::new();
        let len = colors.len().min(MAX_PALETTE_SIZE);
        palette.colors[..len].copy_from_slice(&colors[..len]);
        palette.len = len;
        palette
    }

    /// Build a palette from packed `r, g, b` triples as stored in a GIF
    pub(crate) fn set_from_triples(&mut self, triples: &[u8]) {
        self.clear();
        for (slot, rgb) in self.colors.iter_mut().zip(triples.chunks_exact(3)) {
            *slot = Rgb::new(rgb[0], rgb[1], rgb[2]);
            self.len += 1;
        }
    }

    /// Color stored at `index`
    #[inline]
    pub fn get(&self, index: u8) -> Rgb {
        self.colors[usize::from(index)]
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget every entry
    pub(crate) fn clear(&mut self) {
        self.colors = [BLACK; MAX_PALETTE_SIZE];
        self.len = 0;
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}
