#![allow(dead_code)]

use proto_face::PixelSink;

pub const CLEAR: u16 = 4;
pub const END: u16 = 5;

/// Panel fake that records every write
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub pixels: Vec<(u16, u16, u16)>,
    pub spans: usize,
    pub fills: Vec<u16>,
}

impl RecordingSink {
    pub fn pixel_at(&self, x: u16, y: u16) -> Option<u16> {
        self.pixels
            .iter()
            .rev()
            .find(|(px, py, _)| *px == x && *py == y)
            .map(|(_, _, color)| *color)
    }
}

impl PixelSink for RecordingSink {
    fn draw_pixel(&mut self, x: u16, y: u16, color: u16) {
        self.pixels.push((x, y, color));
    }

    fn write_span(&mut self, x: u16, y: u16, colors: &[u16]) {
        self.spans += 1;
        for (offset, color) in colors.iter().enumerate() {
            self.pixels.push((x + offset as u16, y, *color));
        }
    }

    fn fill_screen(&mut self, color: u16) {
        self.fills.push(color);
    }
}

/// Pack LZW codes of the given widths LSB-first into a raw byte stream
pub fn pack_bits(codes: impl IntoIterator<Item = (u16, u8)>) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut acc = 0u32;
    let mut count = 0;
    for (code, width) in codes {
        acc |= u32::from(code) << count;
        count += u32::from(width);
        while count >= 8 {
            bytes.push(acc as u8);
            acc >>= 8;
            count -= 8;
        }
    }
    if count > 0 {
        bytes.push(acc as u8);
    }
    bytes
}

/// Split raw image data into sub-blocks, terminator included
pub fn sub_blocks(bytes: &[u8]) -> Vec<u8> {
    let mut blocks = Vec::new();
    for chunk in bytes.chunks(255) {
        blocks.push(chunk.len() as u8);
        blocks.extend_from_slice(chunk);
    }
    blocks.push(0);
    blocks
}

/// Emit literal indices without ever sending a clear code
///
/// Widths follow the decoder: every code after the first defines a table
/// entry until the table holds 4096 codes, and the width grows whenever the
/// next entry needs another bit, up to 12. Once the table is full the stream
/// keeps going at 12 bits.
pub fn literals_without_clear(min_code_size: u8, indices: &[u8]) -> Vec<u8> {
    let clear = 1u16 << min_code_size;
    let mut width = min_code_size + 1;
    let mut next = clear + 2;
    let mut codes = vec![(clear, width)];
    for (position, index) in indices.iter().enumerate() {
        codes.push((u16::from(*index), width));
        if position > 0 && next < 4096 {
            next += 1;
            if next == 1 << width && width < 12 {
                width += 1;
            }
        }
    }
    codes.push((clear + 1, width));
    pack_bits(codes)
}

/// Deterministic pseudo-random indices below `limit`
pub fn noise(len: usize, limit: u16, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((state >> 16) % u32::from(limit)) as u8
        })
        .collect()
}

/// Encode palette indices (0..=3) with min code size 2
///
/// A clear code precedes every pair of indices so the code width stays at
/// 3 bits.
pub fn encode_indices(indices: &[u8]) -> Vec<u16> {
    let mut codes = Vec::new();
    for pair in indices.chunks(2) {
        codes.push(CLEAR);
        codes.extend(pair.iter().map(|index| u16::from(*index)));
    }
    codes.push(END);
    codes
}

/// Minimal single-frame GIF writer with a 4-color global palette
pub struct GifBuilder {
    pub width: u16,
    pub height: u16,
    pub left: u16,
    pub top: u16,
    pub background: u8,
    pub palette: [[u8; 3]; 4],
    pub transparent: Option<u8>,
    pub disposal: u8,
    pub delay_cs: u16,
    pub interlaced: bool,
    /// LZW minimum code size written before the image data
    pub min_code_size: u8,
}

impl GifBuilder {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            left: 0,
            top: 0,
            background: 0,
            palette: [[0, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]],
            transparent: None,
            disposal: 0,
            delay_cs: 10,
            interlaced: false,
            min_code_size: 2,
        }
    }

    pub fn build(&self, indices: &[u8]) -> Vec<u8> {
        self.build_codes(&encode_indices(indices))
    }

    pub fn build_codes(&self, codes: &[u16]) -> Vec<u8> {
        self.build_raw(&pack_bits(codes.iter().map(|code| (*code, 3))))
    }

    /// Wrap already LZW-compressed image data
    pub fn build_raw(&self, data: &[u8]) -> Vec<u8> {
        let mut gif = b"GIF89a".to_vec();
        gif.extend_from_slice(&self.width.to_le_bytes());
        gif.extend_from_slice(&self.height.to_le_bytes());
        gif.extend_from_slice(&[0x81, self.background, 0]);
        for color in &self.palette {
            gif.extend_from_slice(color);
        }

        let flags = (self.disposal << 2) | u8::from(self.transparent.is_some());
        gif.extend_from_slice(&[0x21, 0xF9, 4, flags]);
        gif.extend_from_slice(&self.delay_cs.to_le_bytes());
        gif.extend_from_slice(&[self.transparent.unwrap_or(0), 0]);

        gif.push(0x2C);
        gif.extend_from_slice(&self.left.to_le_bytes());
        gif.extend_from_slice(&self.top.to_le_bytes());
        gif.extend_from_slice(&self.width.to_le_bytes());
        gif.extend_from_slice(&self.height.to_le_bytes());
        gif.push(if self.interlaced { 0x40 } else { 0 });
        gif.push(self.min_code_size);
        gif.extend_from_slice(&sub_blocks(data));
        gif.push(0x3B);
        gif
    }
}

/// The classic 1x1 fully transparent GIF
pub const TRANSPARENT_PIXEL_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3B,
];

/// Leak a byte buffer so it can live in a `StaticStorage`
pub fn leak(bytes: Vec<u8>) -> &'static [u8] {
    Box::leak(bytes.into_boxed_slice())
}
