//! GIF frame decoder
//!
//! Parses the GIF container from a [`ByteSource`] and streams the first image
//! of the file one raster line at a time. Nothing is buffered beyond a single
//! scanline, so memory use is independent of the frame height.

mod lzw;
mod palette;
mod reader;

use core::fmt;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use lzw::LzwTables;
pub use palette::{MAX_PALETTE_SIZE, Palette};
use reader::BlockReader;

use crate::compositor::{MAX_SCANLINE_WIDTH, Scanline};
use crate::source::ByteSource;
use crate::storage::StorageFile;

const BLOCK_EXTENSION: u8 = 0x21;
const BLOCK_IMAGE: u8 = 0x2C;
const BLOCK_TRAILER: u8 = 0x3B;
const LABEL_GRAPHIC_CONTROL: u8 = 0xF9;

const FLAG_COLOR_TABLE: u8 = 0x80;
const FLAG_INTERLACED: u8 = 0x40;
const FLAG_TRANSPARENT: u8 = 0x01;

/// Reason a byte stream could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Stream ended before the frame was complete
    Truncated,
    /// Missing `GIF87a`/`GIF89a` signature
    BadSignature,
    /// Unknown block introducer byte
    UnexpectedBlock(u8),
    /// Graphic control extension shorter than 4 bytes
    MalformedExtension,
    /// Frame wider than [`MAX_SCANLINE_WIDTH`]
    FrameTooWide(u16),
    /// Neither a global nor a local color table
    MissingPalette,
    /// LZW minimum code size outside `1..=8`
    InvalidCodeSize(u8),
    /// LZW code not yet defined
    InvalidCode(u16),
    /// Trailer reached before any image
    NoImage,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => f.write_str("stream truncated"),
            Self::BadSignature => f.write_str("not a GIF stream"),
            Self::UnexpectedBlock(byte) => write!(f, "unexpected block 0x{:02X}", byte),
            Self::MalformedExtension => f.write_str("malformed graphic control extension"),
            Self::FrameTooWide(width) => {
                write!(f, "frame width {} exceeds {}", width, MAX_SCANLINE_WIDTH)
            }
            Self::MissingPalette => f.write_str("no color table"),
            Self::InvalidCodeSize(size) => write!(f, "invalid LZW code size {}", size),
            Self::InvalidCode(code) => write!(f, "invalid LZW code {}", code),
            Self::NoImage => f.write_str("no image in stream"),
        }
    }
}

/// Per-frame instruction for treating the previous frame's pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    /// Leave the previous pixels in place (GIF methods 0 and 1)
    #[default]
    Leave,
    /// Restore to the background color (GIF method 2)
    RestoreBackground,
    /// Restore to the previous frame (GIF method 3)
    RestorePrevious,
}

impl Disposal {
    /// Decode the 3-bit disposal field; reserved values map to [`Disposal::Leave`]
    pub const fn from_raw(value: u8) -> Self {
        match value {
            2 => Self::RestoreBackground,
            3 => Self::RestorePrevious,
            _ => Self::Leave,
        }
    }

    /// Disposal the compositor actually applies
    ///
    /// Restore-to-previous needs a copy of the last frame which the pipeline
    /// never keeps, so it is drawn as [`Disposal::Leave`].
    pub const fn effective(self) -> Self {
        match self {
            Self::RestorePrevious => Self::Leave,
            other => other,
        }
    }
}

/// Geometry and timing of a decoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    /// Declared frame delay in milliseconds
    pub delay_ms: u32,
    /// Disposal as declared in the stream
    pub disposal: Disposal,
    pub transparent: Option<u8>,
    pub interlaced: bool,
}

/// Values from the most recent graphic control extension
#[derive(Debug, Clone, Copy, Default)]
struct GraphicControl {
    disposal: Disposal,
    transparent: Option<u8>,
    delay_cs: u16,
}

/// Row order of the frame being decoded
struct RowCursor {
    height: u16,
    interlaced: bool,
    pass: u8,
    next_row: u16,
    emitted: u16,
}

impl RowCursor {
    const fn new(height: u16, interlaced: bool) -> Self {
        Self {
            height,
            interlaced,
            pass: 0,
            next_row: 0,
            emitted: 0,
        }
    }

    const fn is_done(&self) -> bool {
        self.emitted >= self.height
    }

    /// Frame-relative row for the next decoded line
    fn advance(&mut self) -> u16 {
        const START: [u16; 4] = [0, 4, 2, 1];
        const STEP: [u16; 4] = [8, 8, 4, 2];

        let row = self.next_row;
        self.emitted += 1;
        if !self.interlaced {
            self.next_row += 1;
            return row;
        }

        self.next_row = self.next_row.saturating_add(STEP[usize::from(self.pass)]);
        while self.next_row >= self.height && self.pass < 3 {
            self.pass += 1;
            self.next_row = START[usize::from(self.pass)];
        }
        row
    }
}

/// Streaming GIF decoder that renders the first frame of a file
///
/// Owns the LZW dictionary, the active palette and one scanline buffer, so a
/// single instance can be reused for every playback attempt.
pub struct FrameDecoder {
    palette: Palette,
    lzw: LzwTables,
    row: [u8; MAX_SCANLINE_WIDTH],
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            palette: Palette::new(),
            lzw: LzwTables::new(),
            row: [0; MAX_SCANLINE_WIDTH],
        }
    }

    /// Palette of the last decoded frame
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Decode the header, palettes and first image of the stream
    ///
    /// `draw` is called once per raster line with the line's palette indices.
    /// Lines of a non-interlaced frame arrive top to bottom. On error, lines
    /// already handed to `draw` stay drawn.
    pub fn decode_first_frame<F, D>(
        &mut self,
        source: &mut ByteSource<F>,
        mut draw: D,
    ) -> Result<FrameInfo, DecodeError>
    where
        F: StorageFile,
        D: FnMut(Scanline<'_>),
    {
        let mut reader = BlockReader::new(source);

        let mut signature = [0u8; 6];
        reader.read_exact(&mut signature)?;
        if &signature != b"GIF87a" && &signature != b"GIF89a" {
            return Err(DecodeError::BadSignature);
        }

        // Logical screen descriptor
        reader.skip(4)?;
        let flags = reader.read_u8()?;
        let background = reader.read_u8()?;
        reader.skip(1)?;

        self.palette.clear();
        if flags & FLAG_COLOR_TABLE != 0 {
            self.read_palette(&mut reader, flags)?;
        }

        let mut control = GraphicControl::default();
        loop {
            match reader.read_u8()? {
                BLOCK_EXTENSION => {
                    if reader.read_u8()? == LABEL_GRAPHIC_CONTROL {
                        control = read_graphic_control(&mut reader)?;
                    } else {
                        reader.skip_sub_blocks()?;
                    }
                }
                BLOCK_IMAGE => return self.decode_image(&mut reader, background, control, &mut draw),
                BLOCK_TRAILER => return Err(DecodeError::NoImage),
                other => return Err(DecodeError::UnexpectedBlock(other)),
            }
        }
    }

    fn read_palette<F: StorageFile>(
        &mut self,
        reader: &mut BlockReader<'_, F>,
        flags: u8,
    ) -> Result<(), DecodeError> {
        let count = 2usize << (flags & 0x07);
        let mut triples = [0u8; MAX_PALETTE_SIZE * 3];
        reader.read_exact(&mut triples[..count * 3])?;
        self.palette.set_from_triples(&triples[..count * 3]);
        Ok(())
    }

    fn decode_image<F, D>(
        &mut self,
        reader: &mut BlockReader<'_, F>,
        background: u8,
        control: GraphicControl,
        draw: &mut D,
    ) -> Result<FrameInfo, DecodeError>
    where
        F: StorageFile,
        D: FnMut(Scanline<'_>),
    {
        let left = reader.read_u16()?;
        let top = reader.read_u16()?;
        let width = reader.read_u16()?;
        let height = reader.read_u16()?;
        let flags = reader.read_u8()?;

        if usize::from(width) > MAX_SCANLINE_WIDTH {
            return Err(DecodeError::FrameTooWide(width));
        }
        if flags & FLAG_COLOR_TABLE != 0 {
            self.read_palette(reader, flags)?;
        }
        if self.palette.is_empty() {
            return Err(DecodeError::MissingPalette);
        }

        let info = FrameInfo {
            left,
            top,
            width,
            height,
            delay_ms: u32::from(control.delay_cs) * 10,
            disposal: control.disposal,
            transparent: control.transparent,
            interlaced: flags & FLAG_INTERLACED != 0,
        };
        #[cfg(feature = "esp32-log")]
        if control.disposal == Disposal::RestorePrevious {
            println!("[FrameDecoder.decode_image] restore-to-previous disposal drawn as leave");
        }

        let min_code_size = reader.read_u8()?;
        if width == 0 || height == 0 {
            reader.skip_sub_blocks()?;
            return Ok(info);
        }

        let Self { palette, lzw, row } = self;
        let palette: &Palette = palette;
        let width = usize::from(width);
        let mut rows = RowCursor::new(height, info.interlaced);
        let mut x = 0;
        lzw.decode(reader, min_code_size, |index| {
            row[x] = index;
            x += 1;
            if x < width {
                return false;
            }
            x = 0;
            let y = top.saturating_add(rows.advance());
            draw(Scanline {
                x: left,
                y,
                pixels: &mut row[..width],
                palette,
                disposal: control.disposal.effective(),
                transparent: control.transparent,
                background,
            });
            rows.is_done()
        })?;

        if !rows.is_done() {
            return Err(DecodeError::Truncated);
        }
        Ok(info)
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn read_graphic_control<F: StorageFile>(
    reader: &mut BlockReader<'_, F>,
) -> Result<GraphicControl, DecodeError> {
    let size = reader.read_u8()?;
    if size < 4 {
        return Err(DecodeError::MalformedExtension);
    }
    let flags = reader.read_u8()?;
    let delay_cs = reader.read_u16()?;
    let transparent_index = reader.read_u8()?;
    reader.skip(u32::from(size - 4))?;
    reader.skip_sub_blocks()?;

    Ok(GraphicControl {
        disposal: Disposal::from_raw((flags >> 2) & 0x07),
        transparent: (flags & FLAG_TRANSPARENT != 0).then_some(transparent_index),
        delay_cs,
    })
}
