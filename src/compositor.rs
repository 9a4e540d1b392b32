//! Scanline compositing
//!
//! Turns one line of palette indices into pixel writes. Transparent pixels are
//! skipped so they keep whatever the panel showed before; opaque pixels are
//! coalesced into runs and written as spans.

use crate::PixelSink;
use crate::decoder::{Disposal, Palette};

/// Widest frame the pipeline accepts
///
/// Bounds the scanline buffer and the opaque run buffer. The decoder rejects
/// wider frames before anything is drawn.
pub const MAX_SCANLINE_WIDTH: usize = 320;

/// One decoded raster line
#[derive(Debug)]
pub struct Scanline<'a> {
    /// Panel x of the first pixel
    pub x: u16,
    /// Panel y of the line
    pub y: u16,
    /// Palette indices, one per pixel
    pub pixels: &'a mut [u8],
    pub palette: &'a Palette,
    pub disposal: Disposal,
    pub transparent: Option<u8>,
    /// Background index used by [`Disposal::RestoreBackground`]
    pub background: u8,
}

/// Draw one scanline onto the sink
///
/// Returns the number of pixels written.
#[allow(clippy::cast_possible_truncation)]
pub fn composite<P: PixelSink + ?Sized>(line: Scanline<'_>, sink: &mut P) -> usize {
    let Scanline {
        x,
        y,
        pixels,
        palette,
        disposal,
        mut transparent,
        background,
    } = line;
    let width = pixels.len().min(MAX_SCANLINE_WIDTH);
    let pixels = &mut pixels[..width];

    if disposal == Disposal::RestoreBackground {
        if let Some(transparent) = transparent {
            for pixel in pixels.iter_mut().filter(|pixel| **pixel == transparent) {
                *pixel = background;
            }
        }
        transparent = None;
    }

    let Some(transparent) = transparent else {
        for (offset, &index) in pixels.iter().enumerate() {
            let color = sink.color565(palette.get(index));
            sink.draw_pixel(x.saturating_add(offset as u16), y, color);
        }
        return width;
    };

    let mut run = [0u16; MAX_SCANLINE_WIDTH];
    let mut written = 0;
    let mut cursor = 0;
    while cursor < width {
        // Opaque run
        let start = cursor;
        while cursor < width && pixels[cursor] != transparent {
            run[cursor - start] = sink.color565(palette.get(pixels[cursor]));
            cursor += 1;
        }
        if cursor > start {
            sink.write_span(x.saturating_add(start as u16), y, &run[..cursor - start]);
            written += cursor - start;
        }

        // Transparent run
        while cursor < width && pixels[cursor] == transparent {
            cursor += 1;
        }
    }
    written
}
