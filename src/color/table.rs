use crate::PixelSink;
use crate::color::Rgb;

/// Named colors resolved against a ready pixel sink
///
/// Built once the panel is initialized, so the packed values always match
/// the sink's own color format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTable {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub white: u16,
    pub yellow: u16,
    pub cyan: u16,
    pub magenta: u16,
    pub black: u16,
}

impl ColorTable {
    /// Resolve every named color through the sink's packing
    pub fn resolve<P: PixelSink + ?Sized>(sink: &P) -> Self {
        Self {
            red: sink.color565(Rgb::new(255, 0, 0)),
            green: sink.color565(Rgb::new(0, 255, 0)),
            blue: sink.color565(Rgb::new(0, 0, 255)),
            white: sink.color565(Rgb::new(255, 255, 255)),
            yellow: sink.color565(Rgb::new(255, 255, 0)),
            cyan: sink.color565(Rgb::new(0, 255, 255)),
            magenta: sink.color565(Rgb::new(255, 0, 255)),
            black: sink.color565(Rgb::new(0, 0, 0)),
        }
    }
}
