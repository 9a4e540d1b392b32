#![no_std]

pub mod animation;
pub mod channel;
pub mod color;
pub mod compositor;
pub mod control;
pub mod decoder;
pub mod emotion;
pub mod peripheral;
pub mod scheduler;
pub mod source;
pub mod status;
pub mod storage;
pub mod tilt;

pub use animation::{AnimationInfo, AnimationManager, PlaybackError};
pub use compositor::{MAX_SCANLINE_WIDTH, Scanline, composite};
pub use control::{
    ControlChannel, ControlEffects, ControlIntent, ControlProcessor, ControlReceiver,
    ControlSender,
};
pub use decoder::{DecodeError, Disposal, FrameDecoder, FrameInfo, Palette};
pub use emotion::{AnimationId, AnimationIdError, EmotionDefaults, EmotionState, animation_path};
pub use peripheral::{EarConfig, EarController, FanConfig, FanController, FanError, PwmOutput};
pub use scheduler::{Animatronic, AnimatronicConfig, Hardware, TickResult};
pub use source::{ByteSource, OpenSource};
pub use status::StatusLines;
pub use storage::{StaticStorage, Storage, StorageError, StorageFile, sanitize_file_name};
pub use tilt::{Accelerometer, SensorAbsent, TiltClassifier, TiltConfig, TiltState, TiltVector};

pub use color::{ColorTable, Rgb, parse_hex_color, rgb565};
pub use embassy_time::{Duration, Instant};

/// Abstract LED matrix driver trait
///
/// Implement this trait to support different display panels.
/// Playback is generic over this trait and never reads pixels back.
pub trait PixelSink {
    /// Draw a single pixel with a packed 16-bit color
    fn draw_pixel(&mut self, x: u16, y: u16, color: u16);

    /// Draw a contiguous horizontal run of pixels starting at `x`
    ///
    /// Drivers with a faster bulk path should override this.
    #[allow(clippy::cast_possible_truncation)]
    fn write_span(&mut self, x: u16, y: u16, colors: &[u16]) {
        for (offset, color) in colors.iter().enumerate() {
            self.draw_pixel(x.saturating_add(offset as u16), y, *color);
        }
    }

    /// Fill the whole panel with one color
    fn fill_screen(&mut self, color: u16);

    /// Pack an RGB color into the panel's 16-bit color format
    fn color565(&self, color: Rgb) -> u16 {
        rgb565(color)
    }
}
