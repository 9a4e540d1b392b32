//! Text lines for the status OLED
//!
//! The OLED driver itself lives outside this crate; it only needs the three
//! strings built here.

use core::fmt::Write;

use heapless::String;
use smart_leds::SmartLedsWrite;

use crate::color::Rgb;
use crate::emotion::EmotionState;
use crate::peripheral::{EarController, FanController, PwmOutput};

pub const STATUS_LINE_LEN: usize = 24;

/// Snapshot of what the status display shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLines {
    /// Display name of the active emotion
    pub emotion: String<STATUS_LINE_LEN>,
    /// Fan speed, e.g. `39%`
    pub fan: String<STATUS_LINE_LEN>,
    /// Ear color and brightness, e.g. `#FFFFFF B:31%`
    pub ears: String<STATUS_LINE_LEN>,
}

impl StatusLines {
    pub fn capture<P, W>(emotion: &EmotionState, fan: &FanController<P>, ears: &EarController<W>) -> Self
    where
        P: PwmOutput,
        W: SmartLedsWrite<Color = Rgb>,
    {
        let mut lines = Self::default();
        for c in emotion.display_emotion().chars() {
            if lines.emotion.push(c).is_err() {
                break;
            }
        }
        let _ = write!(lines.fan, "{}%", fan.duty_percent());
        let _ = write!(lines.ears, "{} B:{}%", ears.color_hex(), ears.brightness_percent());
        lines
    }
}
