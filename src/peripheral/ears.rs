use core::fmt::Write;

use heapless::String;
use smart_leds::{SmartLedsWrite, brightness};

use crate::color::Rgb;

#[derive(Debug, Clone, Copy)]
pub struct EarConfig {
    pub led_count: u16,
    pub brightness: u8,
    pub color: Rgb,
}

impl Default for EarConfig {
    fn default() -> Self {
        Self {
            led_count: 32,
            brightness: 80,
            color: Rgb::new(255, 255, 255),
        }
    }
}

/// Solid-color ear LED strips
pub struct EarController<W>
where
    W: SmartLedsWrite<Color = Rgb>,
{
    strip: W,
    led_count: u16,
    brightness: u8,
    color: Rgb,
}

impl<W> EarController<W>
where
    W: SmartLedsWrite<Color = Rgb>,
{
    pub const fn new(strip: W, config: &EarConfig) -> Self {
        Self {
            strip,
            led_count: config.led_count,
            brightness: config.brightness,
            color: config.color,
        }
    }

    pub const fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    /// Brightness as a rounded percentage of 255
    #[allow(clippy::cast_possible_truncation)]
    pub const fn brightness_percent(&self) -> u8 {
        ((self.brightness as u16 * 100 + 127) / 255) as u8
    }

    /// Current color as `#RRGGBB`
    pub fn color_hex(&self) -> String<7> {
        let mut text = String::new();
        let _ = write!(text, "#{:02X}{:02X}{:02X}", self.color.r, self.color.g, self.color.b);
        text
    }

    /// Write the current color at the current brightness to every LED
    pub fn update(&mut self) -> Result<(), W::Error> {
        let pixels = core::iter::repeat_n(self.color, usize::from(self.led_count));
        self.strip.write(brightness(pixels, self.brightness))
    }
}
