use crate::color::Rgb;

/// Pack an RGB color into RGB565 (5 bits red, 6 bits green, 5 bits blue)
#[inline]
pub const fn rgb565(color: Rgb) -> u16 {
    ((color.r as u16 & 0xF8) << 8) | ((color.g as u16 & 0xFC) << 3) | (color.b as u16 >> 3)
}

/// Create an RGB color from a u32 value (0xRRGGBB format)
#[allow(clippy::cast_possible_truncation)]
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Parse a `#RRGGBB` color string
///
/// Returns `None` unless the input is exactly a hash followed by six hex digits.
pub fn parse_hex_color(text: &str) -> Option<Rgb> {
    let digits = text.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(rgb_from_u32(value))
}
