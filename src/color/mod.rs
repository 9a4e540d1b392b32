mod table;
mod utils;

use smart_leds::RGB8;
pub use table::ColorTable;
pub use utils::{parse_hex_color, rgb565, rgb_from_u32};

pub type Rgb = RGB8;
