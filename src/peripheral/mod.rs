//! Peripheral state exposed to the control surfaces
//!
//! These controllers only hold the values the user picked and push them to
//! the hardware; all timing lives in the scheduler.

mod ears;
mod fan;

pub use ears::{EarConfig, EarController};
pub use fan::{FanConfig, FanController, FanError, PwmOutput};
