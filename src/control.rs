//! Control intent processing
//!
//! Control surfaces (BLE characteristics, HTTP handlers) post intents into a
//! [`ControlChannel`]. The scheduler drains it at the start of every tick, so
//! a change requested mid-tick is seen by the next playback step. Intents
//! posted while a drain is running wait for the next tick.

#[cfg(feature = "esp32-log")]
use esp_println::println;
use smart_leds::SmartLedsWrite;

use crate::channel::{Channel, Receiver, Sender};
use crate::color::Rgb;
use crate::emotion::{AnimationId, EmotionState};
use crate::peripheral::{EarController, FanController, PwmOutput};

/// A change requested by a control surface
#[derive(Debug, Clone, PartialEq)]
pub enum ControlIntent {
    /// Play a different animation
    SetEmotion(AnimationId),
    /// Change the animation used when tilted up
    SetTiltUpEmotion(AnimationId),
    /// Change the animation used when tilted to the side
    SetTiltSideEmotion(AnimationId),
    /// Set the fan PWM duty cycle
    SetFanDuty(u32),
    /// Change the ear LED color
    SetEarColor(Rgb),
    /// Change the ear LED brightness
    SetEarBrightness(u8),
}

/// What draining the queue changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlEffects {
    /// Number of intents applied
    pub applied: u8,
    /// Number of intents rejected as invalid
    pub rejected: u8,
    /// The current emotion was replaced
    pub emotion_changed: bool,
}

impl ControlEffects {
    pub const fn has_effects(&self) -> bool {
        self.applied > 0 || self.rejected > 0
    }
}

/// Type alias for control sender
pub type ControlSender<'a, const SIZE: usize> = Sender<'a, ControlIntent, SIZE>;

/// Type alias for control receiver
pub type ControlReceiver<'a, const SIZE: usize> = Receiver<'a, ControlIntent, SIZE>;

/// Type alias for the control channel
pub type ControlChannel<const SIZE: usize> = Channel<ControlIntent, SIZE>;

/// Applies queued control intents to the device state
pub struct ControlProcessor<'a, const SIZE: usize> {
    intents: ControlReceiver<'a, SIZE>,
}

impl<'a, const SIZE: usize> ControlProcessor<'a, SIZE> {
    pub const fn new(intents: ControlReceiver<'a, SIZE>) -> Self {
        Self { intents }
    }

    /// Apply every intent queued when the call starts (non-blocking)
    pub fn process_pending<P, W>(
        &mut self,
        emotion: &mut EmotionState,
        fan: &mut FanController<P>,
        ears: &mut EarController<W>,
    ) -> ControlEffects
    where
        P: PwmOutput,
        W: SmartLedsWrite<Color = Rgb>,
    {
        let mut effects = ControlEffects::default();

        for intent in self.intents.drain() {
            match intent {
                ControlIntent::SetEmotion(id) => {
                    emotion.set_current_emotion(id);
                    effects.emotion_changed = true;
                }
                ControlIntent::SetTiltUpEmotion(id) => emotion.set_tilt_up_target(id),
                ControlIntent::SetTiltSideEmotion(id) => emotion.set_tilt_side_target(id),
                ControlIntent::SetFanDuty(duty) => {
                    if fan.set_duty_cycle(duty).is_err() {
                        effects.rejected = effects.rejected.saturating_add(1);
                        continue;
                    }
                }
                ControlIntent::SetEarColor(color) => ears.set_color(color),
                ControlIntent::SetEarBrightness(brightness) => ears.set_brightness(brightness),
            }
            effects.applied = effects.applied.saturating_add(1);
        }

        #[cfg(feature = "esp32-log")]
        if effects.has_effects() {
            println!(
                "[ControlProcessor.process_pending] applied {}, rejected {}",
                effects.applied, effects.rejected
            );
        }
        effects
    }
}
