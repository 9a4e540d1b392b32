//! Cooperative tick loop
//!
//! Everything runs on one thread of control. Each tick runs the components
//! in a fixed order:
//! 1. control intents from the network/BLE surfaces
//! 2. tilt classification
//! 3. animation playback
//! 4. peripheral refresh (ear LEDs)
//!
//! The caller is responsible for sleeping between ticks.

use embassy_time::{Duration, Instant};
#[cfg(feature = "esp32-log")]
use esp_println::println;
use heapless::Vec;
use smart_leds::SmartLedsWrite;

use crate::PixelSink;
use crate::animation::{AnimationInfo, AnimationManager, PlaybackError};
use crate::color::Rgb;
use crate::control::{ControlEffects, ControlProcessor, ControlReceiver};
use crate::decoder::FrameInfo;
use crate::emotion::{AnimationId, AnimationIdError, EmotionDefaults, EmotionState};
use crate::peripheral::{EarConfig, EarController, FanConfig, FanController, PwmOutput};
use crate::status::StatusLines;
use crate::storage::Storage;
use crate::tilt::{Accelerometer, SensorAbsent, TiltClassifier, TiltConfig, TiltState};

/// Default tick rate (30 ticks per second).
pub const DEFAULT_TICKS_PER_SECOND: u32 = 30;

/// Default tick duration based on the target rate.
pub const DEFAULT_TICK_DURATION: Duration =
    Duration::from_millis(1000 / DEFAULT_TICKS_PER_SECOND as u64);

/// Device configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimatronicConfig {
    pub tick_duration: Option<Duration>,
    pub emotions: EmotionDefaults,
    pub tilt: TiltConfig,
    pub fan: FanConfig,
    pub ears: EarConfig,
}

/// Hardware needed to run the device
pub struct Hardware<S, P, A, F, W> {
    pub storage: S,
    pub panel: P,
    /// `None` on boards without an accelerometer
    pub accelerometer: Option<A>,
    pub fan: F,
    pub ears: W,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (may be zero if behind schedule).
    pub sleep_duration: Duration,
    /// Control intents applied this tick
    pub control: ControlEffects,
    /// Tilt transition taken this tick
    pub tilt: Option<TiltState>,
    /// Playback outcome; failures only skip this tick's visual update
    pub playback: Result<FrameInfo, PlaybackError>,
}

/// The whole device: emotion state plus every component that reads or
/// writes it
pub struct Animatronic<'a, S, P, A, F, W, const CONTROL_CHANNEL_SIZE: usize>
where
    S: Storage,
    P: PixelSink,
    A: Accelerometer,
    F: PwmOutput,
    W: SmartLedsWrite<Color = Rgb>,
{
    control: ControlProcessor<'a, CONTROL_CHANNEL_SIZE>,
    emotion: EmotionState,
    tilt: TiltClassifier<A>,
    animation: AnimationManager<S, P>,
    fan: FanController<F>,
    ears: EarController<W>,
    next_tick: Instant,
    tick_duration: Duration,
}

impl<'a, S, P, A, F, W, const CONTROL_CHANNEL_SIZE: usize>
    Animatronic<'a, S, P, A, F, W, CONTROL_CHANNEL_SIZE>
where
    S: Storage,
    P: PixelSink,
    A: Accelerometer,
    F: PwmOutput,
    W: SmartLedsWrite<Color = Rgb>,
{
    pub fn new(
        hardware: Hardware<S, P, A, F, W>,
        intents: ControlReceiver<'a, CONTROL_CHANNEL_SIZE>,
        config: &AnimatronicConfig,
    ) -> Result<Self, AnimationIdError> {
        let tilt = match hardware.accelerometer {
            Some(sensor) => TiltClassifier::new(sensor, config.tilt),
            None => TiltClassifier::disabled(config.tilt),
        };
        Ok(Self {
            control: ControlProcessor::new(intents),
            emotion: EmotionState::new(&config.emotions)?,
            tilt,
            animation: AnimationManager::new(hardware.storage, hardware.panel),
            fan: FanController::new(hardware.fan, &config.fan),
            ears: EarController::new(hardware.ears, &config.ears),
            next_tick: Instant::from_millis(0),
            tick_duration: config.tick_duration.unwrap_or(DEFAULT_TICK_DURATION),
        })
    }

    /// Bring up the hardware
    ///
    /// A missing accelerometer is reported but not fatal; tilt stays off.
    pub fn begin(&mut self) -> Result<(), SensorAbsent> {
        let _ = self.animation.begin();
        self.fan.begin();
        if let Err(_err) = self.ears.update() {
            #[cfg(feature = "esp32-log")]
            println!("[Animatronic.begin] ear LED write failed");
        }
        if self.tilt.is_enabled() {
            self.tilt.begin()
        } else {
            Err(SensorAbsent)
        }
    }

    /// Run one tick and return timing information.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        // Drift correction: if we've fallen too far behind, reset to now
        // This prevents catch-up bursts after long stalls
        let max_drift = Duration::from_millis(self.tick_duration.as_millis() * 2);
        if now.as_millis() > self.next_tick.as_millis() + max_drift.as_millis() {
            self.next_tick = now;
        }

        let control = self
            .control
            .process_pending(&mut self.emotion, &mut self.fan, &mut self.ears);
        let tilt = self.tilt.tick(now, &mut self.emotion);

        // Snapshot: writes after this point are seen next tick
        let current = self.emotion.current().clone();
        let playback = self.animation.play_emotion(current.as_str());

        if let Err(_err) = self.ears.update() {
            #[cfg(feature = "esp32-log")]
            println!("[Animatronic.tick] ear LED write failed");
        }

        self.next_tick += self.tick_duration;
        let sleep_duration = if self.next_tick.as_millis() > now.as_millis() {
            Duration::from_millis(self.next_tick.as_millis() - now.as_millis())
        } else {
            Duration::from_millis(0)
        };

        TickResult {
            next_deadline: self.next_tick,
            sleep_duration,
            control,
            tilt,
            playback,
        }
    }

    pub fn current_emotion(&self) -> &AnimationId {
        self.emotion.current()
    }

    /// Switch emotion from a synchronous control handler
    pub fn set_current_emotion(&mut self, emotion: AnimationId) {
        self.emotion.set_current_emotion(emotion);
    }

    pub fn list_available_emotions<const N: usize>(&self) -> Vec<AnimationInfo, N> {
        self.animation.list_available_emotions()
    }

    /// Current lines for the status display
    pub fn status(&self) -> StatusLines {
        StatusLines::capture(&self.emotion, &self.fan, &self.ears)
    }

    pub fn emotion(&self) -> &EmotionState {
        &self.emotion
    }

    pub fn emotion_mut(&mut self) -> &mut EmotionState {
        &mut self.emotion
    }

    pub fn tilt(&self) -> &TiltClassifier<A> {
        &self.tilt
    }

    pub fn tilt_mut(&mut self) -> &mut TiltClassifier<A> {
        &mut self.tilt
    }

    pub fn animation(&self) -> &AnimationManager<S, P> {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut AnimationManager<S, P> {
        &mut self.animation
    }

    pub fn fan_mut(&mut self) -> &mut FanController<F> {
        &mut self.fan
    }

    pub fn ears_mut(&mut self) -> &mut EarController<W> {
        &mut self.ears
    }
}
