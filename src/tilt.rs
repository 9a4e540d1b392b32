//! Tilt-triggered emotion changes
//!
//! Compares accelerometer readings against fixed reference orientations and
//! switches the face to the configured tilt emotion when the head is tilted
//! up or to the side.

use core::fmt;

use embassy_time::{Duration, Instant};
#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::emotion::EmotionState;

/// One accelerometer reading in normalized units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TiltVector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TiltVector {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Check that every axis differs from `reference` by less than `tolerance`
    pub fn approx_eq(self, reference: Self, tolerance: f32) -> bool {
        libm::fabsf(self.x - reference.x) < tolerance
            && libm::fabsf(self.y - reference.y) < tolerance
            && libm::fabsf(self.z - reference.z) < tolerance
    }
}

/// The accelerometer did not answer at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorAbsent;

impl fmt::Display for SensorAbsent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("accelerometer not detected")
    }
}

/// Abstract accelerometer driver
pub trait Accelerometer {
    /// Probe for the device; called once at startup
    fn detect(&mut self) -> bool;

    /// Take a fresh reading
    fn sample(&mut self) -> TiltVector;
}

/// Reference orientations and timing for tilt classification
#[derive(Debug, Clone, Copy)]
pub struct TiltConfig {
    pub neutral: TiltVector,
    pub up: TiltVector,
    pub side: TiltVector,
    /// Per-axis tolerance shared by all references
    pub tolerance: f32,
    /// Longest time a tilt emotion holds before returning to neutral
    pub max_duration: Duration,
    /// Minimum time between two samples
    pub sample_interval: Duration,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            neutral: TiltVector::new(0.3, 0.92, 0.33),
            up: TiltVector::new(-0.17, 0.99, 0.11),
            side: TiltVector::new(0.05, 0.7, 0.73),
            tolerance: 0.1,
            max_duration: Duration::from_millis(8000),
            sample_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiltState {
    #[default]
    Neutral,
    TiltedUp,
    TiltedSide,
}

/// Tilt state machine driven by an [`Accelerometer`]
///
/// Without a detected sensor the classifier stays disabled for good and
/// every tick does nothing.
pub struct TiltClassifier<A: Accelerometer> {
    sensor: Option<A>,
    config: TiltConfig,
    state: TiltState,
    last_sample: Option<Instant>,
    tilted_at: Instant,
    last_reading: Option<TiltVector>,
}

impl<A: Accelerometer> TiltClassifier<A> {
    /// Create a classifier without probing the sensor yet
    pub const fn new(sensor: A, config: TiltConfig) -> Self {
        Self {
            sensor: Some(sensor),
            config,
            state: TiltState::Neutral,
            last_sample: None,
            tilted_at: Instant::from_millis(0),
            last_reading: None,
        }
    }

    /// Create a classifier for a board without an accelerometer
    pub const fn disabled(config: TiltConfig) -> Self {
        Self {
            sensor: None,
            config,
            state: TiltState::Neutral,
            last_sample: None,
            tilted_at: Instant::from_millis(0),
            last_reading: None,
        }
    }

    /// Probe the sensor once; on failure the classifier is disabled for good
    pub fn begin(&mut self) -> Result<(), SensorAbsent> {
        let detected = self.sensor.as_mut().is_some_and(Accelerometer::detect);
        if !detected {
            self.sensor = None;
            #[cfg(feature = "esp32-log")]
            println!("[TiltClassifier.begin] accelerometer not found, tilt disabled");
            return Err(SensorAbsent);
        }
        Ok(())
    }

    pub const fn is_enabled(&self) -> bool {
        self.sensor.is_some()
    }

    pub const fn state(&self) -> TiltState {
        self.state
    }

    /// Most recent reading taken by [`TiltClassifier::tick`]
    pub const fn last_reading(&self) -> Option<TiltVector> {
        self.last_reading
    }

    /// Take a reading outside the classification schedule
    pub fn read_acceleration(&mut self) -> Option<TiltVector> {
        let reading = self.sensor.as_mut()?.sample();
        self.last_reading = Some(reading);
        Some(reading)
    }

    /// Sample the sensor and advance the state machine
    ///
    /// Entering a tilt state sets the matching tilt emotion. Returning to
    /// neutral leaves the emotion untouched. Returns the new state when a
    /// transition happened.
    pub fn tick(&mut self, now: Instant, emotion: &mut EmotionState) -> Option<TiltState> {
        let sensor = self.sensor.as_mut()?;
        if let Some(last) = self.last_sample {
            if now.saturating_duration_since(last) < self.config.sample_interval {
                return None;
            }
        }
        self.last_sample = Some(now);

        let reading = sensor.sample();
        self.last_reading = Some(reading);
        let tolerance = self.config.tolerance;

        let next = match self.state {
            TiltState::Neutral => {
                if reading.approx_eq(self.config.up, tolerance) {
                    emotion.set_current_emotion(emotion.tilt_up_target().clone());
                    TiltState::TiltedUp
                } else if reading.approx_eq(self.config.side, tolerance) {
                    emotion.set_current_emotion(emotion.tilt_side_target().clone());
                    TiltState::TiltedSide
                } else {
                    return None;
                }
            }
            TiltState::TiltedUp | TiltState::TiltedSide => {
                let expired =
                    now.saturating_duration_since(self.tilted_at) > self.config.max_duration;
                if expired || reading.approx_eq(self.config.neutral, tolerance) {
                    TiltState::Neutral
                } else {
                    return None;
                }
            }
        };

        if next != TiltState::Neutral {
            self.tilted_at = now;
        }
        #[cfg(feature = "esp32-log")]
        println!("[TiltClassifier.tick] {:?} -> {:?}", self.state, next);
        self.state = next;
        Some(next)
    }
}
