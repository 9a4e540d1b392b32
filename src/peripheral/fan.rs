use core::fmt;

#[cfg(feature = "esp32-log")]
use esp_println::println;

/// Abstract PWM channel driving the cooling fan
pub trait PwmOutput {
    fn set_duty(&mut self, duty: u16);
}

/// Requested duty cycle does not fit the PWM resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanError {
    OutOfRange { requested: u32, max: u16 },
}

impl fmt::Display for FanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { requested, max } => {
                write!(f, "duty cycle {} outside 0..={}", requested, max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FanConfig {
    /// PWM resolution in bits (1..=16)
    pub resolution_bits: u8,
    /// Duty cycle applied by [`FanController::begin`]
    pub initial_duty: u16,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            resolution_bits: 8,
            initial_duty: 100,
        }
    }
}

/// Fan speed as a PWM duty cycle
pub struct FanController<P: PwmOutput> {
    pwm: P,
    resolution_bits: u8,
    duty: u16,
}

impl<P: PwmOutput> FanController<P> {
    pub fn new(pwm: P, config: &FanConfig) -> Self {
        let resolution_bits = config.resolution_bits.clamp(1, 16);
        let max = Self::max_for(resolution_bits);
        Self {
            pwm,
            resolution_bits,
            duty: config.initial_duty.min(max),
        }
    }

    /// Push the initial duty cycle to the hardware
    pub fn begin(&mut self) {
        self.pwm.set_duty(self.duty);
    }

    /// Set a new duty cycle in `0..=max_duty_cycle()`
    pub fn set_duty_cycle(&mut self, duty: u32) -> Result<(), FanError> {
        let max = self.max_duty_cycle();
        let Some(duty) = u16::try_from(duty).ok().filter(|duty| *duty <= max) else {
            #[cfg(feature = "esp32-log")]
            println!("[FanController.set_duty_cycle] rejected {}", duty);
            return Err(FanError::OutOfRange { requested: duty, max });
        };
        self.duty = duty;
        self.pwm.set_duty(duty);
        Ok(())
    }

    pub const fn duty_cycle(&self) -> u16 {
        self.duty
    }

    pub const fn max_duty_cycle(&self) -> u16 {
        Self::max_for(self.resolution_bits)
    }

    /// Duty cycle as a rounded-down percentage of the maximum
    #[allow(clippy::cast_possible_truncation)]
    pub const fn duty_percent(&self) -> u8 {
        (self.duty as u32 * 100 / self.max_duty_cycle() as u32) as u8
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn max_for(resolution_bits: u8) -> u16 {
        ((1u32 << resolution_bits) - 1) as u16
    }
}
