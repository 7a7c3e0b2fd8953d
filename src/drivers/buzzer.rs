//! Passive buzzer on an LEDC channel.
//!
//! The tone frequency is fixed at init (`SystemConfig::buzzer_freq_hz`);
//! the fast tick only gates it by switching the duty between zero and a
//! 50 % square wave.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes LEDC duty via hw_init.
//! On host/test: writes the simulated duty register.

use crate::drivers::hw_init;
use crate::pins;

pub struct Buzzer {
    on: bool,
}

impl Buzzer {
    pub fn new() -> Self {
        hw_init::ledc_set(hw_init::LEDC_CH_BUZZER, 0);
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        let duty = if on { pins::BUZZER_DUTY_ON } else { 0 };
        hw_init::ledc_set(hw_init::LEDC_CH_BUZZER, duty);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}
