//! Onboard status LED (single GPIO, active HIGH).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init.
//! On host/test: writes the simulated level register.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    on: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        hw_init::gpio_write(pins::STATUS_LED_GPIO, false);
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        if on != self.on {
            hw_init::gpio_write(pins::STATUS_LED_GPIO, on);
            self.on = on;
        }
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}
