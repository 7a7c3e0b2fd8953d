//! Hardware adapters: bridge the GPIO drivers to the domain port traits.
//!
//! Split in two because the halves live on different tasks:
//! [`HardwareOutputs`] moves into the fast-tick timer and
//! [`HardwareInputs`] stays with the slow loop.  On non-espidf targets
//! the drivers underneath write the simulated pin bank.

use crate::app::ports::{InputPort, OutputPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::keys::KeyPad;
use crate::drivers::load::LoadBank;
use crate::drivers::status_led::StatusLed;
use crate::error::InputError;

/// Everything the fast tick writes.
pub struct HardwareOutputs {
    loads: LoadBank,
    led: StatusLed,
    buzzer: Buzzer,
}

impl HardwareOutputs {
    pub fn new(loads: LoadBank, led: StatusLed, buzzer: Buzzer) -> Self {
        Self { loads, led, buzzer }
    }
}

impl OutputPort for HardwareOutputs {
    fn set_load(&mut self, channel: usize, active: bool) {
        self.loads.set(channel, active);
    }

    fn set_led(&mut self, on: bool) {
        self.led.set(on);
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set(on);
    }
}

/// Everything the slow loop reads.
pub struct HardwareInputs {
    keys: KeyPad,
}

impl HardwareInputs {
    pub fn new(keys: KeyPad) -> Self {
        Self { keys }
    }
}

impl InputPort for HardwareInputs {
    fn key_pressed(&mut self, key: u8) -> Result<bool, InputError> {
        self.keys.is_pressed(key)
    }
}
