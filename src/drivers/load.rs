//! Load output bank (relay / SSR drivers on plain GPIO).
//!
//! Each channel is a single digital output switched by the fast tick.
//! Relay modules are commonly active-low, so the logical state is XORed
//! with the configured polarity before it reaches the pin.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real GPIO via hw_init.
//! On host/test: writes the simulated level register.

use crate::drivers::hw_init;
use crate::pins;
use crate::program::MAX_CHANNELS;

pub struct LoadBank {
    inverted: bool,
    channels: usize,
    state: [bool; MAX_CHANNELS],
}

impl LoadBank {
    /// Create the bank and drive every wired output to its off level.
    pub fn new(channels: usize, inverted: bool) -> Self {
        let mut bank = Self {
            inverted,
            channels: channels.min(MAX_CHANNELS),
            state: [false; MAX_CHANNELS],
        };
        bank.all_off();
        bank
    }

    /// Switch one channel.  Unwired channels are ignored.
    pub fn set(&mut self, channel: usize, active: bool) {
        if channel >= self.channels {
            return;
        }
        hw_init::gpio_write(pins::LOAD_GPIOS[channel], active != self.inverted);
        self.state[channel] = active;
    }

    pub fn all_off(&mut self) {
        for ch in 0..self.channels {
            self.set(ch, false);
        }
    }

    /// Logical (pre-inversion) state of a channel.
    pub fn is_active(&self, channel: usize) -> bool {
        self.state.get(channel).copied().unwrap_or(false)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
