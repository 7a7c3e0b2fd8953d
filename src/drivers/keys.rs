//! Key inputs (momentary switches to ground with internal pull-ups).
//!
//! Keys are level-sampled once per slow poll; a held key simply reads
//! pressed on every poll.  The trigger state machine provides the
//! once-per-press behaviour, so no debouncing happens here.

use crate::drivers::hw_init;
use crate::error::InputError;
use crate::pins;
use crate::program::MAX_KEYS;

pub struct KeyPad {
    count: usize,
}

impl KeyPad {
    /// `count` keys wired, starting at `key0`.
    pub fn new(count: usize) -> Self {
        Self {
            count: count.min(MAX_KEYS),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_pressed(&self, key: u8) -> Result<bool, InputError> {
        let index = usize::from(key);
        if index >= self.count {
            return Err(InputError::NoSuchKey(key));
        }
        // Pull-up: released reads HIGH.
        Ok(!hw_init::gpio_read(pins::KEY_GPIOS[index]))
    }
}
