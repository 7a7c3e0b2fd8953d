//! Sound/flash codes for the `s<N>` command.
//!
//! | Code   | Indicator | Pattern (ticks)              | Repeat       |
//! |--------|-----------|------------------------------|--------------|
//! | 1–9    | LED       | `[2,5]`                      | N times      |
//! | 41–49  | LED       | `[2,3]` × (N−40), last = 12  | forever      |
//! | 51–59  | buzzer    | `[3,3]`                      | N−50 times   |
//! | 81     | LED       | `[2,8]`                      | forever      |
//! | 82     | LED       | `[2,1,2,8]`                  | forever      |
//! | 83     | LED       | `[2,1,2,1,2,8]`              | forever      |
//! | 88     | buzzer    | `[1,1,1,1,1,3]`              | 2 times      |
//!
//! Any other code clears the active messenger.

use heapless::Vec;

use super::messenger::{MAX_SEGMENTS, Messenger, SignalTarget};

/// Gap that closes a 41–49 flash group.
const GROUP_PAUSE_TICKS: u8 = 12;

/// Build the messenger for a sound code, or `None` for silence.
pub fn preset(code: u32) -> Option<Messenger> {
    match code {
        1..=9 => Messenger::new(&[2, 5], SignalTarget::Led, Some(code)).ok(),
        41..=49 => flash_group(code - 40),
        51..=59 => Messenger::new(&[3, 3], SignalTarget::Buzzer, Some(code - 50)).ok(),
        81 => Messenger::new(&[2, 8], SignalTarget::Led, None).ok(),
        82 => Messenger::new(&[2, 1, 2, 8], SignalTarget::Led, None).ok(),
        83 => Messenger::new(&[2, 1, 2, 1, 2, 8], SignalTarget::Led, None).ok(),
        88 => Messenger::new(&[1, 1, 1, 1, 1, 3], SignalTarget::Buzzer, Some(2)).ok(),
        _ => None,
    }
}

/// `flashes` short flashes, then a long pause, forever.
fn flash_group(flashes: u32) -> Option<Messenger> {
    let mut pattern: Vec<u8, MAX_SEGMENTS> = Vec::new();
    for _ in 0..flashes {
        pattern.extend_from_slice(&[2, 3]).ok()?;
    }
    if let Some(last) = pattern.last_mut() {
        *last = GROUP_PAUSE_TICKS;
    }
    Messenger::new(&pattern, SignalTarget::Led, None).ok()
}
