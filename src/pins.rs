//! GPIO / peripheral pin assignments for the SmartPlug board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

use crate::program::{MAX_CHANNELS, MAX_KEYS};

// ---------------------------------------------------------------------------
// Load outputs (relay / SSR drivers)
// ---------------------------------------------------------------------------

/// Digital outputs for channels `a`..`d`.  Polarity is set by
/// `SystemConfig::outputs_inverted` (relay boards are usually active-low).
pub const LOAD_GPIOS: [i32; MAX_CHANNELS] = [15, 16, 17, 18];

// ---------------------------------------------------------------------------
// Keys (momentary, to ground, internal pull-up)
// ---------------------------------------------------------------------------

/// Digital inputs for `key0`..`key3`.  LOW = pressed.
pub const KEY_GPIOS: [i32; MAX_KEYS] = [4, 5, 6, 7];

// ---------------------------------------------------------------------------
// User feedback
// ---------------------------------------------------------------------------

/// Onboard status LED (active HIGH).
pub const STATUS_LED_GPIO: i32 = 2;

/// Passive buzzer, driven by an LEDC square wave.
pub const BUZZER_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Buzzer duty while sounding (50 % of the 8-bit LEDC range).
pub const BUZZER_DUTY_ON: u8 = 128;
