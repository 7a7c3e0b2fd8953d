//! System configuration parameters
//!
//! All tunable parameters for the SmartPlug controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::program::{MAX_CHANNELS, MAX_KEYS};

/// Firmware version reported in the status snapshot.
pub const FIRMWARE_VERSION: &str = "1.0";

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Board ---
    /// Load outputs actually wired (1..=4)
    pub channel_count: u8,
    /// Keys actually wired (0..=4)
    pub key_count: u8,
    /// Loads are active-low (relay boards pulled to ground)
    pub outputs_inverted: bool,

    // --- Software PWM ---
    /// Ticks per dimming period (30 ticks at 100 ms = 3 s)
    pub pwm_period_ticks: u16,
    /// Fast tick period (milliseconds)
    pub fast_tick_ms: u32,
    /// Trigger poll period (milliseconds)
    pub poll_interval_ms: u32,

    // --- Signalling ---
    /// Buzzer tone frequency (Hz)
    pub buzzer_freq_hz: u32,

    // --- Network ---
    pub http_port: u16,
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Board
            channel_count: MAX_CHANNELS as u8,
            key_count: MAX_KEYS as u8,
            outputs_inverted: true,

            // Software PWM
            pwm_period_ticks: 30,
            fast_tick_ms: 100,      // 10 Hz
            poll_interval_ms: 1000, // 1 Hz

            // Signalling
            buzzer_freq_hz: 1000,

            // Network
            http_port: 80,
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
        }
    }
}
