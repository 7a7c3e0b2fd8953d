//! Output scheduler (the fast tick).
//!
//! Realises coarse software PWM for loads that cannot take a real PWM
//! carrier (relays, mains switches), and plays the active messenger on
//! the LED or buzzer.
//!
//! ```text
//!   period = 30 ticks (3 s at 100 ms)       setpoint 0.4 → 12 ticks on
//!
//!   ramp   0 ........ 11 12 ............... 29 | 0 ...
//!   load   ▮▮▮▮▮▮▮▮▮▮▮▮ . . . . . . . . . . . . | ▮ ...
//! ```
//!
//! A channel is active while `ramp < setpoint × period`, so over one full
//! period it is on for `ceil(setpoint × period)` ticks.
//!
//! `tick()` takes one short lock on the [`SharedContext`] and then only
//! writes pins: no allocation, no waiting.

use crate::app::ports::OutputPort;
use crate::context::SharedContext;
use crate::program::MAX_CHANNELS;
use crate::signal::SignalTarget;

// ═══════════════════════════════════════════════════════════════
//  Duty quantisation
// ═══════════════════════════════════════════════════════════════

/// Whether a channel at `setpoint` is on at ramp position `ramp`.
pub fn channel_active(setpoint: f32, ramp: u16, period: u16) -> bool {
    f32::from(ramp) < setpoint * f32::from(period)
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct OutputScheduler {
    period: u16,
    ramp: u16,
    channels: usize,
}

impl OutputScheduler {
    /// `period_ticks` of zero is treated as one; `channels` is capped at
    /// [`MAX_CHANNELS`].
    pub fn new(period_ticks: u16, channels: usize) -> Self {
        Self {
            period: period_ticks.max(1),
            ramp: 0,
            channels: channels.min(MAX_CHANNELS),
        }
    }

    pub fn period(&self) -> u16 {
        self.period
    }

    /// Position within the current PWM period.
    pub fn ramp(&self) -> u16 {
        self.ramp
    }

    /// One fast tick: drive every load and the indicator, then advance.
    pub fn tick(&mut self, shared: &SharedContext, out: &mut impl OutputPort) {
        let snap = shared.tick_snapshot();

        for (channel, &setpoint) in snap.setpoints.iter().enumerate().take(self.channels) {
            out.set_load(channel, channel_active(setpoint, self.ramp, self.period));
        }

        let (led, buzzer) = match snap.signal {
            Some((SignalTarget::Led, on)) => (on, false),
            Some((SignalTarget::Buzzer, on)) => (false, on),
            None => (false, false),
        };
        out.set_led(led);
        out.set_buzzer(buzzer);

        self.ramp += 1;
        if self.ramp >= self.period {
            self.ramp = 0;
        }
    }
}
