//! Shared output state: the single object both periodic tasks touch.
//!
//! ```text
//!   slow loop (1 Hz)                         fast tick (10 Hz)
//!   ────────────────                         ─────────────────
//!   SetLoadState ──▶ setpoints[ch] ──┐
//!   SayToUser    ──▶ messenger slot  ├──▶ SharedContext::tick_snapshot()
//!   Halt         ──▶ halted, zero    ┘         │
//!                                              ▼
//!                                        OutputScheduler
//! ```
//!
//! Guarded by an embassy `CriticalSectionRawMutex`: every critical section
//! is a handful of field copies, so the fast tick never waits longer than
//! one slow-loop write.  Slow-loop writes are visible to the next tick.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::program::MAX_CHANNELS;
use crate::signal::{Messenger, SignalTarget};

#[derive(Debug, Clone)]
struct ChannelState {
    setpoints: [f32; MAX_CHANNELS],
    messenger: Option<Messenger>,
    halted: bool,
}

impl ChannelState {
    const fn new() -> Self {
        Self {
            setpoints: [0.0; MAX_CHANNELS],
            messenger: None,
            halted: false,
        }
    }
}

/// What the fast tick needs for one output pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSnapshot {
    pub setpoints: [f32; MAX_CHANNELS],
    /// Indicator driven by the active messenger and its state this tick.
    pub signal: Option<(SignalTarget, bool)>,
}

pub struct SharedContext {
    state: Mutex<CriticalSectionRawMutex, RefCell<ChannelState>>,
}

impl SharedContext {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(ChannelState::new())),
        }
    }

    /// Set a channel duty.  Values are clamped to `0.0..=1.0`; indices past
    /// the last channel are ignored.
    pub fn set_setpoint(&self, channel: usize, power: f32) {
        let power = if power.is_nan() { 0.0 } else { power.clamp(0.0, 1.0) };
        self.state.lock(|s| {
            if let Some(slot) = s.borrow_mut().setpoints.get_mut(channel) {
                *slot = power;
            }
        });
    }

    pub fn setpoint(&self, channel: usize) -> f32 {
        self.state
            .lock(|s| s.borrow().setpoints.get(channel).copied().unwrap_or(0.0))
    }

    pub fn setpoints(&self) -> [f32; MAX_CHANNELS] {
        self.state.lock(|s| s.borrow().setpoints)
    }

    /// Replace the active messenger; `None` silences the indicators.
    pub fn install_messenger(&self, messenger: Option<Messenger>) {
        self.state.lock(|s| s.borrow_mut().messenger = messenger);
    }

    pub fn messenger(&self) -> Option<Messenger> {
        self.state.lock(|s| s.borrow().messenger.clone())
    }

    /// Zero every output and stop trigger evaluation until reset.
    pub fn halt(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.setpoints = [0.0; MAX_CHANNELS];
            s.halted = true;
        });
    }

    pub fn is_halted(&self) -> bool {
        self.state.lock(|s| s.borrow().halted)
    }

    /// Copy the setpoints and advance the messenger by one position,
    /// retiring it once its repeat count is spent.
    pub fn tick_snapshot(&self) -> TickSnapshot {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let signal = s.messenger.as_mut().map(|m| (m.target(), m.step()));
            let signal = match signal {
                Some((target, step)) => {
                    if step.finished {
                        s.messenger = None;
                    }
                    Some((target, step.active))
                }
                None => None,
            };
            TickSnapshot {
                setpoints: s.setpoints,
                signal,
            }
        })
    }
}

impl Default for SharedContext {
    fn default() -> Self {
        Self::new()
    }
}
