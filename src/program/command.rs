//! The four program actions and their start/poll contract.
//!
//! `start()` runs once when a trigger reaches the command; `poll()` is
//! then called once per slow poll until it reports done.  Only `Wait`
//! spans more than one poll.

use crate::context::SharedContext;
use crate::error::ParseErrorKind;
use crate::signal;

use super::{MAX_CHANNELS, MAX_WAIT_SECS};

/// What a command sees while running.
pub struct CommandEnv<'a> {
    pub shared: &'a SharedContext,
    /// Monotonic milliseconds, wrapping at `u32::MAX`.
    pub now_ms: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set one load channel's duty.
    SetLoadState { channel: u8, power: f32 },
    /// Block the trigger for `seconds`; `deadline_ms` is set by `start()`.
    Wait { seconds: u32, deadline_ms: Option<u32> },
    /// Install the sound/flash preset for `code` (or silence).
    SayToUser { code: u32 },
    /// Zero all loads and stop trigger evaluation until reset.
    Halt,
}

impl Command {
    pub fn set_load(channel: u8, power: f32) -> Result<Self, ParseErrorKind> {
        if usize::from(channel) >= MAX_CHANNELS {
            return Err(ParseErrorKind::UnknownCommand);
        }
        if !(0.0..=1.0).contains(&power) {
            return Err(ParseErrorKind::PowerOutOfRange);
        }
        Ok(Self::SetLoadState { channel, power })
    }

    pub fn wait(seconds: u32) -> Result<Self, ParseErrorKind> {
        if seconds > MAX_WAIT_SECS {
            return Err(ParseErrorKind::DurationOverflow);
        }
        Ok(Self::Wait {
            seconds,
            deadline_ms: None,
        })
    }

    pub fn say(code: u32) -> Self {
        Self::SayToUser { code }
    }

    pub fn start(&mut self, env: &CommandEnv<'_>) {
        match self {
            Self::SetLoadState { channel, power } => {
                env.shared.set_setpoint(usize::from(*channel), *power);
            }
            Self::Wait {
                seconds,
                deadline_ms,
            } => {
                // seconds <= 86400, so the offset fits well inside i32.
                *deadline_ms = Some(env.now_ms.wrapping_add(*seconds * 1000));
            }
            Self::SayToUser { code } => {
                env.shared.install_messenger(signal::preset(*code));
            }
            Self::Halt => env.shared.halt(),
        }
    }

    /// `true` once the command has finished.
    pub fn poll(&self, env: &CommandEnv<'_>) -> bool {
        match self {
            Self::Wait {
                deadline_ms: Some(deadline),
                ..
            } => env.now_ms.wrapping_sub(*deadline) as i32 >= 0,
            _ => true,
        }
    }
}
