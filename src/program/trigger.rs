//! EventTrigger: a condition bound to an ordered command list.
//!
//! ```text
//!            condition true
//!   Idle ───────────────────▶ Running(0)
//!    ▲                            │ poll(cmd[i]) done
//!    │ condition false            ▼
//!   Finished ◀──── i == len ── Running(i+1)
//! ```
//!
//! `Finished` only re-arms after the condition reads false, so a key held
//! down fires its commands once.  An `Immediate` trigger therefore runs
//! exactly once per program load.

use crate::app::ports::InputPort;
use crate::error::InputError;

use super::command::{Command, CommandEnv};

/// Weekday mask (bit 1 = Monday .. bit 7 = Sunday) and `HHMM` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub days: u8,
    pub hhmm: u16,
}

impl TimeOfDay {
    pub fn includes_day(&self, day: u8) -> bool {
        day < 8 && self.days & (1 << day) != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Always true.
    Immediate,
    /// True while the key reads pressed.
    KeyPressed(u8),
    /// Load switched off externally.  Never true: there is no load
    /// feedback input to detect it yet.
    LoadOff,
    /// Wall-clock schedule.  Never true: the device keeps no calendar
    /// time yet.
    TimeOfDay(TimeOfDay),
}

impl Condition {
    pub fn evaluate(&self, inputs: &mut impl InputPort) -> Result<bool, InputError> {
        match *self {
            Self::Immediate => Ok(true),
            Self::KeyPressed(key) => inputs.key_pressed(key),
            Self::LoadOff | Self::TimeOfDay(_) => Ok(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Idle,
    Running(usize),
    Finished,
}

/// What one poll did, for event reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerStep {
    /// Nothing changed.
    Quiet,
    /// Condition went true; the first command started.
    Fired,
    /// Command `i` started after its predecessor finished.
    Advanced(usize),
    /// Last command finished.
    Completed,
    /// Condition read false after finishing; armed again.
    Rearmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventTrigger {
    condition: Condition,
    commands: Vec<Command>,
    cursor: Cursor,
}

impl EventTrigger {
    pub fn new(condition: Condition, commands: Vec<Command>) -> Self {
        Self {
            condition,
            commands,
            cursor: Cursor::Idle,
        }
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Advance the state machine by one slow poll.
    ///
    /// A failed condition read leaves the cursor untouched.
    pub fn poll(
        &mut self,
        inputs: &mut impl InputPort,
        env: &CommandEnv<'_>,
    ) -> Result<TriggerStep, InputError> {
        match self.cursor {
            Cursor::Idle => {
                if !self.condition.evaluate(inputs)? {
                    return Ok(TriggerStep::Quiet);
                }
                match self.commands.first_mut() {
                    Some(first) => {
                        first.start(env);
                        self.cursor = Cursor::Running(0);
                        Ok(TriggerStep::Fired)
                    }
                    None => {
                        self.cursor = Cursor::Finished;
                        Ok(TriggerStep::Completed)
                    }
                }
            }
            Cursor::Running(i) => {
                let Some(current) = self.commands.get(i) else {
                    self.cursor = Cursor::Finished;
                    return Ok(TriggerStep::Completed);
                };
                if !current.poll(env) {
                    return Ok(TriggerStep::Quiet);
                }
                let next = i + 1;
                match self.commands.get_mut(next) {
                    Some(cmd) => {
                        cmd.start(env);
                        self.cursor = Cursor::Running(next);
                        Ok(TriggerStep::Advanced(next))
                    }
                    None => {
                        self.cursor = Cursor::Finished;
                        Ok(TriggerStep::Completed)
                    }
                }
            }
            Cursor::Finished => {
                if self.condition.evaluate(inputs)? {
                    Ok(TriggerStep::Quiet)
                } else {
                    self.cursor = Cursor::Idle;
                    Ok(TriggerStep::Rearmed)
                }
            }
        }
    }
}
