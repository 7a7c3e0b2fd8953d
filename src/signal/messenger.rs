//! Messenger: a position-driven on/off sequencer.
//!
//! A pattern is a list of segment lengths in fast ticks, alternating
//! active/inactive and starting active.  The output at any position is a
//! pure function of `position % period` where `period = sum(pattern)`:
//!
//! ```text
//!   pattern [2, 5]      period 7
//!   position  0 1 2 3 4 5 6 | 7 8 9 ...
//!   state     ▮ ▮ . . . . . | ▮ ▮ . ...
//! ```
//!
//! With a repeat count `k` the messenger reports finished once
//! `position >= period * k`; without one it runs until replaced.
//! The scheduler owns the single active instance and advances it once
//! per fast tick.

use core::fmt;

use heapless::Vec;

/// Longest pattern in the sound catalog (nine flash/gap pairs).
pub const MAX_SEGMENTS: usize = 18;

/// Which physical indicator the messenger drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalTarget {
    Led,
    Buzzer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    /// No segments at all.
    Empty,
    /// Every segment has length zero.
    ZeroPeriod,
    /// More than [`MAX_SEGMENTS`] segments.
    TooLong,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty pattern"),
            Self::ZeroPeriod => write!(f, "pattern period is zero"),
            Self::TooLong => write!(f, "pattern has more than {MAX_SEGMENTS} segments"),
        }
    }
}

/// Result of advancing a messenger by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessengerStep {
    /// Indicator state for the tick just consumed.
    pub active: bool,
    /// Repeat count exhausted; the caller must retire the messenger.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messenger {
    pattern: Vec<u8, MAX_SEGMENTS>,
    period: u32,
    repeat: Option<u32>,
    target: SignalTarget,
    position: u32,
}

impl Messenger {
    pub fn new(
        pattern: &[u8],
        target: SignalTarget,
        repeat: Option<u32>,
    ) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        let pattern = Vec::from_slice(pattern).map_err(|()| PatternError::TooLong)?;
        let period: u32 = pattern.iter().map(|&len| u32::from(len)).sum();
        if period == 0 {
            return Err(PatternError::ZeroPeriod);
        }
        Ok(Self {
            pattern,
            period,
            repeat,
            target,
            position: 0,
        })
    }

    pub fn target(&self) -> SignalTarget {
        self.target
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn repeat(&self) -> Option<u32> {
        self.repeat
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Indicator state at an arbitrary position.
    pub fn state_at(&self, position: u32) -> bool {
        let mut remaining = position % self.period;
        let mut active = true;
        for &len in &self.pattern {
            let len = u32::from(len);
            if remaining < len {
                return active;
            }
            remaining -= len;
            active = !active;
        }
        // remaining < period, so the walk always returns above.
        false
    }

    /// Whether the repeat count is exhausted at `position`.
    pub fn is_finished_at(&self, position: u32) -> bool {
        self.repeat
            .is_some_and(|k| position >= self.period.saturating_mul(k))
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished_at(self.position)
    }

    /// Emit the state for the current position and move one tick forward.
    pub fn step(&mut self) -> MessengerStep {
        let active = self.state_at(self.position);
        self.position = match self.repeat {
            // Endless patterns only need the phase; keep it bounded.
            None => (self.position + 1) % self.period,
            Some(_) => self.position.saturating_add(1),
        };
        MessengerStep {
            active,
            finished: self.is_finished(),
        }
    }
}
