//! The load-control program language.
//!
//! A program is one line of text binding trigger conditions to command
//! sequences:
//!
//! ```text
//!   a1w5a0@key0:b1w60b0@reset:s81
//!   └─┬──┘ └────┬─────┘ └───┬───┘
//!   on upload  key 0 held   at boot
//! ```
//!
//! [`compile`] is all-or-nothing: any error rejects the whole text and the
//! caller keeps running its previous [`Program`].

pub mod command;
pub mod lexer;
pub mod parser;
pub mod trigger;

pub use command::{Command, CommandEnv};
pub use trigger::{Condition, Cursor, EventTrigger, TimeOfDay, TriggerStep};

use crate::error::{ParseError, ParseErrorKind};

/// Load outputs addressable as `a`..`d`.
pub const MAX_CHANNELS: usize = 4;
/// Keys addressable as `key0`..`key3`.
pub const MAX_KEYS: usize = 4;
/// Longest accepted program text, in bytes.
pub const MAX_PROGRAM_LEN: usize = 1024;
/// Longest accepted `w` argument (one day).
pub const MAX_WAIT_SECS: u32 = 86_400;

/// Why a program is being compiled.  Decides which Immediate blocks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Reloading the stored program after power-up: `reset:` blocks run.
    Boot,
    /// A freshly uploaded program: headerless blocks run.
    Upload,
}

/// A compiled program plus the text it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    source: String,
    triggers: Vec<EventTrigger>,
}

impl Program {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn triggers(&self) -> &[EventTrigger] {
        &self.triggers
    }

    pub fn triggers_mut(&mut self) -> &mut [EventTrigger] {
        &mut self.triggers
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

/// Compile program text.  Case-insensitive; the original text is kept
/// for persistence.
pub fn compile(text: &str, mode: LoadMode) -> Result<Program, ParseError> {
    if text.len() > MAX_PROGRAM_LEN {
        return Err(ParseError::new(ParseErrorKind::ProgramTooLong, 0, 0));
    }
    let lowered = text.to_ascii_lowercase();
    let mut triggers = Vec::new();
    for (index, block) in lowered.split('@').enumerate() {
        if let Some(trigger) = parser::parse_block(block, index, mode)? {
            triggers.push(trigger);
        }
    }
    Ok(Program {
        source: text.to_owned(),
        triggers,
    })
}
