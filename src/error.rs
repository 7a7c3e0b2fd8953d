//! Unified error types for the SmartPlug firmware.
//!
//! Every subsystem error converts into [`Error`] so the slow loop and the
//! binary handle failures uniformly.  Variants stay `Copy` so they can be
//! passed through events and verdicts without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An uploaded or stored program failed to compile.
    Parse(ParseError),
    /// A trigger condition could not be evaluated.
    Input(InputError),
    /// Program or config storage failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Program compile errors
// ---------------------------------------------------------------------------

/// What went wrong while compiling a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Event header is none of the known trigger shapes.
    UnknownTriggerHeader,
    /// Command name is not `a`..`d`, `w`, `s` or `halt`.
    UnknownCommand,
    /// Letters without a numeric argument, or a stray character run.
    MalformedToken,
    /// Numeric argument is not a valid number for its command.
    BadNumber,
    /// Wait longer than one day.
    DurationOverflow,
    /// Load power outside `0.0..=1.0`.
    PowerOutOfRange,
    /// Key trigger names a key the board does not have.
    KeyOutOfRange,
    /// Program text longer than [`MAX_PROGRAM_LEN`](crate::program::MAX_PROGRAM_LEN).
    ProgramTooLong,
}

impl ParseErrorKind {
    /// Stable short name, used in HTTP verdicts and log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownTriggerHeader => "unknown trigger header",
            Self::UnknownCommand => "unknown command",
            Self::MalformedToken => "malformed token",
            Self::BadNumber => "bad number",
            Self::DurationOverflow => "wait longer than 86400 s",
            Self::PowerOutOfRange => "power outside 0..1",
            Self::KeyOutOfRange => "no such key",
            Self::ProgramTooLong => "program too long",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compile failure, located by event block (0-based, split on `@`) and
/// byte column within that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub block: usize,
    pub column: usize,
}

impl ParseError {
    pub const fn new(kind: ParseErrorKind, block: usize, column: usize) -> Self {
        Self {
            kind,
            block,
            column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (event {}, col {})", self.kind, self.block, self.column)
    }
}

// ---------------------------------------------------------------------------
// Trigger input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// Key index is not wired on this board.
    NoSuchKey(u8),
    /// GPIO read returned an error.
    ReadFailed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchKey(k) => write!(f, "key {k} not wired"),
            Self::ReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
