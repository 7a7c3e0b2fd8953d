//! Event-block grammar.
//!
//! ```text
//!   program  := block ( '@' block )*
//!   block    := [ header ':' ] commands
//!   header   := ''                       Immediate, upload only
//!             | 'key' DIGITS             KeyPressed
//!             | 'off' ...                LoadOff
//!             | 'reset'                  Immediate, boot only
//!             | DAYS HHMM                TimeOfDay (4–11 digits)
//!   commands := ( NAME NUMBER )*         see lexer
//! ```
//!
//! A block without `:` is an upload-only Immediate block.  A pre-colon
//! part that is not a header but lexes as commands (`a1.0:w5s3`) is read
//! the same way, with the colon acting as a separator.
//!
//! Blocks skipped for the current [`LoadMode`] are still checked, so a
//! program accepted at upload also compiles at the next boot.

use crate::error::{ParseError, ParseErrorKind};

use super::command::Command;
use super::lexer::{Token, tokenize};
use super::trigger::{Condition, EventTrigger, TimeOfDay};
use super::{LoadMode, MAX_KEYS};

const KEY_PREFIX: &str = "key";
const OFF_PREFIX: &str = "off";
const RESET_HEADER: &str = "reset";
const HHMM_DIGITS: usize = 4;
const MAX_DAY_DIGITS: usize = 7;

/// Header outcome before the load mode is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    OnUpload,
    OnBoot,
    Always(Condition),
}

/// Parse one `@`-separated block.  `Ok(None)` means the block does not
/// apply to this load mode, or has no commands.
pub fn parse_block(
    block: &str,
    index: usize,
    mode: LoadMode,
) -> Result<Option<EventTrigger>, ParseError> {
    let (header, commands) = match block.split_once(':') {
        None => (Header::OnUpload, parse_commands(block, index, 0)?),
        Some((head, tail)) => {
            let tail_col = head.len() + 1;
            match parse_header(head, index)? {
                Some(header) => (header, parse_commands(tail, index, tail_col)?),
                None => {
                    // Headerless block whose first commands precede the colon.
                    let Ok(mut leading) = parse_commands(head, index, 0) else {
                        return Err(ParseError::new(
                            ParseErrorKind::UnknownTriggerHeader,
                            index,
                            0,
                        ));
                    };
                    leading.extend(parse_commands(tail, index, tail_col)?);
                    (Header::OnUpload, leading)
                }
            }
        }
    };

    let condition = match (header, mode) {
        (Header::OnUpload, LoadMode::Upload) | (Header::OnBoot, LoadMode::Boot) => {
            Condition::Immediate
        }
        (Header::OnUpload, LoadMode::Boot) | (Header::OnBoot, LoadMode::Upload) => {
            return Ok(None);
        }
        (Header::Always(condition), _) => condition,
    };

    if commands.is_empty() {
        return Ok(None);
    }
    Ok(Some(EventTrigger::new(condition, commands)))
}

/// `Ok(None)` when `head` is not any known header shape.
fn parse_header(head: &str, block: usize) -> Result<Option<Header>, ParseError> {
    let lead = head.len() - head.trim_start().len();
    let head = head.trim();
    let err = |kind| ParseError::new(kind, block, lead);

    if head.is_empty() {
        return Ok(Some(Header::OnUpload));
    }
    if head == RESET_HEADER {
        return Ok(Some(Header::OnBoot));
    }
    if head.starts_with(OFF_PREFIX) {
        return Ok(Some(Header::Always(Condition::LoadOff)));
    }
    if let Some(digits) = head.strip_prefix(KEY_PREFIX) {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err(ParseErrorKind::UnknownTriggerHeader));
        }
        let key: usize = digits
            .parse()
            .map_err(|_| err(ParseErrorKind::KeyOutOfRange))?;
        if key >= MAX_KEYS {
            return Err(err(ParseErrorKind::KeyOutOfRange));
        }
        return Ok(Some(Header::Always(Condition::KeyPressed(key as u8))));
    }
    if (HHMM_DIGITS..=HHMM_DIGITS + MAX_DAY_DIGITS).contains(&head.len())
        && head.bytes().all(|b| b.is_ascii_digit())
    {
        return parse_time_of_day(head)
            .map(|tod| Some(Header::Always(Condition::TimeOfDay(tod))))
            .ok_or_else(|| err(ParseErrorKind::BadNumber));
    }
    Ok(None)
}

/// `DDDHHMM`: any number of weekday digits (1–7, `0` meaning Sunday as 7)
/// followed by a four-digit time.  No days means every day.
fn parse_time_of_day(digits: &str) -> Option<TimeOfDay> {
    let split = digits.len() - HHMM_DIGITS;
    let (days, time) = digits.split_at(split);
    let hhmm: u16 = time.parse().ok()?;
    let mut mask = 0u8;
    for d in days.bytes() {
        let day = match d - b'0' {
            0 => 7,
            day @ 1..=7 => day,
            _ => return None,
        };
        mask |= 1 << day;
    }
    if mask == 0 {
        mask = 0b1111_1110;
    }
    Some(TimeOfDay { days: mask, hhmm })
}

fn parse_commands(src: &str, block: usize, base: usize) -> Result<Vec<Command>, ParseError> {
    tokenize(src, block, base)?
        .into_iter()
        .map(|tok| {
            build_command(&tok).map_err(|kind| ParseError::new(kind, block, tok.column))
        })
        .collect()
}

fn build_command(tok: &Token<'_>) -> Result<Command, ParseErrorKind> {
    match tok.name {
        "w" => {
            // All digits but past u32 is still just a very long wait.
            let seconds = parse_int(tok.number).map_err(|kind| {
                if tok.number.contains('.') {
                    kind
                } else {
                    ParseErrorKind::DurationOverflow
                }
            })?;
            Command::wait(seconds)
        }
        "s" => Ok(Command::say(parse_int(tok.number)?)),
        "halt" => Ok(Command::Halt),
        name if name.len() == 1 => {
            let channel = name.as_bytes()[0] - b'a';
            if usize::from(channel) >= super::MAX_CHANNELS {
                return Err(ParseErrorKind::UnknownCommand);
            }
            let power: f32 = tok
                .number
                .parse()
                .map_err(|_| ParseErrorKind::BadNumber)?;
            Command::set_load(channel, power)
        }
        _ => Err(ParseErrorKind::UnknownCommand),
    }
}

/// Integer argument; a `.0` style fraction is a bad number.
fn parse_int(number: &str) -> Result<u32, ParseErrorKind> {
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::BadNumber);
    }
    number.parse().map_err(|_| ParseErrorKind::BadNumber)
}
