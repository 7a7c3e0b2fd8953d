//! Mock adapters for integration tests.
//!
//! Records every pin write so tests can assert on the full output
//! history without touching real GPIO/LEDC registers.

use std::cell::Cell;

use smartplug::app::events::AppEvent;
use smartplug::app::ports::{Clock, EventSink, InputPort, OutputPort, ProgramStore, StorageError};
use smartplug::error::InputError;

// ── Pin call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinCall {
    Load { channel: usize, active: bool },
    Led(bool),
    Buzzer(bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<PinCall>,
    pub keys: [bool; 4],
    pub key_count: u8,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            keys: [false; 4],
            key_count: 4,
        }
    }

    pub fn press(&mut self, key: usize) {
        self.keys[key] = true;
    }

    pub fn release(&mut self, key: usize) {
        self.keys[key] = false;
    }

    /// Last written state of a load channel.
    pub fn load(&self, channel: usize) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match *c {
            PinCall::Load { channel: ch, active } if ch == channel => Some(active),
            _ => None,
        })
    }

    pub fn led(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match *c {
            PinCall::Led(on) => Some(on),
            _ => None,
        })
    }

    pub fn buzzer(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match *c {
            PinCall::Buzzer(on) => Some(on),
            _ => None,
        })
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for MockHardware {
    fn set_load(&mut self, channel: usize, active: bool) {
        self.calls.push(PinCall::Load { channel, active });
    }

    fn set_led(&mut self, on: bool) {
        self.calls.push(PinCall::Led(on));
    }

    fn set_buzzer(&mut self, on: bool) {
        self.calls.push(PinCall::Buzzer(on));
    }
}

impl InputPort for MockHardware {
    fn key_pressed(&mut self, key: u8) -> Result<bool, InputError> {
        if key >= self.key_count {
            return Err(InputError::NoSuchKey(key));
        }
        Ok(self.keys[usize::from(key)])
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    now: Cell<u32>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(ms: u32) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

// ── MemStore ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MemStore {
    pub text: Option<String>,
    pub load_error: Option<StorageError>,
    pub fail_saves: bool,
    pub saves: usize,
}

#[allow(dead_code)]
impl MemStore {
    pub fn with_program(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            ..Default::default()
        }
    }
}

impl ProgramStore for MemStore {
    fn load_program(&self) -> Result<Option<String>, StorageError> {
        match self.load_error {
            Some(e) => Err(e),
            None => Ok(self.text.clone()),
        }
    }

    fn save_program(&mut self, text: &str) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::IoError);
        }
        self.saves += 1;
        self.text = Some(text.to_owned());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
