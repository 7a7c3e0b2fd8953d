//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per application event to
//! the ESP-IDF logger (UART / USB-CDC in production, stderr on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { triggers } => {
                info!("START | triggers={}", triggers);
            }
            AppEvent::ProgramAccepted { mode, triggers } => {
                info!("PROG  | accepted mode={:?} triggers={}", mode, triggers);
            }
            AppEvent::ProgramRejected { mode, error } => {
                warn!("PROG  | rejected mode={:?} error=\"{}\"", mode, error);
            }
            AppEvent::NoStoredProgram(None) => {
                info!("PROG  | none stored");
            }
            AppEvent::NoStoredProgram(Some(e)) => {
                warn!("PROG  | stored unreadable error=\"{}\"", e);
            }
            AppEvent::UploadAbandoned { id } => {
                warn!("PROG  | dropped abandoned upload id={}", id);
            }
            AppEvent::ProgramPersisted { bytes } => {
                info!("STORE | saved bytes={}", bytes);
            }
            AppEvent::PersistFailed(e) => {
                warn!("STORE | save failed error=\"{}\"", e);
            }
            AppEvent::TriggerFired { index } => {
                info!("TRIG  | fired event={}", index);
            }
            AppEvent::TriggerFinished { index } => {
                info!("TRIG  | finished event={}", index);
            }
            AppEvent::TriggerFault { index, error } => {
                warn!("TRIG  | fault event={} error=\"{}\"", index, error);
            }
            AppEvent::Halted => {
                warn!("HALT  | outputs off until reset");
            }
        }
    }
}
