//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::{InputError, ParseError};
use crate::program::LoadMode;

use super::commands::RequestId;
use super::ports::StorageError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service finished its boot load.
    Started { triggers: usize },

    /// A program compiled and replaced the running one.
    ProgramAccepted { mode: LoadMode, triggers: usize },

    /// A program failed to compile; the running one is unchanged.
    ProgramRejected { mode: LoadMode, error: ParseError },

    /// No stored program, or it could not be read.  Runs empty.
    NoStoredProgram(Option<StorageError>),

    /// Upload `id` reached the slow loop after its requester gave up; it
    /// was dropped without being compiled.
    UploadAbandoned { id: RequestId },

    /// The accepted program text was written to storage.
    ProgramPersisted { bytes: usize },

    /// Saving the accepted program failed; it stays active but the stored
    /// text is the previous one.
    PersistFailed(StorageError),

    /// Trigger `index` started its first command.
    TriggerFired { index: usize },

    /// Trigger `index` ran its last command.
    TriggerFinished { index: usize },

    /// Trigger `index` could not be polled this round.
    TriggerFault { index: usize, error: InputError },

    /// A `halt` command ran; outputs are zeroed until reset.
    Halted,
}
