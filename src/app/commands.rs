//! Inbound requests to the application service and their replies.
//!
//! The HTTP task cannot touch the [`AppService`](super::service::AppService)
//! directly (it lives on the slow loop), so it posts an [`AppCommand`]
//! through the [`Mailbox`](super::mailbox::Mailbox) and waits for the
//! matching [`AppResponse`].

use std::time::Instant;

use serde::Serialize;

use crate::error::ParseError;
use crate::program::MAX_PROGRAM_LEN;

/// Correlates a response with the request that caused it.
pub type RequestId = u32;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Compile `text` and, on success, make it the running program.
    ///
    /// The requester stops waiting at `expires`; past that point the
    /// upload is dropped unapplied, so the requester's `Timeout` holds.
    LoadProgram {
        id: RequestId,
        text: heapless::String<MAX_PROGRAM_LEN>,
        expires: Instant,
    },

    /// Read the current [`StatusSnapshot`].
    QueryStatus { id: RequestId },
}

impl AppCommand {
    pub fn id(&self) -> RequestId {
        match self {
            Self::LoadProgram { id, .. } | Self::QueryStatus { id } => *id,
        }
    }
}

/// Shape of an accepted program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramSummary {
    pub triggers: usize,
    pub bytes: usize,
}

/// Read-only view of the service for status pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Source text of the running program.
    pub program: String,
    pub version: &'static str,
    pub key_count: u8,
    pub out_count: u8,
    pub triggers: usize,
    pub halted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppResponse {
    Verdict {
        id: RequestId,
        result: Result<ProgramSummary, ParseError>,
    },
    Status {
        id: RequestId,
        snapshot: StatusSnapshot,
    },
}

impl AppResponse {
    pub fn id(&self) -> RequestId {
        match self {
            Self::Verdict { id, .. } | Self::Status { id, .. } => *id,
        }
    }
}
