//! Request/response mailbox between the HTTP task and the slow loop.
//!
//! Uses `embassy-sync` bounded channels so both sides share one object
//! without heap allocation per message.
//!
//! ```text
//! ┌──────────────┐  AppCommand   ┌──────────────┐
//! │  HTTP task   │─────────────▶│  Slow loop    │
//! │  (blocking)  │◀─────────────│  AppService   │
//! └──────────────┘  AppResponse  └──────────────┘
//! ```
//!
//! The slow loop drains requests once per poll, so a requester may wait
//! up to one poll period for its answer.  An upload whose requester has
//! (nearly) given up is not applied: see [`is_awaited`].

use core::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use super::commands::{AppCommand, AppResponse, RequestId};

/// Channel depth for inbound requests.
const REQUEST_DEPTH: usize = 4;

/// Channel depth for outbound responses.
const RESPONSE_DEPTH: usize = 4;

/// How often a waiting requester re-checks the response channel.
const RESPONSE_POLL: Duration = Duration::from_millis(20);

/// A reply must be posted at least this long before the requester's
/// deadline to be seen.
pub const REPLY_MARGIN: Duration = Duration::from_millis(100);

/// Whether a requester waiting until `expires` will still collect a reply
/// posted now.
pub fn is_awaited(expires: Instant) -> bool {
    Instant::now() + REPLY_MARGIN < expires
}

pub struct Mailbox {
    requests: Channel<CriticalSectionRawMutex, AppCommand, REQUEST_DEPTH>,
    responses: Channel<CriticalSectionRawMutex, AppResponse, RESPONSE_DEPTH>,
    next_id: AtomicU32,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            responses: Channel::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Fresh id for a request.
    pub fn next_id(&self) -> RequestId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    // ── Requester side ────────────────────────────────────────

    /// Queue a request.  Hands it back when the queue is full.
    pub fn try_submit(&self, cmd: AppCommand) -> Result<(), AppCommand> {
        self.requests.try_send(cmd).map_err(|TrySendError::Full(cmd)| cmd)
    }

    /// Block until the response for `id` arrives or `timeout` passes.
    /// Responses for other ids (abandoned requests) are discarded.
    pub fn wait_response(&self, id: RequestId, timeout: Duration) -> Option<AppResponse> {
        self.wait_until(id, Instant::now() + timeout)
    }

    /// [`wait_response`](Self::wait_response) against an absolute deadline.
    /// The queue is drained once more after the deadline passes.
    pub fn wait_until(&self, id: RequestId, deadline: Instant) -> Option<AppResponse> {
        loop {
            let expired = Instant::now() >= deadline;
            if let Some(resp) = self.take_response(id) {
                return Some(resp);
            }
            if expired {
                return None;
            }
            std::thread::sleep(RESPONSE_POLL);
        }
    }

    fn take_response(&self, id: RequestId) -> Option<AppResponse> {
        while let Ok(resp) = self.responses.try_receive() {
            if resp.id() == id {
                return Some(resp);
            }
            log::debug!("mailbox: dropping stale response {}", resp.id());
        }
        None
    }

    // ── Service side ──────────────────────────────────────────

    pub fn try_next_request(&self) -> Option<AppCommand> {
        self.requests.try_receive().ok()
    }

    /// Post a response, evicting the oldest one if nobody collected it.
    pub fn reply(&self, resp: AppResponse) {
        if let Err(TrySendError::Full(resp)) = self.responses.try_send(resp) {
            let _ = self.responses.try_receive();
            let _ = self.responses.try_send(resp);
        }
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
