//! Application service: the slow-loop core.
//!
//! [`AppService`] owns the running [`Program`] and a handle to the
//! [`SharedContext`] the fast tick reads.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!  ProgramStore ◀─▶ ┌────────────────────────┐ ──▶ EventSink
//!                   │       AppService        │
//!     InputPort ──▶ │  Program · triggers     │ ──▶ SharedContext ──▶ fast tick
//!         Clock ──▶ └────────────────────────┘
//! ```

use std::sync::Arc;

use log::{info, warn};

use crate::config::{FIRMWARE_VERSION, SystemConfig};
use crate::context::SharedContext;
use crate::error::{Error, ParseError};
use crate::program::{self, CommandEnv, LoadMode, Program, TriggerStep};

use super::commands::{AppCommand, AppResponse, ProgramSummary, StatusSnapshot};
use super::events::AppEvent;
use super::mailbox::{self, Mailbox};
use super::ports::{Clock, EventSink, InputPort, ProgramStore, StorageError};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: SystemConfig,
    shared: Arc<SharedContext>,
    program: Program,
    /// The running program differs from the stored one.
    persist_pending: bool,
    poll_count: u64,
}

impl AppService {
    /// Construct the service with an empty program.
    ///
    /// Call [`boot`](Self::boot) next to load the stored program.
    pub fn new(config: SystemConfig, shared: Arc<SharedContext>) -> Self {
        Self {
            config,
            shared,
            program: Program::empty(),
            persist_pending: false,
            poll_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load and compile the stored program in [`LoadMode::Boot`].
    ///
    /// Never leaves the service unusable: a missing, unreadable or no
    /// longer valid program means running empty.  The error says which.
    pub fn boot(
        &mut self,
        store: &impl ProgramStore,
        sink: &mut impl EventSink,
    ) -> Result<ProgramSummary, Error> {
        let outcome = match store.load_program() {
            Ok(Some(text)) => self.install(&text, LoadMode::Boot, sink).map_err(Error::from),
            Ok(None) | Err(StorageError::NotFound) => {
                info!("AppService: no stored program");
                sink.emit(&AppEvent::NoStoredProgram(None));
                Ok(self.summary())
            }
            Err(e) => {
                warn!("AppService: program read failed: {}", e);
                sink.emit(&AppEvent::NoStoredProgram(Some(e)));
                Err(Error::from(e))
            }
        };
        sink.emit(&AppEvent::Started {
            triggers: self.program.len(),
        });
        outcome
    }

    // ── Program ingestion ─────────────────────────────────────

    /// Compile an uploaded program and swap it in on success.
    ///
    /// On error nothing changes: the old program keeps running.
    pub fn accept_upload(
        &mut self,
        text: &str,
        sink: &mut impl EventSink,
    ) -> Result<ProgramSummary, ParseError> {
        self.install(text, LoadMode::Upload, sink)
    }

    /// Write the running program's text to the store.
    pub fn persist(
        &self,
        store: &mut impl ProgramStore,
        sink: &mut impl EventSink,
    ) -> Result<(), StorageError> {
        let text = self.program.source();
        match store.save_program(text) {
            Ok(()) => {
                sink.emit(&AppEvent::ProgramPersisted { bytes: text.len() });
                Ok(())
            }
            Err(e) => {
                warn!("AppService: program save failed: {}", e);
                sink.emit(&AppEvent::PersistFailed(e));
                Err(e)
            }
        }
    }

    fn install(
        &mut self,
        text: &str,
        mode: LoadMode,
        sink: &mut impl EventSink,
    ) -> Result<ProgramSummary, ParseError> {
        match program::compile(text, mode) {
            Ok(compiled) => {
                self.program = compiled;
                info!(
                    "AppService: program accepted ({:?}, {} triggers)",
                    mode,
                    self.program.len()
                );
                sink.emit(&AppEvent::ProgramAccepted {
                    mode,
                    triggers: self.program.len(),
                });
                Ok(self.summary())
            }
            Err(error) => {
                warn!("AppService: program rejected ({:?}): {}", mode, error);
                sink.emit(&AppEvent::ProgramRejected { mode, error });
                Err(error)
            }
        }
    }

    // ── Mailbox ───────────────────────────────────────────────

    /// Answer every queued request, then save the running program if it
    /// is not yet stored.  An accepted upload is answered before it is
    /// persisted, and a failed save is retried on every call until it
    /// succeeds.  Uploads whose requester already gave up are dropped.
    /// Returns the number of requests handled.
    pub fn serve(
        &mut self,
        mailbox: &Mailbox,
        store: &mut impl ProgramStore,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Some(cmd) = mailbox.try_next_request() {
            handled += 1;
            match cmd {
                AppCommand::LoadProgram { id, text, expires } => {
                    if !mailbox::is_awaited(expires) {
                        warn!("AppService: upload {} abandoned by requester", id);
                        sink.emit(&AppEvent::UploadAbandoned { id });
                        continue;
                    }
                    let result = self.accept_upload(&text, sink);
                    mailbox.reply(AppResponse::Verdict { id, result });
                    if result.is_ok() {
                        self.persist_pending = true;
                    }
                }
                AppCommand::QueryStatus { id } => {
                    mailbox.reply(AppResponse::Status {
                        id,
                        snapshot: self.status(),
                    });
                }
            }
        }
        if self.persist_pending {
            // Failure already reported through the sink.
            self.persist_pending = self.persist(store, sink).is_err();
        }
        handled
    }

    // ── Per-poll orchestration ────────────────────────────────

    /// Poll every trigger once, in program order.
    ///
    /// A trigger whose condition cannot be read is skipped for this round.
    /// After a `halt` nothing is polled again, including the triggers that
    /// follow it in this round.
    pub fn poll(
        &mut self,
        inputs: &mut impl InputPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        if self.shared.is_halted() {
            return;
        }
        self.poll_count += 1;
        let env = CommandEnv {
            shared: self.shared.as_ref(),
            now_ms: clock.now_ms(),
        };

        for (index, trigger) in self.program.triggers_mut().iter_mut().enumerate() {
            match trigger.poll(inputs, &env) {
                Ok(TriggerStep::Fired) => sink.emit(&AppEvent::TriggerFired { index }),
                Ok(TriggerStep::Completed) => sink.emit(&AppEvent::TriggerFinished { index }),
                Ok(_) => {}
                Err(error) => sink.emit(&AppEvent::TriggerFault { index, error }),
            }
            if self.shared.is_halted() {
                warn!("AppService: halted by trigger {}", index);
                sink.emit(&AppEvent::Halted);
                break;
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            program: self.program.source().to_owned(),
            version: FIRMWARE_VERSION,
            key_count: self.config.key_count,
            out_count: self.config.channel_count,
            triggers: self.program.len(),
            halted: self.shared.is_halted(),
        }
    }

    fn summary(&self) -> ProgramSummary {
        ProgramSummary {
            triggers: self.program.len(),
            bytes: self.program.source().len(),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn shared(&self) -> &SharedContext {
        &self.shared
    }

    /// A save failed and will be retried on the next [`serve`](Self::serve).
    pub fn persist_pending(&self) -> bool {
        self.persist_pending
    }

    pub fn is_halted(&self) -> bool {
        self.shared.is_halted()
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}
