//! Route parsing and reply rendering.
//!
//! ```text
//!   GET /setprog?<program>  ──▶ AppCommand::LoadProgram ──▶ {"Result":"Ok"}
//!   GET /cfg.js             ──▶ AppCommand::QueryStatus ──▶ let CFG={...}
//!   anything else           ──▶ 404
//! ```
//!
//! Every request becomes one mailbox round trip.  A full mailbox answers
//! `Busy`, a slow loop that does not answer in time answers `Timeout`.
//! A timed-out upload carries its deadline and is never applied.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::app::commands::{AppCommand, AppResponse, ProgramSummary, StatusSnapshot};
use crate::app::mailbox::Mailbox;
use crate::error::{ParseError, ParseErrorKind};
use crate::program::MAX_PROGRAM_LEN;

pub const CONTENT_JSON: &str = "application/json";
pub const CONTENT_JS: &str = "application/javascript";
pub const CONTENT_TEXT: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpReply {
    fn ok(content_type: &'static str, body: String) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: CONTENT_TEXT,
            body: "404 Not Found".into(),
        }
    }

    fn unavailable(reason: &str) -> Self {
        Self {
            status: 503,
            content_type: CONTENT_TEXT,
            body: reason.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Routing
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// Raw (still percent-encoded) query string.
    SetProgram(&'a str),
    ConfigJs,
    NotFound,
}

/// Page names compare case-insensitively; the query is kept verbatim.
pub fn route(uri: &str) -> Route<'_> {
    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, query),
        None => (uri, ""),
    };
    let page = path.trim_start_matches('/');
    if page.eq_ignore_ascii_case("setprog") {
        Route::SetProgram(query)
    } else if page.eq_ignore_ascii_case("cfg.js") {
        Route::ConfigJs
    } else {
        Route::NotFound
    }
}

/// Decode `%XX` escapes.  Malformed escapes pass through literally and
/// invalid UTF-8 is replaced.
pub fn percent_decode(raw: &str) -> String {
    fn hex(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ═══════════════════════════════════════════════════════════════
//  Rendering
// ═══════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct Verdict<'a> {
    #[serde(rename = "Result")]
    result: &'a str,
    #[serde(rename = "Reason", skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn verdict(result: &str, reason: Option<String>) -> String {
    serde_json::to_string(&Verdict { result, reason })
        .unwrap_or_else(|_| format!("{{\"Result\":\"{}\"}}", result))
}

/// `{"Result":"Ok"}` or `{"Result":"Error","Reason":"..."}`.
pub fn render_verdict(result: &Result<ProgramSummary, ParseError>) -> String {
    match result {
        Ok(_) => verdict("Ok", None),
        Err(e) => verdict("Error", Some(e.to_string())),
    }
}

pub fn render_busy() -> String {
    verdict("Busy", None)
}

pub fn render_timeout() -> String {
    verdict("Timeout", None)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrowserConfig<'a> {
    program: &'a str,
    version: &'a str,
    key_count: u8,
    out_count: u8,
}

/// `let CFG={"program":..,"version":..,"keyCount":..,"outCount":..}`
pub fn render_config_js(snapshot: &StatusSnapshot) -> String {
    let cfg = BrowserConfig {
        program: &snapshot.program,
        version: snapshot.version,
        key_count: snapshot.key_count,
        out_count: snapshot.out_count,
    };
    let json = serde_json::to_string(&cfg).unwrap_or_else(|_| "{}".into());
    format!("let CFG={}", json)
}

// ═══════════════════════════════════════════════════════════════
//  Dispatch
// ═══════════════════════════════════════════════════════════════

/// Serve one request, blocking up to `timeout` for the slow loop.
pub fn handle(uri: &str, mailbox: &Mailbox, timeout: Duration) -> HttpReply {
    match route(uri) {
        Route::SetProgram(query) => handle_set_program(query, mailbox, timeout),
        Route::ConfigJs => handle_config_js(mailbox, timeout),
        Route::NotFound => HttpReply::not_found(),
    }
}

fn handle_set_program(query: &str, mailbox: &Mailbox, timeout: Duration) -> HttpReply {
    let decoded = percent_decode(query);
    let mut text = heapless::String::<MAX_PROGRAM_LEN>::new();
    if text.push_str(&decoded).is_err() {
        let err = ParseError::new(ParseErrorKind::ProgramTooLong, 0, 0);
        return HttpReply::ok(CONTENT_JSON, render_verdict(&Err(err)));
    }

    let id = mailbox.next_id();
    let expires = Instant::now() + timeout;
    if mailbox
        .try_submit(AppCommand::LoadProgram { id, text, expires })
        .is_err()
    {
        log::warn!("web: mailbox full, upload refused");
        return HttpReply::ok(CONTENT_JSON, render_busy());
    }
    match mailbox.wait_until(id, expires) {
        Some(AppResponse::Verdict { result, .. }) => {
            HttpReply::ok(CONTENT_JSON, render_verdict(&result))
        }
        Some(AppResponse::Status { .. }) | None => {
            HttpReply::ok(CONTENT_JSON, render_timeout())
        }
    }
}

fn handle_config_js(mailbox: &Mailbox, timeout: Duration) -> HttpReply {
    let id = mailbox.next_id();
    if mailbox.try_submit(AppCommand::QueryStatus { id }).is_err() {
        return HttpReply::unavailable("busy");
    }
    match mailbox.wait_response(id, timeout) {
        Some(AppResponse::Status { snapshot, .. }) => {
            HttpReply::ok(CONTENT_JS, render_config_js(&snapshot))
        }
        Some(AppResponse::Verdict { .. }) | None => HttpReply::unavailable("timeout"),
    }
}
