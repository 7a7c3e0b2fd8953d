//! Integration tests for the upload path: HTTP route → mailbox →
//! `AppService::serve` → program swap → persistence.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::mock_hw::{MemStore, MockClock, MockHardware, RecordingSink};

use smartplug::app::commands::{AppCommand, AppResponse};
use smartplug::app::events::AppEvent;
use smartplug::app::mailbox::Mailbox;
use smartplug::app::ports::StorageError;
use smartplug::app::service::AppService;
use smartplug::config::SystemConfig;
use smartplug::context::SharedContext;
use smartplug::error::ParseErrorKind;
use smartplug::program::LoadMode;
use smartplug::web::routes::{self, CONTENT_JS, CONTENT_JSON};

fn make_app() -> AppService {
    AppService::new(SystemConfig::default(), Arc::new(SharedContext::new()))
}

fn upload(mailbox: &Mailbox, text: &str) -> u32 {
    let id = mailbox.next_id();
    let text = heapless::String::try_from(text).unwrap();
    let expires = Instant::now() + Duration::from_secs(5);
    mailbox
        .try_submit(AppCommand::LoadProgram { id, text, expires })
        .unwrap();
    id
}

/// Run the slow-loop side until it has answered one request.
fn serve_one(app: &mut AppService, mailbox: &Mailbox, store: &mut MemStore, sink: &mut RecordingSink) {
    for _ in 0..200 {
        if app.serve(mailbox, store, sink) > 0 {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("no request arrived");
}

// ── Mailbox → service ─────────────────────────────────────────

#[test]
fn accepted_upload_is_answered_then_persisted() {
    let mut app = make_app();
    let mailbox = Mailbox::new();
    let mut store = MemStore::default();
    let mut sink = RecordingSink::new();

    let id = upload(&mailbox, "key1:d0.5");
    assert_eq!(app.serve(&mailbox, &mut store, &mut sink), 1);

    let resp = mailbox.wait_response(id, Duration::from_millis(10)).unwrap();
    assert!(matches!(resp, AppResponse::Verdict { result: Ok(s), .. } if s.triggers == 1));
    assert_eq!(store.text.as_deref(), Some("key1:d0.5"));
    assert_eq!(
        sink.events,
        vec![
            AppEvent::ProgramAccepted {
                mode: LoadMode::Upload,
                triggers: 1
            },
            AppEvent::ProgramPersisted { bytes: 9 },
        ]
    );
}

#[test]
fn rejected_upload_keeps_running_program() {
    let mut app = make_app();
    let mailbox = Mailbox::new();
    let mut store = MemStore::default();
    let mut sink = RecordingSink::new();

    upload(&mailbox, "a0.5");
    app.serve(&mailbox, &mut store, &mut sink);

    let id = upload(&mailbox, "key0:x1");
    app.serve(&mailbox, &mut store, &mut sink);

    match mailbox.wait_response(id, Duration::from_millis(10)) {
        Some(AppResponse::Verdict { result: Err(e), .. }) => {
            assert_eq!(e.kind, ParseErrorKind::UnknownCommand);
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
    assert_eq!(app.program().source(), "a0.5");
    assert_eq!(store.saves, 1);
}

#[test]
fn failed_save_keeps_new_program_active() {
    let mut app = make_app();
    let mailbox = Mailbox::new();
    let mut store = MemStore {
        fail_saves: true,
        ..Default::default()
    };
    let mut sink = RecordingSink::new();

    upload(&mailbox, "b1.0");
    app.serve(&mailbox, &mut store, &mut sink);

    assert_eq!(app.program().source(), "b1.0");
    assert!(store.text.is_none());
    assert!(sink.events.contains(&AppEvent::PersistFailed(StorageError::IoError)));
    assert!(app.persist_pending());
}

#[test]
fn failed_save_is_retried_until_stored() {
    let mut app = make_app();
    let mailbox = Mailbox::new();
    let mut store = MemStore {
        fail_saves: true,
        ..MemStore::with_program("key0:a1.0")
    };
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    let clock = MockClock::at(0);

    upload(&mailbox, "key1:b1.0");
    app.serve(&mailbox, &mut store, &mut sink);
    app.serve(&mailbox, &mut store, &mut sink);
    assert_eq!(store.text.as_deref(), Some("key0:a1.0"));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PersistFailed(_))), 2);

    store.fail_saves = false;
    assert_eq!(app.serve(&mailbox, &mut store, &mut sink), 0);
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(store.text.as_deref(), Some("key1:b1.0"));
    assert!(!app.persist_pending());

    // Stored once; later serves leave the store alone.
    let saves = store.saves;
    app.serve(&mailbox, &mut store, &mut sink);
    assert_eq!(store.saves, saves);

    let mut rebooted = make_app();
    rebooted.boot(&store, &mut sink).unwrap();
    assert_eq!(rebooted.program().source(), "key1:b1.0");
}

#[test]
fn abandoned_upload_is_not_applied() {
    let mut app = make_app();
    let mailbox = Mailbox::new();
    let mut store = MemStore::with_program("key0:a1.0");
    app.boot(&store, &mut RecordingSink::new()).unwrap();
    let mut sink = RecordingSink::new();

    let reply = routes::handle("/setprog?a1.0", &mailbox, Duration::from_millis(20));
    assert_eq!(reply.body, r#"{"Result":"Timeout"}"#);

    assert_eq!(app.serve(&mailbox, &mut store, &mut sink), 1);
    assert_eq!(app.program().source(), "key0:a1.0");
    assert_eq!(store.text.as_deref(), Some("key0:a1.0"));
    assert_eq!(store.saves, 0);
    assert!(matches!(sink.events.as_slice(), [AppEvent::UploadAbandoned { .. }]));
}

#[test]
fn upload_after_halt_is_stored_but_not_run() {
    let mut app = make_app();
    let mailbox = Mailbox::new();
    let mut store = MemStore::default();
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    let clock = MockClock::at(0);

    app.accept_upload("halt0", &mut sink).unwrap();
    app.poll(&mut hw, &clock, &mut sink);
    assert!(app.is_halted());

    let id = upload(&mailbox, "a1.0");
    app.serve(&mailbox, &mut store, &mut sink);
    let resp = mailbox.wait_response(id, Duration::from_millis(10)).unwrap();
    assert!(matches!(resp, AppResponse::Verdict { result: Ok(_), .. }));
    assert_eq!(store.text.as_deref(), Some("a1.0"));

    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 0.0);
}

#[test]
fn status_query_answers_snapshot() {
    let mut app = make_app();
    let mailbox = Mailbox::new();
    let mut store = MemStore::default();
    let mut sink = RecordingSink::new();

    let id = mailbox.next_id();
    mailbox.try_submit(AppCommand::QueryStatus { id }).unwrap();
    app.serve(&mailbox, &mut store, &mut sink);

    match mailbox.wait_response(id, Duration::from_millis(10)) {
        Some(AppResponse::Status { snapshot, .. }) => {
            assert_eq!(snapshot.program, "");
            assert_eq!(snapshot.version, "1.0");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(store.saves, 0);
}

// ── HTTP route → service ──────────────────────────────────────

#[test]
fn http_upload_round_trip() {
    let mut app = make_app();
    let mailbox = Arc::new(Mailbox::new());
    let mut store = MemStore::default();
    let mut sink = RecordingSink::new();

    let client = {
        let mailbox = mailbox.clone();
        thread::spawn(move || {
            routes::handle("/setprog?key0%3Aa1.0%40key1%3Aa0", &mailbox, Duration::from_secs(2))
        })
    };
    serve_one(&mut app, &mailbox, &mut store, &mut sink);
    let reply = client.join().unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, CONTENT_JSON);
    assert_eq!(reply.body, r#"{"Result":"Ok"}"#);
    assert_eq!(app.program().len(), 2);
    assert_eq!(store.text.as_deref(), Some("key0:a1.0@key1:a0"));
}

#[test]
fn http_rejection_carries_reason() {
    let mut app = make_app();
    let mailbox = Arc::new(Mailbox::new());
    let mut store = MemStore::default();
    let mut sink = RecordingSink::new();

    let client = {
        let mailbox = mailbox.clone();
        thread::spawn(move || routes::handle("/setprog?w90000", &mailbox, Duration::from_secs(2)))
    };
    serve_one(&mut app, &mailbox, &mut store, &mut sink);
    let reply = client.join().unwrap();

    assert!(reply.body.starts_with(r#"{"Result":"Error","Reason":"wait longer than 86400 s"#));
    assert!(app.program().is_empty());
    assert_eq!(store.saves, 0);
}

#[test]
fn http_config_script_reflects_program() {
    let mut app = make_app();
    let mailbox = Arc::new(Mailbox::new());
    let mut store = MemStore::default();
    let mut sink = RecordingSink::new();
    app.accept_upload("key0:a1.0", &mut sink).unwrap();

    let client = {
        let mailbox = mailbox.clone();
        thread::spawn(move || routes::handle("/cfg.js", &mailbox, Duration::from_secs(2)))
    };
    serve_one(&mut app, &mailbox, &mut store, &mut sink);
    let reply = client.join().unwrap();

    assert_eq!(reply.content_type, CONTENT_JS);
    assert_eq!(
        reply.body,
        r#"let CFG={"program":"key0:a1.0","version":"1.0","keyCount":4,"outCount":4}"#
    );
}
