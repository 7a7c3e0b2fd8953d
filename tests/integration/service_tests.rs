//! Integration tests for boot, trigger polling and halt through
//! `AppService` with mock adapters.

use std::sync::Arc;

use crate::mock_hw::{MemStore, MockClock, MockHardware, RecordingSink};

use smartplug::app::events::AppEvent;
use smartplug::app::ports::StorageError;
use smartplug::app::service::AppService;
use smartplug::config::SystemConfig;
use smartplug::context::SharedContext;
use smartplug::error::{Error, InputError};
use smartplug::program::LoadMode;

fn make_app() -> (AppService, MockHardware, MockClock, RecordingSink) {
    let app = AppService::new(SystemConfig::default(), Arc::new(SharedContext::new()));
    (app, MockHardware::new(), MockClock::at(0), RecordingSink::new())
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_without_stored_program_runs_empty() {
    let (mut app, _, _, mut sink) = make_app();
    let summary = app.boot(&MemStore::default(), &mut sink).unwrap();

    assert_eq!(summary.triggers, 0);
    assert!(app.program().is_empty());
    assert_eq!(
        sink.events,
        vec![AppEvent::NoStoredProgram(None), AppEvent::Started { triggers: 0 }]
    );
}

#[test]
fn boot_uses_reset_blocks_and_skips_upload_blocks() {
    let (mut app, mut hw, clock, mut sink) = make_app();
    let store = MemStore::with_program("a1.0@reset:b0.5");
    let summary = app.boot(&store, &mut sink).unwrap();
    assert_eq!(summary.triggers, 1);
    assert!(sink.events.contains(&AppEvent::ProgramAccepted {
        mode: LoadMode::Boot,
        triggers: 1
    }));

    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 0.0);
    assert_eq!(app.shared().setpoint(1), 0.5);
}

#[test]
fn boot_with_invalid_stored_program_runs_empty() {
    let (mut app, _, _, mut sink) = make_app();
    let store = MemStore::with_program("zz9");
    let result = app.boot(&store, &mut sink);

    assert!(matches!(result, Err(Error::Parse(_))));
    assert!(app.program().is_empty());
    assert!(sink.events.contains(&AppEvent::Started { triggers: 0 }));
}

#[test]
fn boot_with_unreadable_store_runs_empty() {
    let (mut app, _, _, mut sink) = make_app();
    let store = MemStore {
        load_error: Some(StorageError::IoError),
        ..Default::default()
    };
    let result = app.boot(&store, &mut sink);

    assert_eq!(result, Err(Error::Storage(StorageError::IoError)));
    assert!(app.program().is_empty());
    assert_eq!(sink.events[0], AppEvent::NoStoredProgram(Some(StorageError::IoError)));
}

// ── Key triggers ──────────────────────────────────────────────

#[test]
fn key_trigger_runs_sequence_once_per_press() {
    let (mut app, mut hw, clock, mut sink) = make_app();
    app.accept_upload("key0:a1.0w2a0", &mut sink).unwrap();

    // Idle until the key goes down.
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 0.0);

    hw.press(0);
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 1.0);
    assert_eq!(sink.count(|e| *e == AppEvent::TriggerFired { index: 0 }), 1);

    // Wait starts at t=1000 and ends at t=3000.
    clock.advance(1000);
    app.poll(&mut hw, &clock, &mut sink);
    clock.advance(1000);
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 1.0);

    clock.advance(1000);
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 0.0);

    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(sink.count(|e| *e == AppEvent::TriggerFinished { index: 0 }), 1);

    // Still held: no second run.
    for _ in 0..3 {
        app.poll(&mut hw, &clock, &mut sink);
    }
    assert_eq!(sink.count(|e| *e == AppEvent::TriggerFired { index: 0 }), 1);

    // Release re-arms; the next press runs again.
    hw.release(0);
    app.poll(&mut hw, &clock, &mut sink);
    hw.press(0);
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(sink.count(|e| *e == AppEvent::TriggerFired { index: 0 }), 2);
}

#[test]
fn unwired_key_faults_only_its_own_trigger() {
    let (mut app, mut hw, clock, mut sink) = make_app();
    hw.key_count = 1;
    app.accept_upload("key3:a1.0@b0.25", &mut sink).unwrap();

    app.poll(&mut hw, &clock, &mut sink);
    assert!(sink.events.contains(&AppEvent::TriggerFault {
        index: 0,
        error: InputError::NoSuchKey(3)
    }));
    assert_eq!(app.shared().setpoint(0), 0.0);
    assert_eq!(app.shared().setpoint(1), 0.25);
}

#[test]
fn wait_survives_clock_wrap() {
    let (mut app, mut hw, _, mut sink) = make_app();
    let clock = MockClock::at(u32::MAX - 500);
    app.accept_upload("w2a1.0", &mut sink).unwrap();

    app.poll(&mut hw, &clock, &mut sink);
    clock.advance(1000);
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 0.0);

    clock.advance(1000);
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoint(0), 1.0);
}

// ── Halt ──────────────────────────────────────────────────────

#[test]
fn halt_zeroes_outputs_and_stops_polling() {
    let (mut app, mut hw, clock, mut sink) = make_app();
    app.accept_upload("a1.0halt0@b1.0", &mut sink).unwrap();

    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.shared().setpoints()[..2], [1.0, 1.0]);

    app.poll(&mut hw, &clock, &mut sink);
    assert!(app.is_halted());
    assert_eq!(app.shared().setpoints(), [0.0; 4]);
    assert_eq!(sink.count(|e| *e == AppEvent::Halted), 1);

    let polls = app.poll_count();
    app.poll(&mut hw, &clock, &mut sink);
    assert_eq!(app.poll_count(), polls);
    assert_eq!(sink.count(|e| *e == AppEvent::Halted), 1);
}

#[test]
fn halt_ends_the_round_it_runs_in() {
    let (mut app, mut hw, clock, mut sink) = make_app();
    app.accept_upload("halt0@c1.0", &mut sink).unwrap();

    app.poll(&mut hw, &clock, &mut sink);
    assert!(app.is_halted());
    assert_eq!(app.shared().setpoint(2), 0.0);
    assert_eq!(sink.count(|e| *e == AppEvent::TriggerFired { index: 1 }), 0);
}

// ── Status ────────────────────────────────────────────────────

#[test]
fn status_reports_running_program() {
    let (mut app, _, _, mut sink) = make_app();
    app.accept_upload("Key0:A1.0@b0", &mut sink).unwrap();
    let status = app.status();

    assert_eq!(status.program, "Key0:A1.0@b0");
    assert_eq!(status.version, "1.0");
    assert_eq!(status.key_count, 4);
    assert_eq!(status.out_count, 4);
    assert_eq!(status.triggers, 2);
    assert!(!status.halted);
}
