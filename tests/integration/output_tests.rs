//! Integration tests for the fast tick: a polled program drives the
//! `OutputScheduler` through the shared context onto mock pins.

use std::sync::Arc;

use crate::mock_hw::{MockClock, MockHardware, PinCall, RecordingSink};

use smartplug::app::service::AppService;
use smartplug::config::SystemConfig;
use smartplug::context::SharedContext;
use smartplug::scheduler::OutputScheduler;

fn make_app() -> (AppService, Arc<SharedContext>) {
    let shared = Arc::new(SharedContext::new());
    (AppService::new(SystemConfig::default(), shared.clone()), shared)
}

fn on_ticks(hw: &MockHardware, channel: usize) -> usize {
    hw.calls
        .iter()
        .filter(|c| **c == PinCall::Load { channel, active: true })
        .count()
}

#[test]
fn half_power_is_on_for_half_the_period() {
    let (mut app, shared) = make_app();
    let mut inputs = MockHardware::new();
    let clock = MockClock::at(0);
    let mut sink = RecordingSink::new();
    app.accept_upload("a0.5b1.0", &mut sink).unwrap();
    // One command starts per poll.
    app.poll(&mut inputs, &clock, &mut sink);
    app.poll(&mut inputs, &clock, &mut sink);

    let mut sched = OutputScheduler::new(30, 4);
    let mut pins = MockHardware::new();
    for _ in 0..30 {
        sched.tick(&shared, &mut pins);
    }
    assert_eq!(on_ticks(&pins, 0), 15);
    assert_eq!(on_ticks(&pins, 1), 30);
    assert_eq!(on_ticks(&pins, 2), 0);
}

#[test]
fn say_command_sounds_buzzer_then_goes_quiet() {
    let (mut app, shared) = make_app();
    let mut inputs = MockHardware::new();
    let clock = MockClock::at(0);
    let mut sink = RecordingSink::new();
    // Two beeps: [3 on, 3 off] x 2.
    app.accept_upload("s52", &mut sink).unwrap();
    app.poll(&mut inputs, &clock, &mut sink);

    let mut sched = OutputScheduler::new(30, 4);
    let mut pins = MockHardware::new();
    let mut trace = Vec::new();
    for _ in 0..14 {
        sched.tick(&shared, &mut pins);
        trace.push(pins.buzzer() == Some(true));
        assert_eq!(pins.led(), Some(false));
    }
    let expected = [
        true, true, true, false, false, false, true, true, true, false, false, false, false, false,
    ];
    assert_eq!(trace, expected);
    assert!(shared.messenger().is_none());
}

#[test]
fn unknown_sound_code_silences_indicator() {
    let (mut app, shared) = make_app();
    let mut inputs = MockHardware::new();
    let clock = MockClock::at(0);
    let mut sink = RecordingSink::new();
    app.accept_upload("s81w1s0", &mut sink).unwrap();

    app.poll(&mut inputs, &clock, &mut sink);
    assert!(shared.messenger().is_some());

    app.poll(&mut inputs, &clock, &mut sink);
    clock.advance(1000);
    app.poll(&mut inputs, &clock, &mut sink);
    assert!(shared.messenger().is_none());

    let mut sched = OutputScheduler::new(30, 4);
    let mut pins = MockHardware::new();
    sched.tick(&shared, &mut pins);
    assert_eq!(pins.led(), Some(false));
    assert_eq!(pins.buzzer(), Some(false));
}

#[test]
fn halt_drives_every_load_off() {
    let (mut app, shared) = make_app();
    let mut inputs = MockHardware::new();
    let clock = MockClock::at(0);
    let mut sink = RecordingSink::new();
    app.accept_upload("a1.0b1.0c1.0d1.0halt0", &mut sink).unwrap();

    // One poll per command, plus the halt.
    for _ in 0..5 {
        app.poll(&mut inputs, &clock, &mut sink);
    }
    assert!(app.is_halted());

    let mut sched = OutputScheduler::new(30, 4);
    let mut pins = MockHardware::new();
    sched.tick(&shared, &mut pins);
    for ch in 0..4 {
        assert_eq!(pins.load(ch), Some(false));
    }
}
