//! Property tests for the program compiler, the software PWM and the
//! messenger.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32
//! targets.

#![cfg(not(target_os = "espidf"))]

use std::sync::Arc;

use proptest::prelude::*;

use smartplug::app::events::AppEvent;
use smartplug::app::ports::{EventSink, OutputPort};
use smartplug::app::service::AppService;
use smartplug::config::SystemConfig;
use smartplug::context::SharedContext;
use smartplug::program::{LoadMode, compile};
use smartplug::scheduler::OutputScheduler;
use smartplug::signal::{MAX_SEGMENTS, Messenger, SignalTarget};

struct OnCounter {
    on: [usize; 4],
}

impl OutputPort for OnCounter {
    fn set_load(&mut self, channel: usize, active: bool) {
        if active {
            self.on[channel] += 1;
        }
    }
    fn set_led(&mut self, _on: bool) {}
    fn set_buzzer(&mut self, _on: bool) {}
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

// ── Software PWM ──────────────────────────────────────────────

proptest! {
    /// Over one full period a channel is on for its setpoint share of the
    /// ticks, to within one tick.
    #[test]
    fn pwm_duty_within_one_tick(
        setpoint in 0.0f32..=1.0f32,
        period in 1u16..=200u16,
    ) {
        let shared = SharedContext::new();
        shared.set_setpoint(0, setpoint);
        let mut sched = OutputScheduler::new(period, 1);
        let mut pins = OnCounter { on: [0; 4] };
        for _ in 0..period {
            sched.tick(&shared, &mut pins);
        }
        let ideal = setpoint * f32::from(period);
        prop_assert!((pins.on[0] as f32 - ideal).abs() <= 1.0,
            "on={} ideal={}", pins.on[0], ideal);
    }
}

// ── Messenger ─────────────────────────────────────────────────

fn arb_pattern() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(1u8..=12u8, 1..=MAX_SEGMENTS)
}

proptest! {
    #[test]
    fn messenger_is_periodic(pattern in arb_pattern(), pos in 0u32..10_000) {
        let m = Messenger::new(&pattern, SignalTarget::Led, None).unwrap();
        prop_assert_eq!(m.state_at(pos), m.state_at(pos + m.period()));
    }

    #[test]
    fn messenger_first_segment_is_active(pattern in arb_pattern()) {
        let m = Messenger::new(&pattern, SignalTarget::Buzzer, None).unwrap();
        for pos in 0..u32::from(pattern[0]) {
            prop_assert!(m.state_at(pos));
        }
    }

    /// A messenger with repeat `k` reports finished exactly on its
    /// `k × period`-th step.
    #[test]
    fn messenger_finishes_after_k_periods(pattern in arb_pattern(), k in 1u32..=5) {
        let mut m = Messenger::new(&pattern, SignalTarget::Led, Some(k)).unwrap();
        let total = m.period() * k;
        for step in 1..=total {
            let s = m.step();
            prop_assert_eq!(s.finished, step == total);
        }
    }

    #[test]
    fn endless_messenger_never_finishes(pattern in arb_pattern()) {
        let mut m = Messenger::new(&pattern, SignalTarget::Led, None).unwrap();
        for _ in 0..(m.period() * 3) {
            prop_assert!(!m.step().finished);
        }
        prop_assert!(m.position() < m.period());
    }
}

// ── Compiler robustness ───────────────────────────────────────

proptest! {
    #[test]
    fn compile_never_panics_on_arbitrary_text(text in ".{0,300}") {
        let _ = compile(&text, LoadMode::Upload);
        let _ = compile(&text, LoadMode::Boot);
    }

    #[test]
    fn compile_never_panics_on_dsl_alphabet(text in "[a-z0-9.:@ ]{0,96}") {
        let _ = compile(&text, LoadMode::Upload);
        let _ = compile(&text, LoadMode::Boot);
    }

    /// Anything accepted at upload also compiles at the next boot.
    #[test]
    fn accepted_upload_compiles_at_boot(text in "[abdkeyrstw0-9.:@]{0,64}") {
        if compile(&text, LoadMode::Upload).is_ok() {
            prop_assert!(compile(&text, LoadMode::Boot).is_ok());
        }
    }

    /// A rejected upload never disturbs the running program.
    #[test]
    fn rejected_upload_keeps_program(text in "[a-z0-9.:@]{0,48}") {
        let mut app = AppService::new(SystemConfig::default(), Arc::new(SharedContext::new()));
        let mut sink = NullSink;
        app.accept_upload("key0:a1.0@b0.5", &mut sink).unwrap();

        if app.accept_upload(&text, &mut sink).is_err() {
            prop_assert_eq!(app.program().source(), "key0:a1.0@b0.5");
            prop_assert_eq!(app.program().len(), 2);
        }
    }
}
