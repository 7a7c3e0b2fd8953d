//! SmartPlug firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareOutputs   HardwareInputs   NvsAdapter   SystemClock   │
//! │  (OutputPort)      (InputPort)      (Config+Prog) (Clock)      │
//! │  LogEventSink      WifiAdapter      HTTP server                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────────┐     ┌────────────────────────┐   │
//! │  │  AppService (slow loop)  │────▶│ SharedContext          │   │
//! │  │  Program · triggers      │     │ setpoints · messenger  │   │
//! │  └──────────────────────────┘     └───────────┬────────────┘   │
//! │                                               ▼                │
//! │                               OutputScheduler (fast tick)      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use smartplug::adapters::hardware::{HardwareInputs, HardwareOutputs};
use smartplug::adapters::log_sink::LogEventSink;
use smartplug::adapters::nvs::NvsAdapter;
use smartplug::adapters::time::SystemClock;
use smartplug::adapters::wifi::WifiAdapter;
use smartplug::app::mailbox::Mailbox;
use smartplug::app::ports::ConfigPort;
use smartplug::app::service::AppService;
use smartplug::config::{FIRMWARE_VERSION, SystemConfig};
use smartplug::context::SharedContext;
use smartplug::drivers::buzzer::Buzzer;
use smartplug::drivers::hw_init;
use smartplug::drivers::hw_timer::{self, FastTick};
use smartplug::drivers::keys::KeyPad;
use smartplug::drivers::load::LoadBank;
use smartplug::drivers::status_led::StatusLed;
use smartplug::drivers::watchdog::Watchdog;
use smartplug::scheduler::OutputScheduler;
use smartplug::web;

/// HTTP task ↔ slow loop.
static MAILBOX: Mailbox = Mailbox::new();

const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartPlug v{}                      ║", FIRMWARE_VERSION);
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take().context("system event loop")?;
    let nvs_partition = EspDefaultNvsPartition::take().context("default NVS partition")?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow::anyhow!("NVS init failed: {}", e))?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Hardware + fast tick ───────────────────────────────
    hw_init::init_peripherals(config.buzzer_freq_hz)
        .map_err(|e| anyhow::anyhow!("HAL init failed: {}", e))?;

    let shared = Arc::new(SharedContext::new());
    let outputs = HardwareOutputs::new(
        LoadBank::new(usize::from(config.channel_count), config.outputs_inverted),
        StatusLed::new(),
        Buzzer::new(),
    );
    let scheduler = OutputScheduler::new(config.pwm_period_ticks, usize::from(config.channel_count));
    hw_timer::start_fast_tick(FastTick::new(scheduler, shared.clone(), outputs), config.fast_tick_ms)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let mut inputs = HardwareInputs::new(KeyPad::new(usize::from(config.key_count)));

    // ── 4. Program ────────────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let clock = SystemClock::new();
    let mut app = AppService::new(config.clone(), shared);
    if let Err(e) = app.boot(&nvs, &mut log_sink) {
        warn!("Boot: running empty program ({})", e);
    }

    // ── 5. Network ────────────────────────────────────────────
    // Loads run whether or not the network comes up.
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs_partition)
        .context("WiFi driver init")?;
    match wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
        Ok(()) => {
            if let Err(e) = wifi.connect() {
                warn!("WiFi: {} (will retry)", e);
            }
        }
        Err(e) => warn!("WiFi: {}; HTTP upload unavailable", e),
    }
    let _http = web::server::start(
        config.http_port,
        &MAILBOX,
        web::server::reply_timeout(config.poll_interval_ms),
    )
    .context("HTTP server start")?;

    // ── 6. Slow loop ──────────────────────────────────────────
    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);
    let poll_period = Duration::from_millis(u64::from(config.poll_interval_ms));
    let poll_secs = (config.poll_interval_ms / 1000).max(1);
    info!("System ready. Entering slow loop.");

    loop {
        let iteration = catch_unwind(AssertUnwindSafe(|| {
            app.serve(&MAILBOX, &mut nvs, &mut log_sink);
            app.poll(&mut inputs, &clock, &mut log_sink);
            wifi.poll(poll_secs);
        }));
        if iteration.is_err() {
            error!("Slow loop iteration panicked (poll #{}); continuing", app.poll_count());
        }
        watchdog.feed();
        std::thread::sleep(poll_period);
    }
}
