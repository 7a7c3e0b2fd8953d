//! Fast-tick timer.
//!
//! Runs the [`OutputScheduler`] at the configured fast-tick period:
//!
//! - On ESP-IDF, an `esp_timer` periodic callback dispatched from the
//!   ESP timer task (not ISR context).  The callback owns a leaked
//!   [`FastTick`] and takes only the short [`SharedContext`] lock.
//! - On the host, a plain thread sleeping between ticks.
//!
//! Once started the tick runs until process restart; there is no stop.

use std::sync::Arc;

use crate::app::ports::OutputPort;
use crate::context::SharedContext;
use crate::scheduler::OutputScheduler;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Errors starting the fast tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwTimerError {
    CreateFailed(i32),
    StartFailed(i32),
    SpawnFailed,
}

impl core::fmt::Display for HwTimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CreateFailed(rc) => write!(f, "fast-tick timer create failed (rc={})", rc),
            Self::StartFailed(rc) => write!(f, "fast-tick timer start failed (rc={})", rc),
            Self::SpawnFailed => write!(f, "fast-tick thread spawn failed"),
        }
    }
}

/// Everything one fast tick touches.
pub struct FastTick<O: OutputPort> {
    scheduler: OutputScheduler,
    shared: Arc<SharedContext>,
    outputs: O,
}

impl<O: OutputPort> FastTick<O> {
    pub fn new(scheduler: OutputScheduler, shared: Arc<SharedContext>, outputs: O) -> Self {
        Self {
            scheduler,
            shared,
            outputs,
        }
    }

    pub fn run_once(&mut self) {
        self.scheduler.tick(&self.shared, &mut self.outputs);
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn fast_tick_cb<O: OutputPort>(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the leaked Box<FastTick<O>> from start_fast_tick().
    // esp_timer dispatches callbacks one at a time from its own task, so
    // this is the only live reference.
    let tick = unsafe { &mut *arg.cast::<FastTick<O>>() };
    tick.run_once();
}

/// Start ticking every `period_ms`.
#[cfg(target_os = "espidf")]
pub fn start_fast_tick<O: OutputPort + Send + 'static>(
    tick: FastTick<O>,
    period_ms: u32,
) -> Result<(), HwTimerError> {
    let arg = Box::into_raw(Box::new(tick));
    let args = esp_timer_create_args_t {
        callback: Some(fast_tick_cb::<O>),
        arg: arg.cast(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: c"fast_tick".as_ptr(),
        skip_unhandled_events: true,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();

    // SAFETY: `args` and `arg` outlive the timer (the box is never freed
    // on success).  Called once from main before the slow loop starts.
    unsafe {
        let ret = esp_timer_create(&args, &mut handle);
        if ret != ESP_OK {
            drop(Box::from_raw(arg));
            return Err(HwTimerError::CreateFailed(ret));
        }
        let ret = esp_timer_start_periodic(handle, u64::from(period_ms) * 1_000);
        if ret != ESP_OK {
            esp_timer_delete(handle);
            drop(Box::from_raw(arg));
            return Err(HwTimerError::StartFailed(ret));
        }
    }

    log::info!("hw_timer: fast tick every {} ms", period_ms);
    Ok(())
}

/// Simulation: a detached thread sleeping `period_ms` between ticks.
#[cfg(not(target_os = "espidf"))]
pub fn start_fast_tick<O: OutputPort + Send + 'static>(
    mut tick: FastTick<O>,
    period_ms: u32,
) -> Result<(), HwTimerError> {
    let period = std::time::Duration::from_millis(u64::from(period_ms));
    std::thread::Builder::new()
        .name("fast-tick".into())
        .spawn(move || {
            loop {
                tick.run_once();
                std::thread::sleep(period);
            }
        })
        .map_err(|_| HwTimerError::SpawnFailed)?;
    log::info!("hw_timer(sim): fast tick thread every {} ms", period_ms);
    Ok(())
}
