//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the slow loop stops feeding it, e.g. because a
//! trigger poll wedged.  The fast tick runs in the timer task and is not
//! subscribed.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct Watchdog {
    subscribed: bool,
    timeout_ms: u32,
}

impl Watchdog {
    /// Subscribe the calling task with the given timeout.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT API calls from the task being subscribed.
            let subscribed = unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("Watchdog: reconfigure returned {} (keeping existing config)", ret);
                }
                let ret = esp_task_wdt_add(core::ptr::null_mut());
                if ret != ESP_OK {
                    log::warn!("Watchdog: subscribe failed ({})", ret);
                }
                ret == ESP_OK
            };
            if subscribed {
                log::info!("Watchdog: subscribed ({} ms, panic on trigger)", timeout_ms);
            }
            Self {
                subscribed,
                timeout_ms,
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op ({} ms)", timeout_ms);
            Self {
                subscribed: false,
                timeout_ms,
            }
        }
    }

    /// Feed the watchdog.  Call at least once per `timeout_ms`.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the calling task's TWDT entry.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}
