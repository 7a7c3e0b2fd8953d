//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`], [`StoragePort`] and [`ProgramStore`].
//! Everything lives in the `smartplug` namespace:
//!
//! | Key       | Contents                              |
//! |-----------|---------------------------------------|
//! | `config`  | postcard-encoded [`SystemConfig`]     |
//! | `program` | UTF-8 text of the accepted program    |
//!
//! ESP-IDF NVS commits are atomic per `nvs_commit()`, so a failed save
//! leaves the previous value readable.  The simulation backend is an
//! in-memory map.

use crate::app::ports::{ConfigError, ConfigPort, ProgramStore, StorageError, StoragePort};
use crate::config::SystemConfig;
use crate::program::{MAX_CHANNELS, MAX_KEYS, MAX_PROGRAM_LEN};
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub const NAMESPACE: &str = "smartplug";
const CONFIG_KEY: &str = "config";
const PROGRAM_KEY: &str = "program";

/// Upper bound on the encoded config blob.
const MAX_CONFIG_BLOB: usize = 256;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// A partition with no free pages or from a newer IDF is erased and
    /// re-initialised (losing the stored program).
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS
            // access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NvsAdapter: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK
                {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// NUL-terminated copy of an NVS name (max 15 chars).
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let len = name.len().min(15);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        buf
    }

    /// Open a namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;

        // SAFETY: `ns` is NUL-terminated and outlives the call.
        let ret = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        // SAFETY: `handle` was opened above and is not used afterwards.
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

// ───────────────────────────────────────────────────────────────
// Config validation
// ───────────────────────────────────────────────────────────────

fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if !(1..=MAX_CHANNELS as u8).contains(&cfg.channel_count) {
        return Err(ConfigError::ValidationFailed("channel_count must be 1–4"));
    }
    if cfg.key_count > MAX_KEYS as u8 {
        return Err(ConfigError::ValidationFailed("key_count must be 0–4"));
    }
    if !(1..=1000).contains(&cfg.pwm_period_ticks) {
        return Err(ConfigError::ValidationFailed("pwm_period_ticks must be 1–1000"));
    }
    if !(10..=1000).contains(&cfg.fast_tick_ms) {
        return Err(ConfigError::ValidationFailed("fast_tick_ms must be 10–1000"));
    }
    if !(100..=10_000).contains(&cfg.poll_interval_ms) {
        return Err(ConfigError::ValidationFailed("poll_interval_ms must be 100–10000"));
    }
    if cfg.poll_interval_ms <= cfg.fast_tick_ms {
        return Err(ConfigError::ValidationFailed(
            "poll_interval_ms must be > fast_tick_ms",
        ));
    }
    if !(100..=10_000).contains(&cfg.buzzer_freq_hz) {
        return Err(ConfigError::ValidationFailed("buzzer_freq_hz must be 100–10000"));
    }
    if cfg.http_port == 0 {
        return Err(ConfigError::ValidationFailed("http_port must be non-zero"));
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// ConfigPort
// ───────────────────────────────────────────────────────────────

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let mut buf = [0u8; MAX_CONFIG_BLOB];
        match self.read(NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let cfg: SystemConfig =
                    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                validate_config(&cfg)?;
                info!("NvsAdapter: loaded config ({} bytes)", len);
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
            Err(e) => {
                warn!("NvsAdapter: config read error ({}), using defaults", e);
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.write_blob(NAMESPACE, CONFIG_KEY, &bytes)
            .map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// ProgramStore
// ───────────────────────────────────────────────────────────────

impl ProgramStore for NvsAdapter {
    fn load_program(&self) -> Result<Option<String>, StorageError> {
        let mut buf = vec![0u8; MAX_PROGRAM_LEN];
        match self.read(NAMESPACE, PROGRAM_KEY, &mut buf) {
            Ok(len) => {
                buf.truncate(len);
                String::from_utf8(buf)
                    .map(Some)
                    .map_err(|_| StorageError::Corrupted)
            }
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_program(&mut self, text: &str) -> Result<(), StorageError> {
        if text.len() > MAX_PROGRAM_LEN {
            return Err(StorageError::Full);
        }
        self.write(NAMESPACE, PROGRAM_KEY, text.as_bytes())
    }
}

// ───────────────────────────────────────────────────────────────
// StoragePort
// ───────────────────────────────────────────────────────────────

impl NvsAdapter {
    // Shared by ConfigPort::save (&self) and StoragePort::write (&mut self).
    fn write_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                // SAFETY: `key` is NUL-terminated; `data` is valid for its length.
                let ret = unsafe {
                    nvs_set_blob(handle, key.as_ptr().cast(), data.as_ptr().cast(), data.len())
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                warn!("NvsAdapter: write error {}", e);
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                // SAFETY: `buf` is valid for `size` bytes.
                let ret = unsafe {
                    nvs_get_blob(handle, key.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.write_blob(namespace, key, data)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow().contains_key(&composite)
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_name(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                // SAFETY: `key` is NUL-terminated.
                let ret =
                    unsafe { nvs_find_key(handle, key.as_ptr().cast(), core::ptr::null_mut()) };
                Ok(ret == ESP_OK)
            });
            result.unwrap_or(false)
        }
    }
}
