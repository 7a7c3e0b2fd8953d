//! WiFi station-mode adapter.
//!
//! Brings the device onto the configured network so the HTTP endpoint is
//! reachable.  Loads keep running whether or not the link is up.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi`, driven
//!   without blocking: `connect()` only starts association and each
//!   [`poll`](WifiAdapter::poll) checks whether the netif came up.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! Nothing here waits on the radio, so the slow loop keeps its cadence
//! (and feeds the watchdog) while the access point is unreachable.
//!
//! ```text
//!                begin ok            link up
//!   Reconnecting ───────▶ Connecting ───────▶ Connected
//!        ▲                    │ 15 s, no link     │ link lost
//!        └──── backoff ×2 ────┘◀──────────────────┘
//! ```
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) of slow-loop polls before retrying.

use core::fmt;
use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    /// Association started `elapsed` seconds ago; waiting for the link.
    Connecting { attempt: u32, elapsed: u32 },
    Connected,
    /// Waiting `wait` more polls before attempt number `attempt`.
    Reconnecting { attempt: u32, wait: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;
/// Give up on an attempt that has not brought the link up by then.
const CONNECT_TIMEOUT_SECS: u32 = 15;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !ssid.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_secs: u32,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    /// Simulation: link level that `platform_is_connected` reports.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    /// Simulation: whether a started attempt brings the link up.
    #[cfg(not(target_os = "espidf"))]
    sim_ap_reachable: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        let wifi = EspWifi::new(modem, sysloop, Some(nvs))?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            sim_link_up: false,
            sim_ap_reachable: true,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// Start the first connection attempt and return at once.
    ///
    /// [`poll`](Self::poll) notices when the link comes up.  If the
    /// attempt cannot even be started the adapter enters `Reconnecting`
    /// and `poll` keeps trying.
    pub fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        info!("WiFi: connecting to '{}'", self.ssid);
        match self.platform_begin_connect() {
            Ok(()) => {
                self.state = WifiState::Connecting {
                    attempt: 0,
                    elapsed: 0,
                };
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.schedule_retry(0);
                Err(e)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    /// Call once per `poll_secs` seconds from the slow loop.  Never blocks.
    pub fn poll(&mut self, poll_secs: u32) {
        match self.state {
            WifiState::Connecting { .. } if self.platform_is_connected() => self.on_connected(),
            WifiState::Connecting { attempt, elapsed }
                if elapsed + poll_secs < CONNECT_TIMEOUT_SECS =>
            {
                self.state = WifiState::Connecting {
                    attempt,
                    elapsed: elapsed + poll_secs,
                };
            }
            WifiState::Connecting { attempt, .. } => {
                warn!("WiFi: attempt {} timed out", attempt);
                self.platform_abort();
                self.retry_later(attempt + 1);
            }
            WifiState::Reconnecting { attempt, wait } if wait > poll_secs => {
                self.state = WifiState::Reconnecting {
                    attempt,
                    wait: wait - poll_secs,
                };
            }
            WifiState::Reconnecting { attempt, .. } => {
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt, self.backoff_secs);
                match self.platform_begin_connect() {
                    Ok(()) => self.state = WifiState::Connecting { attempt, elapsed: 0 },
                    Err(_) => self.retry_later(attempt + 1),
                }
            }
            WifiState::Connected if !self.platform_is_connected() => {
                warn!("WiFi: connection lost, entering reconnect");
                self.schedule_retry(0);
            }
            _ => {}
        }
    }

    fn on_connected(&mut self) {
        self.state = WifiState::Connected;
        self.backoff_secs = INITIAL_BACKOFF_SECS;
        info!("WiFi: connected");
    }

    fn retry_later(&mut self, attempt: u32) {
        self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
        self.schedule_retry(attempt);
    }

    fn schedule_retry(&mut self, attempt: u32) {
        self.state = WifiState::Reconnecting {
            attempt,
            wait: self.backoff_secs,
        };
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin_connect(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi(espidf): {}", e);
            ConnectivityError::ConnectionFailed
        };
        self.wifi.set_configuration(&config).map_err(fail)?;
        if !self.wifi.is_started().map_err(fail)? {
            self.wifi.start().map_err(fail)?;
        }
        // Returns once association has been requested.
        self.wifi.connect().map_err(fail)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_link_up = self.sim_ap_reachable;
        info!("WiFi(sim): associating with '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_abort(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi(espidf): disconnect: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_abort(&mut self) {
        self.sim_link_up = false;
    }

    /// Associated and the station netif has an address.
    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.sta_netif().is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    /// Simulation: drop the link so the next poll notices.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }

    /// Simulation: make later attempts succeed or hang.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_ap_reachable(&mut self, reachable: bool) {
        self.sim_ap_reachable = reachable;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
