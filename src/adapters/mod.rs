//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | OutputPort         | Load GPIO, LED, buzzer   |
//! |            | InputPort          | Key GPIO                 |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `nvs`      | ConfigPort         | NVS / in-memory store    |
//! |            | StoragePort        |                          |
//! |            | ProgramStore       |                          |
//! | `time`     | Clock              | ESP32 system timer       |
//! | `wifi`     | (none)             | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;
