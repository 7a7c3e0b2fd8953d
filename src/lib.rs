//! SmartPlug firmware library.
//!
//! Exposes the program compiler, the trigger engine and the output
//! scheduler for integration testing.  All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod program;
pub mod scheduler;
pub mod signal;

mod pins;

// Hardware-facing modules; host builds get the simulation half.
pub mod adapters;
pub mod drivers;
pub mod web;
