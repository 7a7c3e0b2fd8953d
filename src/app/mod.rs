//! Application core: program orchestration with no direct I/O.
//!
//! The [`service::AppService`] runs the slow loop: it compiles uploaded
//! programs, polls their triggers and reports what happened.  Hardware,
//! storage and the clock are reached only through the **port traits** in
//! [`ports`], so this layer runs unchanged under host tests.

pub mod commands;
pub mod events;
pub mod mailbox;
pub mod ports;
pub mod service;
