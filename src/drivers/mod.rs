//! GPIO drivers, hardware initialisation and the fast-tick timer.

pub mod buzzer;
pub mod hw_init;
pub mod hw_timer;
pub mod keys;
pub mod load;
pub mod status_led;
pub mod watchdog;
