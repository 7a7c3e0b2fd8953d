//! User feedback: on/off patterns for the onboard LED and the buzzer.
//!
//! [`Messenger`] is the position-driven pattern generator; [`catalog`]
//! maps the `s<N>` sound codes of the program language to presets.

pub mod catalog;
pub mod messenger;

pub use catalog::preset;
pub use messenger::{MAX_SEGMENTS, Messenger, MessengerStep, PatternError, SignalTarget};
