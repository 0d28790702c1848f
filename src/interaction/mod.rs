//! User-facing progress output
//!
//! Tracing carries the detailed log; [`ProgressDisplay`] is the short,
//! human-oriented narration of a run printed to the terminal.

pub mod display;

pub use display::{ConsoleDisplay, ProgressDisplay, QuietDisplay, SpinnerHandle};
