//! Utility helpers for terminal output

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
