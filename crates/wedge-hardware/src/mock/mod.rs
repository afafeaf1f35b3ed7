//! Mock device implementations for testing and development.
//!
//! This module provides simulated device sources that can be controlled
//! programmatically without requiring physical hardware.

pub mod source;

// Re-export commonly used types
pub use source::{MockSource, MockSourceHandle, MockStream};
