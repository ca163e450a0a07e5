//! Shared test utilities for blogflow integration tests.
//!
//! This module provides:
//! - Scriptable stand-ins for the generative, research and browser services
//! - `TestHarness` wiring the stand-ins into both pipelines

pub mod harness;
pub mod stubs;

pub use harness::TestHarness;
pub use stubs::*;
