//! Testing utilities for procedure pipelines.
//!
//! This module provides:
//! - A scripted HTTP client double for handler-level tests
//! - An ordered call recorder for hook sequencing assertions

mod mocks;

pub use mocks::{CallRecorder, StaticHttpClient};
