//! Shared utilities for the CodeThrone client workspace.
//!
//! This crate carries the pieces every other package needs: logging setup
//! and time utilities with a clock abstraction for testability.

pub mod logger;
pub mod time;
