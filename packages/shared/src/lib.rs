//! Shared utilities for Sketchroom packages.

pub mod logger;
pub mod time;
