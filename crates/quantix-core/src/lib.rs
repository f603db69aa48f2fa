//! quantix-core — Pure types and spoken-math text processing.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod render;
pub mod speech;
pub mod types;
