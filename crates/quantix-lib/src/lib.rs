//! quantix-lib — Client engine for the Quantix math solver.
//!
//! Backend HTTP client, solve-session state, and the dictation state
//! machine. Depends on quantix-core for pure types and text processing.

pub mod client;
pub mod dictation;
pub mod session;

// Re-export quantix-core for convenience
pub use quantix_core;
