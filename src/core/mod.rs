//! Core configuration functionality
//!
//! This module contains the configuration store itself, the key-value storage
//! primitive it persists through, and shared infrastructure (logging, state
//! synchronization).

pub mod config;
pub mod kv;
pub mod logging;
pub mod traits;
