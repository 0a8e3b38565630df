#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! nvconfig - Persistent configuration store for flash-backed devices
//!
//! This library provides a schema-driven, typed key-value layer on top of a
//! raw key-value storage primitive. Settings are validated and defaulted on
//! access, and every committed write is announced to interested observers.

// Platform abstraction layer (Flash interface, mock platform)
pub mod platform;

// Core systems: configuration store, storage primitive, logging
pub mod core;

// Device configuration schema and parameter groups
pub mod parameters;

pub use crate::core::config::{
    ChangeEvent, ChangeSink, ConfigError, ConfigStore, ConfigValue, ResetReport, SchemaRegistry,
    SharedConfigStore, Setting,
};
pub use crate::core::kv::{KvStore, StoreError};

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!, log_trace!)
// and the config_schema! macro are exported at crate root via #[macro_export]
