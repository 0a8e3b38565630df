//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the platform traits and of the
//! key-value storage primitive, for unit testing without hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use nvconfig::platform::mock::MockKvStore;
//! use nvconfig::KvStore;
//!
//! let mut store = MockKvStore::new();
//! store.write(3, &[1, 2]).unwrap();
//! store.fail_writes(true);
//! assert!(store.write(3, &[4, 5]).is_err());
//! ```

#![cfg(any(test, feature = "mock"))]

mod flash;
mod kv;

pub use flash::MockFlash;
pub use kv::MockKvStore;
