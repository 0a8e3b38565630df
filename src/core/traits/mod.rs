//! Core traits for platform-agnostic configuration access.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Application tasks / shell / BLE callbacks               │
//! │                      │                                   │
//! │                      ▼                                   │
//! │   SharedState<ConfigStore<..>>                           │
//! │     + with(f: Fn(&T) -> R)                               │
//! │     + with_mut(f: Fn(&mut T) -> R)                       │
//! │          │                          │                    │
//! │          ▼                          ▼                    │
//! │   BlockingState<M, T>          MockState<T>              │
//! │   (embassy-sync Mutex)         (RefCell, tests)          │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod sync;

pub use sync::{BlockingState, MockState, SharedState};
