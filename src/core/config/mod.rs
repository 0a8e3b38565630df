//! Persistent configuration store
//!
//! Schema-driven, typed access to device settings persisted through a
//! [`KvStore`](crate::core::kv::KvStore).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Callers (application, shell, BLE handlers)  │
//! └──────────────────┬───────────────────────────┘
//!                    │ get / set / read / write
//!                    ▼
//! ┌──────────────────────────────────────────────┐
//! │  ConfigStore                                 │
//! │   - SchemaRegistry (size, default, validator)│
//! │   - reset_all / reset_resettable             │
//! └──────────┬───────────────────────┬───────────┘
//!            │ persist               │ announce
//!            ▼                       ▼
//! ┌────────────────────┐   ┌────────────────────┐
//! │  KvStore           │   │  ChangeSink        │
//! │  (Flash log, RAM)  │   │  (pub/sub, calls)  │
//! └────────────────────┘   └────────────────────┘
//! ```
//!
//! # Concurrency
//!
//! All operations take `&mut self`, which enforces a single writer. Reads do
//! too, since Flash reads need `&mut` access to the Flash interface, so
//! readers of a [`SharedConfigStore`] serialize on its mutex for the length
//! of one storage read.

pub mod error;
pub mod listing;
pub mod macros;
pub mod notify;
pub mod reset;
pub mod schema;
pub mod store;
pub mod value;

pub use error::{ConfigError, SchemaError};
pub use listing::{ListedEntry, ListedValue};
pub use notify::{ChangeEvent, ChangeSink, NotifyError, Observer, ObserverList, PubSubSink};
pub use reset::{ResetFailure, ResetReport};
pub use schema::{SchemaDecl, SchemaEntry, SchemaRegistry, Validator, UNKNOWN_KEY_NAME};
pub use store::{ConfigStore, SharedConfigStore};
pub use value::{ConfigValue, Setting};
