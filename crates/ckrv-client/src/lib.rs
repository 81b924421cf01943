//! `ckrv-client` — async client for the ckrv orchestration engine.
//!
//! Three surfaces, one per kind of traffic the dashboard generates:
//!
//! ```text
//! ApiClient      ← request/response: lists, validate, design, tasks, fix
//! EventStream    ← GET /api/events, long-lived SSE push channel
//! Poller         ← fixed-interval list refresh on a watch channel
//! ```
//!
//! The event stream follows the background-task-plus-mpsc shape: a spawned
//! task owns the HTTP response and forwards decoded events until the
//! connection ends or the receiver is dropped. There is no reconnection
//! logic; when the connection drops the stream simply ends.

pub mod api;
pub mod error;
pub mod events;
pub mod poll;

pub use api::ApiClient;
pub use error::ClientError;
pub use events::EventStream;
pub use poll::{spawn_specs_poller, spawn_tasks_poller, Poller};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClientError>;
