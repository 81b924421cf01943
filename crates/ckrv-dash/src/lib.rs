//! `ckrv-dash` — terminal dashboard for a running ckrv engine.
//!
//! One `App` owns all mutable state. Three independent background
//! sources feed it through channels: the SSE event stream, the specs
//! poller, and the tasks poller. They write into disjoint state slices
//! (log buffer / spec snapshot / task snapshot), so the select loop in
//! `runtime` needs no ordering contract between them. User-triggered
//! mutations run one at a time behind a busy guard and report back as
//! messages.

pub mod app;
pub mod export;
pub mod runtime;
pub mod ui;

pub use app::{App, Msg};
pub use runtime::run;
