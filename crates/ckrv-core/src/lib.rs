pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod log;
pub mod pipeline;
pub mod spec;
pub mod task;

pub use error::{CkrvError, Result};
