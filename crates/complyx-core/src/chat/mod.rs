//! Message log: per-session message history and the current working view.

pub mod log;

pub use log::{MessageEdit, MessageLog, NewMessage};
