//! Session registry: the set of chat sessions and which one is active.

pub mod registry;

pub use registry::SessionRegistry;
