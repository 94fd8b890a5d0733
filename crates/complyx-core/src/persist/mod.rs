//! Persistence layer: the durable store port and the snapshot codec.
//!
//! Domain state uses native `DateTime<Utc>` and `HashSet` types; the
//! snapshot types in [`snapshot`] are the single encode/decode boundary
//! where timestamps become ISO-8601 strings and sets become ordered arrays.

pub mod memory;
pub mod snapshot;
pub mod state_store;

pub use memory::MemoryStateStore;
pub use state_store::StateStore;
