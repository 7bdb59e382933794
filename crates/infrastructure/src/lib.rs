//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod clock;
mod in_memory_access_control_store;
mod postgres_access_control_store;

pub use clock::SystemClock;
pub use in_memory_access_control_store::{
    InMemoryAccessControlStore, InMemoryAccessControlTransaction,
};
pub use postgres_access_control_store::{
    PostgresAccessControlStore, PostgresAccessControlTransaction,
};
