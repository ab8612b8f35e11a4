//! Session backends for the HTTP transport.

pub mod memory;

pub use memory::{InMemorySessionBackend, SessionHandle, run_purge_loop};
