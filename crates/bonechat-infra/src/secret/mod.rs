//! Credential lookup.
//!
//! - `env`: Environment variable provider (the only credential source)

pub mod env;
