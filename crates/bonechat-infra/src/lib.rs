//! Infrastructure layer for bonechat.
//!
//! Contains implementations of the ports defined in `bonechat-core`:
//! the Gemini generation provider, environment credential lookup, the
//! in-memory session backend, and the TOML configuration loader.

pub mod config;
pub mod llm;
pub mod secret;
pub mod session;
