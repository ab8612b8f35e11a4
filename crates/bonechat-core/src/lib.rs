//! Business logic and port definitions for bonechat.
//!
//! This crate defines the ports (the session store and LLM provider traits)
//! that the infrastructure layer implements, and the conversational memory
//! logic built on them. It depends only on `bonechat-types` -- never on
//! `bonechat-infra` or any network/IO crate.

pub mod chat;
pub mod llm;
pub mod session;
