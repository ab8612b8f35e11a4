//! Shared domain types for bonechat.
//!
//! This crate contains the types used across the workspace: conversation
//! turns and the typed session view, the wire shapes exchanged with the
//! generation service, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
