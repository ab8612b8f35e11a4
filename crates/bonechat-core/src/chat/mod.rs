//! Conversational memory and turn orchestration.
//!
//! - `turn_store`: bounded turn log inside a session
//! - `history`: stored turns to the generation service's format
//! - `orchestrator`: one request/response exchange with memory
//! - `command`: in-band commands such as `/reset`

pub mod command;
pub mod history;
pub mod orchestrator;
pub mod turn_store;
