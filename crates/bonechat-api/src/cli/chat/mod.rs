//! Interactive terminal chat.
//!
//! Runs the same orchestrator as the HTTP server over a private in-memory
//! session. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
