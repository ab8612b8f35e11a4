//! LLM provider abstractions for bonechat.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `LazyProvider`: Explicit init/get-or-init lifecycle around a provider factory

pub mod box_provider;
pub mod lazy;
pub mod provider;

#[cfg(test)]
pub(crate) mod mock;
