//! HTTP layer for bonechat.
//!
//! The form endpoint `/chatbot` keeps the plain JSON replies browser pages
//! expect; the `/api/v1/chat` routes use the envelope response format.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;
