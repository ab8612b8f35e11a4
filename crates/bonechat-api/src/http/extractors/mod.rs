//! Request extractors.

pub mod session;
