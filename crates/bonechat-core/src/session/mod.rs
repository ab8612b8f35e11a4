//! Session bag abstraction.
//!
//! The HTTP layer owns session transport and persistence; the chat code only
//! sees a [`SessionStore`](store::SessionStore).

pub mod store;
