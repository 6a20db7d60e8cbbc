//! Session transcript
//!
//! Ordered, append-only record of role-tagged messages for one conversation.
//! Owned by the interactive surface; the agent core appends exactly one
//! assistant turn per user turn and reads prior turns only for framing.

pub mod store;

pub use store::{SessionStore, Transcript};
