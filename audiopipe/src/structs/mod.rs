//! Plain data owned by the caller of a session.

pub mod buffer;
pub mod format;
pub mod intervals;
