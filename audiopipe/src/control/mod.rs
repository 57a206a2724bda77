//! Cross-thread coordination.
//!
//! [`state::Control`] carries the running / paused / aborted status that an
//! outside owner drives and every session observes. [`notify::SharedBuffer`]
//! is the meeting point between one session's reader and its consumer.

pub mod notify;
pub mod state;
