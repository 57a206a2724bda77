//! Supporting infrastructure.
//!
//! Error types shared by the launcher, the reader loop and the interval table.

pub mod errors;
