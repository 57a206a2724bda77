mod decode_impl;
pub mod levels;
pub mod output;
pub mod progress;
pub mod reader_thread;
pub mod report;

pub use decode_impl::cmd_decode;
