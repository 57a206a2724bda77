pub mod command;
pub mod decode;
