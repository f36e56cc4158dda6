// Upload gateway: the HTTP form, transient storage and archive expansion.
// Parsing itself is delegated to crate::parser.

pub mod archive;
pub mod handlers;
pub mod storage;
