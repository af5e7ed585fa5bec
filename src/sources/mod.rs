pub mod base;
pub mod plain_source;
pub mod session_source;

pub use base::{create_auth_source, AuthSource, SourceConfig};
