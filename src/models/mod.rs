// Re-export the model types so callers can "use crate::models::Profile".
pub mod identity;
pub mod profile;

pub use identity::*;
pub use profile::*;
