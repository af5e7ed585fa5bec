pub mod coordinator;
pub mod state;

pub use coordinator::{LoadOutcome, SessionCoordinator, SyncOutcome};
pub use state::{SessionSnapshot, SessionState};
