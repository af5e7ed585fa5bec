pub mod gate;
pub mod routes;

pub use gate::{GateConfig, GateDecision, RouteGate};
pub use routes::{RouteClass, RouteDescriptor, RouteTable};
