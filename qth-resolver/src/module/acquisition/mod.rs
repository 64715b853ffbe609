//! Acquisition cycle
//!
//! One cycle takes a fresh sensor fix, publishes an offline result straight
//! away, then either enriches it over the network or marks it as an
//! estimate. Results flow out through a [`ResultRegister`].

mod network;
mod orchestrator;
mod register;
mod sensor;

pub use network::{NetworkMonitor, ReachabilityProbe};
pub use orchestrator::{AcquisitionOrchestrator, CycleReport, OrchestratorOptions};
pub use register::{ResultRegister, StalePolicy};
pub use sensor::{FixRequest, FixedSensor, LocationSensor, request_fix};
