//! Ports for the Process Engine subsystem.

pub mod inbound;
pub mod outbound;

pub use inbound::ProcessEngineApi;
pub use outbound::{MockProcessEngineRepository, ProcessEngineRepository, StartedProcess};
