//! Service wiring and run reporting.

mod orchestrator;
mod stats;

pub use orchestrator::{run_banner, service_mode};
pub use stats::RunReport;
