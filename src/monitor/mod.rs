pub mod enforcer;
pub mod escalation;
pub mod registry;
pub mod terminator;

pub use enforcer::EnforcementContext;
pub use registry::{ProcessRegistry, ProcfsRegistry, SysinfoRegistry};
