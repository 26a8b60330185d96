//! procgate - Host Process Gatekeeper Library
//!
//! This library exposes the allow-list policy, process registry backends
//! and the enforcement loop used by the `procgate` binary.

pub mod cli;
pub mod constants;
pub mod gate;
pub mod models;
pub mod monitor;
pub mod output;
pub mod policy;
