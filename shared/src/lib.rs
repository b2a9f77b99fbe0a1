//! Shared types for the generation orchestration system
//!
//! Holds what both the adapters and the orchestrator need to agree on:
//! task descriptors, the open parameter bag and its lenient reader,
//! task outcomes, batch parsing and logging setup.

pub mod errors;
pub mod logging;
pub mod params;
pub mod types;

pub use errors::*;
pub use params::{FilePayload, ParamReader};
pub use types::*;
