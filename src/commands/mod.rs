//! CLI command implementations.

pub mod list;
pub mod run;

pub use list::ListCommand;
pub use run::{RunCommand, RunReport, RunStatus};
