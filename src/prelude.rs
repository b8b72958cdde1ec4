//! Prelude module for convenient imports
//!
//! Re-exports the types needed to load, apply and report on patches.
//!
//! # Example
//!
//! ```rust,no_run
//! use shuusei::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let options = RunOptions::default();
//! let outcome = run_patch_file("patches/17-fix-chart-height.toml", &options)?;
//! println!("{}", ReportFormatter::format_report(&outcome.report));
//! # Ok(())
//! # }
//! ```

// Documents
pub use crate::document::{FieldPath, NodeIndex, NodeSelector, Workflow};

// Patches
pub use crate::patch::{
    PatchDefinition, PatchReport, Replacement, ReportFormatter, Step, StepOutcome, StepReport,
    apply_patch,
};

// Running
pub use crate::runner::{RunOptions, RunOutcome, run_patch, run_patch_file, run_sequence};

// Error types
pub use crate::error::{DefinitionError, DocumentError, PatchError, RunError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
