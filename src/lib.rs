//! # Shuusei - Declarative Workflow Document Patches
//!
//! **Shuusei** applies small, targeted edits to workflow-automation documents: JSON
//! files holding an ordered list of `nodes` and a `connections` map, where node
//! parameters often carry embedded JavaScript, SQL or HTML/CSS as plain strings.
//!
//! Instead of a one-off script per change, each edit is a **patch definition** (a
//! TOML or JSON file) naming a target document and an ordered list of steps.
//!
//! ## Core Workflow
//!
//! 1.  **Load the patch**: `PatchDefinition::from_file` parses and validates a patch.
//! 2.  **Load the document**: `Workflow::from_file` reads the target, preserving key order.
//! 3.  **Apply**: `apply_patch` runs every step and returns the edited document together
//!     with a `PatchReport`. Selectors or literals that match nothing become warnings,
//!     never errors.
//! 4.  **Save**: `Workflow::save` writes the document back atomically.
//!
//! `runner::run_patch` bundles the four steps.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shuusei::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let patch = PatchDefinition::from_toml_str(r#"
//!         name = "disable-aspect-ratio"
//!         target = "workflows/dashboard.json"
//!
//!         [[steps]]
//!         op = "replace_text"
//!         node = { name = "Render HTML" }
//!         field = "parameters.jsCode"
//!         find = "maintainAspectRatio: true,"
//!         replace = "maintainAspectRatio: false,"
//!     "#)?;
//!
//!     let workflow = Workflow::from_file("workflows/dashboard.json")?;
//!     let (patched, report) = apply_patch(workflow, &patch)?;
//!     println!("{}", ReportFormatter::format_report(&report));
//!
//!     patched.save("workflows/dashboard.json")?;
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod error;
pub mod patch;
pub mod prelude;
pub mod runner;
