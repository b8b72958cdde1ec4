use crate::document::Workflow;
use crate::error::{DefinitionError, RunError};
use crate::patch::{PatchDefinition, PatchReport};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Controls how patches are resolved and whether results are written.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory that relative patch targets resolve against.
    pub root: PathBuf,
    /// Overrides the patch's own `target`.
    pub target: Option<PathBuf>,
    /// Apply in memory only; never write.
    pub dry_run: bool,
    /// Refuse to write a document when any step reported a warning.
    pub strict: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            target: None,
            dry_run: false,
            strict: false,
        }
    }
}

/// The result of one load -> apply -> save run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: PatchReport,
    pub target: PathBuf,
    pub written: bool,
    /// Set when strict mode withheld the write because of warnings.
    pub blocked: bool,
    pub notes: Vec<String>,
}

/// Loads the patch's target, applies the patch and writes the document back.
///
/// The document is written even when nothing matched, unless the run is a
/// dry run or strict mode saw a warning.
pub fn run_patch(patch: &PatchDefinition, options: &RunOptions) -> Result<RunOutcome, RunError> {
    let target = match &options.target {
        Some(target) => target.clone(),
        None => patch
            .resolve_target(&options.root)
            .ok_or_else(|| DefinitionError::Invalid {
                patch: patch.name.clone(),
                message: "no target document given".to_string(),
            })?,
    };

    info!(patch = %patch.name, document = %target.display(), "applying patch");
    let workflow = Workflow::from_file(&target)?;
    for name in workflow.index().duplicate_names() {
        warn!(document = %target.display(), node = name, "node name is not unique");
    }
    let (patched, report) = patch.apply(workflow).map_err(|source| RunError::Patch {
        patch: patch.name.clone(),
        source,
    })?;

    let blocked = options.strict && report.has_warnings();
    let written = if options.dry_run {
        false
    } else if blocked {
        warn!(
            patch = %patch.name,
            document = %target.display(),
            "strict mode: document not written because some steps matched nothing"
        );
        false
    } else {
        patched.save(&target)?;
        true
    };

    Ok(RunOutcome {
        report,
        target,
        written,
        blocked,
        notes: patch.notes.clone(),
    })
}

pub fn run_patch_file(
    path: impl AsRef<Path>,
    options: &RunOptions,
) -> Result<RunOutcome, RunError> {
    let patch = PatchDefinition::from_file(path)?;
    run_patch(&patch, options)
}

/// Runs patch files in the given order, stopping after a run that strict mode
/// blocked. Later patches in a migration sequence usually build on earlier ones.
pub fn run_sequence<P: AsRef<Path>>(
    paths: &[P],
    options: &RunOptions,
) -> Result<Vec<RunOutcome>, RunError> {
    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        let outcome = run_patch_file(path, options)?;
        let blocked = outcome.blocked;
        outcomes.push(outcome);
        if blocked {
            break;
        }
    }
    Ok(outcomes)
}
