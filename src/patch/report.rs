use itertools::Itertools;

/// What a single step did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step matched and edited the document.
    Applied {
        /// Labels of the nodes that were touched (empty for connection edits).
        nodes: Vec<String>,
        /// Literal occurrences replaced, lines removed, or fields written.
        edits: usize,
        /// Previews of literals that matched nowhere in an otherwise applied step.
        unmatched: Vec<String>,
    },
    /// Nothing matched; the document was left as it was.
    NoMatch { reason: String },
}

impl StepOutcome {
    /// True when the document has drifted from what the step expected.
    pub fn is_warning(&self) -> bool {
        match self {
            StepOutcome::Applied { unmatched, .. } => !unmatched.is_empty(),
            StepOutcome::NoMatch { .. } => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// One-based position of the step within its patch.
    pub index: usize,
    pub op: &'static str,
    pub outcome: StepOutcome,
}

/// The result of applying one patch to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub patch: String,
    pub steps: Vec<StepReport>,
    /// Whether the document differs from the one passed in.
    pub changed: bool,
}

impl PatchReport {
    pub fn warnings(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.outcome.is_warning())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn total_edits(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match &step.outcome {
                StepOutcome::Applied { edits, .. } => *edits,
                StepOutcome::NoMatch { .. } => 0,
            })
            .sum()
    }
}

/// Renders patch reports as human-readable status lines.
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format_report(report: &PatchReport) -> String {
        let mut lines = vec![format!("Patch '{}'", report.patch)];
        lines.extend(report.steps.iter().map(Self::format_step));

        let summary = if report.changed {
            format!("  {} edit(s) applied", report.total_edits())
        } else {
            "  document unchanged".to_string()
        };
        lines.push(summary);
        lines.join("\n")
    }

    fn format_step(step: &StepReport) -> String {
        match &step.outcome {
            StepOutcome::Applied {
                nodes,
                edits,
                unmatched,
            } => {
                let target = if nodes.is_empty() {
                    String::new()
                } else {
                    format!(" on {}", nodes.iter().map(|n| format!("'{}'", n)).join(", "))
                };
                let mut line = format!(
                    "  ✓ [{}] {}{} ({} edit(s))",
                    step.index, step.op, target, edits
                );
                for literal in unmatched {
                    line.push_str(&format!("\n    ⚠ literal not found: {}", literal));
                }
                line
            }
            StepOutcome::NoMatch { reason } => {
                format!("  ⚠ [{}] {} skipped: {}", step.index, step.op, reason)
            }
        }
    }
}
