use super::definition::{PatchDefinition, Replacement, Step};
use super::report::{PatchReport, StepOutcome, StepReport};
use super::text;
use crate::document::{FieldPath, NodeSelector, Workflow, node_label, node_name};
use crate::error::PatchError;
use serde_json::{Map, Value};
use tracing::{debug, warn};

impl PatchDefinition {
    /// Applies this patch to `workflow`. See [`apply_patch`].
    pub fn apply(&self, workflow: Workflow) -> Result<(Workflow, PatchReport), PatchError> {
        apply_patch(workflow, self)
    }
}

/// Applies every step of `patch`, in order, and returns the edited document.
///
/// Steps whose selector or literal matches nothing are recorded as
/// [`StepOutcome::NoMatch`] and logged as warnings; they never fail the patch.
/// A hard error (a selected node lacking the addressed field, for instance)
/// discards the partially edited document.
pub fn apply_patch(
    workflow: Workflow,
    patch: &PatchDefinition,
) -> Result<(Workflow, PatchReport), PatchError> {
    let original = workflow.clone();
    let mut working = workflow;
    let mut steps = Vec::with_capacity(patch.steps.len());

    for (i, step) in patch.steps.iter().enumerate() {
        let index = i + 1;
        debug!(patch = %patch.name, step = index, op = step.op_name(), "applying step");

        let outcome = apply_step(&mut working, step, index)?;
        match &outcome {
            StepOutcome::NoMatch { reason } => {
                warn!(patch = %patch.name, step = index, op = step.op_name(), "{}", reason);
            }
            StepOutcome::Applied { unmatched, .. } => {
                for literal in unmatched {
                    warn!(
                        patch = %patch.name,
                        step = index,
                        op = step.op_name(),
                        "literal not found: {}",
                        literal
                    );
                }
            }
        }

        steps.push(StepReport {
            index,
            op: step.op_name(),
            outcome,
        });
    }

    let changed = working != original;
    let report = PatchReport {
        patch: patch.name.clone(),
        steps,
        changed,
    };
    Ok((working, report))
}

fn apply_step(
    workflow: &mut Workflow,
    step: &Step,
    index: usize,
) -> Result<StepOutcome, PatchError> {
    match step {
        Step::ReplaceText { node, field, .. } => {
            replace_text(workflow, node, field, &step.replacement_pairs())
        }
        Step::StripBlankLines { node, field } => strip_blank_lines(workflow, node, field),
        Step::SetField { node, field, value } => set_field(workflow, node, field, value),
        Step::ReplaceNode { node, record, keep } => {
            replace_node(workflow, node, record, keep, index)
        }
        Step::RenameNode { node, to } => rename_node(workflow, node, to),
        Step::InsertNode { index: at, record } => insert_node(workflow, *at, record, index),
        Step::SetConnection { from, routing } => {
            workflow
                .connections_mut()
                .insert(from.clone(), routing.clone());
            Ok(applied(Vec::new(), 1))
        }
        Step::RemoveConnection { from } => {
            let present = workflow
                .connections()
                .is_some_and(|connections| connections.contains_key(from));
            if !present {
                return Ok(StepOutcome::NoMatch {
                    reason: format!("no connection from '{}'", from),
                });
            }
            workflow.connections_mut().shift_remove(from);
            Ok(applied(Vec::new(), 1))
        }
    }
}

fn applied(nodes: Vec<String>, edits: usize) -> StepOutcome {
    StepOutcome::Applied {
        nodes,
        edits,
        unmatched: Vec::new(),
    }
}

fn no_node(selector: &NodeSelector) -> StepOutcome {
    StepOutcome::NoMatch {
        reason: format!("no node with {}", selector),
    }
}

fn select(workflow: &Workflow, selector: &NodeSelector) -> Vec<usize> {
    workflow.index().select(selector).to_vec()
}

fn text_field_mut<'a>(
    node: &'a mut Value,
    field: &FieldPath,
    label: &str,
) -> Result<&'a mut String, PatchError> {
    match field.get_mut(node) {
        Some(Value::String(source)) => Ok(source),
        Some(_) => Err(PatchError::FieldNotText {
            node: label.to_string(),
            field: field.to_string(),
        }),
        None => Err(PatchError::FieldNotFound {
            node: label.to_string(),
            field: field.to_string(),
        }),
    }
}

fn replace_text(
    workflow: &mut Workflow,
    selector: &NodeSelector,
    field: &FieldPath,
    pairs: &[Replacement],
) -> Result<StepOutcome, PatchError> {
    let positions = select(workflow, selector);
    if positions.is_empty() {
        return Ok(no_node(selector));
    }

    let mut labels = Vec::with_capacity(positions.len());
    let mut hits = vec![0usize; pairs.len()];
    for position in positions {
        let node = &mut workflow.nodes_mut()[position];
        let label = node_label(node, position);
        let source = text_field_mut(node, field, &label)?;
        for (pair, hit) in pairs.iter().zip(hits.iter_mut()) {
            let (updated, count) = text::replace_literal(source, &pair.find, &pair.replace);
            if count > 0 {
                *source = updated;
                *hit += count;
            }
        }
        labels.push(label);
    }

    let edits: usize = hits.iter().sum();
    if edits == 0 {
        return Ok(StepOutcome::NoMatch {
            reason: format!(
                "no literal found in '{}' of '{}'",
                field,
                labels.join("', '")
            ),
        });
    }

    let unmatched = pairs
        .iter()
        .zip(&hits)
        .filter(|(_, hit)| **hit == 0)
        .map(|(pair, _)| text::preview(&pair.find))
        .collect();
    Ok(StepOutcome::Applied {
        nodes: labels,
        edits,
        unmatched,
    })
}

fn strip_blank_lines(
    workflow: &mut Workflow,
    selector: &NodeSelector,
    field: &FieldPath,
) -> Result<StepOutcome, PatchError> {
    let positions = select(workflow, selector);
    if positions.is_empty() {
        return Ok(no_node(selector));
    }

    let mut labels = Vec::with_capacity(positions.len());
    let mut removed = 0;
    for position in positions {
        let node = &mut workflow.nodes_mut()[position];
        let label = node_label(node, position);
        let source = text_field_mut(node, field, &label)?;
        let (stripped, count) = text::strip_blank_lines(source);
        *source = stripped;
        removed += count;
        labels.push(label);
    }
    Ok(applied(labels, removed))
}

fn set_field(
    workflow: &mut Workflow,
    selector: &NodeSelector,
    field: &FieldPath,
    value: &Value,
) -> Result<StepOutcome, PatchError> {
    let positions = select(workflow, selector);
    if positions.is_empty() {
        return Ok(no_node(selector));
    }

    let mut labels = Vec::with_capacity(positions.len());
    for position in positions {
        let node = &mut workflow.nodes_mut()[position];
        let label = node_label(node, position);
        field
            .set(node, value.clone())
            .map_err(|segment| PatchError::PathBlocked {
                node: label.clone(),
                field: field.to_string(),
                segment,
            })?;
        labels.push(label);
    }
    let edits = labels.len();
    Ok(applied(labels, edits))
}

fn replace_node(
    workflow: &mut Workflow,
    selector: &NodeSelector,
    record: &Value,
    keep: &[FieldPath],
    step: usize,
) -> Result<StepOutcome, PatchError> {
    if !record.is_object() {
        return Err(PatchError::InvalidNodeRecord { step });
    }
    let positions = select(workflow, selector);
    if positions.is_empty() {
        return Ok(no_node(selector));
    }

    let mut labels = Vec::with_capacity(positions.len());
    for position in positions {
        let old = &workflow.nodes()[position];
        let label = node_label(old, position);
        let mut replacement = record.clone();
        for path in keep {
            if let Some(kept) = path.get(old) {
                path.set(&mut replacement, kept.clone())
                    .map_err(|segment| PatchError::PathBlocked {
                        node: label.clone(),
                        field: path.to_string(),
                        segment,
                    })?;
            }
        }
        workflow.nodes_mut()[position] = replacement;
        labels.push(label);
    }
    let edits = labels.len();
    Ok(applied(labels, edits))
}

fn rename_node(
    workflow: &mut Workflow,
    selector: &NodeSelector,
    to: &str,
) -> Result<StepOutcome, PatchError> {
    let positions = select(workflow, selector);
    let position = match positions.as_slice() {
        [] => return Ok(no_node(selector)),
        [position] => *position,
        _ => {
            return Err(PatchError::AmbiguousRename {
                selector: selector.to_string(),
                count: positions.len(),
            });
        }
    };

    let node = &workflow.nodes()[position];
    let old_name = node_name(node).map(str::to_string);
    if old_name.as_deref() == Some(to) {
        return Ok(applied(vec![to.to_string()], 0));
    }
    if workflow.index().contains_name(to) {
        return Err(PatchError::NameTaken {
            from: node_label(node, position),
            to: to.to_string(),
        });
    }
    if workflow.connections().is_some_and(|connections| connections.contains_key(to)) {
        return Err(PatchError::ConnectionTaken {
            from: node_label(node, position),
            to: to.to_string(),
        });
    }

    if let Value::Object(record) = &mut workflow.nodes_mut()[position] {
        record.insert("name".to_string(), Value::String(to.to_string()));
    }
    let mut edits = 1;
    if let Some(old) = &old_name {
        if workflow.connections().is_some() {
            edits += rewire_connections(workflow.connections_mut(), old, to);
        }
    }
    Ok(applied(vec![to.to_string()], edits))
}

/// Re-keys `old` to `new`, keeping the entry's position, and retargets every
/// `{"node": old}` reference. Returns the number of keys and references changed.
fn rewire_connections(connections: &mut Map<String, Value>, old: &str, new: &str) -> usize {
    let mut rewired = 0;
    for (key, mut routing) in std::mem::take(connections) {
        rewired += retarget_references(&mut routing, old, new);
        if key == old {
            connections.insert(new.to_string(), routing);
            rewired += 1;
        } else {
            connections.insert(key, routing);
        }
    }
    rewired
}

fn retarget_references(value: &mut Value, old: &str, new: &str) -> usize {
    match value {
        Value::Object(object) => {
            let mut count = 0;
            if object.get("node").and_then(Value::as_str) == Some(old) {
                object.insert("node".to_string(), Value::String(new.to_string()));
                count += 1;
            }
            count
                + object
                    .values_mut()
                    .filter(|child| child.is_object() || child.is_array())
                    .map(|child| retarget_references(child, old, new))
                    .sum::<usize>()
        }
        Value::Array(items) => items
            .iter_mut()
            .map(|item| retarget_references(item, old, new))
            .sum(),
        _ => 0,
    }
}

fn insert_node(
    workflow: &mut Workflow,
    at: Option<usize>,
    record: &Value,
    step: usize,
) -> Result<StepOutcome, PatchError> {
    if !record.is_object() {
        return Err(PatchError::InvalidNodeRecord { step });
    }
    let nodes = workflow.nodes_mut();
    let position = at.unwrap_or(nodes.len()).min(nodes.len());
    nodes.insert(position, record.clone());
    Ok(applied(vec![node_label(record, position)], 1))
}
