//! Structural and reachability checks over a single diagram snapshot.
//!
//! Two passes in O(states + transitions): collect the id set and incoming
//! edges, then verify. Structural corruption (missing actions/transitions,
//! transitions to unknown states) is an error and marks the snapshot
//! invalid; dead ends and unreachable states are advisory warnings and
//! never block. Cycles are valid and not reported.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::diagram::StateDiagram;

/// Ids tried first, case-insensitively, when guessing the entry point.
pub const ENTRY_POINT_CANDIDATES: [&str; 3] = ["initial", "start", "home"];

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
}

/// One finding. `field` points at the offending location when there is one.
#[derive(Serialize, Clone, Debug)]
pub struct ValidationIssue {
    pub level: IssueLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationIssue {
    fn error(message: String, field: Option<String>) -> Self {
        ValidationIssue {
            level: IssueLevel::Error,
            message,
            field,
        }
    }

    fn warning(message: String, field: Option<String>) -> Self {
        ValidationIssue {
            level: IssueLevel::Warning,
            message,
            field,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.warnings
            .iter()
            .filter(|issue| issue.level == IssueLevel::Error)
    }
}

/// The entry point used for the reachability heuristic: the first of
/// [`ENTRY_POINT_CANDIDATES`] present in the diagram (case-insensitive),
/// else the first state in document order.
pub fn entry_point(diagram: &StateDiagram) -> Option<&String> {
    for candidate in ENTRY_POINT_CANDIDATES {
        if let Some(id) = diagram
            .states
            .keys()
            .find(|id| id.eq_ignore_ascii_case(candidate))
        {
            return Some(id);
        }
    }
    diagram.states.keys().next()
}

pub fn validate(diagram: &StateDiagram) -> ValidationResult {
    let mut warnings = Vec::new();

    if diagram.states.is_empty() {
        warnings.push(ValidationIssue::warning(
            "State diagram has no states".to_string(),
            None,
        ));
        return finish(warnings);
    }

    let state_ids: HashSet<&str> = diagram.states.keys().map(String::as_str).collect();
    let mut has_incoming: HashSet<&str> = HashSet::new();

    for (id, state) in &diagram.states {
        if state.actions.is_none() {
            warnings.push(ValidationIssue::error(
                format!("State '{}' is missing an actions list", id),
                Some(format!("states.{}.actions", id)),
            ));
        }

        let Some(transitions) = &state.transitions else {
            warnings.push(ValidationIssue::error(
                format!("State '{}' is missing a transitions map", id),
                Some(format!("states.{}.transitions", id)),
            ));
            continue;
        };

        if transitions.is_empty() {
            warnings.push(ValidationIssue::warning(
                format!("State '{}' has no outgoing transitions (dead end)", id),
                Some(format!("states.{}.transitions", id)),
            ));
        }

        for (action, target) in transitions {
            if state_ids.contains(target.as_str()) {
                has_incoming.insert(target.as_str());
            } else {
                warnings.push(ValidationIssue::error(
                    format!(
                        "State '{}' action '{}' points at unknown state '{}'",
                        id, action, target
                    ),
                    Some(format!("states.{}.transitions.{}", id, action)),
                ));
            }
        }
    }

    let entry = entry_point(diagram);
    for id in diagram.states.keys() {
        if Some(id) == entry {
            continue;
        }
        if !has_incoming.contains(id.as_str()) {
            warnings.push(ValidationIssue::warning(
                format!(
                    "State '{}' has no incoming transitions and may be unreachable",
                    id
                ),
                Some(format!("states.{}", id)),
            ));
        }
    }

    finish(warnings)
}

fn finish(warnings: Vec<ValidationIssue>) -> ValidationResult {
    let is_valid = !warnings.iter().any(|issue| issue.level == IssueLevel::Error);
    debug!(
        "Validation finished: {} finding(s), valid: {}",
        warnings.len(),
        is_valid
    );
    ValidationResult { is_valid, warnings }
}
