//! Structured difference between two diagram snapshots.
//!
//! The caller supplies (previous, current) in true chronological order by
//! `metadata.generated`; the differ neither reorders nor detects
//! misordering. The four output sets are disjoint and together cover every
//! state id from both snapshots exactly once.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::diagram::{State, StateDiagram};
use crate::model::ChangeType;

#[derive(Serialize, Clone, Debug, Default)]
pub struct StateDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<StateModification>,
    pub unchanged: Vec<String>,
}

/// A state present in both snapshots whose fields differ.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StateModification {
    pub state_id: String,
    pub changes: StateChanges,
}

/// Field-level change detail. A field absent here is guaranteed unchanged.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StateChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<FieldChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<FieldChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions_added: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions_removed: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub transitions_added: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions_removed: Vec<String>,
}

/// Old/new pair for a scalar field; `None` on either side means the field
/// was absent in that snapshot.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldChange {
    pub old: Option<String>,
    pub new: Option<String>,
}

impl FieldChange {
    fn between(old: &Option<String>, new: &Option<String>) -> Option<Self> {
        if old == new {
            None
        } else {
            Some(FieldChange {
                old: old.clone(),
                new: new.clone(),
            })
        }
    }
}

impl StateChanges {
    pub fn is_empty(&self) -> bool {
        self.implementation.is_none()
            && self.last_modified.is_none()
            && self.actions_added.is_empty()
            && self.actions_removed.is_empty()
            && self.transitions_added.is_empty()
            && self.transitions_removed.is_empty()
    }

    /// Whether the functional surface (actions or transitions) changed.
    pub fn behavior_changed(&self) -> bool {
        !self.actions_added.is_empty()
            || !self.actions_removed.is_empty()
            || !self.transitions_added.is_empty()
            || !self.transitions_removed.is_empty()
    }
}

pub fn diff(previous: &StateDiagram, current: &StateDiagram) -> StateDiff {
    let mut result = StateDiff::default();

    for id in current.states.keys() {
        if !previous.states.contains_key(id) {
            result.added.push(id.clone());
        }
    }
    for id in previous.states.keys() {
        if !current.states.contains_key(id) {
            result.removed.push(id.clone());
        }
    }

    for (id, current_state) in &current.states {
        let Some(previous_state) = previous.states.get(id) else {
            continue;
        };
        let changes = detect_state_changes(previous_state, current_state);
        if changes.is_empty() {
            result.unchanged.push(id.clone());
        } else {
            result.modified.push(StateModification {
                state_id: id.clone(),
                changes,
            });
        }
    }

    debug!(
        "Diffed '{}': {} added, {} removed, {} modified, {} unchanged",
        current.application_name,
        result.added.len(),
        result.removed.len(),
        result.modified.len(),
        result.unchanged.len()
    );
    result
}

/// Field-level comparison of one state across the two snapshots.
pub fn detect_state_changes(previous: &State, current: &State) -> StateChanges {
    let mut changes = StateChanges {
        implementation: FieldChange::between(&previous.implementation, &current.implementation),
        last_modified: FieldChange::between(&previous.last_modified, &current.last_modified),
        ..StateChanges::default()
    };

    let previous_actions = previous.actions.as_deref().unwrap_or(&[]);
    let current_actions = current.actions.as_deref().unwrap_or(&[]);
    changes.actions_added = current_actions
        .iter()
        .filter(|a| !previous_actions.contains(*a))
        .cloned()
        .collect();
    changes.actions_removed = previous_actions
        .iter()
        .filter(|a| !current_actions.contains(*a))
        .cloned()
        .collect();

    let empty = IndexMap::new();
    let previous_transitions = previous.transitions.as_ref().unwrap_or(&empty);
    let current_transitions = current.transitions.as_ref().unwrap_or(&empty);

    // Covers both newly-added actions and existing actions re-pointed at a
    // different target.
    for (action, target) in current_transitions {
        if previous_transitions.get(action) != Some(target) {
            changes
                .transitions_added
                .insert(action.clone(), target.clone());
        }
    }
    for action in previous_transitions.keys() {
        if !current_transitions.contains_key(action) {
            changes.transitions_removed.push(action.clone());
        }
    }

    changes
}

/// Classify a modification into the test case change-type vocabulary.
///
/// Functional surface changes always imply behavior risk; implementation
/// or timestamp-only changes imply UI-only risk. Anything else falls back
/// to behavior.
pub fn detect_change_type(modification: &StateModification) -> ChangeType {
    let changes = &modification.changes;
    if changes.behavior_changed() {
        ChangeType::ModifiedBehavior
    } else if changes.implementation.is_some() {
        ChangeType::ModifiedUi
    } else if changes.last_modified.is_some() {
        ChangeType::ModifiedUi
    } else {
        ChangeType::ModifiedBehavior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagram(text: &str) -> StateDiagram {
        StateDiagram::from_json(text).unwrap()
    }

    fn two_state_diagram() -> StateDiagram {
        diagram(
            r#"{
                "applicationName": "webshop",
                "states": {
                    "initial": {"actions": ["open cart"], "transitions": {"open cart": "state2"}},
                    "state2": {"actions": [], "transitions": {}}
                },
                "metadata": {"generated": "2024-03-01T10:00:00Z"}
            }"#,
        )
    }

    #[test]
    fn test_diff_against_itself_is_all_unchanged() {
        let d = two_state_diagram();
        let result = diff(&d, &d);
        assert!(result.added.is_empty());
        assert!(result.removed.is_empty());
        assert!(result.modified.is_empty());
        assert_eq!(result.unchanged, ["initial", "state2"]);
    }

    #[test]
    fn test_sets_partition_all_ids() {
        let previous = two_state_diagram();
        let current = diagram(
            r#"{
                "applicationName": "webshop",
                "states": {
                    "initial": {"actions": ["open cart"], "transitions": {"open cart": "state2"}},
                    "state2": {"actions": ["pay"], "transitions": {"pay": "state3"}},
                    "state3": {"actions": [], "transitions": {}}
                },
                "metadata": {"generated": "2024-03-02T10:00:00Z"}
            }"#,
        );
        let result = diff(&previous, &current);
        assert_eq!(result.added, ["state3"]);
        assert!(result.removed.is_empty());
        assert_eq!(result.unchanged, ["initial"]);
        assert_eq!(result.modified.len(), 1);
        assert_eq!(result.modified[0].state_id, "state2");

        let mut covered: Vec<&str> = Vec::new();
        covered.extend(result.added.iter().map(String::as_str));
        covered.extend(result.removed.iter().map(String::as_str));
        covered.extend(result.unchanged.iter().map(String::as_str));
        covered.extend(result.modified.iter().map(|m| m.state_id.as_str()));
        covered.sort_unstable();
        assert_eq!(covered, ["initial", "state2", "state3"]);
    }

    #[test]
    fn test_removed_states_are_reported() {
        let previous = two_state_diagram();
        let current = diagram(
            r#"{
                "applicationName": "webshop",
                "states": {
                    "initial": {"actions": [], "transitions": {}}
                }
            }"#,
        );
        let result = diff(&previous, &current);
        assert_eq!(result.removed, ["state2"]);
        // initial lost its action and transition, so it is modified
        assert_eq!(result.modified.len(), 1);
        assert_eq!(
            result.modified[0].changes.actions_removed,
            ["open cart"]
        );
        assert_eq!(
            result.modified[0].changes.transitions_removed,
            ["open cart"]
        );
    }

    #[test]
    fn test_repointed_transition_counts_as_added() {
        let previous = State {
            actions: Some(vec!["go".to_string()]),
            transitions: Some(IndexMap::from([("go".to_string(), "a".to_string())])),
            ..State::default()
        };
        let current = State {
            actions: Some(vec!["go".to_string()]),
            transitions: Some(IndexMap::from([("go".to_string(), "b".to_string())])),
            ..State::default()
        };
        let changes = detect_state_changes(&previous, &current);
        assert_eq!(changes.transitions_added.get("go"), Some(&"b".to_string()));
        assert!(changes.transitions_removed.is_empty());
        assert!(changes.actions_added.is_empty());
    }

    #[test]
    fn test_field_changes_record_old_and_new() {
        let previous = State {
            implementation: Some("loop-same".to_string()),
            ..State::default()
        };
        let current = State {
            implementation: Some("custom".to_string()),
            last_modified: Some("2024-03-02".to_string()),
            ..State::default()
        };
        let changes = detect_state_changes(&previous, &current);
        assert_eq!(
            changes.implementation,
            Some(FieldChange {
                old: Some("loop-same".to_string()),
                new: Some("custom".to_string()),
            })
        );
        assert_eq!(
            changes.last_modified,
            Some(FieldChange {
                old: None,
                new: Some("2024-03-02".to_string()),
            })
        );
    }

    #[test]
    fn test_detect_change_type_classification() {
        let behavior = StateModification {
            state_id: "s".to_string(),
            changes: StateChanges {
                actions_added: vec!["new action".to_string()],
                implementation: Some(FieldChange::default()),
                ..StateChanges::default()
            },
        };
        assert_eq!(detect_change_type(&behavior), ChangeType::ModifiedBehavior);

        let ui = StateModification {
            state_id: "s".to_string(),
            changes: StateChanges {
                implementation: Some(FieldChange::default()),
                ..StateChanges::default()
            },
        };
        assert_eq!(detect_change_type(&ui), ChangeType::ModifiedUi);

        let timestamp_only = StateModification {
            state_id: "s".to_string(),
            changes: StateChanges {
                last_modified: Some(FieldChange::default()),
                ..StateChanges::default()
            },
        };
        assert_eq!(detect_change_type(&timestamp_only), ChangeType::ModifiedUi);

        // catch-all: a modification with no recognized field still implies
        // behavior risk
        let empty = StateModification {
            state_id: "s".to_string(),
            changes: StateChanges::default(),
        };
        assert_eq!(detect_change_type(&empty), ChangeType::ModifiedBehavior);
    }
}
