//! Turns a diff + diagram into scored test-case drafts and
//! functionality-inventory entries.

use tracing::{debug, info};

use crate::diagram::StateDiagram;
use crate::diff::{self, StateChanges, StateDiff};
use crate::model::{
    CaseSource, ChangeType, EffortInput, ExistingFunctionality, FunctionalityStatus,
    ImplementationType, TestCase,
};

/// Easy/quick automation factors for a state's implementation label.
/// Unknown or absent implementations get the neutral middle.
pub fn implementation_factors(implementation: Option<&str>) -> (u32, u32) {
    match implementation.and_then(ImplementationType::from_label) {
        Some(ImplementationType::LoopSame) => (5, 5),
        Some(ImplementationType::LoopDifferent) => (3, 5),
        Some(ImplementationType::Custom) => (1, 5),
        Some(ImplementationType::Mix) => (2, 5),
        None => (3, 3),
    }
}

/// Graph connectivity of a state: outgoing transitions plus incoming
/// transitions from all other states, capped at 5. A state that does not
/// exist in the diagram counts as 1, never 0.
pub fn calculate_affected_areas(state_id: &str, diagram: &StateDiagram) -> u32 {
    let Some(state) = diagram.get_state(state_id) else {
        return 1;
    };
    let outgoing = state.transitions.as_ref().map_or(0, |t| t.len());
    let incoming: usize = diagram
        .states
        .iter()
        .filter(|(id, _)| id.as_str() != state_id)
        .map(|(_, other)| {
            other
                .transitions
                .as_ref()
                .map_or(0, |t| t.values().filter(|target| *target == state_id).count())
        })
        .sum();
    ((outgoing + incoming) as u32).clamp(1, 5)
}

/// One draft per added state and one per modified state, each scored with
/// the generator defaults (frequency 3, impact 3, not legal).
pub fn generate_test_cases(diff: &StateDiff, diagram: &StateDiagram) -> Vec<TestCase> {
    let mut cases = Vec::new();

    for state_id in &diff.added {
        let notes = format!("New state: {}", state_id);
        cases.push(draft_case(
            format!("sd-{}", state_id),
            state_id,
            ChangeType::New,
            notes,
            diagram,
        ));
    }

    for modification in &diff.modified {
        let change_type = diff::detect_change_type(modification);
        let notes = describe_changes(&modification.changes);
        cases.push(draft_case(
            format!("sd-{}-mod", modification.state_id),
            &modification.state_id,
            change_type,
            notes,
            diagram,
        ));
    }

    info!(
        "Generated {} draft test case(s) from diff of '{}'",
        cases.len(),
        diagram.application_name
    );
    cases
}

fn draft_case(
    id: String,
    state_id: &str,
    change_type: ChangeType,
    notes: String,
    diagram: &StateDiagram,
) -> TestCase {
    let state = diagram.get_state(state_id);
    let test_name = state
        .and_then(|s| s.description.clone())
        .unwrap_or_else(|| state_id.to_string());
    let (easy, quick) = implementation_factors(state.and_then(|s| s.implementation.as_deref()));

    let mut case = TestCase::draft(id, test_name, CaseSource::StateDiagram);
    case.change_type = change_type;
    case.affected_areas = calculate_affected_areas(state_id, diagram);
    case.effort = EffortInput::Factors { easy, quick };
    case.notes = Some(notes);
    case.state_id = Some(state_id.to_string());
    case.recompute();

    debug!(
        "Draft '{}': total {} -> {}",
        case.id, case.scores.total, case.recommendation
    );
    case
}

/// Human-readable rendering of a structured changes record, for the draft's
/// notes field.
pub fn describe_changes(changes: &StateChanges) -> String {
    let mut parts = Vec::new();
    if let Some(change) = &changes.implementation {
        parts.push(format!(
            "Implementation changed: {} -> {}",
            change.old.as_deref().unwrap_or("none"),
            change.new.as_deref().unwrap_or("none")
        ));
    }
    if !changes.actions_added.is_empty() {
        parts.push(format!("Actions added: {}", changes.actions_added.join(", ")));
    }
    if !changes.actions_removed.is_empty() {
        parts.push(format!(
            "Actions removed: {}",
            changes.actions_removed.join(", ")
        ));
    }
    if !changes.transitions_added.is_empty() {
        let rendered: Vec<String> = changes
            .transitions_added
            .iter()
            .map(|(action, target)| format!("{} -> {}", action, target))
            .collect();
        parts.push(format!("Transitions added: {}", rendered.join(", ")));
    }
    if !changes.transitions_removed.is_empty() {
        parts.push(format!(
            "Transitions removed: {}",
            changes.transitions_removed.join(", ")
        ));
    }
    if let Some(change) = &changes.last_modified {
        parts.push(format!(
            "Last modified: {} -> {}",
            change.old.as_deref().unwrap_or("none"),
            change.new.as_deref().unwrap_or("none")
        ));
    }
    parts.join("; ")
}

/// One inventory entry per state in the snapshot.
pub fn generate_existing_functionality(diagram: &StateDiagram) -> Vec<ExistingFunctionality> {
    diagram
        .states
        .iter()
        .map(|(id, state)| ExistingFunctionality {
            name: state
                .description
                .clone()
                .unwrap_or_else(|| id.clone()),
            implementation_type: state
                .implementation
                .as_deref()
                .and_then(ImplementationType::from_label)
                .unwrap_or(ImplementationType::Custom),
            status: FunctionalityStatus::Stable,
            source: CaseSource::StateDiagram,
            last_tested: state.last_modified.clone(),
            state_id: Some(id.clone()),
        })
        .collect()
}
