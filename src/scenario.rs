//! External scenario import: a thin field-remapping adapter for pasted
//! scenario JSON from other tooling. Field names and vocabulary values
//! arrive in several spellings; both are normalized here, once, at the
//! boundary.

use regex::Regex;
use serde_json::Value;

use crate::errors::ScenarioError;
use crate::model::{CaseSource, ChangeType, EffortInput, ImplementationType, TestCase};

/// A scenario as pasted from external tooling, already normalized.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalScenario {
    pub scenario_id: Option<String>,
    pub title: Option<String>,
    pub ticket: Option<String>,
    pub change_type: Option<ChangeType>,
    pub implementation: Option<ImplementationType>,
    pub context: Option<String>,
}

/// Lowercase a vocabulary token and collapse whitespace/underscore runs to
/// single hyphens, so `Modified Behavior`, `modified_behavior` and
/// `MODIFIED-BEHAVIOR` all compare equal.
pub fn normalize_token(raw: &str) -> String {
    let separators = Regex::new(r"[\s_-]+").unwrap();
    separators
        .replace_all(raw.trim(), "-")
        .to_lowercase()
}

fn first_string(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Parse a pasted scenario document.
///
/// Unknown change-type or implementation values are errors (the paste is
/// wrong, not the diagram); absent fields are simply `None`.
pub fn parse_scenario(text: &str) -> Result<ExternalScenario, ScenarioError> {
    let value: Value = serde_json::from_str(text)?;
    let obj = value.as_object().ok_or(ScenarioError::NotAnObject)?;

    let change_type = match first_string(obj, &["detectedCodeChange", "changeType"]) {
        None => None,
        Some(raw) => Some(
            ChangeType::from_label(&normalize_token(&raw))
                .ok_or(ScenarioError::UnknownChangeType(raw))?,
        ),
    };

    let implementation = match first_string(obj, &["detectedImplementation", "implementation"]) {
        None => None,
        Some(raw) => Some(
            ImplementationType::from_label(&normalize_token(&raw))
                .ok_or(ScenarioError::UnknownImplementation(raw))?,
        ),
    };

    Ok(ExternalScenario {
        scenario_id: first_string(obj, &["scenarioId", "id"]),
        title: first_string(obj, &["scenarioTitle", "title", "name"]),
        ticket: first_string(obj, &["jiraTicket", "ticket"]),
        change_type,
        implementation,
        context: first_string(obj, &["context"]),
    })
}

impl ExternalScenario {
    /// Produce a scored draft with the same defaults as the generator.
    /// A detected implementation selects the legacy effort path; otherwise
    /// the neutral per-factor defaults apply.
    pub fn into_test_case(self, id: impl Into<String>) -> TestCase {
        let id = id.into();
        let test_name = self
            .title
            .or_else(|| self.scenario_id.clone())
            .unwrap_or_else(|| "Imported scenario".to_string());

        let mut case = TestCase::draft(id, test_name, CaseSource::Manual);
        case.change_type = self.change_type.unwrap_or(ChangeType::New);
        if let Some(implementation_type) = self.implementation {
            case.effort = EffortInput::Legacy {
                implementation_type,
            };
        }
        case.notes = self.context;
        case.external_scenario_id = self.scenario_id;
        case.ticket = self.ticket;
        case.recompute();
        case
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token_is_case_and_separator_insensitive() {
        assert_eq!(normalize_token("Modified Behavior"), "modified-behavior");
        assert_eq!(normalize_token("modified_behavior"), "modified-behavior");
        assert_eq!(normalize_token("MODIFIED-BEHAVIOR"), "modified-behavior");
        assert_eq!(normalize_token("  Loop   Same "), "loop-same");
        assert_eq!(normalize_token("Standard_Components"), "standard-components");
    }

    #[test]
    fn test_parse_scenario_with_primary_field_names() {
        let scenario = parse_scenario(
            r#"{
                "scenarioId": "SC-17",
                "scenarioTitle": "Checkout with voucher",
                "jiraTicket": "SHOP-204",
                "detectedCodeChange": "Modified Behavior",
                "detectedImplementation": "Standard Components",
                "context": "Voucher flow touched by pricing refactor"
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.scenario_id.as_deref(), Some("SC-17"));
        assert_eq!(scenario.title.as_deref(), Some("Checkout with voucher"));
        assert_eq!(scenario.ticket.as_deref(), Some("SHOP-204"));
        assert_eq!(scenario.change_type, Some(ChangeType::ModifiedBehavior));
        assert_eq!(scenario.implementation, Some(ImplementationType::LoopSame));
    }

    #[test]
    fn test_parse_scenario_with_alias_field_names() {
        let scenario = parse_scenario(
            r#"{
                "id": "42",
                "name": "Login",
                "ticket": "AUTH-1",
                "changeType": "new",
                "implementation": "hybrid"
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.scenario_id.as_deref(), Some("42"));
        assert_eq!(scenario.title.as_deref(), Some("Login"));
        assert_eq!(scenario.change_type, Some(ChangeType::New));
        assert_eq!(scenario.implementation, Some(ImplementationType::Mix));
    }

    #[test]
    fn test_unknown_change_type_is_an_error() {
        let err = parse_scenario(r#"{"changeType": "refactored"}"#).unwrap_err();
        assert!(err.to_string().contains("refactored"));
    }

    #[test]
    fn test_into_test_case_uses_legacy_effort_when_detected() {
        let scenario = parse_scenario(
            r#"{
                "id": "SC-1",
                "title": "Search",
                "changeType": "modified_ui",
                "implementation": "custom-implementation"
            }"#,
        )
        .unwrap();
        let case = scenario.into_test_case("tc-9");
        assert_eq!(case.change_type, ChangeType::ModifiedUi);
        assert_eq!(
            case.effort,
            EffortInput::Legacy {
                implementation_type: ImplementationType::Custom
            }
        );
        // modified-ui -> 2 x 2 = 4; custom legacy ease -> 5
        assert_eq!(case.scores.value, 4);
        assert_eq!(case.scores.effort, 5);
        assert_eq!(case.external_scenario_id.as_deref(), Some("SC-1"));
    }

    #[test]
    fn test_into_test_case_defaults() {
        let case = ExternalScenario::default().into_test_case("tc-1");
        assert_eq!(case.test_name, "Imported scenario");
        assert_eq!(case.change_type, ChangeType::New);
        assert_eq!(case.effort, EffortInput::Factors { easy: 3, quick: 3 });
    }
}
