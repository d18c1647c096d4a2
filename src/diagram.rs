//! State diagram snapshots: a directed graph of named states with actions
//! and outgoing action -> state transitions, versioned per application.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DiagramError;

pub const DEFAULT_DIAGRAM_VERSION: &str = "1.0";

/// One versioned snapshot of an application's state diagram.
///
/// `states` preserves document key order; the validator's entry-point
/// fallback and diff output ordering depend on it.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct StateDiagram {
    #[serde(default = "default_version")]
    pub version: String,
    pub application_name: String,
    #[serde(default)]
    pub states: IndexMap<String, State>,
    #[serde(default)]
    pub metadata: DiagramMetadata,
}

/// Snapshot metadata. `generated` is the version's identity and sort key.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DiagramMetadata {
    #[serde(default)]
    pub generated: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One node in the diagram.
///
/// `actions` and `transitions` are `None` when the document omitted or
/// malformed them; the validator reports that as a structural error
/// rather than the parser rejecting the whole snapshot.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub transitions: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_notes: Option<String>,
}

fn default_version() -> String {
    DEFAULT_DIAGRAM_VERSION.to_string()
}

impl StateDiagram {
    /// Parse a diagram from JSON text.
    ///
    /// Fails fast with a descriptive error when the text is not JSON or
    /// when `applicationName`/`states` are missing or mistyped. Everything
    /// below the state level parses leniently and is left to the
    /// validator.
    pub fn from_json(text: &str) -> Result<Self, DiagramError> {
        let value: Value = serde_json::from_str(text)?;
        let obj = value.as_object().ok_or(DiagramError::WrongType {
            field: "document",
            expected: "object",
        })?;

        let application_name = match obj.get("applicationName") {
            None => return Err(DiagramError::MissingField("applicationName")),
            Some(v) => v
                .as_str()
                .ok_or(DiagramError::WrongType {
                    field: "applicationName",
                    expected: "string",
                })?
                .to_string(),
        };

        let states_value = obj
            .get("states")
            .ok_or(DiagramError::MissingField("states"))?;
        let states_obj = states_value.as_object().ok_or(DiagramError::WrongType {
            field: "states",
            expected: "object",
        })?;

        let states = states_obj
            .iter()
            .map(|(id, state)| (id.clone(), parse_state(state)))
            .collect();

        let version = obj
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DIAGRAM_VERSION)
            .to_string();

        Ok(StateDiagram {
            version,
            application_name,
            states,
            metadata: parse_metadata(obj.get("metadata")),
        })
    }

    pub fn get_state(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    /// Total outgoing transitions across all states.
    pub fn transition_count(&self) -> usize {
        self.states
            .values()
            .map(|s| s.transitions.as_ref().map_or(0, IndexMap::len))
            .sum()
    }

    pub fn stats(&self) -> String {
        format!(
            "States: {}, Transitions: {}",
            self.states.len(),
            self.transition_count()
        )
    }
}

fn parse_state(value: &Value) -> State {
    let Some(obj) = value.as_object() else {
        return State::default();
    };

    let actions = obj.get("actions").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    });

    let transitions = obj
        .get("transitions")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(action, target)| {
                    target.as_str().map(|t| (action.clone(), t.to_string()))
                })
                .collect()
        });

    let get_str =
        |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

    State {
        description: get_str("description"),
        actions,
        transitions,
        implementation: get_str("implementation"),
        last_modified: get_str("lastModified"),
        change_notes: get_str("changeNotes"),
    }
}

fn parse_metadata(value: Option<&Value>) -> DiagramMetadata {
    let mut metadata = DiagramMetadata::default();
    if let Some(obj) = value.and_then(Value::as_object) {
        for (key, val) in obj {
            if key == "generated" {
                if let Some(generated) = val.as_str() {
                    metadata.generated = generated.to_string();
                }
            } else {
                metadata.extra.insert(key.clone(), val.clone());
            }
        }
    }
    if metadata.generated.is_empty() {
        metadata.generated = Utc::now().to_rfc3339();
    }
    metadata
}
