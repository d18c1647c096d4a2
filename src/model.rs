//! Test case and functionality inventory entities, and the project
//! document that owns them.
//!
//! All scoring inputs flow through [`TestCase::recompute`]: any mutation of
//! an input recomputes the five sub-scores, the total and the
//! recommendation in the same update, so `scores.total` never drifts from
//! its inputs.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::RatingError;
use crate::scoring::{self, Recommendation, Scores};

pub const PROJECT_DOCUMENT_VERSION: &str = "1.0";

/// What kind of change a test case covers, in the diff vocabulary.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    New,
    ModifiedBehavior,
    ModifiedUi,
    Unchanged,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangeType::New => "new",
            ChangeType::ModifiedBehavior => "modified-behavior",
            ChangeType::ModifiedUi => "modified-ui",
            ChangeType::Unchanged => "unchanged",
        };
        write!(f, "{}", label)
    }
}

impl ChangeType {
    /// Resolve a normalized label (see [`crate::scenario::normalize_token`])
    /// to a change type.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "new" => Some(ChangeType::New),
            "modified-behavior" => Some(ChangeType::ModifiedBehavior),
            "modified-ui" => Some(ChangeType::ModifiedUi),
            "unchanged" => Some(ChangeType::Unchanged),
            _ => None,
        }
    }
}

/// How a piece of functionality is implemented, with serde aliases for the
/// legacy vocabulary found in older saved data and diagram exports.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ImplementationType {
    #[serde(alias = "standard-components")]
    LoopSame,
    #[serde(alias = "new-pattern")]
    LoopDifferent,
    #[serde(alias = "custom-implementation")]
    Custom,
    #[serde(alias = "hybrid")]
    Mix,
}

impl std::fmt::Display for ImplementationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ImplementationType::LoopSame => "loop-same",
            ImplementationType::LoopDifferent => "loop-different",
            ImplementationType::Custom => "custom",
            ImplementationType::Mix => "mix",
        };
        write!(f, "{}", label)
    }
}

impl ImplementationType {
    /// Resolve a normalized label, accepting both the canonical and the
    /// legacy spellings.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "loop-same" | "standard-components" => Some(ImplementationType::LoopSame),
            "loop-different" | "new-pattern" => Some(ImplementationType::LoopDifferent),
            "custom" | "custom-implementation" => Some(ImplementationType::Custom),
            "mix" | "hybrid" => Some(ImplementationType::Mix),
            _ => None,
        }
    }
}

/// Where a test case or inventory entry came from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CaseSource {
    Manual,
    StateDiagram,
}

/// Inventory entry lifecycle status.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionalityStatus {
    Stable,
    Unstable,
    Deprecated,
}

/// The two effort input shapes, normalized into one tagged union at the
/// boundary instead of threading field fallbacks through every formula.
///
/// `Factors` is the current shape; `Legacy` carries the single
/// implementation-type field of older saved data. Flattened into the
/// [`TestCase`] serde shape, so both document generations parse.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum EffortInput {
    Factors {
        #[serde(rename = "easyToAutomate")]
        easy: u32,
        #[serde(rename = "quickToAutomate")]
        quick: u32,
    },
    Legacy {
        #[serde(rename = "implementationType")]
        implementation_type: ImplementationType,
    },
}

/// One row of the prioritization table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub test_name: String,
    pub change_type: ChangeType,
    pub user_frequency: u32,
    pub business_impact: u32,
    pub affected_areas: u32,
    pub is_legal: bool,
    #[serde(flatten)]
    pub effort: EffortInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub source: CaseSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_scenario_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    pub scores: Scores,
    pub recommendation: Recommendation,
}

impl TestCase {
    /// A draft with the generator/import defaults, already scored.
    pub fn draft(id: impl Into<String>, test_name: impl Into<String>, source: CaseSource) -> Self {
        let mut case = TestCase {
            id: id.into(),
            test_name: test_name.into(),
            change_type: ChangeType::New,
            user_frequency: 3,
            business_impact: 3,
            affected_areas: 1,
            is_legal: false,
            effort: EffortInput::Factors { easy: 3, quick: 3 },
            notes: None,
            source,
            state_id: None,
            external_scenario_id: None,
            ticket: None,
            scores: Scores::default(),
            recommendation: Recommendation::DontAutomate,
        };
        case.recompute();
        case
    }

    /// Recompute all five sub-scores, the total and the recommendation from
    /// the current inputs. The only writer of `scores`.
    pub fn recompute(&mut self) {
        let mut scores = Scores {
            risk: scoring::risk_score(self.user_frequency, self.business_impact),
            value: scoring::value_score(self.change_type, self.business_impact),
            effort: scoring::effort_score_for(&self.effort),
            history: scoring::history_score(self.affected_areas),
            legal: scoring::legal_score(self.is_legal),
            total: 0,
        };
        scores.total = scoring::total_score(&scores);
        self.scores = scores;
        self.recommendation = scoring::recommendation(scores.total);
    }

    /// Apply a partial edit. All rating fields are validated before any
    /// field is written, so a rejected edit leaves the case untouched;
    /// an accepted edit always ends in a recompute.
    pub fn apply_edit(&mut self, edit: &TestCaseEdit) -> Result<(), RatingError> {
        if let Some(value) = edit.user_frequency {
            validate_rating("userFrequency", value)?;
        }
        if let Some(value) = edit.business_impact {
            validate_rating("businessImpact", value)?;
        }
        if let Some(value) = edit.easy_to_automate {
            validate_rating("easyToAutomate", value)?;
        }
        if let Some(value) = edit.quick_to_automate {
            validate_rating("quickToAutomate", value)?;
        }

        if let Some(test_name) = &edit.test_name {
            self.test_name = test_name.clone();
        }
        if let Some(change_type) = edit.change_type {
            self.change_type = change_type;
        }
        if let Some(user_frequency) = edit.user_frequency {
            self.user_frequency = user_frequency;
        }
        if let Some(business_impact) = edit.business_impact {
            self.business_impact = business_impact;
        }
        if let Some(affected_areas) = edit.affected_areas {
            self.affected_areas = affected_areas;
        }
        if let Some(is_legal) = edit.is_legal {
            self.is_legal = is_legal;
        }
        if edit.easy_to_automate.is_some() || edit.quick_to_automate.is_some() {
            // Switching to (or updating) the per-factor shape; factors not
            // named in the edit keep their current value, or the default 3
            // when coming from the legacy shape.
            let (current_easy, current_quick) = match self.effort {
                EffortInput::Factors { easy, quick } => (easy, quick),
                EffortInput::Legacy { .. } => (3, 3),
            };
            self.effort = EffortInput::Factors {
                easy: edit.easy_to_automate.unwrap_or(current_easy),
                quick: edit.quick_to_automate.unwrap_or(current_quick),
            };
        } else if let Some(implementation_type) = edit.implementation_type {
            self.effort = EffortInput::Legacy {
                implementation_type,
            };
        }
        if let Some(notes) = &edit.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(ticket) = &edit.ticket {
            self.ticket = Some(ticket.clone());
        }

        self.recompute();
        Ok(())
    }
}

/// Partial update to a test case; absent fields are left unchanged.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseEdit {
    pub test_name: Option<String>,
    pub change_type: Option<ChangeType>,
    pub user_frequency: Option<u32>,
    pub business_impact: Option<u32>,
    pub affected_areas: Option<u32>,
    pub is_legal: Option<bool>,
    pub easy_to_automate: Option<u32>,
    pub quick_to_automate: Option<u32>,
    pub implementation_type: Option<ImplementationType>,
    pub notes: Option<String>,
    pub ticket: Option<String>,
}

fn validate_rating(field: &'static str, value: u32) -> Result<(), RatingError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(RatingError::OutOfRange { field, value })
    }
}

/// Inventory entry describing a previously-tested capability.
///
/// `state_id` is a weak back-reference to the diagram state the entry was
/// generated from: lookup only, not ownership.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExistingFunctionality {
    pub name: String,
    pub implementation_type: ImplementationType,
    pub status: FunctionalityStatus,
    pub source: CaseSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_tested: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
}

/// The persisted project document; exclusively owns its test cases and
/// inventory entries.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub version: String,
    pub project_name: String,
    pub created: String,
    pub last_modified: String,
    #[serde(default)]
    pub existing_functionality: Vec<ExistingFunctionality>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    pub fn new(project_name: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Project {
            version: PROJECT_DOCUMENT_VERSION.to_string(),
            project_name: project_name.into(),
            created: now.clone(),
            last_modified: now,
            existing_functionality: Vec::new(),
            test_cases: Vec::new(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn get_test_case(&self, id: &str) -> Option<&TestCase> {
        self.test_cases.iter().find(|c| c.id == id)
    }

    /// Insert or replace by id.
    pub fn set_test_case(&mut self, case: TestCase) {
        let idx = self.test_cases.iter().position(|c| c.id == case.id);
        if let Some(idx) = idx {
            self.test_cases[idx] = case;
        } else {
            self.test_cases.push(case);
        }
        self.touch();
    }

    /// Apply a partial edit to the case with the given id. Returns `false`
    /// when no such case exists.
    pub fn update_test_case(&mut self, id: &str, edit: &TestCaseEdit) -> Result<bool, RatingError> {
        let Some(case) = self.test_cases.iter_mut().find(|c| c.id == id) else {
            return Ok(false);
        };
        case.apply_edit(edit)?;
        self.touch();
        Ok(true)
    }

    pub fn remove_test_case(&mut self, id: &str) {
        self.test_cases.retain(|c| c.id != id);
        self.touch();
    }

    /// Project-wide clear of cases and inventory.
    pub fn clear(&mut self) {
        self.test_cases.clear();
        self.existing_functionality.clear();
        self.touch();
    }

    pub fn stats(&self) -> String {
        format!(
            "Test cases: {}, Functionality entries: {}",
            self.test_cases.len(),
            self.existing_functionality.len()
        )
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now().to_rfc3339();
    }
}
