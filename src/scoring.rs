//! The automation-worthiness rubric.
//!
//! Pure, stateless arithmetic over pre-validated inputs: no I/O, no hidden
//! state, recomputing with unchanged inputs always yields identical scores.
//! Range validation of the 1-5 ratings happens at the edit/import boundary
//! (see `model`), not here.

use serde::{Deserialize, Serialize};

use crate::model::{ChangeType, EffortInput, ImplementationType, TestCase};

/// The five sub-scores and their total for one test case.
///
/// `total` is always `risk + value + effort + history + legal`; the only
/// writer is [`TestCase::recompute`], which fills the whole struct in one
/// step.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scores {
    pub risk: u32,
    pub value: u32,
    pub effort: u32,
    pub history: u32,
    pub legal: u32,
    pub total: u32,
}

/// Three-way bucketing of the total score.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recommendation {
    #[serde(rename = "AUTOMATE")]
    Automate,
    #[serde(rename = "MAYBE")]
    Maybe,
    #[serde(rename = "DONT_AUTOMATE")]
    DontAutomate,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Recommendation::Automate => "AUTOMATE",
            Recommendation::Maybe => "MAYBE",
            Recommendation::DontAutomate => "DONT_AUTOMATE",
        };
        write!(f, "{}", label)
    }
}

/// `frequency * impact`, both 1-5, range 1-25.
pub fn risk_score(frequency: u32, impact: u32) -> u32 {
    frequency * impact
}

/// How much new information a test of this change type provides.
pub fn distinctness(change_type: ChangeType) -> u32 {
    match change_type {
        ChangeType::Unchanged => 0,
        ChangeType::ModifiedUi => 2,
        ChangeType::ModifiedBehavior => 4,
        ChangeType::New => 5,
    }
}

/// How likely a failing test is to trigger a team response.
///
/// New functionality has no historical signal yet, so its urgency scales
/// with business impact; the other change types carry a fixed urgency.
pub fn induction_to_action(change_type: ChangeType, business_impact: u32) -> u32 {
    match change_type {
        ChangeType::Unchanged => 1,
        ChangeType::ModifiedUi => 2,
        ChangeType::ModifiedBehavior => 5,
        ChangeType::New => business_impact,
    }
}

/// `distinctness * induction`, range 0-25.
pub fn value_score(change_type: ChangeType, business_impact: u32) -> u32 {
    distinctness(change_type) * induction_to_action(change_type, business_impact)
}

/// `easy * quick`, both 1-5, range 1-25.
pub fn effort_score(easy: u32, quick: u32) -> u32 {
    easy * quick
}

/// Implementation risk for the legacy single-field effort path.
pub fn implementation_risk(implementation: ImplementationType) -> u32 {
    match implementation {
        ImplementationType::LoopSame => 5,
        ImplementationType::LoopDifferent => 3,
        ImplementationType::Custom => 1,
        ImplementationType::Mix => 2,
    }
}

/// Legacy ease score: implementation risk scaled by 5 to stay on the same
/// 0-25 scale as [`effort_score`]. Used only when per-factor easy/quick
/// values are absent from older saved data.
pub fn legacy_ease_score(implementation: ImplementationType) -> u32 {
    implementation_risk(implementation) * 5
}

/// Connectivity proxy, capped at 5 so highly-connected features do not
/// dominate the total.
pub fn history_score(affected_areas: u32) -> u32 {
    affected_areas.min(5)
}

/// Binary compliance override.
pub fn legal_score(is_legal: bool) -> u32 {
    if is_legal {
        20
    } else {
        0
    }
}

/// Effort for whichever input shape the case carries.
pub fn effort_score_for(effort: &EffortInput) -> u32 {
    match *effort {
        EffortInput::Factors { easy, quick } => effort_score(easy, quick),
        EffortInput::Legacy {
            implementation_type,
        } => legacy_ease_score(implementation_type),
    }
}

/// Plain sum of the five sub-scores. No clamping: the legal bonus can push
/// the total above 100 and callers interpret the raw sum.
pub fn total_score(scores: &Scores) -> u32 {
    scores.risk + scores.value + scores.effort + scores.history + scores.legal
}

/// Bucket a total into the recommendation trichotomy.
///
/// Boundaries are closed: 67 and above automates, 34 to 66 is a maybe,
/// everything below 34 is not worth automating.
pub fn recommendation(total: u32) -> Recommendation {
    if total >= 67 {
        Recommendation::Automate
    } else if total >= 34 {
        Recommendation::Maybe
    } else {
        Recommendation::DontAutomate
    }
}

/// Human-readable breakdown reproducing each formula with the actual
/// numbers substituted. Audit/tooltip output, never an input to scoring.
pub fn explain_score(case: &TestCase) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Test case: {} ({})", case.test_name, case.id));
    lines.push(format!(
        "Risk: frequency {} x impact {} = {}",
        case.user_frequency, case.business_impact, case.scores.risk
    ));
    lines.push(format!(
        "Value: distinctness {} x induction {} = {} (change type: {})",
        distinctness(case.change_type),
        induction_to_action(case.change_type, case.business_impact),
        case.scores.value,
        case.change_type
    ));
    match case.effort {
        EffortInput::Factors { easy, quick } => {
            lines.push(format!(
                "Effort: easy {} x quick {} = {}",
                easy, quick, case.scores.effort
            ));
        }
        EffortInput::Legacy {
            implementation_type,
        } => {
            lines.push(format!(
                "Effort (legacy ease): {} risk {} x 5 = {}",
                implementation_type,
                implementation_risk(implementation_type),
                case.scores.effort
            ));
        }
    }
    lines.push(format!(
        "History: min(affected areas {}, 5) = {}",
        case.affected_areas, case.scores.history
    ));
    lines.push(format!(
        "Legal: {} = {}",
        if case.is_legal { "yes" } else { "no" },
        case.scores.legal
    ));
    lines.push(format!(
        "Total: {} + {} + {} + {} + {} = {} -> {}",
        case.scores.risk,
        case.scores.value,
        case.scores.effort,
        case.scores.history,
        case.scores.legal,
        case.scores.total,
        case.recommendation
    ));
    lines.join("\n")
}
