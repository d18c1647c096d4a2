use csv::Writer;
use std::error::Error;

use crate::export::renderer;
use crate::model::{EffortInput, Project};

pub fn render(project: &Project) -> Result<String, Box<dyn Error>> {
    let mut wtr = Writer::from_writer(vec![]);

    // Write the header
    wtr.write_record([
        "id",
        "testName",
        "changeType",
        "userFrequency",
        "businessImpact",
        "affectedAreas",
        "isLegal",
        "easyToAutomate",
        "quickToAutomate",
        "implementationType",
        "risk",
        "value",
        "effort",
        "history",
        "legal",
        "total",
        "recommendation",
        "notes",
    ])?;

    for case in renderer::prioritized_cases(project) {
        let (easy, quick, implementation) = match case.effort {
            EffortInput::Factors { easy, quick } => {
                (easy.to_string(), quick.to_string(), String::new())
            }
            EffortInput::Legacy {
                implementation_type,
            } => (String::new(), String::new(), implementation_type.to_string()),
        };
        wtr.write_record(&[
            case.id,
            case.test_name,
            case.change_type.to_string(),
            case.user_frequency.to_string(),
            case.business_impact.to_string(),
            case.affected_areas.to_string(),
            case.is_legal.to_string(),
            easy,
            quick,
            implementation,
            case.scores.risk.to_string(),
            case.scores.value.to_string(),
            case.scores.effort.to_string(),
            case.scores.history.to_string(),
            case.scores.legal.to_string(),
            case.scores.total.to_string(),
            case.recommendation.to_string(),
            case.notes.unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner()?;
    let csv_string = String::from_utf8(data)?;

    Ok(csv_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaseSource, TestCase, TestCaseEdit};

    #[test]
    fn test_rows_are_priority_ordered() {
        let mut project = Project::new("Webshop");
        project.set_test_case(TestCase::draft("tc-low", "Low", CaseSource::Manual));
        let mut high = TestCase::draft("tc-high", "High", CaseSource::Manual);
        high.apply_edit(&TestCaseEdit {
            user_frequency: Some(5),
            business_impact: Some(5),
            is_legal: Some(true),
            ..Default::default()
        })
        .unwrap();
        project.set_test_case(high);

        let csv = render(&project).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("id,testName"));
        assert!(lines[1].starts_with("tc-high,"));
        assert!(lines[2].starts_with("tc-low,"));
        assert!(lines[1].contains("AUTOMATE"));
    }
}
