use std::error::Error;

use crate::model::Project;

/// The persisted project document shape, pretty-printed.
pub fn render(project: &Project) -> Result<String, Box<dyn Error>> {
    let json_string = serde_json::to_string_pretty(project)?;
    Ok(json_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaseSource, TestCase};

    #[test]
    fn test_renders_document_shape() {
        let mut project = Project::new("Webshop");
        project.set_test_case(TestCase::draft("tc-1", "Checkout", CaseSource::Manual));
        let rendered = render(&project).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["projectName"], "Webshop");
        assert_eq!(value["testCases"][0]["id"], "tc-1");
        assert_eq!(value["testCases"][0]["scores"]["total"], 34);
    }
}
