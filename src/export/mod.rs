pub mod to_csv_cases;
pub mod to_json;
pub mod to_markdown;

/// Common rendering support shared by the exporters.
pub mod renderer {
    use serde_json::{json, Value};
    use std::error::Error;

    use crate::model::{Project, TestCase};
    use crate::scoring::Recommendation;

    /// Test cases in priority order: highest total first, ties by id.
    pub fn prioritized_cases(project: &Project) -> Vec<TestCase> {
        let mut cases = project.test_cases.clone();
        cases.sort_by(|a, b| {
            b.scores
                .total
                .cmp(&a.scores.total)
                .then_with(|| a.id.cmp(&b.id))
        });
        cases
    }

    pub fn prepare_project_data(project: &Project) -> Value {
        let cases = prioritized_cases(project);
        let count = |bucket: Recommendation| {
            cases
                .iter()
                .filter(|c| c.recommendation == bucket)
                .count()
        };
        let automate = count(Recommendation::Automate);
        let maybe = count(Recommendation::Maybe);
        let dont_automate = count(Recommendation::DontAutomate);
        json!({
            "projectName": project.project_name,
            "lastModified": project.last_modified,
            "totals": {
                "automate": automate,
                "maybe": maybe,
                "dontAutomate": dont_automate,
            },
            "cases": cases,
            "functionality": project.existing_functionality,
        })
    }

    pub fn render_template(project: &Project, template: &str) -> Result<String, Box<dyn Error>> {
        let handlebars = crate::common::get_handlebars();
        let data = prepare_project_data(project);
        let rendered = handlebars.render_template(template, &data)?;
        Ok(rendered)
    }
}
