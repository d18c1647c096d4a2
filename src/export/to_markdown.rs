use std::error::Error;

use crate::model::Project;

pub fn get_template() -> String {
    include_str!("to_markdown.hbs").to_string()
}

pub fn render(project: &Project) -> Result<String, Box<dyn Error>> {
    crate::export::renderer::render_template(project, &get_template())
}
