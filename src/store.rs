//! File-backed persistence for the project document and the per-application
//! diagram history. The core never reads or writes files itself; everything
//! here happens before or after the pure pipeline runs.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::common;
use crate::diagram::StateDiagram;
use crate::model::Project;

/// Retained diagram versions per application; the oldest is evicted first.
pub const MAX_RETAINED_VERSIONS: usize = 3;

pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProjectStore { root: root.into() }
    }

    pub fn project_path(&self) -> PathBuf {
        self.root.join("project.json")
    }

    fn history_path(&self, application_name: &str) -> PathBuf {
        self.root
            .join("history")
            .join(format!("{}.json", slug(application_name)))
    }

    /// Load the project document, or `None` when the store is empty.
    pub fn load_project(&self) -> Result<Option<Project>> {
        let path = self.project_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read project document {}", path.display()))?;
        let project = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse project document {}", path.display()))?;
        Ok(Some(project))
    }

    pub fn save_project(&self, project: &Project) -> Result<()> {
        let path = self.project_path();
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Store path contains invalid UTF-8: {}", path.display()))?;
        let content = serde_json::to_string_pretty(project)?;
        common::write_string_to_file(path_str, &content)?;
        debug!("Saved project document: {}", project.stats());
        Ok(())
    }

    /// All retained versions for an application, oldest first.
    pub fn load_history(&self, application_name: &str) -> Result<Vec<StateDiagram>> {
        let path = self.history_path(application_name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read diagram history {}", path.display()))?;
        let history = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse diagram history {}", path.display()))?;
        Ok(history)
    }

    /// Append a new version and return the previously latest snapshot, the
    /// one a diff should run against. Keeps at most
    /// [`MAX_RETAINED_VERSIONS`] entries.
    pub fn push_version(&self, diagram: &StateDiagram) -> Result<Option<StateDiagram>> {
        let mut history = self.load_history(&diagram.application_name)?;
        let previous = history.last().cloned();

        history.push(diagram.clone());
        while history.len() > MAX_RETAINED_VERSIONS {
            history.remove(0);
        }

        let path = self.history_path(&diagram.application_name);
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Store path contains invalid UTF-8: {}", path.display()))?;
        common::write_string_to_file(path_str, &serde_json::to_string_pretty(&history)?)?;

        info!(
            "Stored diagram version for '{}' ({} retained)",
            diagram.application_name,
            history.len()
        );
        Ok(previous)
    }
}

/// Filename-safe key for an application name.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && !out.is_empty() {
            out.push('-');
            last_was_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        "unnamed".to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagram(generated: &str) -> StateDiagram {
        StateDiagram::from_json(&format!(
            r#"{{
                "applicationName": "Web Shop",
                "states": {{
                    "initial": {{"actions": [], "transitions": {{}}}}
                }},
                "metadata": {{"generated": "{}"}}
            }}"#,
            generated
        ))
        .unwrap()
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Web Shop"), "web-shop");
        assert_eq!(slug("  admin / portal  "), "admin-portal");
        assert_eq!(slug("!!!"), "unnamed");
    }

    #[test]
    fn test_push_version_returns_previous_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());

        let previous = store.push_version(&diagram("2024-03-01T10:00:00Z")).unwrap();
        assert!(previous.is_none());

        let previous = store.push_version(&diagram("2024-03-02T10:00:00Z")).unwrap();
        assert_eq!(
            previous.unwrap().metadata.generated,
            "2024-03-01T10:00:00Z"
        );
    }

    #[test]
    fn test_history_is_capped_at_three_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());

        for day in 1..=4 {
            let generated = format!("2024-03-0{}T10:00:00Z", day);
            store.push_version(&diagram(&generated)).unwrap();
        }

        let history = store.load_history("Web Shop").unwrap();
        assert_eq!(history.len(), MAX_RETAINED_VERSIONS);
        // oldest (day 1) evicted, newest last
        assert_eq!(history[0].metadata.generated, "2024-03-02T10:00:00Z");
        assert_eq!(history[2].metadata.generated, "2024-03-04T10:00:00Z");
    }

    #[test]
    fn test_project_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());
        assert!(store.load_project().unwrap().is_none());

        let project = Project::new("Webshop");
        store.save_project(&project).unwrap();
        let loaded = store.load_project().unwrap().unwrap();
        assert_eq!(loaded.project_name, "Webshop");
    }
}
