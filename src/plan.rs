use serde::{Deserialize, Serialize};

/// ## Structure
/// This module contains the data structures for the plan file.
///
/// ```text
/// Plan
///   ├── meta: Option<Meta>
///   │   └── name: Option<String>
///   ├── import: ImportConfig
///   │   └── diagrams: Vec<String>   // diagram JSON files, oldest first
///   └── export: ExportProfile
///       └── profiles: Vec<ExportProfileItem>
///           ├── filename: String
///           └── exporter: ExportFileType
///               ├── CsvCases
///               ├── Json
///               └── Markdown
/// ```

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Plan {
    pub meta: Option<Meta>,
    pub import: ImportConfig,
    pub export: ExportProfile,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ImportConfig {
    /// Diagram snapshot files. Execution sorts them chronologically by
    /// `metadata.generated` before diffing, so file order is a convenience,
    /// not a contract.
    pub diagrams: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExportProfile {
    pub profiles: Vec<ExportProfileItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExportProfileItem {
    pub filename: String,
    pub exporter: ExportFileType,
}

#[derive(Serialize, Deserialize, Clone, Debug, Copy, PartialEq, Eq)]
pub enum ExportFileType {
    CsvCases,
    Json,
    Markdown,
}

impl Plan {
    /// Skeleton written by `triage init`.
    pub fn skeleton() -> Self {
        Plan {
            meta: Some(Meta {
                name: Some("Unnamed Project".to_string()),
            }),
            import: ImportConfig {
                diagrams: vec![
                    "diagram_v1.json".to_string(),
                    "diagram_v2.json".to_string(),
                ],
            },
            export: ExportProfile {
                profiles: vec![
                    ExportProfileItem {
                        filename: "output/cases.csv".to_string(),
                        exporter: ExportFileType::CsvCases,
                    },
                    ExportProfileItem {
                        filename: "output/report.md".to_string(),
                        exporter: ExportFileType::Markdown,
                    },
                    ExportProfileItem {
                        filename: "output/project.json".to_string(),
                        exporter: ExportFileType::Json,
                    },
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_yaml_round_trip() {
        let yaml = r#"
meta:
  name: Webshop
import:
  diagrams:
    - diagram_v1.json
    - diagram_v2.json
export:
  profiles:
    - filename: output/cases.csv
      exporter: CsvCases
    - filename: output/report.md
      exporter: Markdown
"#;
        let plan: Plan = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(plan.meta.unwrap().name.as_deref(), Some("Webshop"));
        assert_eq!(plan.import.diagrams.len(), 2);
        assert_eq!(plan.export.profiles[1].exporter, ExportFileType::Markdown);
    }

    #[test]
    fn test_skeleton_serializes() {
        let yaml = serde_yaml::to_string(&Plan::skeleton()).unwrap();
        assert!(yaml.contains("diagram_v1.json"));
        assert!(yaml.contains("CsvCases"));
    }
}
