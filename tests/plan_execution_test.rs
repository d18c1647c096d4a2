use std::fs;

use triage::plan_execution;
use triage::store::ProjectStore;

const DIAGRAM_V1: &str = r#"{
    "applicationName": "Webshop",
    "states": {
        "initial": {"actions": ["go"], "transitions": {"go": "state2"}},
        "state2": {"actions": [], "transitions": {}}
    },
    "metadata": {"generated": "2024-03-01T10:00:00Z"}
}"#;

const DIAGRAM_V2: &str = r#"{
    "applicationName": "Webshop",
    "states": {
        "initial": {"actions": ["go"], "transitions": {"go": "state2"}},
        "state2": {"actions": ["pay"], "transitions": {"pay": "state3"}},
        "state3": {"description": "Payment result", "actions": [], "transitions": {}}
    },
    "metadata": {"generated": "2024-03-02T10:00:00Z"}
}"#;

const PLAN: &str = r#"
meta:
  name: Webshop
import:
  diagrams:
    - diagram_v2.json
    - diagram_v1.json
export:
  profiles:
    - filename: output/cases.csv
      exporter: CsvCases
    - filename: output/report.md
      exporter: Markdown
    - filename: output/project.json
      exporter: Json
"#;

#[test]
fn test_plan_run_generates_scored_drafts_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("diagram_v1.json"), DIAGRAM_V1).unwrap();
    fs::write(dir.path().join("diagram_v2.json"), DIAGRAM_V2).unwrap();
    let plan_path = dir.path().join("plan.yaml");
    // the plan lists the files newest-first on purpose; execution orders
    // snapshots by metadata.generated
    fs::write(&plan_path, PLAN).unwrap();

    plan_execution::execute_plan(plan_path.to_str().unwrap().to_string(), false).unwrap();

    let csv = fs::read_to_string(dir.path().join("output/cases.csv")).unwrap();
    let report = fs::read_to_string(dir.path().join("output/report.md")).unwrap();
    let project: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("output/project.json")).unwrap())
            .unwrap();

    let cases = project["testCases"].as_array().unwrap();
    assert_eq!(cases.len(), 2);

    let added = cases
        .iter()
        .find(|c| c["changeType"] == "new")
        .expect("draft for the added state");
    assert_eq!(added["stateId"], "state3");
    assert_eq!(added["testName"], "Payment result");
    assert_eq!(added["scores"]["risk"], 9);
    assert_eq!(added["scores"]["value"], 15);
    assert_eq!(added["scores"]["total"], 34);
    assert_eq!(added["recommendation"], "MAYBE");

    let modified = cases
        .iter()
        .find(|c| c["changeType"] == "modified-behavior")
        .expect("draft for the re-pointed state");
    assert_eq!(modified["stateId"], "state2");
    assert_eq!(modified["scores"]["value"], 20);
    assert_eq!(modified["scores"]["history"], 2);

    let inventory = project["existingFunctionality"].as_array().unwrap();
    assert_eq!(inventory.len(), 3);

    assert!(csv.lines().next().unwrap().starts_with("id,testName"));
    assert_eq!(csv.lines().count(), 3);
    assert!(report.contains("# Test automation triage: Webshop"));
    assert!(report.contains("| Payment result |"));
}

#[test]
fn test_invalid_diagram_blocks_exports() {
    let dir = tempfile::tempdir().unwrap();
    let broken = r#"{
        "applicationName": "Webshop",
        "states": {
            "initial": {"actions": ["go"], "transitions": {"go": "nowhere"}}
        }
    }"#;
    fs::write(dir.path().join("diagram_v1.json"), broken).unwrap();
    let plan_path = dir.path().join("plan.yaml");
    fs::write(
        &plan_path,
        r#"
import:
  diagrams:
    - diagram_v1.json
export:
  profiles:
    - filename: output/cases.csv
      exporter: CsvCases
"#,
    )
    .unwrap();

    plan_execution::execute_plan(plan_path.to_str().unwrap().to_string(), false).unwrap();
    assert!(!dir.path().join("output/cases.csv").exists());
}

#[test]
fn test_import_snapshot_diffs_against_stored_version() {
    let dir = tempfile::tempdir().unwrap();
    let store_root = dir.path().join("store");
    let store_str = store_root.to_str().unwrap();
    let v1_path = dir.path().join("v1.json");
    let v2_path = dir.path().join("v2.json");
    fs::write(&v1_path, DIAGRAM_V1).unwrap();
    fs::write(&v2_path, DIAGRAM_V2).unwrap();

    // first import stores the version but has nothing to diff against
    plan_execution::import_snapshot(store_str, v1_path.to_str().unwrap()).unwrap();
    let store = ProjectStore::new(&store_root);
    let project = store.load_project().unwrap().unwrap();
    assert!(project.test_cases.is_empty());
    assert_eq!(project.existing_functionality.len(), 2);

    // second import diffs against the first
    plan_execution::import_snapshot(store_str, v2_path.to_str().unwrap()).unwrap();
    let project = store.load_project().unwrap().unwrap();
    assert_eq!(project.test_cases.len(), 2);
    assert_eq!(project.existing_functionality.len(), 3);
    assert_eq!(store.load_history("Webshop").unwrap().len(), 2);

    let added = project
        .test_cases
        .iter()
        .find(|c| c.state_id.as_deref() == Some("state3"))
        .unwrap();
    assert_eq!(added.scores.total, 34);
}
