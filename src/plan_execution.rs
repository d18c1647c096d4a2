//! Plan execution: load diagram snapshots, validate, diff consecutive
//! versions, generate scored drafts and inventory, render exports. Also the
//! incremental single-snapshot import flow backed by the store.

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::channel;
use tracing::{debug, error, info, warn};

use anyhow::{anyhow, Result};

use crate::diagram::StateDiagram;
use crate::diff;
use crate::generator;
use crate::model::Project;
use crate::plan::{ExportFileType, ExportProfileItem, Plan};
use crate::store::ProjectStore;
use crate::validation::{self, IssueLevel};

/// Loads a diagram snapshot from disk
fn load_diagram(file_path: &Path) -> Result<StateDiagram> {
    let content = std::fs::read_to_string(file_path)?;
    StateDiagram::from_json(&content)
        .map_err(|e| anyhow!("Error parsing diagram {}: {}", file_path.display(), e))
}

/// Loads all diagrams named by the plan and orders them chronologically.
fn load_diagrams(plan: &Plan, plan_file_path: &Path) -> Result<Vec<StateDiagram>> {
    let parent_dir = plan_file_path
        .parent()
        .ok_or_else(|| anyhow!("Plan file has no parent directory"))?;

    let mut diagrams = Vec::new();
    for file in &plan.import.diagrams {
        let import_file_path = parent_dir.join(file);
        info!("Importing diagram: {}", import_file_path.display());
        let diagram = load_diagram(&import_file_path)?;
        debug!("Loaded diagram: {}", diagram.stats());
        diagrams.push(diagram);
    }

    // RFC 3339 timestamps order lexicographically, which keeps the
    // (previous, current) pairs handed to the differ chronological.
    diagrams.sort_by(|a, b| a.metadata.generated.cmp(&b.metadata.generated));
    Ok(diagrams)
}

/// Validates a snapshot, logging every finding. Returns whether the
/// snapshot is structurally valid; advisory warnings never fail it.
fn validate_diagram(diagram: &StateDiagram) -> bool {
    let result = validation::validate(diagram);
    for issue in &result.warnings {
        match issue.level {
            IssueLevel::Error => warn!("{}", issue.message),
            IssueLevel::Warning => info!("{}", issue.message),
        }
    }
    if !result.is_valid {
        warn!(
            "Identified {} validation error(s) in diagram '{}'",
            result.errors().count(),
            diagram.application_name
        );
    }
    result.is_valid
}

/// Creates a new project with metadata from the plan
fn create_project_from_plan(plan: &Plan) -> Project {
    let name = match &plan.meta {
        Some(meta) => match &meta.name {
            Some(name) => name.clone(),
            _ => "Unnamed Project".to_string(),
        },
        _ => "Unnamed Project".to_string(),
    };
    Project::new(name)
}

/// Builds the project from the ordered snapshots: inventory from the
/// latest, drafts from each consecutive diff.
fn build_project(plan: &Plan, diagrams: &[StateDiagram]) -> Project {
    let mut project = create_project_from_plan(plan);

    if let Some(latest) = diagrams.last() {
        project.existing_functionality = generator::generate_existing_functionality(latest);
    }

    for pair in diagrams.windows(2) {
        let result = diff::diff(&pair[0], &pair[1]);
        info!(
            "Diff {} -> {}: {} added, {} removed, {} modified, {} unchanged",
            pair[0].metadata.generated,
            pair[1].metadata.generated,
            result.added.len(),
            result.removed.len(),
            result.modified.len(),
            result.unchanged.len()
        );
        for case in generator::generate_test_cases(&result, &pair[1]) {
            project.set_test_case(case);
        }
    }

    info!("Project built: {}", project.stats());
    project
}

/// Exports the project to the specified file using the appropriate renderer
fn export_project(
    project: &Project,
    profile: &ExportProfileItem,
    plan_file_path: &Path,
) -> Result<()> {
    info!(
        "Starting export to file: {} using exporter {:?}",
        profile.filename, profile.exporter
    );

    let result = match profile.exporter {
        ExportFileType::CsvCases => crate::export::to_csv_cases::render(project),
        ExportFileType::Json => crate::export::to_json::render(project),
        ExportFileType::Markdown => crate::export::to_markdown::render(project),
    };

    let parent_dir = plan_file_path
        .parent()
        .ok_or_else(|| anyhow!("Plan file has no parent directory"))?;
    let output_path = parent_dir.join(&profile.filename);
    let output_str = output_path.to_str().ok_or_else(|| {
        anyhow!(
            "Export file path contains invalid UTF-8: {}",
            output_path.display()
        )
    })?;

    match result {
        Ok(output) => {
            if let Err(e) = crate::common::write_string_to_file(output_str, &output) {
                error!("Failed to write to file {}: {}", profile.filename, e);
            }
        }
        Err(e) => {
            error!("Failed to export file {}: {}", profile.filename, e);
        }
    }

    Ok(())
}

/// Executes a single triage plan
fn run_plan(plan: Plan, plan_file_path: &Path) -> Result<()> {
    let diagrams = load_diagrams(&plan, plan_file_path)?;
    if diagrams.is_empty() {
        warn!("Plan names no diagrams, nothing to do");
        return Ok(());
    }

    let mut all_valid = true;
    for diagram in &diagrams {
        if !validate_diagram(diagram) {
            all_valid = false;
        }
    }
    if !all_valid {
        warn!("Not rendering exports");
        return Ok(());
    }
    info!("Diagram validation: ok - rendering exports");

    let project = build_project(&plan, &diagrams);

    for profile in &plan.export.profiles {
        if let Err(e) = export_project(&project, profile, plan_file_path) {
            error!("Failed to export project: {}", e);
        }
    }

    Ok(())
}

/// Main function to execute a plan, with optional file watching
pub fn execute_plan(plan: String, watch: bool) -> Result<()> {
    info!("Executing plan {}", plan);

    let plan_file_path = std::path::Path::new(&plan);
    let path_content = std::fs::read_to_string(plan_file_path)?;
    let plan: Plan = serde_yaml::from_str(&path_content)?;

    debug!("Executing plan: {:?}", plan);
    run_plan(plan.clone(), plan_file_path)?;

    if watch {
        watch_for_changes(plan, plan_file_path)?;
    }

    Ok(())
}

/// Sets up file watching for input files to re-run the plan on changes
fn watch_for_changes(plan: Plan, plan_file_path: &Path) -> Result<()> {
    info!("Watching for changes");
    let files: Vec<String> = plan.import.diagrams.clone();

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
    for file in &files {
        let parent_dir = plan_file_path
            .parent()
            .ok_or_else(|| anyhow!("Plan file has no parent directory"))?;
        let path = parent_dir.join(file);
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if let Ok(event) = event {
                    if let EventKind::Modify(_) = event.kind {
                        debug!("File modified {:?}", event.paths);
                        info!("Change detected, re-executing plan");
                        run_plan(plan.clone(), plan_file_path)?;
                    }
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        }
    }
}

/// Imports one new snapshot into the store: validate, diff against the
/// previously stored version for the same application, generate drafts and
/// refresh the inventory, save the project document.
pub fn import_snapshot(store_root: &str, diagram_path: &str) -> Result<()> {
    let diagram = load_diagram(Path::new(diagram_path))?;

    if !validate_diagram(&diagram) {
        return Err(anyhow!(
            "Diagram '{}' failed validation, not importing",
            diagram.application_name
        ));
    }

    let store = ProjectStore::new(store_root);
    let mut project = store
        .load_project()?
        .unwrap_or_else(|| Project::new(diagram.application_name.clone()));

    let previous = store.push_version(&diagram)?;
    match previous {
        Some(previous) => {
            let result = diff::diff(&previous, &diagram);
            let cases = generator::generate_test_cases(&result, &diagram);
            info!(
                "Imported new version of '{}': {} draft(s) generated",
                diagram.application_name,
                cases.len()
            );
            for case in cases {
                project.set_test_case(case);
            }
        }
        None => {
            info!(
                "First version of '{}' stored, no diff to generate from",
                diagram.application_name
            );
        }
    }
    project.existing_functionality = generator::generate_existing_functionality(&diagram);

    store.save_project(&project)?;
    Ok(())
}
