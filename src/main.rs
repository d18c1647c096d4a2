use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use triage::diagram::StateDiagram;
use triage::model::Project;
use triage::plan::Plan;
use triage::scenario;
use triage::scoring;
use triage::store::ProjectStore;
use triage::{common, diff, generate_commands, plan_execution, validation};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a triage plan: import diagrams, diff, generate, export
    Run {
        #[clap(short, long)]
        plan: String,
        #[clap(short, long)]
        watch: bool,
    },
    /// Write a skeleton plan file
    Init {
        #[clap(short, long)]
        plan: String,
    },
    /// Validate one diagram snapshot and print the findings as JSON
    Validate { diagram: String },
    /// Diff two diagram snapshots (previous, then current) and print JSON
    Diff { previous: String, current: String },
    /// Import one new diagram version into the store and regenerate drafts
    Import {
        diagram: String,
        #[clap(short, long, default_value = ".triage")]
        store: String,
    },
    /// Import a pasted scenario file into the stored project
    Scenario {
        scenario: String,
        #[clap(short, long, default_value = ".triage")]
        store: String,
    },
    /// Print score breakdowns for stored test cases
    Explain {
        #[clap(short, long, default_value = ".triage")]
        store: String,
        #[clap(short, long)]
        id: Option<String>,
    },
    Generate {
        #[clap(subcommand)]
        command: GenerateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum GenerateCommands {
    Template { name: String },
    Sample { sample: String, dir: String },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Run { plan, watch } => {
            info!("Running plan: {}", plan);
            plan_execution::execute_plan(plan, watch)?;
        }
        Commands::Init { plan } => {
            info!("Initializing plan: {}", plan);
            let plan_file_path = plan;
            let plan = Plan::skeleton();
            let serialized_plan = serde_yaml::to_string(&plan)?;
            common::write_string_to_file(&plan_file_path, &serialized_plan)?;
        }
        Commands::Validate { diagram } => {
            let content = std::fs::read_to_string(&diagram)?;
            let diagram = StateDiagram::from_json(&content)?;
            let result = validation::validate(&diagram);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_valid {
                std::process::exit(1);
            }
        }
        Commands::Diff { previous, current } => {
            let previous = StateDiagram::from_json(&std::fs::read_to_string(&previous)?)?;
            let current = StateDiagram::from_json(&std::fs::read_to_string(&current)?)?;
            let result = diff::diff(&previous, &current);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Import { diagram, store } => {
            plan_execution::import_snapshot(&store, &diagram)?;
        }
        Commands::Scenario { scenario: file, store } => {
            let content = std::fs::read_to_string(&file)?;
            let parsed = scenario::parse_scenario(&content)?;
            let store = ProjectStore::new(&store);
            let mut project = store
                .load_project()?
                .unwrap_or_else(|| Project::new("Unnamed Project"));
            let id = parsed
                .scenario_id
                .clone()
                .map(|id| format!("sc-{}", id))
                .unwrap_or_else(|| format!("sc-{}", project.test_cases.len() + 1));
            let case = parsed.into_test_case(id);
            info!(
                "Imported scenario as '{}': total {} -> {}",
                case.id, case.scores.total, case.recommendation
            );
            project.set_test_case(case);
            store.save_project(&project)?;
        }
        Commands::Explain { store, id } => {
            let store = ProjectStore::new(&store);
            let Some(project) = store.load_project()? else {
                anyhow::bail!("No project document in store");
            };
            match id {
                Some(id) => {
                    let Some(case) = project.get_test_case(&id) else {
                        anyhow::bail!("No test case with id '{}'", id);
                    };
                    println!("{}", scoring::explain_score(case));
                }
                None => {
                    for case in &project.test_cases {
                        println!("{}\n", scoring::explain_score(case));
                    }
                }
            }
        }
        Commands::Generate { command } => match command {
            GenerateCommands::Template { name } => {
                info!("Generating template: {}", name);
                generate_commands::generate_template(name);
            }
            GenerateCommands::Sample { sample, dir } => {
                info!("Generating sample: {} in {}", sample, dir);
                generate_commands::generate_sample(sample, dir);
            }
        },
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .init();
}
