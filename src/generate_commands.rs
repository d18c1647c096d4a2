use include_dir::{include_dir, Dir};
use std::fs;
use std::path::Path;
use tracing::{error, info};

static SAMPLE_DIR_CHECKOUT_FLOW: Dir = include_dir!("sample/checkout_flow");

pub fn generate_template(exporter: String) {
    info!("Generating exporter template: {}", exporter);
    match exporter.as_str() {
        "markdown" => {
            println!("{}", crate::export::to_markdown::get_template());
        }
        _ => {
            error!("Unsupported exporter: {} - use markdown", exporter);
        }
    }
}

pub fn generate_sample(sample: String, dir: String) {
    info!("Generating sample project: {:?} in {:?}", sample, dir);
    let target_path = Path::new(&dir);
    if let Err(e) = fs::create_dir_all(target_path) {
        error!("Failed to create target directory: {:?}", e);
        return;
    }

    fn write_dir_contents(dir: &Dir, target_path: &Path) {
        for file in dir.files() {
            let relative_path = match file.path().strip_prefix(dir.path()) {
                Ok(path) => path,
                Err(e) => {
                    error!(
                        "Failed to create relative path for {:?}: {}",
                        file.path(),
                        e
                    );
                    continue;
                }
            };
            let target_file = target_path.join(relative_path);
            if let Some(parent) = target_file.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    error!("Failed to create directory {:?}: {}", parent, e);
                    continue;
                }
            }
            match fs::write(&target_file, file.contents()) {
                Ok(_) => info!("Wrote {:?}", target_file),
                Err(e) => error!("Failed to write {:?}: {}", target_file, e),
            }
        }
        for subdir in dir.dirs() {
            write_dir_contents(subdir, target_path);
        }
    }

    match sample.as_str() {
        "checkout_flow" => write_dir_contents(&SAMPLE_DIR_CHECKOUT_FLOW, target_path),
        _ => {
            error!("Unsupported sample: {} - use checkout_flow", sample);
        }
    }
}
