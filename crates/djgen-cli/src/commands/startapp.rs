use std::fs;
use std::path::Path;

use clap::Args;

use djgen_core::scaffold::{default_app_tree, plan_tree};

use crate::config::read_project_config;

#[derive(Args)]
pub struct StartappArgs {
    /// Name of the app to scaffold
    pub app: String,
}

pub fn run(args: &StartappArgs) -> Result<String, String> {
    let app = args.app.to_lowercase();
    let config = read_project_config(Path::new("."));
    let apps_root = config.apps_root();

    let tree = default_app_tree().map_err(|e| e.to_string())?;
    let plan = plan_tree(&tree, &apps_root, &app).map_err(|e| e.to_string())?;

    let mut created = 0usize;
    for dir in &plan.dirs {
        fs::create_dir_all(dir).map_err(|e| format!("failed to create {}: {e}", dir.display()))?;
    }
    for (path, content) in &plan.files {
        if path.exists() {
            continue;
        }
        fs::write(path, content)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        created += 1;
    }

    Ok(format!(
        "Scaffolded app \"{app}\" under {} ({} directories, {created} new files).",
        apps_root.display(),
        plan.dirs.len()
    ))
}
