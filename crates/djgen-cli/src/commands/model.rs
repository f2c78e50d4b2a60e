use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use djgen_core::{generate_model, ModelOptions, TypeRegistry};

use crate::config::read_project_config;

use super::{format_report, load_project_files, probe_shape, split_app_model, write_outputs};

#[derive(Args)]
pub struct ModelArgs {
    /// App name and model name in the form app:ModelName
    pub app_model: String,

    /// Field specs, e.g. title:char:blank,max_length=255
    pub fields: Vec<String>,

    /// Generate a save() stub on the model
    #[arg(long)]
    pub def_save: bool,

    /// Model file stem inside a models package (defaults to the model name)
    #[arg(long)]
    pub model: Option<String>,

    /// JSON file extending/overriding the built-in field-type registry
    #[arg(long)]
    pub types: Option<PathBuf>,

    /// Output format: human (default) or json
    #[arg(long, default_value = "human")]
    pub format: String,
}

pub fn run(args: &ModelArgs) -> Result<(String, bool), String> {
    let (app, model) = split_app_model(&args.app_model)?;

    let mut registry = TypeRegistry::builtin();
    if let Some(ref path) = args.types {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        registry.merge_json(&content).map_err(|e| e.to_string())?;
    }

    let config = read_project_config(Path::new("."));
    let shape = probe_shape(&config, &app);
    let files = load_project_files(&shape, &app)?;

    let opts = ModelOptions {
        app,
        model,
        fields: args.fields.clone(),
        def_save: args.def_save,
        model_file: args.model.as_ref().map(|s| s.to_lowercase()),
    };

    let run = generate_model(&opts, &shape, &files, &registry).map_err(|e| e.to_string())?;
    write_outputs(&run)?;

    let output = format_report(&run, &args.format)?;
    Ok((output, run.report.success))
}
