use std::path::Path;

use clap::Args;

use djgen_core::{run_view_generation, ViewKind, ViewOptions};

use crate::config::read_project_config;

use super::{format_report, load_project_files, probe_shape, split_app_model, write_outputs};

#[derive(Args)]
pub struct ViewArgs {
    /// App name and model name in the form app:ModelName
    pub app_model: String,

    /// Create a generic ListView for the model
    #[arg(long)]
    pub list: bool,

    /// Create a generic DetailView for the model
    #[arg(long)]
    pub detail: bool,

    /// Create a generic CreateView for the model
    #[arg(long)]
    pub create: bool,

    /// Create a generic UpdateView for the model
    #[arg(long)]
    pub update: bool,

    /// Create a generic DeleteView for the model
    #[arg(long)]
    pub delete: bool,

    /// paginate_by property for the list view
    #[arg(long, default_value_t = 5)]
    pub paginate: u32,

    /// slug_field property for the detail view
    #[arg(long, default_value = "slug")]
    pub slug_field: String,

    /// success_url property for the delete view
    #[arg(long, default_value = "'/'")]
    pub delete_success_url: String,

    /// Model file stem inside a models package (defaults to the model name)
    #[arg(long)]
    pub model: Option<String>,

    /// View file stem inside a views package (defaults to the model name)
    #[arg(long)]
    pub view: Option<String>,

    /// Output format: human (default) or json
    #[arg(long, default_value = "human")]
    pub format: String,
}

impl ViewArgs {
    fn kinds(&self) -> Vec<ViewKind> {
        let flags = [
            (self.list, ViewKind::List),
            (self.detail, ViewKind::Detail),
            (self.create, ViewKind::Create),
            (self.update, ViewKind::Update),
            (self.delete, ViewKind::Delete),
        ];
        flags
            .into_iter()
            .filter_map(|(on, kind)| on.then_some(kind))
            .collect()
    }
}

pub fn run(args: &ViewArgs) -> Result<(String, bool), String> {
    let (app, model) = split_app_model(&args.app_model)?;

    let kinds = args.kinds();
    if kinds.is_empty() {
        return Err(
            "no view kinds requested; pass at least one of --list --detail --create --update --delete"
                .to_string(),
        );
    }

    let config = read_project_config(Path::new("."));
    let shape = probe_shape(&config, &app);
    let files = load_project_files(&shape, &app)?;

    let opts = ViewOptions {
        app,
        model,
        kinds,
        paginate_by: args.paginate,
        slug_field: args.slug_field.clone(),
        delete_success_url: args.delete_success_url.clone(),
        model_file: args.model.as_ref().map(|s| s.to_lowercase()),
        view_file: args.view.as_ref().map(|s| s.to_lowercase()),
    };

    let run = run_view_generation(&opts, &shape, &files).map_err(|e| e.to_string())?;
    write_outputs(&run)?;

    let output = format_report(&run, &args.format)?;
    Ok((output, run.report.success))
}
