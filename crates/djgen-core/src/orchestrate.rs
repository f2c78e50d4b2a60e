//! Run orchestration: build the artifact list for a request, drive the
//! planner over an in-memory file snapshot, and collect the final report.
//!
//! The orchestrator never touches the filesystem — the front end loads the
//! snapshot, hands it in, and writes back whatever changed.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use minijinja::context;

use crate::extract::class_body_span;
use crate::fieldspec::{parse_fields, serialize_field};
use crate::imports::append_if_missing;
use crate::planner;
use crate::registry::TypeRegistry;
use crate::templates;
use crate::types::{
    ArtifactKind, GenContext, GenError, GeneratedArtifact, Outcome, ProjectShape, RunReport,
};
use crate::views::ViewKind;

static RE_FIELD_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s+(\w+)\s*=\s*models\.\w+").unwrap());

// ---------------------------------------------------------------------------
// In-memory project snapshot
// ---------------------------------------------------------------------------

/// The file contents a run may read or edit, keyed by project-relative path.
/// Absent keys mean the file does not exist on disk.
#[derive(Debug, Clone, Default)]
pub struct ProjectFiles {
    files: BTreeMap<PathBuf, String>,
}

impl ProjectFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Result of one orchestrated run: the report plus the files to write.
#[derive(Debug, Clone)]
pub struct GenRun {
    pub report: RunReport,
    pub writes: Vec<(PathBuf, String)>,
}

/// Tracks edits on top of the read-only snapshot. Each file is transformed in
/// memory through the ordered pipeline and compared against the original once
/// at the end, so unchanged files are never rewritten.
struct Workspace<'a> {
    files: &'a ProjectFiles,
    edited: BTreeMap<PathBuf, String>,
}

impl<'a> Workspace<'a> {
    fn new(files: &'a ProjectFiles) -> Self {
        Self {
            files,
            edited: BTreeMap::new(),
        }
    }

    fn current(&self, path: &Path) -> Option<&str> {
        self.edited
            .get(path)
            .map(String::as_str)
            .or_else(|| self.files.get(path))
    }

    fn set(&mut self, path: &Path, text: String) {
        self.edited.insert(path.to_path_buf(), text);
    }

    fn into_writes(self) -> Vec<(PathBuf, String)> {
        let Workspace { files, edited } = self;
        edited
            .into_iter()
            .filter(|(path, text)| files.get(path) != Some(text.as_str()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub app: String,
    pub model: String,
    pub kinds: Vec<ViewKind>,
    pub paginate_by: u32,
    pub slug_field: String,
    pub delete_success_url: String,
    /// Override for the model file stem inside a models package.
    pub model_file: Option<String>,
    /// Override for the view file stem inside a views package.
    pub view_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub app: String,
    pub model: String,
    pub fields: Vec<String>,
    pub def_save: bool,
    pub model_file: Option<String>,
}

// ---------------------------------------------------------------------------
// Path conventions
// ---------------------------------------------------------------------------

fn app_dir(shape: &ProjectShape, app: &str) -> PathBuf {
    shape.apps_root.join(app)
}

fn model_path(shape: &ProjectShape, app: &str, stem: &str) -> PathBuf {
    if shape.models_is_package {
        app_dir(shape, app).join("models").join(format!("{stem}.py"))
    } else {
        app_dir(shape, app).join("models.py")
    }
}

fn views_path(shape: &ProjectShape, app: &str, stem: &str) -> PathBuf {
    if shape.views_is_package {
        app_dir(shape, app).join("views").join(format!("{stem}.py"))
    } else {
        app_dir(shape, app).join("views.py")
    }
}

fn urls_path(shape: &ProjectShape, app: &str) -> PathBuf {
    app_dir(shape, app).join("urls.py")
}

fn form_path(shape: &ProjectShape, app: &str, lower: &str) -> PathBuf {
    app_dir(shape, app).join("forms").join(format!("{lower}.py"))
}

fn template_path(shape: &ProjectShape, app: &str, lower: &str, suffix: &str) -> PathBuf {
    shape
        .templates_root
        .join(app)
        .join(format!("{lower}{suffix}.html"))
}

// ---------------------------------------------------------------------------
// View generation
// ---------------------------------------------------------------------------

/// Generate view classes, routes, form, model method and templates for one
/// model, merging into the existing sources idempotently.
pub fn run_view_generation(
    opts: &ViewOptions,
    shape: &ProjectShape,
    files: &ProjectFiles,
) -> Result<GenRun, GenError> {
    let app = opts.app.to_lowercase();
    let lower = opts.model.to_lowercase();
    let model_stem = opts.model_file.clone().unwrap_or_else(|| lower.clone());
    let view_stem = opts.view_file.clone().unwrap_or_else(|| lower.clone());

    let model_file = model_path(shape, &app, &model_stem);
    let model_text = files
        .get(&model_file)
        .ok_or_else(|| GenError::MissingSource(model_file.clone()))?;

    let model_fields = model_field_names(model_text, &opts.model);
    let is_slug = model_fields.iter().any(|f| f == "slug");

    let urls_file = urls_path(shape, &app);
    let ctx = GenContext {
        app_name: app.clone(),
        model_name: opts.model.clone(),
        paginate_by: opts.paginate_by,
        slug_field: opts.slug_field.clone(),
        delete_success_url: resolve_delete_success_url(opts, &app, &lower, files, &urls_file),
        is_slug,
        model_fields,
        shape: shape.clone(),
    };

    let views_file = views_path(shape, &app, &view_stem);
    let model_module = if shape.models_is_package {
        format!(".{model_stem}")
    } else {
        String::new()
    };
    let model_import = format!(
        "from apps.{app}.models{model_module} import {}",
        ctx.model_name
    );
    let form_import = format!("from apps.{app}.forms.{lower} import {}Form", ctx.model_name);
    let model_python_path = format!("apps.{app}.models{model_module}");

    let kinds: Vec<ViewKind> = ViewKind::ALL
        .into_iter()
        .filter(|k| opts.kinds.contains(k))
        .collect();

    let mut artifacts: Vec<GeneratedArtifact> = Vec::new();

    for kind in &kinds {
        let mut imports = vec![
            format!("from django.views.generic import {}", kind.generic_class()),
            model_import.clone(),
        ];
        if kind.needs_form() {
            imports.push(form_import.clone());
        }
        if *kind == ViewKind::Delete && ctx.delete_success_url.starts_with("reverse(") {
            imports.push("from django.core.urlresolvers import reverse".to_string());
        }
        artifacts.push(GeneratedArtifact {
            kind: ArtifactKind::View,
            identifier: kind.user_class(&ctx.model_name),
            body: templates::render(
                templates::view_class_template(*kind),
                kind.view_context(&ctx),
            )?,
            target: views_file.clone(),
            imports,
        });

        artifacts.push(GeneratedArtifact {
            kind: ArtifactKind::Route,
            identifier: kind.route_name(&ctx),
            body: kind.url_entry(&ctx),
            target: urls_file.clone(),
            imports: vec![format!(
                "from apps.{app}.views import {}",
                kind.user_class(&ctx.model_name)
            )],
        });
    }

    if kinds.iter().any(|k| k.needs_form()) {
        artifacts.push(GeneratedArtifact {
            kind: ArtifactKind::Form,
            identifier: format!("{}Form", ctx.model_name),
            body: templates::render(
                templates::FORM_MODULE,
                context! {
                    model_python_path => model_python_path.clone(),
                    model_name => ctx.model_name.clone(),
                },
            )?,
            target: form_path(shape, &app, &lower),
            imports: Vec::new(),
        });
    }

    if kinds.contains(&ViewKind::Detail) {
        let arg = if ctx.is_slug { "self.slug" } else { "self.pk" };
        artifacts.push(GeneratedArtifact {
            kind: ArtifactKind::ModelMethod,
            identifier: "get_absolute_url".to_string(),
            body: format!(
                "\n\n    def get_absolute_url(self):\n        return reverse('{app}:{lower}.detail', args=({arg},))"
            ),
            target: model_file.clone(),
            imports: vec!["from django.core.urlresolvers import reverse".to_string()],
        });
    }

    let mut template_suffixes: Vec<&'static str> = Vec::new();
    for kind in &kinds {
        let (Some(suffix), Some(body)) = (kind.template_suffix(), kind.template_body(&ctx)) else {
            continue;
        };
        if template_suffixes.contains(&suffix) {
            continue;
        }
        template_suffixes.push(suffix);
        artifacts.push(GeneratedArtifact {
            kind: ArtifactKind::Template,
            identifier: format!("{lower}{suffix}.html"),
            body,
            target: template_path(shape, &app, &lower, suffix),
            imports: Vec::new(),
        });
    }

    // Seed a missing views file with its module header so the first view
    // appends below it and later import merges have an anchor.
    let mut workspace = Workspace::new(files);
    if !kinds.is_empty() && workspace.current(&views_file).is_none() {
        let header = templates::render(
            templates::VIEWS_HEADER,
            context! {
                app_name => app.clone(),
                model_module => model_module.clone(),
                model_name => ctx.model_name.clone(),
            },
        )?;
        workspace.set(&views_file, header);
    }

    let mut report = RunReport::default();
    for artifact in &artifacts {
        let had_file = workspace.current(&artifact.target).is_some();
        let result = planner::apply(artifact, workspace.current(&artifact.target), &ctx);
        // A missed anchor on a missing file yields no content; staging it
        // would materialize an empty file.
        if had_file || matches!(result.outcome, Outcome::Inserted | Outcome::Created) {
            workspace.set(&artifact.target, result.text);
        }
        report.push(artifact, result.outcome);
        report.warnings.extend(result.warnings);
    }

    // Package re-exports after the structural work, so they observe the
    // edited texts.
    if shape.views_is_package {
        let init = app_dir(shape, &app).join("views").join("__init__.py");
        let classes: Vec<String> = kinds.iter().map(|k| k.user_class(&ctx.model_name)).collect();
        if !classes.is_empty() {
            let line = format!(
                "from apps.{app}.views.{view_stem} import {}",
                classes.join(", ")
            );
            merge_init_line(&mut workspace, &init, &line, &mut report);
        }
    }
    if kinds.iter().any(|k| k.needs_form()) {
        let init = app_dir(shape, &app).join("forms").join("__init__.py");
        merge_init_line(&mut workspace, &init, &form_import, &mut report);
    }

    report.finalize();
    Ok(GenRun {
        report,
        writes: workspace.into_writes(),
    })
}

/// Delete views land on the list view when one exists (requested in this run
/// or already routed); otherwise the caller-supplied URL is used as-is.
fn resolve_delete_success_url(
    opts: &ViewOptions,
    app: &str,
    lower: &str,
    files: &ProjectFiles,
    urls_file: &Path,
) -> String {
    let list_requested = opts.kinds.contains(&ViewKind::List);
    let list_routed = files
        .get(urls_file)
        .is_some_and(|t| t.contains(&format!("{lower}.list")));
    if list_requested || list_routed {
        format!("reverse('{app}:{lower}.list')")
    } else {
        opts.delete_success_url.clone()
    }
}

/// Field names declared on the model class, in declaration order. Falls back
/// to a whole-file scan when the class itself cannot be located.
pub fn model_field_names(source: &str, model_name: &str) -> Vec<String> {
    let scope = class_body_span(source, model_name)
        .map(|s| s.text(source))
        .unwrap_or(source);
    RE_FIELD_DECL
        .captures_iter(scope)
        .map(|c| c[1].to_string())
        .collect()
}

/// Append a re-export line to a package `__init__.py` when it is not already
/// present; a missing file is a warning, not a failure.
fn merge_init_line(
    workspace: &mut Workspace<'_>,
    init: &Path,
    line: &str,
    report: &mut RunReport,
) {
    match workspace.current(init) {
        Some(text) => {
            if let Some(updated) = append_if_missing(text, line) {
                workspace.set(init, updated);
            }
        }
        None => report.warnings.push(format!(
            "{} not found; add manually: {line}",
            init.display()
        )),
    }
}

// ---------------------------------------------------------------------------
// Model generation
// ---------------------------------------------------------------------------

/// Generate a model module from raw field tokens and wire up the package
/// re-exports. Fatal input errors (malformed token, unknown type) surface
/// before anything is staged for writing.
pub fn generate_model(
    opts: &ModelOptions,
    shape: &ProjectShape,
    files: &ProjectFiles,
    registry: &TypeRegistry,
) -> Result<GenRun, GenError> {
    let app = opts.app.to_lowercase();
    let lower = opts.model.to_lowercase();
    let stem = opts.model_file.clone().unwrap_or_else(|| lower.clone());

    let specs = parse_fields(&opts.fields, registry)?;
    let declarations = specs
        .iter()
        .map(|s| serialize_field(s, registry).map(|line| format!("    {line}")))
        .collect::<Result<Vec<_>, _>>()?
        .join("\n");

    let str_field = specs
        .iter()
        .find(|s| s.name == "name" || s.name == "title")
        .map(|s| s.name.clone());

    let fragment = templates::render(
        templates::MODEL_CLASS,
        context! {
            model_name => opts.model.clone(),
            declarations => declarations,
            str_field => str_field,
            def_save => opts.def_save,
        },
    )?;

    let target = model_path(shape, &app, &stem);
    // New file gets the full module; an existing one gets the class appended
    // (plus the models import, merged if absent).
    let (body, imports) = if files.contains(&target) {
        (
            fragment,
            vec!["from django.db import models".to_string()],
        )
    } else {
        (format!("{}{}", templates::MODEL_HEADER, fragment), Vec::new())
    };
    let artifact = GeneratedArtifact {
        kind: ArtifactKind::Model,
        identifier: opts.model.clone(),
        body,
        target: target.clone(),
        imports,
    };

    let ctx = GenContext {
        app_name: app.clone(),
        model_name: opts.model.clone(),
        paginate_by: 0,
        slug_field: String::new(),
        delete_success_url: String::new(),
        is_slug: specs.iter().any(|s| s.name == "slug"),
        model_fields: specs.iter().map(|s| s.name.clone()).collect(),
        shape: shape.clone(),
    };

    let mut workspace = Workspace::new(files);
    let mut report = RunReport::default();

    let result = planner::apply(&artifact, workspace.current(&target), &ctx);
    workspace.set(&target, result.text);
    report.push(&artifact, result.outcome);
    report.warnings.extend(result.warnings);

    if shape.models_is_package {
        let init = app_dir(shape, &app).join("models").join("__init__.py");
        let line = format!("from apps.{app}.models.{stem} import *");
        merge_init_line(&mut workspace, &init, &line, &mut report);
    }

    // Apps with an admin package also get the model registered there.
    let admin_init = app_dir(shape, &app).join("admin").join("__init__.py");
    if workspace.current(&admin_init).is_some() {
        let admin_target = app_dir(shape, &app).join("admin").join(format!("{stem}.py"));
        if workspace.current(&admin_target).is_none() {
            let model_module = if shape.models_is_package {
                format!(".{stem}")
            } else {
                String::new()
            };
            let admin_artifact = GeneratedArtifact {
                kind: ArtifactKind::Model,
                identifier: format!("{}Admin", opts.model),
                body: templates::render(
                    templates::ADMIN_MODULE,
                    context! {
                        model_python_path => format!("apps.{app}.models{model_module}"),
                        model_name => opts.model.clone(),
                    },
                )?,
                target: admin_target.clone(),
                imports: Vec::new(),
            };
            let result = planner::apply(&admin_artifact, None, &ctx);
            workspace.set(&admin_target, result.text);
            report.push(&admin_artifact, result.outcome);
        }
        let line = format!("from apps.{app}.admin.{stem} import *");
        merge_init_line(&mut workspace, &admin_init, &line, &mut report);
    }

    report.finalize();
    Ok(GenRun {
        report,
        writes: workspace.into_writes(),
    })
}
