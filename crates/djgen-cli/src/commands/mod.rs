pub mod model;
pub mod startapp;
pub mod view;

use std::fs;

use djgen_core::{GenRun, Outcome, ProjectFiles, ProjectShape};

use crate::config::ProjectConfig;

/// Split the `app:ModelName` argument.
pub fn split_app_model(arg: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = arg.split(':').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(format!(
            "first arg must be app name and model name in the form app:ModelName, got \"{arg}\""
        ));
    }
    Ok((parts[0].to_lowercase(), parts[1].to_string()))
}

/// Probe the on-disk layout once; the core never touches the filesystem.
pub fn probe_shape(config: &ProjectConfig, app: &str) -> ProjectShape {
    let apps_root = config.apps_root();
    let app_dir = apps_root.join(app);
    ProjectShape {
        models_is_package: app_dir.join("models").is_dir(),
        views_is_package: app_dir.join("views").is_dir(),
        apps_root,
        templates_root: config.templates_root(),
    }
}

/// Load the app's Python sources and HTML templates into the in-memory
/// snapshot the orchestrator works on.
pub fn load_project_files(shape: &ProjectShape, app: &str) -> Result<ProjectFiles, String> {
    let mut files = ProjectFiles::new();
    let py_pattern = shape.apps_root.join(app).join("**").join("*.py");
    let html_pattern = shape.templates_root.join(app).join("**").join("*.html");

    for pattern in [py_pattern, html_pattern] {
        let pattern_str = pattern.to_string_lossy().replace('\\', "/");
        let entries =
            glob::glob(&pattern_str).map_err(|e| format!("invalid glob pattern: {e}"))?;
        for entry in entries {
            let path = entry.map_err(|e| format!("glob error: {e}"))?;
            let content = fs::read_to_string(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            files.insert(path, content);
        }
    }

    Ok(files)
}

/// Write the run's outputs, creating parent directories as needed.
pub fn write_outputs(run: &GenRun) -> Result<(), String> {
    for (path, content) in &run.writes {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        fs::write(path, content).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    }
    Ok(())
}

fn outcome_word(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Inserted => "inserted",
        Outcome::SkippedDuplicate => "skipped-duplicate",
        Outcome::FailedAnchor => "failed-anchor",
        Outcome::Created => "created",
        Outcome::SkippedExisting => "skipped-existing",
    }
}

/// Render the run report in the requested output format.
pub fn format_report(run: &GenRun, format: &str) -> Result<String, String> {
    let report = &run.report;
    let landed = report.count(Outcome::Inserted) + report.count(Outcome::Created);
    let skipped =
        report.count(Outcome::SkippedDuplicate) + report.count(Outcome::SkippedExisting);
    let failed = report.count(Outcome::FailedAnchor);

    if format == "json" {
        let output = serde_json::json!({
            "artifacts": report.artifacts,
            "warnings": report.warnings,
            "summary": {
                "inserted": landed,
                "skipped": skipped,
                "failed": failed,
                "success": report.success,
            }
        });
        return serde_json::to_string_pretty(&output)
            .map_err(|e| format!("JSON serialization error: {e}"));
    }

    let mut lines: Vec<String> = Vec::new();
    for artifact in &report.artifacts {
        lines.push(format!(
            "{:<18} {:<12} {} -> {}",
            outcome_word(artifact.outcome),
            serde_json::to_value(artifact.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            artifact.identifier,
            artifact.target
        ));
    }
    for warning in &report.warnings {
        lines.push(format!("Warning! {warning}"));
    }
    lines.push(format!("{landed} inserted, {skipped} skipped, {failed} failed."));
    Ok(lines.join("\n"))
}
