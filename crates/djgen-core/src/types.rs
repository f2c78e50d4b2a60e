use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Fatal input errors
// ---------------------------------------------------------------------------

/// Errors that abort a run before any file is written.
///
/// Recoverable conditions (anchor not found, construct already present) are
/// not errors — they are [`Outcome`] values accumulated in the [`RunReport`].
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("malformed field spec \"{0}\": expected name:type[:arg,key=value,...]")]
    MalformedField(String),

    #[error("unknown field type \"{0}\"")]
    UnknownType(String),

    #[error("required source file not found: {0}")]
    MissingSource(PathBuf),

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Field specifications
// ---------------------------------------------------------------------------

/// One parsed field descriptor: `title:char:blank,max_length=255`.
///
/// `args` is insertion-ordered: registry defaults first (in declared order),
/// then the synthesized `verbose_name`, then user keys in encounter order.
/// A key mapping to an empty string is a positional flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub type_key: String,
    pub args: IndexMap<String, String>,
}

// ---------------------------------------------------------------------------
// Generated artifacts and per-run reporting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Model,
    View,
    Route,
    Form,
    ModelMethod,
    Template,
}

/// One generated fragment or file destined for insertion/creation.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    /// Unique name used for the idempotency check (class name, route name,
    /// method name).
    pub identifier: String,
    pub body: String,
    pub target: PathBuf,
    /// Import statements the fragment requires in its target file.
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Fragment spliced into an existing file.
    Inserted,
    /// Identifier already present; file untouched.
    SkippedDuplicate,
    /// Required anchor (class body, route aggregate) not found; file untouched.
    FailedAnchor,
    /// Whole-file artifact written to a new destination.
    Created,
    /// Whole-file artifact skipped because the destination already exists.
    SkippedExisting,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactReport {
    pub identifier: String,
    pub kind: ArtifactKind,
    pub target: String,
    pub outcome: Outcome,
}

/// Final per-run outcome listing.
///
/// `success` is false iff the run inserted or created nothing — a run where
/// every artifact was skipped or failed achieved nothing and is reported as a
/// failure even though no error was raised.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub artifacts: Vec<ArtifactReport>,
    pub warnings: Vec<String>,
    pub success: bool,
}

impl RunReport {
    pub fn push(&mut self, artifact: &GeneratedArtifact, outcome: Outcome) {
        self.artifacts.push(ArtifactReport {
            identifier: artifact.identifier.clone(),
            kind: artifact.kind,
            target: artifact.target.to_string_lossy().to_string(),
            outcome,
        });
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.outcome == outcome)
            .count()
    }

    /// A run succeeds when at least one artifact landed.
    pub fn finalize(&mut self) {
        self.success = self.count(Outcome::Inserted) + self.count(Outcome::Created) > 0;
    }
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// Shape of the target project on disk, probed once by the front end.
#[derive(Debug, Clone)]
pub struct ProjectShape {
    /// Root directory holding the Django apps (e.g. `server/apps`).
    pub apps_root: PathBuf,
    /// Root directory holding the HTML templates (e.g. `server/templates`).
    pub templates_root: PathBuf,
    /// True when `<app>/models` is a package directory rather than `models.py`.
    pub models_is_package: bool,
    /// True when `<app>/views` is a package directory rather than `views.py`.
    pub views_is_package: bool,
}

/// Everything a single run needs, built once and threaded through parsing,
/// orchestration and planning as an argument.
#[derive(Debug, Clone)]
pub struct GenContext {
    pub app_name: String,
    pub model_name: String,
    pub paginate_by: u32,
    pub slug_field: String,
    pub delete_success_url: String,
    /// True when the model exposes a `slug` field; switches detail routes and
    /// `get_absolute_url` from pk-based to slug-based addressing.
    pub is_slug: bool,
    /// Field names of the target model, for template contexts.
    pub model_fields: Vec<String>,
    pub shape: ProjectShape,
}

impl GenContext {
    pub fn lower_model(&self) -> String {
        self.model_name.to_lowercase()
    }
}
