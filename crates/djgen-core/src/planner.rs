//! Insertion planning: decide whether a generated artifact is already present
//! and splice it into the right place when it is not.
//!
//! All decisions are per-artifact and recoverable; a missing anchor or an
//! already-present construct is an [`Outcome`], never an error. Import merging
//! always runs after the structural edit so the anchor positions other edits
//! rely on are unaffected.

use crate::extract::{
    aggregate_entry_indent, aggregate_span, class_body_span, class_methods, method_span,
};
use crate::imports::merge_imports;
use crate::types::{ArtifactKind, GenContext, GeneratedArtifact, Outcome};

/// Methods a generated model method is inserted after, when present; the last
/// one declared in the class wins.
const INSERT_AFTER_METHODS: [&str; 3] = ["__str__", "__unicode__", "save"];

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub text: String,
    pub outcome: Outcome,
    pub warnings: Vec<String>,
}

impl PlanResult {
    fn unchanged(text: &str, outcome: Outcome) -> Self {
        Self {
            text: text.to_string(),
            outcome,
            warnings: Vec::new(),
        }
    }
}

/// Apply one artifact to the current text of its target file.
///
/// `existing` is `None` when the target file does not exist yet; whole-file
/// kinds create it, structural kinds report a missed anchor.
pub fn apply(artifact: &GeneratedArtifact, existing: Option<&str>, ctx: &GenContext) -> PlanResult {
    match artifact.kind {
        ArtifactKind::Form | ArtifactKind::Template => apply_whole_file(artifact, existing),
        ArtifactKind::Model => apply_model_class(artifact, existing),
        ArtifactKind::View => apply_view(artifact, existing.unwrap_or_default()),
        ArtifactKind::Route => match existing {
            Some(text) => apply_route(artifact, text),
            None => missing_target(artifact),
        },
        ArtifactKind::ModelMethod => match existing {
            Some(text) => apply_model_method(artifact, text, ctx),
            None => missing_target(artifact),
        },
    }
}

fn missing_target(artifact: &GeneratedArtifact) -> PlanResult {
    PlanResult {
        text: String::new(),
        outcome: Outcome::FailedAnchor,
        warnings: vec![format!(
            "{} skipped: target file {} does not exist",
            artifact.identifier,
            artifact.target.display()
        )],
    }
}

/// Whole-file artifacts are created once and never overwritten.
fn apply_whole_file(artifact: &GeneratedArtifact, existing: Option<&str>) -> PlanResult {
    match existing {
        Some(text) => PlanResult::unchanged(text, Outcome::SkippedExisting),
        None => PlanResult {
            text: artifact.body.clone(),
            outcome: Outcome::Created,
            warnings: Vec::new(),
        },
    }
}

/// A model class is created as a whole module when the file is new, appended
/// when the file exists without the class, and skipped when it already
/// declares it. The duplicate check requires the `class` keyword so a model
/// named `Entry` is not shadowed by, say, an `EntryForm` reference.
fn apply_model_class(artifact: &GeneratedArtifact, existing: Option<&str>) -> PlanResult {
    let Some(text) = existing else {
        return PlanResult {
            text: artifact.body.clone(),
            outcome: Outcome::Created,
            warnings: Vec::new(),
        };
    };

    let declared = text.contains(&format!("class {}(", artifact.identifier))
        || text.contains(&format!("class {}:", artifact.identifier));
    if declared {
        return PlanResult::unchanged(text, Outcome::SkippedDuplicate);
    }

    let mut new_text = text.trim_end_matches('\n').to_string();
    new_text.push('\n');
    new_text.push_str(&artifact.body);
    finish_insert(artifact, new_text)
}

fn apply_view(artifact: &GeneratedArtifact, text: &str) -> PlanResult {
    if text.contains(&artifact.identifier) {
        return PlanResult::unchanged(text, Outcome::SkippedDuplicate);
    }

    let mut new_text = text.trim_end_matches('\n').to_string();
    new_text.push('\n');
    new_text.push_str(&artifact.body);
    finish_insert(artifact, new_text)
}

fn apply_route(artifact: &GeneratedArtifact, text: &str) -> PlanResult {
    if text.contains(&artifact.identifier) {
        return PlanResult::unchanged(text, Outcome::SkippedDuplicate);
    }

    let span = aggregate_span(text, "urlpatterns").or_else(|| aggregate_span(text, "patterns"));
    let Some(span) = span else {
        return PlanResult {
            text: text.to_string(),
            outcome: Outcome::FailedAnchor,
            warnings: vec![format!(
                "route aggregate not found in {}; {} not inserted",
                artifact.target.display(),
                artifact.identifier
            )],
        };
    };

    let indent = aggregate_entry_indent(text, span);
    let close = span.end - 1;
    let mut insertion = String::new();
    if !text[..close].ends_with('\n') {
        insertion.push('\n');
    }
    insertion.push_str(&indent);
    insertion.push_str(&artifact.body);
    insertion.push_str(",\n");

    let new_text = insert_at(text, close, &insertion);
    finish_insert(artifact, new_text)
}

fn apply_model_method(artifact: &GeneratedArtifact, text: &str, ctx: &GenContext) -> PlanResult {
    if text.contains(&artifact.identifier) {
        return PlanResult::unchanged(text, Outcome::SkippedDuplicate);
    }

    let class_name = &ctx.model_name;
    let Some(body_span) = class_body_span(text, class_name) else {
        return PlanResult {
            text: text.to_string(),
            outcome: Outcome::FailedAnchor,
            warnings: vec![format!(
                "model {} not found in {}",
                class_name,
                artifact.target.display()
            )],
        };
    };

    let methods = class_methods(text, class_name);
    let sibling = methods
        .iter()
        .rev()
        .find(|m| INSERT_AFTER_METHODS.contains(&m.as_str()));
    let pos = sibling
        .and_then(|m| method_span(text, class_name, m))
        .map(|s| s.end)
        .unwrap_or(body_span.end);

    let new_text = insert_at(text, pos, &artifact.body);
    finish_insert(artifact, new_text)
}

/// Merge the artifact's required imports into the freshly edited text.
fn finish_insert(artifact: &GeneratedArtifact, text: String) -> PlanResult {
    let mut warnings = Vec::new();
    let text = if artifact.imports.is_empty() {
        text
    } else {
        let merge = merge_imports(&text, &artifact.imports);
        if !merge.unplaced.is_empty() {
            warnings.push(format!(
                "could not find where to insert imports in {}; add manually:\n{}",
                artifact.target.display(),
                merge.unplaced.join("\n")
            ));
        }
        merge.text
    };
    PlanResult {
        text,
        outcome: Outcome::Inserted,
        warnings,
    }
}

fn insert_at(text: &str, pos: usize, fragment: &str) -> String {
    let mut out = String::with_capacity(text.len() + fragment.len());
    out.push_str(&text[..pos]);
    out.push_str(fragment);
    out.push_str(&text[pos..]);
    out
}
