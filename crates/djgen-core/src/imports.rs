//! Import-statement merging for Python sources.
//!
//! Desired imports are inserted right after the first existing import line;
//! symbols that any existing import already provides are dropped, so applying
//! the same list twice leaves the text unchanged.

use regex::Regex;
use std::sync::LazyLock;

static RE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:from|import)\s").unwrap());

/// Result of one merge pass.
#[derive(Debug, Clone)]
pub struct ImportMerge {
    pub text: String,
    /// Statements actually inserted (possibly reduced to missing symbols).
    pub added: Vec<String>,
    /// Statements that could not be placed because no anchor line exists;
    /// the caller surfaces these as a warning for manual insertion.
    pub unplaced: Vec<String>,
}

impl ImportMerge {
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Merge `desired` import statements into `text`.
///
/// The anchor is the first line starting with `from` or `import`; without one
/// the merge is a no-op and every statement is reported as unplaced. Each
/// desired statement is reduced to the symbols not yet imported from any
/// module; fully satisfied statements are skipped. Survivors are inserted in
/// input order immediately after the anchor line, which is preserved verbatim.
pub fn merge_imports(text: &str, desired: &[String]) -> ImportMerge {
    let anchor = match RE_ANCHOR.find(text) {
        Some(m) => m,
        None => {
            return ImportMerge {
                text: text.to_string(),
                added: Vec::new(),
                unplaced: desired.to_vec(),
            }
        }
    };

    let mut merged = text.to_string();
    let mut added: Vec<String> = Vec::new();

    for statement in desired {
        if let Some(reduced) = reduce_statement(statement.trim(), &merged) {
            added.push(reduced);
            // Re-check later statements against the grown text so duplicates
            // within one desired list also collapse.
            merged = splice(text, anchor.start(), &added);
        }
    }

    ImportMerge {
        text: merged,
        added,
        unplaced: Vec::new(),
    }
}

/// Rebuild the merged text: original with the added block after the anchor line.
fn splice(original: &str, anchor_start: usize, added: &[String]) -> String {
    let line_end = match original[anchor_start..].find('\n') {
        Some(i) => anchor_start + i + 1,
        None => original.len(),
    };
    let mut out = String::with_capacity(original.len() + 64);
    out.push_str(&original[..line_end]);
    if !original[..line_end].ends_with('\n') {
        out.push('\n');
    }
    for statement in added {
        out.push_str(statement);
        out.push('\n');
    }
    out.push_str(&original[line_end..]);
    out
}

/// Drop the symbols of one statement that are already imported anywhere in
/// `text`; `None` when nothing remains to insert.
fn reduce_statement(statement: &str, text: &str) -> Option<String> {
    if let Some(rest) = statement.strip_prefix("from ") {
        let (path, symbols) = rest.split_once(" import ")?;
        let missing: Vec<&str> = symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !symbol_imported(text, s))
            .collect();
        if missing.is_empty() {
            return None;
        }
        return Some(format!("from {} import {}", path.trim(), missing.join(", ")));
    }

    if let Some(module) = statement.strip_prefix("import ") {
        let module = module.trim();
        if symbol_imported(text, module) {
            return None;
        }
        return Some(format!("import {module}"));
    }

    // Not an import statement; pass through untouched rather than guessing.
    Some(statement.to_string())
}

/// Append `line` at the end of `text` unless an identical line is already
/// present. Used for package `__init__.py` re-exports, which have no import
/// anchor to merge after on fresh scaffolds. `None` means no change.
pub fn append_if_missing(text: &str, line: &str) -> Option<String> {
    let wanted = line.trim();
    if text.lines().any(|l| l.trim() == wanted) {
        return None;
    }
    let mut out = text.trim_end_matches('\n').to_string();
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(wanted);
    out.push('\n');
    Some(out)
}

/// True when `symbol` already appears on any import line, from any module.
fn symbol_imported(text: &str, symbol: &str) -> bool {
    let pattern = format!(
        r"(?m)^\s*(?:from\s+\S+\s+)?import\s+.*\b{}\b",
        regex::escape(symbol)
    );
    Regex::new(&pattern).map(|re| re.is_match(text)).unwrap_or(false)
}
