use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

use crate::registry::TypeRegistry;
use crate::types::{FieldSpec, GenError};

static RE_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Parse one raw field token `name:typeKey[:arg,key=value,...]` into a
/// [`FieldSpec`], resolving default arguments from the registry.
///
/// Argument merge order: registry defaults for the type (declared order),
/// then a synthesized `verbose_name` derived from the field name, then
/// user-supplied pairs. User values override defaults for the same key while
/// keeping the key's original position; new keys append in encounter order.
pub fn parse_field(token: &str, registry: &TypeRegistry) -> Result<FieldSpec, GenError> {
    let mut parts = token.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let type_key = match parts.next() {
        Some(t) => t.trim(),
        None => return Err(GenError::MalformedField(token.to_string())),
    };
    let raw_args = parts.next();

    if !RE_IDENT.is_match(name) {
        return Err(GenError::MalformedField(token.to_string()));
    }
    let entry = registry
        .get(type_key)
        .ok_or_else(|| GenError::UnknownType(type_key.to_string()))?;

    let mut args: IndexMap<String, String> = entry.default_args.clone();
    args.insert(
        "verbose_name".to_string(),
        format!("\"{}\"", display_name(name)),
    );

    if let Some(raw_args) = raw_args {
        for piece in raw_args.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            match piece.matches('=').count() {
                0 => {
                    args.insert(piece.to_string(), String::new());
                }
                1 => {
                    let (key, value) = piece.split_once('=').unwrap_or((piece, ""));
                    args.insert(key.trim().to_string(), value.trim().to_string());
                }
                _ => return Err(GenError::MalformedField(token.to_string())),
            }
        }
    }

    Ok(FieldSpec {
        name: name.to_string(),
        type_key: type_key.to_string(),
        args,
    })
}

/// Parse a list of raw field tokens, failing fast on the first bad token.
pub fn parse_fields(tokens: &[String], registry: &TypeRegistry) -> Result<Vec<FieldSpec>, GenError> {
    tokens.iter().map(|t| parse_field(t, registry)).collect()
}

/// Human-readable display name for a field: `published_at` → `Published at`.
pub fn display_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Serialize one field spec into a Django declaration line.
///
/// Positional flags come first, each rendered as a quoted bare token, then
/// keyword arguments as `key=value`; each group keeps its original insertion
/// order. Pure function: identical input yields byte-identical output.
pub fn serialize_field(spec: &FieldSpec, registry: &TypeRegistry) -> Result<String, GenError> {
    let entry = registry
        .get(&spec.type_key)
        .ok_or_else(|| GenError::UnknownType(spec.type_key.clone()))?;

    let mut positional: Vec<String> = Vec::new();
    let mut keyword: Vec<String> = Vec::new();
    for (key, value) in &spec.args {
        if value.is_empty() {
            positional.push(format!("\"{key}\""));
        } else {
            keyword.push(format!("{key}={value}"));
        }
    }

    let opts: Vec<String> = positional.into_iter().chain(keyword).collect();
    Ok(format!("{} = {}({})", spec.name, entry.name, opts.join(", ")))
}

/// Serialize a slice of field specs, one declaration per line.
pub fn serialize_fields(specs: &[FieldSpec], registry: &TypeRegistry) -> Result<String, GenError> {
    let lines: Result<Vec<String>, GenError> =
        specs.iter().map(|s| serialize_field(s, registry)).collect();
    Ok(lines?.join("\n"))
}
