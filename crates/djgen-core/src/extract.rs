//! Span-level extraction from Python source text.
//!
//! No parser: class and method bodies are located by indentation tracking,
//! aggregate literals (route lists, call arguments) by bracket-depth counting.
//! Bracket counting does not account for brackets inside string literals or
//! comments; balanced pairs inside strings cancel out, unbalanced ones will
//! misplace the span end.

use regex::Regex;

/// A half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Iterate `(byte_offset, line)` pairs, line excludes the terminating newline.
fn lines_with_offsets(source: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    source.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        (start, raw.trim_end_matches(['\n', '\r']))
    })
}

/// Walk an indentation block: given the offset right after the opening line,
/// return the end offset of the last line indented strictly deeper than
/// `open_indent`. Blank lines pass through; the first non-blank line at or
/// below the opening indentation terminates the block (exclusive).
fn walk_block(source: &str, after_open: usize, open_indent: usize) -> usize {
    let mut end = after_open;
    for (offset, line) in lines_with_offsets(&source[after_open..]) {
        if line.trim().is_empty() {
            continue;
        }
        if indent_width(line) <= open_indent {
            break;
        }
        end = after_open + offset + line.len();
    }
    end
}

fn header_line(source: &str, pattern: &Regex) -> Option<(usize, usize, usize)> {
    for (offset, line) in lines_with_offsets(source) {
        if pattern.is_match(line) {
            return Some((offset, offset + line.len(), indent_width(line)));
        }
    }
    None
}

/// Span of a named class, from its `class` line through the last line of its
/// body. `None` when the class is not declared — a normal outcome.
pub fn class_span(source: &str, name: &str) -> Option<Span> {
    let pattern = class_header_re(name);
    let (start, header_end, indent) = header_line(source, &pattern)?;
    let end = walk_block(source, next_line_start(source, header_end), indent);
    Some(Span {
        start,
        end: end.max(header_end),
    })
}

/// Span of a class body only: first body line through the last, excluding the
/// header. An empty span (start == end) means the class has an empty body.
pub fn class_body_span(source: &str, name: &str) -> Option<Span> {
    let pattern = class_header_re(name);
    let (_, header_end, indent) = header_line(source, &pattern)?;
    let body_start = next_line_start(source, header_end);
    let end = walk_block(source, body_start, indent);
    Some(Span {
        start: body_start.min(end),
        end,
    })
}

/// Names of the methods defined directly or nested inside a class body, in
/// declaration order.
pub fn class_methods(source: &str, class_name: &str) -> Vec<String> {
    static RE_DEF: std::sync::LazyLock<Regex> =
        std::sync::LazyLock::new(|| Regex::new(r"(?m)^\s+def\s+(\w+)").unwrap());

    let Some(body) = class_body_span(source, class_name) else {
        return Vec::new();
    };
    RE_DEF
        .captures_iter(body.text(source))
        .map(|c| c[1].to_string())
        .collect()
}

/// Span of a named method inside a class: the `def` line through the last
/// line of the method body, as absolute offsets into `source`.
pub fn method_span(source: &str, class_name: &str, method: &str) -> Option<Span> {
    let body = class_body_span(source, class_name)?;
    let body_text = body.text(source);
    let pattern = Regex::new(&format!(r"^[ \t]*def\s+{}\s*\(", regex::escape(method))).ok()?;
    let (start, header_end, indent) = header_line(body_text, &pattern)?;
    let end = walk_block(body_text, next_line_start(body_text, header_end), indent);
    Some(Span {
        start: body.start + start,
        end: body.start + end.max(header_end),
    })
}

/// Span of a bracketed aggregate anchored at `anchor`: either a call
/// `anchor(...)` or a list assignment `anchor = [...]`. The span runs from the
/// anchor name through the closing bracket (inclusive), found by depth
/// counting over `()[]{}`.
pub fn aggregate_span(source: &str, anchor: &str) -> Option<Span> {
    let pattern = Regex::new(&format!(
        r"{}\s*(?:\(|=\s*\[)",
        regex::escape(anchor)
    ))
    .ok()?;
    let m = pattern.find(source)?;
    let open = source[m.start()..m.end()]
        .rfind(['(', '['])
        .map(|i| m.start() + i)?;

    let bytes = source.as_bytes();
    let mut depth = 0i32;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(Span {
                        start: m.start(),
                        end: i + 1,
                    });
                }
            }
            _ => {}
        }
    }
    None
}

/// Indentation used by the entries of an aggregate span: the indent of its
/// first non-blank interior line, falling back to four spaces.
pub fn aggregate_entry_indent(source: &str, span: Span) -> String {
    let interior = &source[span.start..span.end.saturating_sub(1)];
    for line in interior.lines().skip(1) {
        if !line.trim().is_empty() {
            return line[..indent_width(line)].to_string();
        }
    }
    "    ".to_string()
}

fn class_header_re(name: &str) -> Regex {
    // Class names are validated identifiers; escape anyway.
    Regex::new(&format!(
        r"^[ \t]*class\s+{}\s*[(:]",
        regex::escape(name)
    ))
    .unwrap_or_else(|_| Regex::new(r"$^").unwrap())
}

fn next_line_start(source: &str, from: usize) -> usize {
    match source[from..].find('\n') {
        Some(i) => from + i + 1,
        None => source.len(),
    }
}
