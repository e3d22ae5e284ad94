//! Doc comment classification and repair.
//!
//! Go expects the doc comment of an exported declaration to start with the
//! declaration's name (`// Name does things`). Given a name and the comment
//! lines directly above its declaration, [`classify`] decides what is wrong
//! with the comment and [`plan`] decides how to fix it. Only the head line
//! (index 0, the topmost line) is ever replaced, or a new head is prepended.

use super::segment::describe;
use serde::Serialize;
use std::fmt;

/// Template used when no format is configured.
pub const DEFAULT_FORMAT: &str = "// %s missing godoc.";

/// How synthesized doc lines are rendered.
///
/// Built once per run and shared by every rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocStyle {
    format: String,
    auto_description: bool,
}

impl DocStyle {
    pub fn new(format: impl Into<String>, auto_description: bool) -> Self {
        Self {
            format: format.into(),
            auto_description,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn auto_description(&self) -> bool {
        self.auto_description
    }

    /// Render the doc line used for a missing or name-only comment.
    pub fn render(&self, name: &str) -> String {
        if self.auto_description {
            format!("// {} {}", name, describe(name))
        } else {
            expand_template(&self.format, name)
        }
    }
}

/// Expand a printf-style template: the first `%s` becomes `name` and `%%`
/// becomes a literal `%`. Any other `%` is copied as is.
fn expand_template(format: &str, name: &str) -> String {
    let mut out = String::with_capacity(format.len() + name.len());
    let mut chars = format.chars().peekable();
    let mut substituted = false;

    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.peek() {
                Some('%') => {
                    chars.next();
                    out.push('%');
                    continue;
                }
                Some('s') if !substituted => {
                    chars.next();
                    out.push_str(name);
                    substituted = true;
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Number of `%s` placeholders in a format template, skipping `%%` escapes.
///
/// Returns None when a `%` is followed by anything other than `s` or `%`.
pub fn placeholder_count(format: &str) -> Option<usize> {
    let mut count = 0;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.next() {
                Some('s') => count += 1,
                Some('%') => {}
                _ => return None,
            }
        }
    }
    Some(count)
}

impl Default for DocStyle {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT, false)
    }
}

/// What is wrong with the comment above a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocDefect {
    /// No comment at all.
    Empty,
    /// The comment is only the name (`// Name` or `//Name`).
    JustName,
    /// The head line does not start with `// Name `.
    MissingNamePrefix,
    /// Nothing to fix.
    WellFormed,
}

impl DocDefect {
    pub fn needs_fix(self) -> bool {
        self != DocDefect::WellFormed
    }
}

impl fmt::Display for DocDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocDefect::Empty => "missing comment",
            DocDefect::JustName => "name only",
            DocDefect::MissingNamePrefix => "missing name prefix",
            DocDefect::WellFormed => "well formed",
        };
        f.write_str(label)
    }
}

/// The edit to apply to a comment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocFix {
    Unchanged,
    /// Replace line 0 with the given text.
    ReplaceHead(String),
    /// Insert the given text as a new line 0.
    PrependHead(String),
}

impl DocFix {
    /// The new head line, if the block changes.
    pub fn head(&self) -> Option<&str> {
        match self {
            DocFix::Unchanged => None,
            DocFix::ReplaceHead(line) | DocFix::PrependHead(line) => Some(line),
        }
    }

    /// Apply this fix to a comment block.
    pub fn apply<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let mut out: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
        match self {
            DocFix::Unchanged => {}
            DocFix::ReplaceHead(head) => match out.first_mut() {
                Some(first) => *first = head.clone(),
                None => out.push(head.clone()),
            },
            DocFix::PrependHead(head) => out.insert(0, head.clone()),
        }
        out
    }
}

/// Whether `name` is exported under Go's rules (first rune upper-case).
pub fn is_exported(name: &str) -> bool {
    name.chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

/// Classify the comment block above the declaration named `name`.
pub fn classify<S: AsRef<str>>(name: &str, lines: &[S]) -> DocDefect {
    let Some(head) = lines.first().map(|l| l.as_ref()) else {
        return DocDefect::Empty;
    };

    if head == format!("// {}", name) || head == format!("//{}", name) {
        return DocDefect::JustName;
    }

    if !head.starts_with(&format!("// {} ", name)) {
        return DocDefect::MissingNamePrefix;
    }

    DocDefect::WellFormed
}

/// Remove the first known comment prefix from `line`.
///
/// Name-bearing prefixes are tried before the bare `// ` and `//` markers so
/// that `// Name: text` reduces to `text`.
fn strip_known_prefix<'a>(line: &'a str, name: &str) -> &'a str {
    let prefixes = [
        format!("//{} ", name),
        format!("// {}: ", name),
        format!("// {}:", name),
        format!("//{}: ", name),
        format!("//{}:", name),
        "// ".to_string(),
        "//".to_string(),
    ];

    prefixes
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix.as_str()))
        .unwrap_or(line)
}

/// Decide how to fix the comment block above `name`.
pub fn plan<S: AsRef<str>>(name: &str, exported: bool, lines: &[S], style: &DocStyle) -> DocFix {
    if !exported {
        return DocFix::Unchanged;
    }

    let fix = match classify(name, lines) {
        DocDefect::Empty => DocFix::PrependHead(style.render(name)),
        DocDefect::JustName => DocFix::ReplaceHead(style.render(name)),
        DocDefect::MissingNamePrefix => {
            let head = lines[0].as_ref();
            DocFix::ReplaceHead(format!("// {} {}", name, strip_known_prefix(head, name)))
        }
        DocDefect::WellFormed => DocFix::Unchanged,
    };

    // A `// %s` template renders a name-only head that is already in place.
    if let (DocFix::ReplaceHead(head), Some(current)) = (&fix, lines.first()) {
        if head == current.as_ref() {
            return DocFix::Unchanged;
        }
    }
    fix
}

/// Return the corrected comment block for the declaration named `name`.
pub fn rewrite<S: AsRef<str>>(
    name: &str,
    exported: bool,
    lines: &[S],
    style: &DocStyle,
) -> Vec<String> {
    plan(name, exported, lines, style).apply(lines)
}
