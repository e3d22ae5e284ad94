//! Go declaration extraction and doc comment splicing.
//!
//! Parses Go source with tree-sitter, finds every declaration whose doc
//! comment the engine should look at, and splices the engine's fixes back
//! into the original text. Everything outside the edited comment lines is
//! preserved byte for byte.
//!
//! Rewrite targets:
//!     - function and method declarations, named by the function name
//!     - type/const/var declarations with exactly one spec, named by that
//!       spec's (first) name, using the comment above the keyword
//!     - each spec of a grouped declaration, using the comment above the spec
//!
//! Gotchas:
//!     - Source with syntax errors is rejected as a whole, nothing is fixed
//!     - Declarations inside function bodies are visited too
//!     - A `/* */` comment directly above a declaration makes it a non-target
//!     - Compiler directives (`//go:embed`, `//nolint:...`) stay where they are
//!       and are never treated as doc text

use crate::engine::{classify, is_exported, plan, DocDefect, DocFix, DocStyle};
use crate::parser::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use tree_sitter::{Node, Parser, TreeCursor};

/// Matches `//line `, `//extern `, `//export ` and `//tool:directive` lines.
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^//(line |extern |export |[a-z0-9]+:[a-z0-9])").expect("valid directive regex")
});

/// Kind of declaration a target was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Func,
    Method,
    Type,
    Const,
    Var,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeclKind::Func => "fn",
            DeclKind::Method => "method",
            DeclKind::Type => "type",
            DeclKind::Const => "const",
            DeclKind::Var => "var",
        };
        f.write_str(label)
    }
}

/// One `//` comment line in a leading comment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    /// Comment text, from `//` to end of line (no line terminator)
    pub text: String,
    /// Byte range of `text` in the source
    pub range: Range<usize>,
    /// Whether the line is a compiler directive rather than doc text
    pub directive: bool,
}

/// A declaration whose leading comment may need fixing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTarget {
    /// Identifier the comment must start with
    pub name: String,
    pub kind: DeclKind,
    /// 1-based line of the declaration
    pub line: usize,
    /// Leading comment block in source order (topmost first)
    pub comments: Vec<CommentLine>,
    /// Byte offset where a new head line is inserted (start of the block's first line)
    pub insert_at: usize,
    /// Leading whitespace of the line at `insert_at`
    pub indent: String,
}

impl DocTarget {
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }

    /// The comment lines the engine sees: the block without directives.
    pub fn doc_lines(&self) -> Vec<&str> {
        self.comments
            .iter()
            .filter(|c| !c.directive)
            .map(|c| c.text.as_str())
            .collect()
    }

    fn head(&self) -> Option<&CommentLine> {
        self.comments.iter().find(|c| !c.directive)
    }
}

/// One comment fix applied to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFix {
    pub name: String,
    pub kind: DeclKind,
    pub line: usize,
    pub defect: DocDefect,
    /// Head line before the fix (absent when a line was inserted)
    pub before: Option<String>,
    pub after: String,
}

/// Result of fixing one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFixes {
    pub source: String,
    pub fixes: Vec<AppliedFix>,
}

impl FileFixes {
    pub fn is_changed(&self) -> bool {
        !self.fixes.is_empty()
    }
}

/// A line comment or block comment, keyed by the row it ends on.
struct RawComment {
    range: Range<usize>,
    start_row: usize,
    line_comment: bool,
}

/// Parser for Go files
#[derive(Clone)]
pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| ParseError::ParseError(e.to_string()))?;
        Ok(parser)
    }

    fn node_text<'a>(&self, node: Node, source: &'a str) -> &'a str {
        &source[node.start_byte()..node.end_byte()]
    }

    /// Find every rewrite target in `source`, in source order.
    pub fn extract_targets(&self, source: &str) -> Result<Vec<DocTarget>, ParseError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::ParseError("Failed to parse Go source".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(root)
                .map(|node| node.start_position().row + 1)
                .unwrap_or(1);
            return Err(ParseError::ParseError(format!(
                "Go syntax error near line {}",
                line
            )));
        }

        let mut comments = BTreeMap::new();
        self.collect_comments(&mut root.walk(), source, &mut comments);

        let mut targets = Vec::new();
        self.visit_declarations(&mut root.walk(), source, &comments, &mut targets);
        Ok(targets)
    }

    /// Fix every exported declaration's doc comment in `source`.
    pub fn fix_source(&self, source: &str, style: &DocStyle) -> Result<FileFixes, ParseError> {
        let targets = self.extract_targets(source)?;
        let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };

        let mut edits: Vec<(Range<usize>, String)> = Vec::new();
        let mut fixes = Vec::new();

        for target in &targets {
            let lines = target.doc_lines();
            let defect = classify(&target.name, &lines);

            match plan(&target.name, target.is_exported(), &lines, style) {
                DocFix::Unchanged => {}
                DocFix::ReplaceHead(head) => {
                    let Some(current) = target.head() else {
                        continue;
                    };
                    edits.push((current.range.clone(), head.clone()));
                    fixes.push(AppliedFix {
                        name: target.name.clone(),
                        kind: target.kind,
                        line: target.line,
                        defect,
                        before: Some(current.text.clone()),
                        after: head,
                    });
                }
                DocFix::PrependHead(head) => {
                    let inserted = format!("{}{}{}", head, newline, target.indent);
                    let at = target.insert_at + target.indent.len();
                    edits.push((at..at, inserted));
                    fixes.push(AppliedFix {
                        name: target.name.clone(),
                        kind: target.kind,
                        line: target.line,
                        defect,
                        before: None,
                        after: head,
                    });
                }
            }
        }

        // Apply back to front so earlier offsets stay valid
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        let mut fixed = source.to_string();
        for (range, text) in edits {
            fixed.replace_range(range, &text);
        }

        Ok(FileFixes {
            source: fixed,
            fixes,
        })
    }

    fn collect_comments(
        &self,
        cursor: &mut TreeCursor,
        source: &str,
        comments: &mut BTreeMap<usize, RawComment>,
    ) {
        loop {
            let node = cursor.node();

            if node.kind() == "comment" {
                let mut range = node.start_byte()..node.end_byte();
                if source[range.clone()].ends_with('\r') {
                    range.end -= 1;
                }
                let line_comment = source[range.clone()].starts_with("//");
                // Keep the last comment on a row: it is the one adjacent to the next line
                comments.insert(
                    node.end_position().row,
                    RawComment {
                        range,
                        start_row: node.start_position().row,
                        line_comment,
                    },
                );
            }

            if cursor.goto_first_child() {
                self.collect_comments(cursor, source, comments);
                cursor.goto_parent();
            }

            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    fn visit_declarations(
        &self,
        cursor: &mut TreeCursor,
        source: &str,
        comments: &BTreeMap<usize, RawComment>,
        targets: &mut Vec<DocTarget>,
    ) {
        loop {
            let node = cursor.node();

            match node.kind() {
                "function_declaration" | "method_declaration" => {
                    let kind = if node.kind() == "method_declaration" {
                        DeclKind::Method
                    } else {
                        DeclKind::Func
                    };
                    if let Some(name_node) = node.child_by_field_name("name") {
                        let name = self.node_text(name_node, source);
                        self.push_target(node, name, kind, source, comments, targets);
                    }
                }
                "type_declaration" | "const_declaration" | "var_declaration" => {
                    let kind = match node.kind() {
                        "type_declaration" => DeclKind::Type,
                        "const_declaration" => DeclKind::Const,
                        _ => DeclKind::Var,
                    };
                    let specs = self.specs(node);
                    if let [spec] = specs.as_slice() {
                        // A lone spec is documented by the comment above the keyword
                        if let Some(name) = self.spec_name(*spec, source) {
                            self.push_target(node, name, kind, source, comments, targets);
                        }
                    } else {
                        for &spec in &specs {
                            if let Some(name) = self.spec_name(spec, source) {
                                self.push_target(spec, name, kind, source, comments, targets);
                            }
                        }
                    }
                }
                _ => {}
            }

            if cursor.goto_first_child() {
                self.visit_declarations(cursor, source, comments, targets);
                cursor.goto_parent();
            }

            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    /// Specs of a type/const/var declaration, looking through `var ( ... )` lists.
    fn specs<'t>(&self, decl: Node<'t>) -> Vec<Node<'t>> {
        let mut specs = Vec::new();
        let mut cursor = decl.walk();
        for child in decl.named_children(&mut cursor) {
            match child.kind() {
                "type_spec" | "type_alias" | "const_spec" | "var_spec" => specs.push(child),
                "var_spec_list" => {
                    let mut inner = child.walk();
                    specs.extend(
                        child
                            .named_children(&mut inner)
                            .filter(|n| n.kind() == "var_spec"),
                    );
                }
                _ => {}
            }
        }
        specs
    }

    /// Name of a spec; value specs declaring several names use the first.
    fn spec_name<'a>(&self, spec: Node, source: &'a str) -> Option<&'a str> {
        spec.child_by_field_name("name")
            .map(|name_node| self.node_text(name_node, source))
    }

    fn push_target(
        &self,
        anchor: Node,
        name: &str,
        kind: DeclKind,
        source: &str,
        comments: &BTreeMap<usize, RawComment>,
        targets: &mut Vec<DocTarget>,
    ) {
        match self.build_target(anchor, name, kind, source, comments) {
            Some(target) => targets.push(target),
            None => tracing::debug!(
                "Skipping {} {} at line {}: comment cannot be rewritten",
                kind,
                name,
                anchor.start_position().row + 1
            ),
        }
    }

    /// Gather the line comments directly above `anchor`.
    ///
    /// Returns None when the declaration does not start its own line or sits
    /// right under a block comment.
    fn build_target(
        &self,
        anchor: Node,
        name: &str,
        kind: DeclKind,
        source: &str,
        comments: &BTreeMap<usize, RawComment>,
    ) -> Option<DocTarget> {
        let anchor_start = anchor.start_byte();
        let anchor_line = line_start(source, anchor_start);
        if !is_blank(&source[anchor_line..anchor_start]) {
            return None;
        }

        let mut block = Vec::new();
        let mut row = anchor.start_position().row;
        while row > 0 {
            let Some(comment) = comments.get(&(row - 1)) else {
                break;
            };
            let comment_line = line_start(source, comment.range.start);
            if !is_blank(&source[comment_line..comment.range.start]) {
                // Trailing comment of the previous line of code
                break;
            }
            if !comment.line_comment {
                if block.is_empty() {
                    return None;
                }
                break;
            }

            let text = source[comment.range.clone()].to_string();
            block.push(CommentLine {
                directive: DIRECTIVE.is_match(&text),
                text,
                range: comment.range.clone(),
            });
            row = comment.start_row;
        }
        block.reverse();

        let insert_at = block
            .first()
            .map(|c| line_start(source, c.range.start))
            .unwrap_or(anchor_line);
        let indent = leading_blank(&source[insert_at..]).to_string();

        Some(DocTarget {
            name: name.to_string(),
            kind,
            line: anchor.start_position().row + 1,
            comments: block,
            insert_at,
            indent,
        })
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

/// First error or missing node in source order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Byte offset of the start of the line containing `offset`.
fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t')
}

fn leading_blank(s: &str) -> &str {
    let end = s.find(|c: char| c != ' ' && c != '\t').unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO_FIXTURE: &str = include_str!("../../test_fixtures/sample.go");

    fn target<'a>(targets: &'a [DocTarget], name: &str) -> &'a DocTarget {
        targets
            .iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("no target named {}", name))
    }

    #[test]
    fn test_extract_targets() {
        let parser = GoParser::new();
        let targets = parser.extract_targets(GO_FIXTURE).unwrap();

        let names: Vec<_> = targets
            .iter()
            .map(|t| (&t.name[..], t.kind.to_string()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Version", "const".to_string()),
                ("MaxRetries", "const".to_string()),
                ("DefaultTimeout", "const".to_string()),
                ("internalLimit", "const".to_string()),
                ("DefaultConfig", "var".to_string()),
                ("UserID", "type".to_string()),
                ("UserConfig", "type".to_string()),
                ("Logger", "type".to_string()),
                ("NewUserService", "fn".to_string()),
                ("Get", "method".to_string()),
                ("Set", "method".to_string()),
                ("helper", "fn".to_string()),
                ("Embedded", "var".to_string()),
                ("Render", "fn".to_string()),
                ("LocalType", "type".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_blocks() {
        let parser = GoParser::new();
        let targets = parser.extract_targets(GO_FIXTURE).unwrap();

        // Grouped specs carry their own comments
        assert_eq!(
            target(&targets, "MaxRetries").doc_lines(),
            vec!["// MaxRetries bounds retries."]
        );
        assert!(target(&targets, "DefaultTimeout").doc_lines().is_empty());

        // Comment separated by a blank line is not attached
        assert!(target(&targets, "UserID").comments.is_empty());

        // Multi-line block, topmost first
        assert_eq!(
            target(&targets, "UserConfig").doc_lines(),
            vec!["//UserConfig: holds user settings.", "// It is safe to copy."]
        );

        // Trailing comment on the previous line is not attached
        assert!(target(&targets, "Set").comments.is_empty());

        // Directive lines are part of the block but not doc text
        let embedded = target(&targets, "Embedded");
        assert_eq!(embedded.comments.len(), 1);
        assert!(embedded.comments[0].directive);
        assert!(embedded.doc_lines().is_empty());

        // Nested declarations are indented
        assert_eq!(target(&targets, "LocalType").indent, "\t");
    }

    #[test]
    fn test_block_comment_skips_target() {
        let parser = GoParser::new();
        let targets = parser.extract_targets(GO_FIXTURE).unwrap();
        assert!(targets.iter().all(|t| t.name != "Legacy"));
    }

    #[test]
    fn test_fix_source() {
        let parser = GoParser::new();
        let result = parser.fix_source(GO_FIXTURE, &DocStyle::default()).unwrap();
        let fixed = &result.source;

        assert!(fixed.contains("// MaxRetries bounds retries.\n\tMaxRetries = 3"));
        assert!(fixed.contains("\t// DefaultTimeout missing godoc.\n\tDefaultTimeout = 30"));
        assert!(fixed.contains("// UserID missing godoc.\ntype UserID string"));
        assert!(fixed.contains("// UserConfig holds user settings.\n// It is safe to copy.\ntype UserConfig struct"));
        assert!(fixed.contains("// Logger missing godoc.\ntype Logger interface"));
        assert!(fixed.contains("// NewUserService creates a service.\nfunc NewUserService"));
        assert!(fixed.contains("// Embedded missing godoc.\n//go:embed sample.txt\nvar Embedded string"));
        assert!(fixed.contains("\t// LocalType missing godoc.\n\ttype LocalType int"));

        // Untouched
        assert!(fixed.contains("// helper is not exported\nfunc helper()"));
        assert!(fixed.contains("\tinternalLimit = 10"));
        assert!(!fixed.contains("// internalLimit missing godoc."));
        assert!(fixed.contains("// Get returns a value.\nfunc (s *UserConfig) Get"));
        assert!(fixed.contains("/* Legacy is documented in a block. */\nfunc Legacy()"));
        assert!(fixed.contains("// Package sample is a fixture.\npackage sample"));

        let defects: Vec<_> = result.fixes.iter().map(|f| (&f.name[..], f.defect)).collect();
        assert!(defects.contains(&("UserID", DocDefect::Empty)));
        assert!(defects.contains(&("Logger", DocDefect::JustName)));
        assert!(defects.contains(&("UserConfig", DocDefect::MissingNamePrefix)));
    }

    #[test]
    fn test_fix_source_is_idempotent() {
        let parser = GoParser::new();
        let style = DocStyle::new("// %s TODO.", true);
        let once = parser.fix_source(GO_FIXTURE, &style).unwrap();
        assert!(once.is_changed());

        let twice = parser.fix_source(&once.source, &style).unwrap();
        assert!(!twice.is_changed());
        assert_eq!(once.source, twice.source);
    }

    #[test]
    fn test_syntax_error_rejects_file() {
        let parser = GoParser::new();
        let source = "package p\n\nfunc Foo( {\n\treturn\n}\n\nfunc Bar() {}\n";

        let err = parser
            .fix_source(source, &DocStyle::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::ParseError(_)));
        assert!(err.to_string().contains("syntax error"), "Got: {}", err);
        assert!(parser.extract_targets(source).is_err());

        // The fixture itself parses cleanly
        assert!(parser.extract_targets(GO_FIXTURE).is_ok());
    }

    #[test]
    fn test_fix_source_auto_description() {
        let parser = GoParser::new();
        let source = "package p\n\nfunc NewHTTPClient() {}\n";
        let result = parser
            .fix_source(source, &DocStyle::new("// %s missing godoc.", true))
            .unwrap();
        assert_eq!(
            result.source,
            "package p\n\n// NewHTTPClient new http client\nfunc NewHTTPClient() {}\n"
        );
    }

    #[test]
    fn test_fix_source_crlf() {
        let parser = GoParser::new();
        let source = "package p\r\n\r\n// Foo\r\nfunc Foo() {}\r\n\r\nfunc Bar() {}\r\n";
        let result = parser.fix_source(source, &DocStyle::default()).unwrap();
        assert_eq!(
            result.source,
            "package p\r\n\r\n// Foo missing godoc.\r\nfunc Foo() {}\r\n\r\n// Bar missing godoc.\r\nfunc Bar() {}\r\n"
        );
    }

    #[test]
    fn test_single_spec_in_parens_uses_outer_comment() {
        let parser = GoParser::new();
        let source = "package p\n\n// bounds things\nconst (\n\tLimit = 1\n)\n";
        let result = parser.fix_source(source, &DocStyle::default()).unwrap();
        assert_eq!(
            result.source,
            "package p\n\n// Limit bounds things\nconst (\n\tLimit = 1\n)\n"
        );
    }

    #[test]
    fn test_multi_name_value_spec_uses_first_name() {
        let parser = GoParser::new();
        let source = "package p\n\nvar A, B = 1, 2\n";
        let targets = parser.extract_targets(source).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "A");
    }

    #[test]
    fn test_directive_regex() {
        assert!(DIRECTIVE.is_match("//go:generate stringer -type=Kind"));
        assert!(DIRECTIVE.is_match("//nolint:errcheck"));
        assert!(DIRECTIVE.is_match("//export Foo"));
        assert!(!DIRECTIVE.is_match("// go:generate is not a directive"));
        assert!(!DIRECTIVE.is_match("//Foo: does things"));
    }

    #[test]
    fn test_line_helpers() {
        let source = "a\n\tb\n";
        assert_eq!(line_start(source, 3), 2);
        assert_eq!(line_start(source, 0), 0);
        assert!(is_blank(" \t"));
        assert!(!is_blank(" x"));
        assert_eq!(leading_blank("\t\tfoo"), "\t\t");
    }
}
