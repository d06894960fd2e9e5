//! Tree-walking detector engine.
//!
//! A single generic engine drives every language with a tree-sitter grammar.
//! Per-language knowledge (node kinds, builtin names, complexity query) lives
//! in a `WalkConfig` supplied by `languages/`. The engine walks the tree once
//! and applies the rule checks: dynamic-evaluation calls, hardcoded
//! credentials, nested loops, append accumulation in loops, oversized
//! functions, parameter counts, and missing documentation.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser as TsParser, Query, QueryCursor};

use super::{Category, Detector, FileAnalysis, Finding, Severity};

/// How a language attaches documentation to a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStyle {
    /// First statement of the body is a string literal (Python).
    Docstring,
    /// A comment node immediately precedes the definition (JavaScript).
    LeadingComment,
}

/// Per-language configuration for the tree-walking engine.
#[derive(Clone)]
pub struct WalkConfig {
    /// The tree-sitter language.
    pub language: Language,
    /// Language name (e.g. "python").
    pub language_name: &'static str,
    /// Callee names treated as dynamic-evaluation primitives.
    pub eval_builtins: &'static [&'static str],
    /// Node kinds representing a call expression.
    pub call_kinds: &'static [&'static str],
    /// Field name of the callee within a call node.
    pub callee_field: &'static str,
    /// Node kinds representing constructor invocations (`new F(...)`).
    pub new_kinds: &'static [&'static str],
    /// Field name of the constructor within a new-expression node.
    pub new_callee_field: &'static str,
    /// Node kinds representing loops.
    pub loop_kinds: &'static [&'static str],
    /// Node kinds representing plain assignments (left/right or name/value).
    pub assignment_kinds: &'static [&'static str],
    /// Node kinds representing augmented assignments (`x += y`).
    pub augmented_assignment_kinds: &'static [&'static str],
    /// Node kinds representing string literals.
    pub string_kinds: &'static [&'static str],
    /// Node kinds representing binary expressions (for `x = x + y`).
    pub binary_kinds: &'static [&'static str],
    /// Node kinds representing function definitions.
    pub function_kinds: &'static [&'static str],
    /// Node kinds representing type definitions (classes).
    pub type_kinds: &'static [&'static str],
    /// Field name of a definition's parameter list.
    pub params_field: &'static str,
    /// Field name of a definition's body.
    pub body_field: &'static str,
    /// Documentation convention for this language.
    pub doc_style: DocStyle,
    /// Query counting branch/loop/handler nodes and boolean operators.
    pub complexity_query: &'static str,
}

/// Variable-name substrings that suggest a hardcoded credential.
const CREDENTIAL_TERMS: &[&str] = &["password", "secret", "key", "token"];

/// Function body length (in source lines) above which a finding is emitted.
const MAX_FUNCTION_LINES: usize = 50;

/// Parameter count above which a finding is emitted.
const MAX_PARAMS: usize = 5;

/// Tree-walking detector for one language.
pub struct TreeWalkDetector {
    config: WalkConfig,
}

impl TreeWalkDetector {
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    fn parse(&self, source: &[u8]) -> anyhow::Result<tree_sitter::Tree> {
        let mut parser = TsParser::new();
        parser.set_language(&self.config.language)?;
        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse source"))
    }

    fn run(&self, path: &str, content: &str) -> anyhow::Result<FileAnalysis> {
        let source = content.as_bytes();
        let tree = self.parse(source)?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Ok(FileAnalysis::parse_failure(
                path,
                line,
                format!("{} source failed to parse", self.config.language_name),
            ));
        }

        let mut findings = Vec::new();
        self.walk(root, source, path, 0, &mut findings);

        let complexity = self.complexity(root, source)?;
        Ok(FileAnalysis {
            findings,
            complexity: Some(complexity),
        })
    }

    /// Cyclomatic-style complexity: 1 + branch/loop/handler nodes + boolean
    /// operator nodes (each binary boolean operator adds operands - 1).
    fn complexity(&self, root: Node, source: &[u8]) -> anyhow::Result<f64> {
        if self.config.complexity_query.is_empty() {
            return Ok(1.0);
        }

        let query = Query::new(&self.config.language, self.config.complexity_query)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        let mut complexity = 1.0;
        while matches.next().is_some() {
            complexity += 1.0;
        }
        Ok(complexity)
    }

    /// Single recursive pass applying all rule checks.
    fn walk(
        &self,
        node: Node,
        source: &[u8],
        path: &str,
        loop_depth: usize,
        findings: &mut Vec<Finding>,
    ) {
        let kind = node.kind();
        let line = node.start_position().row + 1;

        if self.config.call_kinds.contains(&kind) {
            self.check_eval_call(node, source, path, line, self.config.callee_field, findings);
        }

        if self.config.new_kinds.contains(&kind) {
            self.check_eval_call(node, source, path, line, self.config.new_callee_field, findings);
        }

        if self.config.assignment_kinds.contains(&kind) {
            self.check_credential_assignment(node, source, path, line, findings);
            if loop_depth > 0 {
                self.check_plain_accumulation(node, source, path, line, findings);
            }
        }

        if loop_depth > 0 && self.config.augmented_assignment_kinds.contains(&kind) {
            self.check_augmented_accumulation(node, source, path, line, findings);
        }

        if self.config.function_kinds.contains(&kind) {
            self.check_function(node, source, path, line, findings);
        }

        if self.config.type_kinds.contains(&kind) {
            self.check_type_docs(node, source, path, line, findings);
        }

        let mut child_depth = loop_depth;
        if self.config.loop_kinds.contains(&kind) {
            if loop_depth >= 1 {
                findings.push(Finding::new(
                    path,
                    Category::Performance,
                    Severity::Medium,
                    Some(line),
                    format!("Loop nested {} levels deep", loop_depth + 1),
                    "Restructure into a single pass or extract the inner loop",
                ));
            }
            child_depth += 1;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, source, path, child_depth, findings);
        }
    }

    fn check_eval_call(
        &self,
        node: Node,
        source: &[u8],
        path: &str,
        line: usize,
        callee_field: &str,
        findings: &mut Vec<Finding>,
    ) {
        let callee = match node.child_by_field_name(callee_field) {
            Some(n) => n,
            None => return,
        };
        let name = node_text(callee, source);
        if self.config.eval_builtins.contains(&name) {
            findings.push(
                Finding::new(
                    path,
                    Category::Security,
                    Severity::High,
                    Some(line),
                    format!("Call to dynamic code evaluation primitive '{}'", name),
                    "Avoid evaluating arbitrary code; use a safe parser or dispatch table",
                )
                .with_confidence(0.95),
            );
        }
    }

    fn check_credential_assignment(
        &self,
        node: Node,
        source: &[u8],
        path: &str,
        line: usize,
        findings: &mut Vec<Finding>,
    ) {
        let (target, value) = match assignment_parts(node) {
            Some(parts) => parts,
            None => return,
        };
        let target_name = node_text(target, source).to_lowercase();
        let is_credential = CREDENTIAL_TERMS.iter().any(|t| target_name.contains(t));
        if is_credential && self.config.string_kinds.contains(&value.kind()) {
            findings.push(
                Finding::new(
                    path,
                    Category::Security,
                    Severity::High,
                    Some(line),
                    format!(
                        "Credential-like variable '{}' assigned a literal string",
                        node_text(target, source)
                    ),
                    "Load secrets from the environment or a secret manager",
                )
                .with_confidence(0.9),
            );
        }
    }

    /// `x = x + y` inside a loop.
    fn check_plain_accumulation(
        &self,
        node: Node,
        source: &[u8],
        path: &str,
        line: usize,
        findings: &mut Vec<Finding>,
    ) {
        let (target, value) = match assignment_parts(node) {
            Some(parts) => parts,
            None => return,
        };
        if !self.config.binary_kinds.contains(&value.kind()) {
            return;
        }
        let operator = value
            .child_by_field_name("operator")
            .map(|n| node_text(n, source))
            .unwrap_or("");
        if operator != "+" {
            return;
        }
        let target_text = node_text(target, source);
        let left_operand = value
            .child_by_field_name("left")
            .map(|n| node_text(n, source))
            .unwrap_or("");
        if target_text == left_operand {
            findings.push(Finding::new(
                path,
                Category::Performance,
                Severity::Medium,
                Some(line),
                format!("Accumulation onto '{}' inside a loop", target_text),
                "Collect parts and join once outside the loop",
            ));
        }
    }

    /// `x += y` inside a loop.
    fn check_augmented_accumulation(
        &self,
        node: Node,
        source: &[u8],
        path: &str,
        line: usize,
        findings: &mut Vec<Finding>,
    ) {
        let operator = node
            .child_by_field_name("operator")
            .map(|n| node_text(n, source))
            .unwrap_or("");
        if operator != "+=" {
            return;
        }
        let target = node
            .child_by_field_name("left")
            .map(|n| node_text(n, source))
            .unwrap_or("value");
        findings.push(Finding::new(
            path,
            Category::Performance,
            Severity::Medium,
            Some(line),
            format!("Accumulation onto '{}' inside a loop", target),
            "Collect parts and join once outside the loop",
        ));
    }

    fn check_function(
        &self,
        node: Node,
        source: &[u8],
        path: &str,
        line: usize,
        findings: &mut Vec<Finding>,
    ) {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        if let Some(body) = node.child_by_field_name(self.config.body_field) {
            let body_lines = body.end_position().row - body.start_position().row + 1;
            if body_lines > MAX_FUNCTION_LINES {
                findings.push(Finding::new(
                    path,
                    Category::Quality,
                    Severity::Low,
                    Some(line),
                    format!("Function '{}' spans {} lines", name, body_lines),
                    "Split into smaller functions with single responsibilities",
                ));
            }
        }

        if let Some(params) = node.child_by_field_name(self.config.params_field) {
            let count = params
                .named_children(&mut params.walk())
                .filter(|n| n.kind() != "comment")
                .count();
            if count > MAX_PARAMS {
                findings.push(Finding::new(
                    path,
                    Category::Quality,
                    Severity::Medium,
                    Some(line),
                    format!("Function '{}' takes {} parameters", name, count),
                    "Group related parameters into a struct or options object",
                ));
            }
        }

        if !self.has_docs(node, source) {
            findings.push(Finding::new(
                path,
                Category::Documentation,
                Severity::Low,
                Some(line),
                format!("Function '{}' has no documentation comment", name),
                "Add a short comment describing purpose and parameters",
            ));
        }
    }

    fn check_type_docs(
        &self,
        node: Node,
        source: &[u8],
        path: &str,
        line: usize,
        findings: &mut Vec<Finding>,
    ) {
        if self.has_docs(node, source) {
            return;
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());
        findings.push(Finding::new(
            path,
            Category::Documentation,
            Severity::Low,
            Some(line),
            format!("Type '{}' has no documentation comment", name),
            "Add a short comment describing the type's role",
        ));
    }

    fn has_docs(&self, node: Node, source: &[u8]) -> bool {
        match self.config.doc_style {
            DocStyle::Docstring => {
                let body = match node.child_by_field_name(self.config.body_field) {
                    Some(b) => b,
                    None => return false,
                };
                let first = match body.named_child(0) {
                    Some(n) => n,
                    None => return false,
                };
                if first.kind() == "comment" {
                    return true;
                }
                first.kind() == "expression_statement"
                    && first
                        .named_child(0)
                        .map(|n| self.config.string_kinds.contains(&n.kind()))
                        .unwrap_or(false)
            }
            DocStyle::LeadingComment => {
                let mut prev = node.prev_named_sibling();
                // Decorators sit between a comment and the definition.
                while let Some(p) = prev {
                    if p.kind() == "comment" {
                        return true;
                    }
                    if p.kind() == "decorator" {
                        prev = p.prev_named_sibling();
                        continue;
                    }
                    return false;
                }
                let _ = source;
                false
            }
        }
    }
}

impl Detector for TreeWalkDetector {
    fn language(&self) -> &'static str {
        self.config.language_name
    }

    fn analyze(&self, path: &str, content: &str) -> FileAnalysis {
        match self.run(path, content) {
            Ok(analysis) => analysis,
            // Errors never escape the file boundary.
            Err(e) => FileAnalysis::parse_failure(path, 1, format!("analysis failed: {}", e)),
        }
    }
}

/// Extract (target, value) from an assignment-like node. Plain assignments
/// use left/right fields; declarators use name/value.
fn assignment_parts(node: Node) -> Option<(Node, Node)> {
    let target = node
        .child_by_field_name("left")
        .or_else(|| node.child_by_field_name("name"))?;
    let value = node
        .child_by_field_name("right")
        .or_else(|| node.child_by_field_name("value"))?;
    Some((target, value))
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Line of the first ERROR or MISSING node in the tree.
fn first_error_line(root: Node) -> Option<usize> {
    let mut cursor = root.walk();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    None
}
