//! Text-pattern detector family.
//!
//! Languages the engine has no parse tree for are scanned line-by-line
//! against a fixed, ordered rule table. Each rule is a substring or
//! compiled-regex trigger with a category, severity, message, and
//! suggestion; a matching line emits one finding per rule. TypeScript
//! carries a secondary table flagging explicitly-untyped declarations.
//!
//! Complexity for this family is approximated as 1 + the number of
//! control-flow keyword occurrences across the whole file.

use regex::Regex;

use super::{Category, Detector, FileAnalysis, Finding, Severity};

/// A trigger for one line-scan rule.
enum Trigger {
    Substr(&'static str),
    Pattern(Regex),
}

impl Trigger {
    fn matches(&self, line: &str) -> bool {
        match self {
            Trigger::Substr(needle) => line.contains(needle),
            Trigger::Pattern(re) => re.is_match(line),
        }
    }
}

/// One entry in a line-scan rule table.
struct LineRule {
    trigger: Trigger,
    category: Category,
    severity: Severity,
    message: &'static str,
    suggestion: &'static str,
}

impl LineRule {
    fn substr(
        needle: &'static str,
        category: Category,
        severity: Severity,
        message: &'static str,
        suggestion: &'static str,
    ) -> Self {
        Self {
            trigger: Trigger::Substr(needle),
            category,
            severity,
            message,
            suggestion,
        }
    }

    fn pattern(
        pattern: &str,
        category: Category,
        severity: Severity,
        message: &'static str,
        suggestion: &'static str,
    ) -> Self {
        Self {
            // Table patterns are fixed literals; a bad one is a programming
            // error caught by the table tests.
            trigger: Trigger::Pattern(Regex::new(pattern).expect("invalid table pattern")),
            category,
            severity,
            message,
            suggestion,
        }
    }
}

const CREDENTIAL_ASSIGNMENT: &str = r#"(?i)\b\w*(password|secret|key|token)\w*\s*=\s*["']"#;

lazy_static::lazy_static! {
    static ref TYPESCRIPT_RULES: Vec<LineRule> = vec![
        LineRule::substr(
            "eval(",
            Category::Security,
            Severity::High,
            "Dynamic code evaluation via eval()",
            "Avoid evaluating arbitrary code; use a safe parser or dispatch table",
        ),
        LineRule::substr(
            "document.write(",
            Category::Security,
            Severity::High,
            "document.write() can enable script injection",
            "Build DOM nodes explicitly instead",
        ),
        LineRule::substr(
            "innerHTML",
            Category::Security,
            Severity::Medium,
            "Direct innerHTML assignment can enable XSS",
            "Use textContent or a sanitizer",
        ),
        LineRule::pattern(
            CREDENTIAL_ASSIGNMENT,
            Category::Security,
            Severity::High,
            "Credential-like variable assigned a literal string",
            "Load secrets from the environment or a secret manager",
        ),
        LineRule::substr(
            "JSON.parse(JSON.stringify(",
            Category::Performance,
            Severity::Medium,
            "Deep clone via JSON round-trip",
            "Use structuredClone or copy only the needed fields",
        ),
        LineRule::pattern(
            r"^\s*var\s+\w",
            Category::Quality,
            Severity::Low,
            "Legacy var declaration",
            "Use let or const",
        ),
        LineRule::substr(
            "console.log(",
            Category::Quality,
            Severity::Low,
            "Leftover console.log call",
            "Remove debug output or route it through a logger",
        ),
        LineRule::substr(
            "@ts-ignore",
            Category::Quality,
            Severity::Medium,
            "Type checking suppressed with @ts-ignore",
            "Fix the underlying type error or use @ts-expect-error with a reason",
        ),
    ];

    /// Secondary table: explicitly-untyped declarations.
    static ref TYPESCRIPT_TYPE_SAFETY: Vec<LineRule> = vec![
        LineRule::pattern(
            r":\s*any\b",
            Category::TypeSafety,
            Severity::Medium,
            "Explicit any annotation",
            "Declare a concrete type or a generic parameter",
        ),
        LineRule::pattern(
            r"\bas\s+any\b",
            Category::TypeSafety,
            Severity::Medium,
            "Cast to any discards type information",
            "Cast to a concrete type instead",
        ),
        LineRule::substr(
            "<any>",
            Category::TypeSafety,
            Severity::Medium,
            "Angle-bracket cast to any",
            "Cast to a concrete type instead",
        ),
    ];

    static ref RUBY_RULES: Vec<LineRule> = vec![
        LineRule::pattern(
            r"\beval\b",
            Category::Security,
            Severity::High,
            "Dynamic code evaluation via eval",
            "Avoid evaluating arbitrary code; use a safe parser or dispatch table",
        ),
        LineRule::pattern(
            r"\bsystem\s*\(",
            Category::Security,
            Severity::High,
            "Shell command execution via system()",
            "Use a library API or pass an argument array without a shell",
        ),
        LineRule::pattern(
            CREDENTIAL_ASSIGNMENT,
            Category::Security,
            Severity::High,
            "Credential-like variable assigned a literal string",
            "Load secrets from the environment or a secret manager",
        ),
        LineRule::pattern(
            r"\.map\s*\{.*\}\.flatten\b",
            Category::Performance,
            Severity::Low,
            "map followed by flatten",
            "Use flat_map",
        ),
        LineRule::substr(
            "rescue Exception",
            Category::Quality,
            Severity::Medium,
            "Rescuing Exception catches interpreter-level errors",
            "Rescue StandardError or a specific error class",
        ),
        LineRule::substr(
            "binding.pry",
            Category::Quality,
            Severity::Medium,
            "Debug breakpoint left in code",
            "Remove the breakpoint",
        ),
    ];
}

const TYPESCRIPT_KEYWORDS: &[&str] = &["if", "else", "for", "while", "switch", "case", "catch"];
const RUBY_KEYWORDS: &[&str] = &[
    "if", "elsif", "unless", "while", "until", "for", "when", "rescue",
];

/// Line-oriented detector driven by fixed rule tables.
pub struct PatternDetector {
    language_name: &'static str,
    rules: &'static [LineRule],
    type_safety: &'static [LineRule],
    keywords: &'static [&'static str],
}

impl PatternDetector {
    fn scan_line(&self, path: &str, line_no: usize, line: &str, findings: &mut Vec<Finding>) {
        for rule in self.rules.iter().chain(self.type_safety.iter()) {
            if rule.trigger.matches(line) {
                findings.push(Finding::new(
                    path,
                    rule.category,
                    rule.severity,
                    Some(line_no),
                    rule.message,
                    rule.suggestion,
                ));
            }
        }
    }

    fn complexity(&self, content: &str) -> f64 {
        let count = content
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|token| self.keywords.contains(token))
            .count();
        1.0 + count as f64
    }
}

impl Detector for PatternDetector {
    fn language(&self) -> &'static str {
        self.language_name
    }

    fn analyze(&self, path: &str, content: &str) -> FileAnalysis {
        let mut findings = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            self.scan_line(path, idx + 1, line, &mut findings);
        }
        FileAnalysis {
            findings,
            complexity: Some(self.complexity(content)),
        }
    }
}

/// Create a new TypeScript detector.
pub fn new_typescript() -> Box<dyn Detector> {
    Box::new(PatternDetector {
        language_name: "typescript",
        rules: &TYPESCRIPT_RULES,
        type_safety: &TYPESCRIPT_TYPE_SAFETY,
        keywords: TYPESCRIPT_KEYWORDS,
    })
}

/// Create a new Ruby detector.
pub fn new_ruby() -> Box<dyn Detector> {
    Box::new(PatternDetector {
        language_name: "ruby",
        rules: &RUBY_RULES,
        type_safety: &[],
        keywords: RUBY_KEYWORDS,
    })
}

/// Register the text-pattern detectors.
pub fn register_all() {
    super::register(".ts", new_typescript);
    super::register(".tsx", new_typescript);
    super::register(".rb", new_ruby);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typescript_any_annotation() {
        let detector = new_typescript();
        let analysis = detector.analyze("api.ts", "function load(data: any) {\n  return data;\n}\n");
        let ts: Vec<_> = analysis
            .findings
            .iter()
            .filter(|f| f.category == Category::TypeSafety)
            .collect();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].line, Some(1));
        assert_eq!(ts[0].severity, Severity::Medium);
    }

    #[test]
    fn test_typescript_eval_and_credential() {
        let detector = new_typescript();
        let source = "const apiKey = \"sk-12345\";\neval(code);\n";
        let analysis = detector.analyze("danger.ts", source);
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.category == Category::Security && f.line == Some(1)));
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.category == Category::Security && f.line == Some(2)));
    }

    #[test]
    fn test_typescript_clean_line_no_findings() {
        let detector = new_typescript();
        let analysis = detector.analyze("ok.ts", "const total: number = items.length;\n");
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn test_var_requires_declaration_position() {
        let detector = new_typescript();
        let analysis = detector.analyze("ok.ts", "const variant = pick(variants);\n");
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn test_typescript_complexity_counts_keywords() {
        let detector = new_typescript();
        let source = "if (a) {\n  for (const x of xs) {\n    work(x);\n  }\n}\n";
        let analysis = detector.analyze("flow.ts", source);
        assert_eq!(analysis.complexity, Some(3.0));
    }

    #[test]
    fn test_ruby_rules() {
        let detector = new_ruby();
        let source = "result = eval(params[:expr])\nrescue Exception => e\n";
        let analysis = detector.analyze("runner.rb", source);
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.category == Category::Security && f.severity == Severity::High));
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.category == Category::Quality && f.line == Some(2)));
    }

    #[test]
    fn test_every_match_on_its_line() {
        let detector = new_typescript();
        let source = "console.log(a);\nconsole.log(b);\n";
        let analysis = detector.analyze("log.ts", source);
        let lines: Vec<_> = analysis.findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![Some(1), Some(2)]);
    }
}
