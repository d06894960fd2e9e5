//! Python configuration for the tree-walking detector.

use crate::analyzers::treesitter::{DocStyle, TreeWalkDetector, WalkConfig};
use crate::analyzers::Detector;

/// Tree-sitter query counting branch/loop/handler nodes and boolean
/// operators for the complexity value.
const COMPLEXITY_QUERY: &str = r#"
(if_statement) @branch
(elif_clause) @branch
(for_statement) @branch
(while_statement) @branch
(except_clause) @branch
(conditional_expression) @branch
(case_clause) @branch
(boolean_operator operator: "and") @branch
(boolean_operator operator: "or") @branch
"#;

/// Create a new Python detector.
pub fn new_detector() -> Box<dyn Detector> {
    Box::new(TreeWalkDetector::new(WalkConfig {
        language: tree_sitter_python::LANGUAGE.into(),
        language_name: "python",
        eval_builtins: &["eval", "exec", "compile"],
        call_kinds: &["call"],
        callee_field: "function",
        new_kinds: &[],
        new_callee_field: "",
        loop_kinds: &["for_statement", "while_statement"],
        assignment_kinds: &["assignment"],
        augmented_assignment_kinds: &["augmented_assignment"],
        string_kinds: &["string"],
        binary_kinds: &["binary_operator"],
        function_kinds: &["function_definition"],
        type_kinds: &["class_definition"],
        params_field: "parameters",
        body_field: "body",
        doc_style: DocStyle::Docstring,
        complexity_query: COMPLEXITY_QUERY,
    }))
}

/// Register the Python detector for .py files.
pub fn register() {
    crate::analyzers::register(".py", new_detector);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::Category;

    #[test]
    fn test_class_without_docs_flagged() {
        let detector = new_detector();
        let source = "class Widget:\n    pass\n";
        let analysis = detector.analyze("widget.py", source);
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.category == Category::Documentation && f.message.contains("Widget")));
    }

    #[test]
    fn test_class_with_docstring_clean() {
        let detector = new_detector();
        let source = "class Widget:\n    \"\"\"A widget.\"\"\"\n";
        let analysis = detector.analyze("widget.py", source);
        assert!(analysis
            .findings
            .iter()
            .all(|f| !(f.category == Category::Documentation && f.message.contains("Widget"))));
    }

    #[test]
    fn test_exec_flagged() {
        let detector = new_detector();
        let analysis = detector.analyze("run.py", "exec(payload)\n");
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.category == Category::Security && f.message.contains("exec")));
    }

    #[test]
    fn test_compile_flagged() {
        let detector = new_detector();
        let analysis = detector.analyze("run.py", "code = compile(src, 'f', 'exec')\n");
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.category == Category::Security && f.message.contains("compile")));
    }
}
