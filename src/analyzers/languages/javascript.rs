//! JavaScript configuration for the tree-walking detector.

use crate::analyzers::treesitter::{DocStyle, TreeWalkDetector, WalkConfig};
use crate::analyzers::Detector;

const COMPLEXITY_QUERY: &str = r#"
(if_statement) @branch
(for_statement) @branch
(for_in_statement) @branch
(while_statement) @branch
(do_statement) @branch
(switch_case) @branch
(catch_clause) @branch
(ternary_expression) @branch
(binary_expression operator: "&&") @branch
(binary_expression operator: "||") @branch
"#;

/// Create a new JavaScript detector.
pub fn new_detector() -> Box<dyn Detector> {
    Box::new(TreeWalkDetector::new(WalkConfig {
        language: tree_sitter_javascript::LANGUAGE.into(),
        language_name: "javascript",
        eval_builtins: &["eval", "Function"],
        call_kinds: &["call_expression"],
        callee_field: "function",
        new_kinds: &["new_expression"],
        new_callee_field: "constructor",
        loop_kinds: &[
            "for_statement",
            "for_in_statement",
            "while_statement",
            "do_statement",
        ],
        assignment_kinds: &["assignment_expression", "variable_declarator"],
        augmented_assignment_kinds: &["augmented_assignment_expression"],
        string_kinds: &["string", "template_string"],
        binary_kinds: &["binary_expression"],
        function_kinds: &["function_declaration", "method_definition"],
        type_kinds: &["class_declaration"],
        params_field: "parameters",
        body_field: "body",
        doc_style: DocStyle::LeadingComment,
        complexity_query: COMPLEXITY_QUERY,
    }))
}

/// Register the JavaScript detector for .js/.jsx/.mjs files.
pub fn register() {
    crate::analyzers::register(".js", new_detector);
    crate::analyzers::register(".jsx", new_detector);
    crate::analyzers::register(".mjs", new_detector);
}
