//! Context retrieval index for question grounding.
//!
//! Files are split into fixed 50-line windows; each chunk records the
//! findings that fall inside it plus keyword tags (security/performance
//! vocabulary hits and shallow function/type name extraction). Queries are
//! scored with a fixed token-overlap formula and the top chunks are packed
//! into a character-budgeted context string for a downstream language-model
//! client. This is a deliberately small lexical index, not a vector store.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analyzers::{Finding, SourceFile};

/// Lines per chunk window.
pub const CHUNK_LINES: usize = 50;

/// Character budget for an assembled context string.
pub const CONTEXT_BUDGET: usize = 2000;

/// Maximum characters of chunk content included in a summary.
pub const CONTENT_PREVIEW: usize = 500;

/// Default and maximum number of chunks returned per query.
pub const DEFAULT_TOP_K: usize = 3;
pub const MAX_TOP_K: usize = 5;

/// Scoring weights for query relevance.
mod weights {
    pub const PATH_HIT: f64 = 2.0;
    pub const CONTENT_TOKEN: f64 = 1.0;
    pub const TAG_MATCH: f64 = 1.5;
    pub const FINDING_MATCH: f64 = 3.0;
    pub const LANGUAGE_HIT: f64 = 1.0;
}

const SECURITY_TERMS: &[&str] = &[
    "password",
    "secret",
    "token",
    "credential",
    "auth",
    "crypt",
    "eval",
    "inject",
    "sql",
];

const PERFORMANCE_TERMS: &[&str] = &[
    "loop", "cache", "query", "async", "thread", "batch", "index", "alloc",
];

const MAX_NAME_TAGS: usize = 5;

lazy_static::lazy_static! {
    static ref FUNCTION_NAME: Regex =
        Regex::new(r"(?m)^\s*(?:def|function|fn|func)\s+([A-Za-z_]\w*)").unwrap();
    static ref TYPE_NAME: Regex =
        Regex::new(r"(?m)^\s*(?:class|struct|interface|trait|enum)\s+([A-Za-z_]\w*)").unwrap();
}

/// A contiguous slice of one file's lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeChunk {
    pub id: String,
    pub file: String,
    /// 1-indexed, inclusive.
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    pub language: String,
    /// Findings whose line falls within [start_line, end_line].
    pub findings: Vec<Finding>,
    /// Lowercase keyword tags.
    pub tags: Vec<String>,
}

/// Per-job lexical retrieval index.
#[derive(Debug, Clone, Default)]
pub struct RetrievalIndex {
    chunks: Vec<CodeChunk>,
}

impl RetrievalIndex {
    /// Build the index from the submitted files and the finding list.
    pub fn build(files: &[SourceFile], findings: &[Finding]) -> Self {
        let mut chunks = Vec::new();
        for file in files {
            chunk_file(file, findings, &mut chunks);
        }
        Self { chunks }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[CodeChunk] {
        &self.chunks
    }

    /// Score every chunk against the question and return the top-K
    /// (clamped to [1, MAX_TOP_K]); ties keep original chunk order.
    pub fn query(&self, question: &str, top_k: usize) -> Vec<&CodeChunk> {
        let k = top_k.clamp(1, MAX_TOP_K);
        let query_lc = question.to_lowercase();
        let tokens = tokenize(&query_lc);

        let mut scored: Vec<(f64, &CodeChunk)> = self
            .chunks
            .iter()
            .map(|c| (score_chunk(c, &tokens, &query_lc), c))
            .collect();
        // Stable sort keeps detection order on equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(k).map(|(_, c)| c).collect()
    }

    /// Assemble a context string for the question. Chunk summaries are
    /// concatenated in score order until the character budget would be
    /// exceeded; the first summary that would overflow is dropped whole.
    pub fn assemble_context(&self, question: &str, top_k: usize) -> String {
        let mut out = String::new();
        for chunk in self.query(question, top_k) {
            let summary = format_chunk(chunk);
            if out.len() + summary.len() > CONTEXT_BUDGET {
                break;
            }
            out.push_str(&summary);
        }
        out
    }
}

/// Split one file into contiguous, non-overlapping windows that together
/// reconstruct the content exactly.
fn chunk_file(file: &SourceFile, findings: &[Finding], chunks: &mut Vec<CodeChunk>) {
    if file.content.is_empty() {
        return;
    }
    let lines: Vec<&str> = file.content.split_inclusive('\n').collect();

    for (idx, window) in lines.chunks(CHUNK_LINES).enumerate() {
        let start_line = idx * CHUNK_LINES + 1;
        let end_line = start_line + window.len() - 1;
        let content: String = window.concat();

        let in_range: Vec<Finding> = findings
            .iter()
            .filter(|f| {
                f.file == file.path
                    && f.line
                        .map(|l| l >= start_line && l <= end_line)
                        .unwrap_or(false)
            })
            .cloned()
            .collect();

        let tags = extract_tags(&content);

        chunks.push(CodeChunk {
            id: format!("{}#{}", file.path, idx),
            file: file.path.clone(),
            start_line,
            end_line,
            content,
            language: file.language.clone(),
            findings: in_range,
            tags,
        });
    }
}

/// Vocabulary hits plus up to 5 function names and 5 type names.
fn extract_tags(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let mut tags: Vec<String> = Vec::new();

    for term in SECURITY_TERMS.iter().chain(PERFORMANCE_TERMS.iter()) {
        if lower.contains(term) {
            tags.push((*term).to_string());
        }
    }
    for cap in FUNCTION_NAME.captures_iter(content).take(MAX_NAME_TAGS) {
        let tag = cap[1].to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    for cap in TYPE_NAME.captures_iter(content).take(MAX_NAME_TAGS) {
        let tag = cap[1].to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn tokenize(query_lc: &str) -> Vec<String> {
    query_lc
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.len() >= 3)
        .map(|t| t.to_string())
        .collect()
}

fn score_chunk(chunk: &CodeChunk, tokens: &[String], query_lc: &str) -> f64 {
    let mut score = 0.0;

    let path_lc = chunk.file.to_lowercase();
    if tokens.iter().any(|t| path_lc.contains(t.as_str())) {
        score += weights::PATH_HIT;
    }

    let content_lc = chunk.content.to_lowercase();
    let content_hits = tokens
        .iter()
        .filter(|t| content_lc.contains(t.as_str()))
        .count();
    score += weights::CONTENT_TOKEN * content_hits as f64;

    let tag_hits = chunk
        .tags
        .iter()
        .filter(|tag| tokens.iter().any(|t| tag.contains(t.as_str())))
        .count();
    score += weights::TAG_MATCH * tag_hits as f64;

    let finding_hits = chunk
        .findings
        .iter()
        .filter(|f| {
            let text = format!("{} {}", f.category, f.message).to_lowercase();
            tokens.iter().any(|t| text.contains(t.as_str()))
        })
        .count();
    score += weights::FINDING_MATCH * finding_hits as f64;

    if !chunk.language.is_empty() && query_lc.contains(&chunk.language) {
        score += weights::LANGUAGE_HIT;
    }

    score
}

fn format_chunk(chunk: &CodeChunk) -> String {
    let mut out = format!(
        "--- {} (lines {}-{}, {}) ---\n",
        chunk.file, chunk.start_line, chunk.end_line, chunk.language
    );
    for f in &chunk.findings {
        out.push_str(&format!(
            "[{}/{}] line {}: {}\n",
            f.category,
            f.severity,
            f.line.unwrap_or(0),
            f.message
        ));
    }
    let preview: String = chunk.content.chars().take(CONTENT_PREVIEW).collect();
    out.push_str(&preview);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out
}
