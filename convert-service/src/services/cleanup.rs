//! Deterministic cleanup of model output before it is returned as CSV.
//!
//! The prompts ask for bare CSV, but models still wrap answers in Markdown
//! code fences now and then. Rules run in order:
//!
//! 1. Drop every ` ```csv ` marker (and one newline after it)
//! 2. Drop every remaining ` ``` ` marker (and one newline after it)
//! 3. Strip leading/trailing newlines
//! 4. Trim surrounding whitespace
//!
//! Matching is case-sensitive: ` ```CSV ` loses its backticks in rule 2 but
//! keeps the `CSV` tag.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CSV_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```csv\n?").unwrap());

static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\n?").unwrap());

/// Apply all cleanup rules to raw model text.
pub fn clean_model_output(input: &str) -> String {
    let s = RE_CSV_FENCE.replace_all(input, "");
    let s = RE_FENCE.replace_all(&s, "");

    s.trim_matches('\n').trim().to_string()
}
