//! The text-marker fallback grammar.
//!
//! Backends without native function calling are instructed (via the
//! system prompt) to emit either
//! `TOOL_CALL: {"tool": "...", "args": {...}}` or `FINAL: <answer>`.
//! String-scanning model output is inherently fragile, so all the
//! failure modes live behind these two parsers: no marker, no opening
//! brace, unbalanced braces, invalid JSON, and wrong shape each yield
//! "no tool call", never an error.

use serde::Deserialize;
use serde_json::Value;

pub const TOOL_CALL_MARKER: &str = "TOOL_CALL:";
pub const FINAL_MARKER: &str = "FINAL:";

/// A tool invocation recovered from marker text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerToolCall {
    pub tool: String,
    pub args: Value,
}

/// Slice out the balanced `{...}` object starting at the first `{` in
/// `text`, counting nested braces. Returns None if no `{` is present
/// or the braces never balance.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Scan `text` for the `TOOL_CALL:` grammar. Absence of a usable call
/// is a normal outcome, not an error.
pub fn parse_tool_call(text: &str) -> Option<MarkerToolCall> {
    let after = &text[text.find(TOOL_CALL_MARKER)? + TOOL_CALL_MARKER.len()..];
    let object = balanced_object(after)?;
    let call: MarkerToolCall = serde_json::from_str(object).ok()?;
    if !call.args.is_object() {
        return None;
    }
    Some(call)
}

/// Scan `text` for a line starting with the `FINAL:` marker;
/// everything after the marker, trimmed, is the answer. Mid-line
/// occurrences (e.g. inside a word) do not count.
pub fn parse_final(text: &str) -> Option<String> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        if line[indent..].starts_with(FINAL_MARKER) {
            let start = offset + indent + FINAL_MARKER.len();
            return Some(text[start..].trim().to_string());
        }
        offset += line.len();
    }
    None
}
