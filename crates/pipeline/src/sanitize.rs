//! Judge reply sanitizer.
//!
//! The scoring prompt demands a bare JSON array, but the judge's reply is
//! untrusted text: it may be wrapped in markdown code fences, padded with
//! prose, cut off mid-array by a token limit, or sprinkled with trailing
//! commas. Repairs are applied in a fixed order:
//!
//! 1. strip a leading code-fence marker (optionally tagged `json`) and a
//!    trailing fence marker
//! 2. slice from the first `[` to the last `]` when both exist in order
//! 3. with only an opening `[`, drop the dangling incomplete trailing
//!    object, strip trailing separators and close the array
//! 4. remove any comma directly preceding `}` or `]`
//!
//! then the result is parsed. A parse failure after all four repairs is a
//! [`SanitizeError`]; the caller falls back to uniform default scores and
//! never retries the judge.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// The judge reply defeated every repair step
#[derive(Error, Debug)]
pub enum SanitizeError {
    /// No `[` anywhere in the reply
    #[error("no JSON array found in judge reply")]
    NoArray,

    /// Still not valid JSON after repair
    #[error("judge reply failed to parse after repair: {0}")]
    Syntax(#[from] serde_json::Error),
}

/// One recovered score entry. Anything but the id may be absent; the
/// ranker supplies the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub id: String,
    pub score: Option<f64>,
    pub reason: Option<String>,
}

/// Recover the score array from a raw judge reply.
///
/// Elements that are not objects, or objects with no usable id, are
/// dropped — an entry we cannot match to a candidate scores nothing.
pub fn sanitize_scores(raw: &str) -> Result<Vec<ScoreEntry>, SanitizeError> {
    let unfenced = strip_code_fences(raw);
    let repaired = repair_array(unfenced)?;
    let cleaned = strip_trailing_separators(&repaired);

    debug!("sanitized judge reply: {} -> {} bytes", raw.len(), cleaned.len());

    let value: Value = serde_json::from_str(&cleaned)?;
    let entries = match value {
        Value::Array(items) => items.iter().filter_map(parse_entry).collect(),
        // repair_array only emits text starting with '['; a valid parse is
        // always an array
        _ => Vec::new(),
    };
    Ok(entries)
}

/// Step 1: peel markdown code fences off both ends.
fn strip_code_fences(text: &str) -> &str {
    let mut out = text.trim();
    if let Some(rest) = out.strip_prefix("```") {
        out = rest.strip_prefix("json").unwrap_or(rest).trim_start();
    }
    if let Some(rest) = out.strip_suffix("```") {
        out = rest.trim_end();
    }
    out
}

/// Steps 2–3: isolate the array span, synthesizing the close bracket when
/// the reply was cut off.
fn repair_array(text: &str) -> Result<String, SanitizeError> {
    let open = text.find('[').ok_or(SanitizeError::NoArray)?;
    match text.rfind(']') {
        Some(close) if close > open => Ok(text[open..=close].to_string()),
        _ => Ok(close_truncated_array(&text[open..])),
    }
}

/// The reply ends mid-array: keep everything through the last complete
/// object, drop the dangling fragment and trailing separators, close.
fn close_truncated_array(text: &str) -> String {
    let body = match text.rfind('}') {
        Some(pos) => &text[..=pos],
        // not even one complete object survived
        None => "[",
    };
    let body = body.trim_end().trim_end_matches(',').trim_end();
    format!("{body}]")
}

/// Step 4: drop any comma whose next non-whitespace character closes a
/// scope. String contents are left alone.
fn strip_trailing_separators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().copied().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some(']' | '}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Tolerant per-element extraction: `id` (or the equivalent `event_id`)
/// as string or number, `score` as number or numeric string, `reason` as
/// string.
fn parse_entry(item: &Value) -> Option<ScoreEntry> {
    let obj = item.as_object()?;

    let id = obj
        .get("id")
        .or_else(|| obj.get("event_id"))
        .and_then(value_to_id)?;
    let score = obj.get("score").and_then(value_to_score);
    let reason = obj
        .get("reason")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ScoreEntry { id, score, reason })
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
