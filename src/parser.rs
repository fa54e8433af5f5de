use crate::types::Finding;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// How much of an unparsable response is kept in the diagnostic log line.
const LOG_SNIPPET_LEN: usize = 400;

/// Parse a raw model response into findings. Total: malformed output of any
/// shape degrades to an empty list, never an error. Recovery stages, tried
/// in order until one yields a JSON object:
/// 1. the first fenced code block that contains an object (markdown-wrapped
///    output),
/// 2. the first top-level `{...}` span anywhere in the text (prose before or
///    after the JSON),
/// 3. the whole text as-is.
pub fn parse_findings(raw: &str) -> Vec<Finding> {
    let candidates = [
        extract_fenced_json(raw),
        extract_brace_span(raw),
        Some(raw.trim().to_string()),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            return match value.get("comments").and_then(Value::as_array) {
                Some(comments) => comments.iter().filter_map(finding_from_value).collect(),
                None => {
                    tracing::warn!(
                        response = %snippet(raw),
                        "model response parsed as JSON but has no comments array"
                    );
                    Vec::new()
                }
            };
        }
    }

    tracing::warn!(
        response = %snippet(raw),
        "failed to parse model response as JSON"
    );
    Vec::new()
}

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

/// Content of the first ``` / ```json fence whose body holds a JSON object.
fn extract_fenced_json(text: &str) -> Option<String> {
    FENCE
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// First top-level `{...}` span, widest match (prose-wrapped responses).
fn extract_brace_span(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| text[start..=end].to_string())
}

/// One element of the `comments` array. Elements are judged individually:
/// a bad line or a missing comment drops that element, not the batch.
fn finding_from_value(value: &Value) -> Option<Finding> {
    let comment = value.get("comment")?.as_str()?.trim();
    if comment.is_empty() {
        return None;
    }

    let line = coerce_line(value.get("line")?)?;
    if line <= 0 {
        return None;
    }

    Some(Finding {
        line,
        comment: comment.to_string(),
    })
}

/// Accept integer lines however the model encoded them: JSON integers,
/// integral floats, or numeric strings.
fn coerce_line(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn snippet(raw: &str) -> &str {
    if raw.len() <= LOG_SNIPPET_LEN {
        return raw;
    }
    let mut end = LOG_SNIPPET_LEN;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{"comments":[{"line":5,"comment":"x"}]}"#;

    #[test]
    fn test_parses_bare_json() {
        let findings = parse_findings(WELL_FORMED);
        assert_eq!(
            findings,
            vec![Finding {
                line: 5,
                comment: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_parses_json_fenced_block() {
        let raw = format!("```json\n{}\n```", WELL_FORMED);
        assert_eq!(parse_findings(&raw).len(), 1);
        assert_eq!(parse_findings(&raw)[0].line, 5);
    }

    #[test]
    fn test_parses_plain_fenced_block() {
        let raw = format!("```\n{}\n```", WELL_FORMED);
        assert_eq!(parse_findings(&raw).len(), 1);
    }

    #[test]
    fn test_parses_prose_wrapped_fence() {
        let raw = "Sure! Here's my review:\n```json\n{\"comments\":[]}\n```\nLet me know!";
        assert_eq!(parse_findings(raw), Vec::new());
    }

    #[test]
    fn test_parses_prose_wrapped_bare_object() {
        let raw = format!("Here you go: {} Hope that helps!", WELL_FORMED);
        assert_eq!(parse_findings(&raw).len(), 1);
    }

    #[test]
    fn test_unparsable_input_yields_empty() {
        assert_eq!(parse_findings("I could not review this file."), Vec::new());
        assert_eq!(parse_findings(""), Vec::new());
        assert_eq!(parse_findings("{{{not json"), Vec::new());
    }

    #[test]
    fn test_missing_comments_array_yields_empty() {
        assert_eq!(parse_findings(r#"{"review":"looks fine"}"#), Vec::new());
    }

    #[test]
    fn test_drops_bad_elements_individually() {
        let raw = r#"{"comments":[
            {"line":3,"comment":"keep"},
            {"line":0,"comment":"non-positive"},
            {"line":-2,"comment":"negative"},
            {"comment":"no line"},
            {"line":9},
            {"line":4,"comment":""},
            {"line":7,"comment":"also keep"}
        ]}"#;
        let findings = parse_findings(raw);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, 3);
        assert_eq!(findings[1].line, 7);
    }

    #[test]
    fn test_coerces_non_integer_lines() {
        let raw = r#"{"comments":[
            {"line":5.0,"comment":"float"},
            {"line":"12","comment":"string"},
            {"line":5.5,"comment":"fractional"}
        ]}"#;
        let findings = parse_findings(raw);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, 5);
        assert_eq!(findings[1].line, 12);
    }

    #[test]
    fn test_extract_fenced_json_ignores_non_object_fences() {
        let raw = "```\nplain code\n```";
        assert_eq!(extract_fenced_json(raw), None);
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let long = "é".repeat(LOG_SNIPPET_LEN);
        let cut = snippet(&long);
        assert!(cut.len() <= LOG_SNIPPET_LEN);
        assert!(long.starts_with(cut));
    }

    #[test]
    fn test_extract_brace_span() {
        assert_eq!(
            extract_brace_span("before {\"a\":1} after").as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(extract_brace_span("no braces"), None);
        assert_eq!(extract_brace_span("} reversed {"), None);
    }
}
