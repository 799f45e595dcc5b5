//! Extraction of embedded function calls from free-text replies
//!
//! Simulated providers are told to answer with exactly
//! `{"function_call": {"name": ..., "arguments": {...}}}` when they want a
//! function. Models wrap that object in prose, nest objects inside
//! `arguments`, or merely talk about the format, so extraction is
//! deliberately forgiving: anything that does not decode into a
//! well-formed call is treated as a plain text answer.

use serde_json::Value;

use crate::types::FunctionCall;

/// Literal that opens an embedded call
pub const FUNCTION_CALL_MARKER: &str = "{\"function_call\":";

/// Decode a simulated reply
///
/// Returns `None` when the reply should be used verbatim as text: no
/// marker, unbalanced braces, invalid JSON, or a missing/mistyped
/// `name` or `arguments`.
pub fn extract_function_call(reply: &str) -> Option<FunctionCall> {
    let start = reply.find(FUNCTION_CALL_MARKER)?;
    let candidate = balanced_object(reply, start)?;
    let value: Value = serde_json::from_str(candidate).ok()?;

    let call = value.get("function_call")?;
    let name = call.get("name")?.as_str()?;
    if name.trim().is_empty() {
        return None;
    }
    let arguments = call.get("arguments")?.as_object()?.clone();

    Some(FunctionCall::new(name, arguments))
}

/// Slice of `text` holding the JSON object that opens at byte `start`
///
/// Counts brace depth, ignoring braces inside string literals (including
/// escaped quotes), and stops at the brace that closes the opening one.
fn balanced_object(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_exact_reply() {
        let call = extract_function_call(r#"{"function_call": {"name": "f", "arguments": {"x": 1}}}"#).unwrap();
        assert_eq!(call, FunctionCall::new("f", args(json!({ "x": 1 }))));
    }

    #[test]
    fn test_nested_arguments_are_not_truncated() {
        let reply = r#"{"function_call": {"name": "f", "arguments": {"nested": {"a": 1}}}}"#;
        let call = extract_function_call(reply).unwrap();
        assert_eq!(call.arguments, args(json!({ "nested": { "a": 1 } })));
    }

    #[test]
    fn test_surrounding_prose_is_ignored() {
        let reply = "Sure, let me check.\n{\"function_call\": {\"name\": \"get_weather\", \"arguments\": {\"city\": \"Paris\"}}}\nOne moment.";
        let call = extract_function_call(reply).unwrap();
        assert_eq!(call.name, "get_weather");
        assert_eq!(call.get_arg_str("city"), Some("Paris"));
    }

    #[test]
    fn test_braces_inside_strings() {
        let reply = r#"{"function_call": {"name": "echo", "arguments": {"text": "a } tricky \" { value"}}}"#;
        let call = extract_function_call(reply).unwrap();
        assert_eq!(call.get_arg_str("text"), Some("a } tricky \" { value"));
    }

    #[test]
    fn test_no_marker_is_text() {
        assert_eq!(extract_function_call("The weather in Paris is sunny."), None);
        // Marker must match literally
        assert_eq!(extract_function_call(r#"{ "function_call": {"name": "f", "arguments": {}}}"#), None);
    }

    #[test]
    fn test_unbalanced_braces_are_text() {
        assert_eq!(extract_function_call(r#"I will not call {"function_call": {{{ garbage"#), None);
        assert_eq!(extract_function_call(r#"{"function_call": {"name": "f", "arguments": {"x": 1}}"#), None);
    }

    #[test]
    fn test_invalid_json_is_text() {
        assert_eq!(extract_function_call(r#"{"function_call": {name: f, arguments: {}}}"#), None);
    }

    #[test]
    fn test_missing_or_mistyped_keys_are_text() {
        assert_eq!(extract_function_call(r#"{"function_call": {"arguments": {}}}"#), None);
        assert_eq!(extract_function_call(r#"{"function_call": {"name": "f"}}"#), None);
        assert_eq!(extract_function_call(r#"{"function_call": {"name": "f", "arguments": "{}"}}"#), None);
        assert_eq!(extract_function_call(r#"{"function_call": {"name": 7, "arguments": {}}}"#), None);
        assert_eq!(extract_function_call(r#"{"function_call": {"name": "  ", "arguments": {}}}"#), None);
        assert_eq!(extract_function_call(r#"{"function_call": "f"}"#), None);
    }

    #[test]
    fn test_name_is_returned_as_sent() {
        let call = extract_function_call(r#"{"function_call": {"name": " get_weather", "arguments": {}}}"#).unwrap();
        assert_eq!(call.name, " get_weather");
    }

    #[test]
    fn test_balanced_object_handles_multibyte_text() {
        let text = "préambule {\"function_call\": {\"name\": \"f\", \"arguments\": {\"ville\": \"Zürich\"}}} fin";
        let start = text.find(FUNCTION_CALL_MARKER).unwrap();
        let object = balanced_object(text, start).unwrap();
        assert!(object.starts_with('{') && object.ends_with('}'));
        assert_eq!(extract_function_call(text).unwrap().get_arg_str("ville"), Some("Zürich"));
    }
}
