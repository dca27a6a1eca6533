//! Tool-Selection Stage: parsing the model's routing output.
//!
//! The selection call asks the model for a single JSON object such as
//! `{"tool": "get_weather", "args": {"city": "Paris"}}`. Small models
//! wrap that object in prose, whitespace, or markdown fences, so the
//! parser scans for the first JSON object carrying a `"tool"` key and
//! tolerates trailing text. Anything unparseable degrades to "no tool";
//! a malformed routing answer is never an error.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Quick check that the output mentions a tool field at all.
static TOOL_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""tool"\s*:"#).expect("valid regex"));

/// The model's routing decision for one turn: either "no tool" or
/// "invoke this tool with these arguments".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDecision {
    /// Name of the tool to invoke, or `None` for a direct reply.
    pub tool: Option<String>,
    /// String arguments for the tool.
    pub arguments: HashMap<String, String>,
}

impl ToolDecision {
    /// Decision to answer directly, without any tool.
    pub fn no_tool() -> Self {
        Self {
            tool: None,
            arguments: HashMap::new(),
        }
    }

    /// Decision to invoke the named tool.
    pub fn call(tool: impl Into<String>, arguments: HashMap<String, String>) -> Self {
        Self {
            tool: Some(tool.into()),
            arguments,
        }
    }

    pub fn is_no_tool(&self) -> bool {
        self.tool.is_none()
    }

    /// Arguments as a JSON object, the shape `Tool::execute` expects.
    pub fn arguments_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Parse the raw selection output into a [`ToolDecision`].
///
/// Always returns a well-formed decision; malformed input maps to
/// [`ToolDecision::no_tool`].
pub fn parse_decision(raw: &str) -> ToolDecision {
    if !TOOL_KEY_RE.is_match(raw) {
        tracing::debug!("Selection output has no tool field, answering directly");
        return ToolDecision::no_tool();
    }

    let Some(value) = extract_tool_object(raw) else {
        tracing::debug!("Selection output mentioned a tool but had no parseable object");
        return ToolDecision::no_tool();
    };

    let tool = match value.get("tool") {
        Some(serde_json::Value::String(name)) => {
            let name = name.trim();
            if name.is_empty() || name.eq_ignore_ascii_case("none") || name.eq_ignore_ascii_case("null")
            {
                None
            } else {
                Some(name.to_string())
            }
        }
        _ => None,
    };

    let Some(tool) = tool else {
        return ToolDecision::no_tool();
    };

    let mut arguments = HashMap::new();
    if let Some(args) = value.get("args").or_else(|| value.get("arguments"))
        && let Some(obj) = args.as_object()
    {
        for (key, val) in obj {
            arguments.insert(key.clone(), stringify(val));
        }
    }
    // Flat {"tool": ..., "input": ...} shape from smaller models.
    if arguments.is_empty()
        && let Some(input) = value.get("input").or_else(|| value.get("query"))
        && let Some(text) = input.as_str()
        && !text.trim().is_empty()
    {
        arguments.insert("input".to_string(), text.trim().to_string());
    }

    ToolDecision::call(tool, arguments)
}

/// Find the first parseable JSON object containing a `"tool"` key.
///
/// Tries every `{` as a start offset; `serde_json`'s streaming
/// deserializer stops at the end of the object, so trailing prose is
/// ignored for free.
fn extract_tool_object(raw: &str) -> Option<serde_json::Value> {
    for (idx, ch) in raw.char_indices() {
        if ch != '{' {
            continue;
        }
        let mut values = serde_json::Deserializer::from_str(&raw[idx..]).into_iter();
        if let Some(Ok(value)) = values.next() {
            let value: serde_json::Value = value;
            if value.is_object() && value.get("tool").is_some() {
                return Some(value);
            }
        }
    }
    None
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_call() {
        let decision = parse_decision(r#"{"tool": "get_weather", "args": {"city": "Paris"}}"#);
        assert_eq!(decision.tool.as_deref(), Some("get_weather"));
        assert_eq!(decision.arguments.get("city").map(String::as_str), Some("Paris"));
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let raw = "Sure! Here is the routing decision:\n```json\n{\"tool\": \"get_news\", \"args\": {\"topic\": \"markets\"}}\n```\nLet me know if you need anything else.";
        let decision = parse_decision(raw);
        assert_eq!(decision.tool.as_deref(), Some("get_news"));
        assert_eq!(decision.arguments.get("topic").map(String::as_str), Some("markets"));
    }

    #[test]
    fn test_parse_flat_input_shape() {
        let decision = parse_decision(r#"{"tool": "get_search", "input": "rust language"}"#);
        assert_eq!(decision.tool.as_deref(), Some("get_search"));
        assert_eq!(
            decision.arguments.get("input").map(String::as_str),
            Some("rust language")
        );
    }

    #[test]
    fn test_parse_none_tool() {
        assert!(parse_decision(r#"{"tool": "none"}"#).is_no_tool());
        assert!(parse_decision(r#"{"tool": null}"#).is_no_tool());
        assert!(parse_decision(r#"{"tool": ""}"#).is_no_tool());
    }

    #[test]
    fn test_parse_plain_prose_degrades() {
        assert!(parse_decision("I don't think any tool is needed here.").is_no_tool());
    }

    #[test]
    fn test_parse_truncated_json_degrades() {
        assert!(parse_decision(r#"{"tool": "get_weather", "args": {"city""#).is_no_tool());
    }

    #[test]
    fn test_parse_garbled_never_panics() {
        for raw in ["", "{}{}{", "{\"tool\"", "}}}}", "{\"tool\": 42}", "null"] {
            let decision = parse_decision(raw);
            assert!(decision.is_no_tool(), "input {:?} should degrade", raw);
        }
    }

    #[test]
    fn test_parse_leading_whitespace() {
        let decision = parse_decision("\n\n   {\"tool\": \"get_weather\", \"args\": {\"city\": \"Oslo\"}}   ");
        assert_eq!(decision.tool.as_deref(), Some("get_weather"));
    }

    #[test]
    fn test_non_string_arguments_stringified() {
        let decision = parse_decision(r#"{"tool": "get_news", "args": {"topic": "ai", "limit": 5}}"#);
        assert_eq!(decision.arguments.get("limit").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_first_tool_object_wins() {
        let raw = r#"{"tool": "get_weather", "args": {"city": "Paris"}} or maybe {"tool": "get_news"}"#;
        let decision = parse_decision(raw);
        assert_eq!(decision.tool.as_deref(), Some("get_weather"));
    }

    #[test]
    fn test_arguments_json_shape() {
        let decision = parse_decision(r#"{"tool": "get_weather", "args": {"city": "Paris"}}"#);
        assert_eq!(
            decision.arguments_json(),
            serde_json::json!({"city": "Paris"})
        );
    }
}
