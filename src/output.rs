//! Plain-text rendering of search results

use serde_json::Value;

const LABEL_FIELDS: [&str; 4] = ["name", "title", "label", "id"];
const URL_FIELDS: [&str; 4] = ["url", "html_url", "homepage", "link"];
const MAX_LABEL_CHARS: usize = 80;

/// One displayable result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub label: String,
    pub url: Option<String>,
}

/// Flatten a response payload into displayable items
///
/// Arrays yield one item per element, anything else a single item.
/// `null` yields nothing.
pub fn result_items(data: &Value) -> Vec<ResultItem> {
    match data {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(to_item).collect(),
        other => vec![to_item(other)],
    }
}

/// Numbered listing, one result per line
pub fn format_results(data: &Value) -> String {
    let items = result_items(data);
    if items.is_empty() {
        return "No results".to_string();
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match &item.url {
            Some(url) => format!("{:>3}. {}  <{}>", i + 1, item.label, url),
            None => format!("{:>3}. {}", i + 1, item.label),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_item(value: &Value) -> ResultItem {
    ResultItem {
        label: item_label(value),
        url: item_url(value),
    }
}

/// First present of the usual name-like fields, else compact JSON
pub fn item_label(value: &Value) -> String {
    let label = match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => LABEL_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(scalar_text))
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    };
    truncate(&label, MAX_LABEL_CHARS)
}

pub fn item_url(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    URL_FIELDS
        .iter()
        .find_map(|field| map.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_of_objects() {
        let data = json!([
            { "name": "serde", "homepage": "https://serde.rs" },
            { "title": "tokio" }
        ]);

        let items = result_items(&data);
        assert_eq!(
            items,
            vec![
                ResultItem {
                    label: "serde".to_string(),
                    url: Some("https://serde.rs".to_string()),
                },
                ResultItem {
                    label: "tokio".to_string(),
                    url: None,
                },
            ]
        );
    }

    #[test]
    fn test_format_results_numbers_lines() {
        let data = json!([{ "name": "a", "url": "https://a" }, "b"]);
        assert_eq!(format_results(&data), "  1. a  <https://a>\n  2. b");
    }

    #[test]
    fn test_empty_payloads() {
        assert_eq!(format_results(&json!([])), "No results");
        assert_eq!(format_results(&Value::Null), "No results");
    }

    #[test]
    fn test_label_falls_back_to_numeric_id_then_json() {
        assert_eq!(item_label(&json!({ "id": 42 })), "42");
        assert_eq!(item_label(&json!({ "x": 1 })), r#"{"x":1}"#);
        assert_eq!(item_label(&json!(true)), "true");
    }

    #[test]
    fn test_label_prefers_name_over_title() {
        assert_eq!(item_label(&json!({ "title": "t", "name": "n" })), "n");
    }

    #[test]
    fn test_single_object_is_one_item() {
        let items = result_items(&json!({ "name": "only", "html_url": "https://gh" }));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url.as_deref(), Some("https://gh"));
    }

    #[test]
    fn test_long_label_is_truncated() {
        let label = item_label(&json!("x".repeat(200)));
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS);
        assert!(label.ends_with('…'));
    }
}
