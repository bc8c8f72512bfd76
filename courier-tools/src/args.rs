use std::collections::BTreeMap;

/// Splits `key="value", key2="value2"` text into a key/value map.
///
/// Commas inside double quotes do not split. A segment without `=` is glued
/// onto the previous value with a single space. Every `"` toggles the quoted
/// state; a backslash does not escape a quote, so a value containing `\"`
/// can split in the wrong place. A repeated key keeps its last value.
pub fn parse_assignments(input: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let mut current_key: Option<String> = None;
    let mut current_value: Vec<&str> = Vec::new();

    for segment in split_unquoted_commas(input) {
        let Some((key, value)) = segment.split_once('=') else {
            if current_key.is_some() && !segment.is_empty() {
                current_value.push(segment);
            }
            continue;
        };

        if let Some(key) = current_key.take() {
            params.insert(key, finish_value(&current_value));
            current_value.clear();
        }

        current_key = Some(key.trim().to_string());
        current_value.push(value.trim());
    }

    if let Some(key) = current_key {
        params.insert(key, finish_value(&current_value));
    }

    params
}

fn split_unquoted_commas(input: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (index, ch) in input.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(input[start..index].trim());
                start = index + ch.len_utf8();
            }
            _ => {}
        }
    }
    segments.push(input[start..].trim());
    segments
}

fn finish_value(parts: &[&str]) -> String {
    strip_quotes(&parts.join(" ")).to_string()
}

/// Trims whitespace and any run of surrounding double quotes.
pub fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

/// Reads a free-text tool input that is either a bare query or
/// `query="...", <limit_key>=N` assignments.
pub(crate) fn query_with_limit(input: &str, limit_key: &str) -> (String, Option<u32>) {
    let params = parse_assignments(input);
    match params.get("query") {
        Some(query) => {
            let limit = params
                .get(limit_key)
                .and_then(|value| value.parse::<u32>().ok());
            (query.clone(), limit)
        }
        None => (strip_quotes(input).to_string(), None),
    }
}
