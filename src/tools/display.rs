//! Display text for server-side tool activity.

/// Text shown while a server tool runs.
///
/// Known tools are described by their primary input field; anything else,
/// or a known tool missing that field, reads `Using <name>...`.
pub fn server_tool_start_text(tool_name: &str, tool_input: &serde_json::Value) -> String {
    let field = |name: &str| {
        tool_input
            .get(name)
            .and_then(serde_json::Value::as_str)
            .filter(|value| !value.trim().is_empty())
    };
    match tool_name {
        "search_web" | "web_search" => match field("query") {
            Some(query) => format!("Searching: \"{query}\"..."),
            None => fallback(tool_name),
        },
        "fetch_url" | "web_fetch" => match field("url") {
            Some(url) => format!("Fetching: {url}..."),
            None => fallback(tool_name),
        },
        _ => fallback(tool_name),
    }
}

fn fallback(tool_name: &str) -> String {
    format!("Using {tool_name}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_uses_query() {
        assert_eq!(
            server_tool_start_text("search_web", &json!({"query": "X"})),
            "Searching: \"X\"..."
        );
    }

    #[test]
    fn fetch_uses_url() {
        assert_eq!(
            server_tool_start_text("web_fetch", &json!({"url": "https://example.com"})),
            "Fetching: https://example.com..."
        );
    }

    #[test]
    fn missing_field_falls_back() {
        assert_eq!(
            server_tool_start_text("search_web", &json!({})),
            "Using search_web..."
        );
        assert_eq!(
            server_tool_start_text("fetch_url", &serde_json::Value::Null),
            "Using fetch_url..."
        );
    }

    #[test]
    fn unknown_tool_falls_back() {
        assert_eq!(
            server_tool_start_text("code_interpreter", &json!({"code": "1+1"})),
            "Using code_interpreter..."
        );
    }
}
