///
/// Standard HTTP headers for checks.
///
/// `headers()` hands checks the header set they should send with their own
/// HTTP requests. The agent version in `User-Agent` comes from the host's
/// `get_version` callback when bound, otherwise from configuration.
///

use rtbridge_std_core::{Dict, Value};

pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const ACCEPT: &str = "text/html, */*";

/// Build the header dictionary in its canonical key order
pub fn build_headers(product: &str, version: &str, http_host: Option<&str>) -> Dict {
    let mut headers = Dict::new();
    headers.insert(
        "User-Agent".into(),
        Value::from(format!("{}/{}", product, version)),
    );
    headers.insert("Content-Type".into(), Value::str(CONTENT_TYPE));
    headers.insert("Accept".into(), Value::str(ACCEPT));
    if let Some(host) = http_host {
        headers.insert("Host".into(), Value::str(host));
    }
    headers
}

/// One `Key: value` line per header, for display
pub fn render(headers: &Dict) -> String {
    headers
        .iter()
        .map(|(key, value)| match value {
            Value::Str(s) => format!("{}: {}", key, s),
            other => format!("{}: {}", key, other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_set() {
        let headers = build_headers("Datadog Agent", "7.50.0", None);
        insta::assert_snapshot!(render(&headers), @r"
        User-Agent: Datadog Agent/7.50.0
        Content-Type: application/x-www-form-urlencoded
        Accept: text/html, */*
        ");
    }

    #[test]
    fn test_host_header_appended_last() {
        let headers = build_headers("Datadog Agent", "7.50.0", Some("localhost:8080"));
        assert_eq!(headers.len(), 4);
        let (last_key, last_value) = headers.last().unwrap();
        assert_eq!(last_key.as_str(), "Host");
        assert_eq!(last_value, &Value::str("localhost:8080"));
    }
}
