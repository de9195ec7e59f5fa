//! Endpoint URL helpers.

use reqwest::Url;

/// Normalize an endpoint URL by trimming whitespace and trailing slashes.
///
/// # Examples
///
/// ```
/// use ultron::utils::url::normalize_endpoint;
///
/// assert_eq!(normalize_endpoint("https://api.example.com/ultron"), "https://api.example.com/ultron");
/// assert_eq!(normalize_endpoint(" https://api.example.com/ultron/// "), "https://api.example.com/ultron");
/// ```
pub fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

/// Check that `endpoint` is an absolute http(s) URL and return it normalized.
pub fn validate_endpoint(endpoint: &str) -> Result<String, String> {
    let normalized = normalize_endpoint(endpoint);
    let url = Url::parse(&normalized).map_err(|e| format!("Invalid endpoint '{endpoint}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(normalized),
        other => Err(format!(
            "Invalid endpoint '{endpoint}': unsupported scheme '{other}' (expected http or https)"
        )),
    }
}
