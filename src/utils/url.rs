//! URL helpers for building backend endpoints from configured base URLs.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use switchboard::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:11434/"), "http://localhost:11434");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash between them
///
/// # Examples
///
/// ```
/// use switchboard::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:11434/", "/api/generate"),
///     "http://localhost:11434/api/generate"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_removed() {
        assert_eq!(
            normalize_base_url("https://example.openai.azure.com///"),
            "https://example.openai.azure.com"
        );
        assert_eq!(
            normalize_base_url("http://localhost:11434"),
            "http://localhost:11434"
        );
    }

    #[test]
    fn endpoints_join_without_double_slashes() {
        assert_eq!(
            construct_api_url("http://127.0.0.1:11434/", "api/generate"),
            "http://127.0.0.1:11434/api/generate"
        );
        assert_eq!(
            construct_api_url(
                "https://example.openai.azure.com",
                "/openai/deployments/gpt4/chat/completions"
            ),
            "https://example.openai.azure.com/openai/deployments/gpt4/chat/completions"
        );
    }
}
