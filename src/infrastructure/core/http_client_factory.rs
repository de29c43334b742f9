use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

/// Yahoo rejects requests without a browser-like user agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stocksight/0.3";

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware
    pub fn create_client() -> ClientWithMiddleware {
        // Exponential backoff, max 3 retries on transient failures (5xx, timeouts)
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Builds a URL with percent-encoded query parameters.
/// reqwest-middleware does not expose `.query()`, so the query goes into the URL.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k.as_ref(), v.as_ref());
        }
    }

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_values() {
        let url = build_url_with_query(
            "https://newsapi.org/v2/everything",
            &[("q", "(\"Apple Inc.\" OR AAPL)"), ("pageSize", "50")],
        )
        .unwrap();

        assert!(url.starts_with("https://newsapi.org/v2/everything?q="));
        assert!(url.contains("pageSize=50"));
        assert!(!url.contains(' '));
        assert!(!url.contains('"'));
    }

    #[test]
    fn test_build_url_keeps_existing_query() {
        let url = build_url_with_query("https://example.com/chart?lang=en", &[("range", "6mo")])
            .unwrap();
        assert_eq!(url, "https://example.com/chart?lang=en&range=6mo");
    }

    #[test]
    fn test_build_url_without_params() {
        let params: [(&str, &str); 0] = [];
        let url = build_url_with_query("https://example.com/chart/AAPL", &params).unwrap();
        assert_eq!(url, "https://example.com/chart/AAPL");
    }

    #[test]
    fn test_build_url_rejects_garbage() {
        assert!(build_url_with_query("not a url", &[("a", "b")]).is_err());
    }
}
