//! HTTP fetch with rate limiting, timeout, and 404/plain-text classification
//! (spec §4.2).

use crate::page_url::PageUrl;
use crate::rate_limiter::RateLimiter;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "llmstxt-forge/0.1 (+https://github.com/; documentation crawler)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Ok {
        body: String,
        content_type: String,
        is_plain_text: bool,
    },
    NotFound,
    Transient(String),
    Cancelled,
}

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl Fetcher {
    pub fn new(limiter: Arc<RateLimiter>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .redirect(reqwest::redirect::Policy::default())
            .build()?;
        Ok(Self { client, limiter })
    }

    /// HEAD `url`, returning whether it answered with a 2xx status. Used by
    /// Discovery's candidate validation; still gated by the rate limiter
    /// since it is a network suspension point (spec §5).
    pub async fn head_ok(&self, url: &PageUrl) -> bool {
        if !self.limiter.acquire().await {
            return false;
        }
        matches!(self.client.head(url.as_str()).send().await, Ok(r) if r.status().is_success())
    }

    pub async fn fetch(&self, url: &PageUrl) -> FetchOutcome {
        if !self.limiter.acquire().await {
            return FetchOutcome::Cancelled;
        }

        let response = match self
            .client
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,*/*")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return FetchOutcome::Transient(e.to_string()),
        };

        let status = response.status();
        if status.as_u16() == 404 {
            log::warn!("404 Not Found: {url}");
            return FetchOutcome::NotFound;
        }
        if !status.is_success() {
            return FetchOutcome::Transient(format!("HTTP {status}"));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return FetchOutcome::Transient(e.to_string()),
        };

        let is_plain_text =
            content_type.starts_with("text/plain") || url.path().ends_with(".txt");

        FetchOutcome::Ok {
            body,
            content_type,
            is_plain_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_200_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>hi</html>")
            .create_async()
            .await;

        let limiter = Arc::new(RateLimiter::new(1000.0, 5.0));
        let fetcher = Fetcher::new(limiter).unwrap();
        let url = PageUrl::parse(&format!("{}/page", server.url())).unwrap();
        match fetcher.fetch(&url).await {
            FetchOutcome::Ok { body, is_plain_text, .. } => {
                assert_eq!(body, "<html>hi</html>");
                assert!(!is_plain_text);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_404_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", "/missing").with_status(404).create_async().await;

        let limiter = Arc::new(RateLimiter::new(1000.0, 5.0));
        let fetcher = Fetcher::new(limiter).unwrap();
        let url = PageUrl::parse(&format!("{}/missing", server.url())).unwrap();
        assert_eq!(fetcher.fetch(&url).await, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn fetch_500_is_transient() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", "/broken").with_status(500).create_async().await;

        let limiter = Arc::new(RateLimiter::new(1000.0, 5.0));
        let fetcher = Fetcher::new(limiter).unwrap();
        let url = PageUrl::parse(&format!("{}/broken", server.url())).unwrap();
        assert!(matches!(fetcher.fetch(&url).await, FetchOutcome::Transient(_)));
    }

    #[tokio::test]
    async fn head_ok_reports_2xx() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/exists").with_status(200).create_async().await;

        let limiter = Arc::new(RateLimiter::new(1000.0, 5.0));
        let fetcher = Fetcher::new(limiter).unwrap();
        let url = PageUrl::parse(&format!("{}/exists", server.url())).unwrap();
        assert!(fetcher.head_ok(&url).await);
    }

    #[tokio::test]
    async fn plain_text_content_type_is_tagged() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/glossary.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("hello")
            .create_async()
            .await;

        let limiter = Arc::new(RateLimiter::new(1000.0, 5.0));
        let fetcher = Fetcher::new(limiter).unwrap();
        let url = PageUrl::parse(&format!("{}/glossary.txt", server.url())).unwrap();
        match fetcher.fetch(&url).await {
            FetchOutcome::Ok { is_plain_text, .. } => assert!(is_plain_text),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
