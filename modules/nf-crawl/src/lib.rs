use async_trait::async_trait;
use nf_common::AdapterErrorKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct CrawlOne {
    pub title: String,
    pub content: String,
    pub ok: bool,
}

#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub url: String,
    pub outcome: Result<CrawlOne, AdapterErrorKind>,
    pub cost_usd: f64,
}

#[derive(Debug, Clone)]
pub struct DiscoveredLink {
    pub url: String,
    pub title: String,
}

/// `crawl_one`, `crawl_many` with bounded parallelism/politeness delay,
/// and `discover` for board-style listing pages. Paywall detection:
/// text shorter than `paywall_min_chars` is reported as `Paywalled`.
#[async_trait]
pub trait CrawlAdapter: Send + Sync {
    async fn crawl_one(&self, url: &str) -> (Result<CrawlOne, AdapterErrorKind>, f64);

    async fn crawl_many(&self, urls: &[String], parallelism: usize, delay_between_ms: u64) -> Vec<CrawlResult>;

    async fn discover(&self, board_url: &str, max_urls: usize) -> (Result<Vec<DiscoveredLink>, AdapterErrorKind>, f64);
}

pub struct HttpCrawlAdapter {
    http: reqwest::Client,
    paywall_min_chars: usize,
}

impl HttpCrawlAdapter {
    pub fn new(paywall_min_chars: usize) -> Self {
        Self { http: reqwest::Client::new(), paywall_min_chars }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, AdapterErrorKind> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AdapterErrorKind::Timeout
            } else {
                AdapterErrorKind::Upstream5xx
            }
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AdapterErrorKind::Upstream5xx);
        }
        if status.is_client_error() {
            return Err(AdapterErrorKind::Upstream4xx);
        }

        response.text().await.map_err(|_| AdapterErrorKind::Parse)
    }
}

fn extract_title(html: &str) -> String {
    html.split("<title>").nth(1).and_then(|rest| rest.split("</title>").next()).unwrap_or_default().trim().to_string()
}

fn extract_text(html: &str) -> String {
    nf_common::text::strip_markup(html)
}

#[async_trait]
impl CrawlAdapter for HttpCrawlAdapter {
    async fn crawl_one(&self, url: &str) -> (Result<CrawlOne, AdapterErrorKind>, f64) {
        match self.fetch_text(url).await {
            Ok(html) => {
                let content = extract_text(&html);
                if content.chars().count() < self.paywall_min_chars {
                    (Err(AdapterErrorKind::Paywalled), 0.001)
                } else {
                    (Ok(CrawlOne { title: extract_title(&html), content, ok: true }), 0.001)
                }
            }
            Err(kind) => (Err(kind), 0.001),
        }
    }

    async fn crawl_many(&self, urls: &[String], parallelism: usize, delay_between_ms: u64) -> Vec<CrawlResult> {
        let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
        let mut handles = Vec::new();

        for (i, url) in urls.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let delay = Duration::from_millis(delay_between_ms * i as u64 / parallelism.max(1) as u64);
            let this_url = url.clone();
            let client = self.http.clone();
            let paywall_min_chars = self.paywall_min_chars;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore not closed");
                tokio::time::sleep(delay).await;

                let adapter = HttpCrawlAdapter { http: client, paywall_min_chars };
                let (outcome, cost_usd) = adapter.crawl_one(&this_url).await;
                CrawlResult { url: this_url, outcome, cost_usd }
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(result) = handle.await {
                results.push(result);
            }
        }
        results
    }

    async fn discover(&self, board_url: &str, max_urls: usize) -> (Result<Vec<DiscoveredLink>, AdapterErrorKind>, f64) {
        match self.fetch_text(board_url).await {
            Ok(html) => {
                let links = parse_links(&html, board_url).into_iter().take(max_urls).collect();
                (Ok(links), 0.001)
            }
            Err(kind) => (Err(kind), 0.001),
        }
    }
}

fn parse_links(html: &str, base_url: &str) -> Vec<DiscoveredLink> {
    let mut links = Vec::new();
    for chunk in html.split("<a ").skip(1) {
        let Some(href_start) = chunk.find("href=\"") else { continue };
        let after = &chunk[href_start + 6..];
        let Some(href_end) = after.find('"') else { continue };
        let href = &after[..href_end];

        let title_start = chunk.find('>').map(|i| i + 1).unwrap_or(0);
        let title_end = chunk[title_start..].find("</a>").map(|i| title_start + i).unwrap_or(chunk.len());
        let title = nf_common::text::strip_markup(&chunk[title_start..title_end]);

        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), href)
        };

        links.push(DiscoveredLink { url, title });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_title_reads_between_tags() {
        assert_eq!(extract_title("<html><title>Hello</title></html>"), "Hello");
    }

    #[test]
    fn parse_links_extracts_href_and_text() {
        let html = r#"<div><a href="https://x.test/a">First</a><a href="/b">Second</a></div>"#;
        let links = parse_links(html, "https://x.test");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://x.test/a");
        assert_eq!(links[1].url, "https://x.test/b");
    }
}
