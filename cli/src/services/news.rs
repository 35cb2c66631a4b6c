use super::sentiment::score_headlines;
use crate::error::NewsError;
use crate::models::{NewsOutcome, Published, ResolvedTicker};
use crate::utils::Timer;
use async_trait::async_trait;
use reqwest::{header, Client};
use rss::Channel;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument};
use url::{form_urlencoded, Url};

/// Only the first entries of a feed are scored.
pub const MAX_ARTICLES: usize = 30;

pub const DEFAULT_NEWS_URL_TEMPLATE: &str = "https://news.google.com/rss/search?q={query}+stock+share+price+Bursa+Malaysia+financial&hl=en-US&gl=US&ceid=US:en";

/// Source of recent, sentiment-scored headlines for a ticker.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn collect(&self, ticker: &ResolvedTicker) -> Result<NewsOutcome, NewsError>;
}

/// Google News RSS search.
pub struct GoogleNewsClient {
    client: Client,
    url_template: String,
}

impl GoogleNewsClient {
    pub fn new() -> Result<Self, NewsError> {
        Self::with_template(DEFAULT_NEWS_URL_TEMPLATE)
    }

    pub fn with_template(url_template: &str) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    /// Substitute the URL-encoded company name for `{query}`.
    pub fn build_url(template: &str, name: &str) -> Result<Url, NewsError> {
        let query: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
        Ok(Url::parse(&template.replace("{query}", &query))?)
    }

    /// Score the first [`MAX_ARTICLES`] entries of an RSS document.
    pub fn parse_feed(content: &[u8]) -> Result<NewsOutcome, NewsError> {
        let channel = Channel::read_from(content)?;
        debug!(entries = channel.items().len(), "Parsed news feed");

        let entries = channel.items().iter().take(MAX_ARTICLES).map(|item| {
            (
                item.title().unwrap_or_default().to_string(),
                Published::from_feed(item.pub_date()),
            )
        });

        Ok(NewsOutcome::from_items(score_headlines(entries)))
    }
}

#[async_trait]
impl NewsProvider for GoogleNewsClient {
    #[instrument(skip(self, ticker), fields(ticker = %ticker.ticker, query = %ticker.display_name))]
    async fn collect(&self, ticker: &ResolvedTicker) -> Result<NewsOutcome, NewsError> {
        let url = Self::build_url(&self.url_template, &ticker.display_name)?;
        let timer = Timer::start("news fetch");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/rss+xml, application/xml, text/xml")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsError::Status(response.status().as_u16()));
        }

        let content = response.bytes().await?;
        let outcome = Self::parse_feed(&content)?;

        info!(
            articles = outcome.len(),
            elapsed_ms = timer.elapsed_ms(),
            "Collected news sentiment"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sentiment::compound;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single request with `status_line` and `body`; returns a feed URL template.
    async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}/rss/search?q={{query}}", addr)
    }

    fn sime() -> ResolvedTicker {
        crate::models::TickerTable::default().resolve("SIME").unwrap()
    }

    fn feed(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>"4197.KL" - Google News</title><link>https://news.google.com</link><description>Google News</description>{}</channel></rss>"#,
            items
        )
    }

    #[test]
    fn test_build_url_encodes_company_name() {
        let url = GoogleNewsClient::build_url(DEFAULT_NEWS_URL_TEMPLATE, "Sime Darby").unwrap();
        assert_eq!(
            url.as_str(),
            "https://news.google.com/rss/search?q=Sime+Darby+stock+share+price+Bursa+Malaysia+financial&hl=en-US&gl=US&ceid=US:en"
        );

        let url = GoogleNewsClient::build_url("https://example.com/rss?q={query}", "AT&T").unwrap();
        assert_eq!(url.query(), Some("q=AT%26T"));
    }

    #[test]
    fn test_parse_feed_scores_titles_and_handles_missing_dates() {
        let content = feed(
            r#"<item><title>Sime Darby posts great profit</title><pubDate>Mon, 14 Oct 2024 07:00:00 GMT</pubDate></item>
<item><title>Plantation stocks slip</title></item>"#,
        );

        let outcome = GoogleNewsClient::parse_feed(content.as_bytes()).unwrap();
        let NewsOutcome::Articles(items) = outcome else {
            panic!("expected articles");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Sime Darby posts great profit");
        assert_eq!(
            items[0].published,
            Published::At("Mon, 14 Oct 2024 07:00:00 GMT".to_string())
        );
        assert_eq!(items[0].sentiment, compound("Sime Darby posts great profit"));
        assert_eq!(items[1].published, Published::Unavailable);
    }

    #[test]
    fn test_parse_feed_caps_entries() {
        let items: String = (0..45)
            .map(|i| format!("<item><title>Headline {}</title></item>", i))
            .collect();
        let outcome = GoogleNewsClient::parse_feed(feed(&items).as_bytes()).unwrap();
        assert_eq!(outcome.len(), MAX_ARTICLES);
    }

    #[test]
    fn test_parse_feed_without_items_is_no_articles() {
        let outcome = GoogleNewsClient::parse_feed(feed("").as_bytes()).unwrap();
        assert_eq!(outcome, NewsOutcome::NoArticles);
    }

    #[tokio::test]
    async fn test_collect_server_error_is_status_failure() {
        let template = serve_once("500 Internal Server Error", String::new()).await;
        let client = GoogleNewsClient::with_template(&template).unwrap();
        let result = client.collect(&sime()).await;
        assert!(matches!(result, Err(NewsError::Status(500))));
    }

    #[tokio::test]
    async fn test_collect_scores_served_feed() {
        let template = serve_once(
            "200 OK",
            feed("<item><title>Sime Darby shares rally</title></item>"),
        )
        .await;
        let client = GoogleNewsClient::with_template(&template).unwrap();
        let outcome = client.collect(&sime()).await.unwrap();
        assert_eq!(outcome.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_empty_feed_is_no_articles() {
        let template = serve_once("200 OK", feed("")).await;
        let client = GoogleNewsClient::with_template(&template).unwrap();
        let outcome = client.collect(&sime()).await.unwrap();
        assert_eq!(outcome, NewsOutcome::NoArticles);
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(GoogleNewsClient::parse_feed(b"<html>not a feed").is_err());
    }
}
