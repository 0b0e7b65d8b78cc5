use std::sync::Arc;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::models::NewsArticle;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Fetches and extracts data from the public schedule page and the news site.
#[derive(Clone)]
pub struct CampusScraper {
    client: reqwest::Client,
    schedule_url: Arc<Url>,
    news_url: Arc<Url>,
}

impl CampusScraper {
    pub fn new(
        schedule_url: Url,
        news_url: Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            schedule_url: Arc::new(schedule_url),
            news_url: Arc::new(news_url),
        })
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, ScrapeError> {
        let response = self.client.get(url.as_str()).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(body)
    }

    /// Returns the raw booking descriptors from the schedule page, in page order.
    pub async fn fetch_booking_descriptors(&self) -> Result<Vec<String>, ScrapeError> {
        let html = self
            .fetch_html(&self.schedule_url)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "failed to fetch schedule page"))?;
        let descriptors = Self::extract_booking_descriptors(&html);
        tracing::debug!(count = descriptors.len(), "extracted booking descriptors");
        Ok(descriptors)
    }

    /// Reads the `title` attribute of every `div.bookingDiv`, skipping empty ones.
    pub fn extract_booking_descriptors(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let booking_sel = Selector::parse("div.bookingDiv").unwrap();

        document
            .select(&booking_sel)
            .filter_map(|div| div.value().attr("title"))
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub async fn fetch_news(&self) -> Result<Vec<NewsArticle>, ScrapeError> {
        let html = self
            .fetch_html(&self.news_url)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "failed to fetch news page"))?;
        Ok(self.parse_news_html(&html))
    }

    pub fn parse_news_html(&self, html: &str) -> Vec<NewsArticle> {
        let document = Html::parse_document(html);
        let card_sel = Selector::parse("article.news-card").unwrap();
        let title_sel = Selector::parse("div.du-title").unwrap();
        let link_sel = Selector::parse("a").unwrap();

        let mut articles = Vec::new();
        for card in document.select(&card_sel) {
            let Some(container) = card.select(&title_sel).next() else {
                continue;
            };
            let Some(link) = container.select(&link_sel).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let url = match self.news_url.join(href) {
                Ok(url) => url.to_string(),
                Err(err) => {
                    tracing::debug!(error = %err, href, "skipping news link");
                    continue;
                }
            };
            articles.push(NewsArticle {
                title: element_text(&link),
                url,
            });
        }
        articles
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> CampusScraper {
        CampusScraper::new(
            Url::parse("https://schedule.example.com/s.html").unwrap(),
            Url::parse("https://www.du.se").unwrap(),
            "Mozilla/5.0",
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn test_extract_booking_descriptors() {
        let html = r#"
        <html><body>
            <div class="bookingDiv fgDiv clickable2 c-1 r669241" title=" 2026-01-22 10:00 - 12:00 H3LLJ_DITMG, GMI35S_V3NJJ, Handledning, Ulrika Artursson Wissa, Internet, Samtal298 (zoom) ID 669241"></div>
            <div class="bookingDiv" title=""></div>
            <div class="bookingDiv"></div>
            <div class="otherDiv" title="ignored"></div>
            <div class="bookingDiv" title="2026-01-23 08:00 - 10:00, K2"></div>
        </body></html>
        "#;
        let descriptors = CampusScraper::extract_booking_descriptors(html);
        assert_eq!(descriptors.len(), 2);
        assert!(descriptors[0].starts_with(" 2026-01-22 10:00"));
        assert_eq!(descriptors[1], "2026-01-23 08:00 - 10:00, K2");
    }

    #[test]
    fn test_extract_booking_descriptors_empty_page() {
        assert!(CampusScraper::extract_booking_descriptors("<html></html>").is_empty());
    }

    #[test]
    fn test_parse_news_html() {
        let html = r#"
        <html><body>
            <article class="news-card">
                <div class="du-title"><a href="/sv/om-oss/nytt-och-aktuellt/nyhet-1/"> Ny forskning </a></div>
            </article>
            <article class="news-card">
                <div class="du-title"><a href="https://other.example.com/x">Extern <b>nyhet</b></a></div>
            </article>
            <article class="news-card"><div class="du-title"><a>No link</a></div></article>
            <article class="news-card"><p>No title</p></article>
        </body></html>
        "#;
        let articles = scraper().parse_news_html(html);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Ny forskning");
        assert_eq!(
            articles[0].url,
            "https://www.du.se/sv/om-oss/nytt-och-aktuellt/nyhet-1/"
        );
        assert_eq!(articles[1].title, "Externnyhet");
        assert_eq!(articles[1].url, "https://other.example.com/x");
    }
}
