use super::{urls, USER_AGENT, WWW_BASE};
use crate::error::ExtractError;
use crate::pagination::{self, RetryPolicy};
use anyhow::{anyhow, bail, Context, Result};
use catalog_sync_models::{ArtistRef, ExportedRecord, ReleaseRef};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use scraper::{Html, Selector};
use tracing::debug;

/// Session-cookie client for the source's HTML listing pages. The ratings
/// listing is only reachable this way; the token API does not expose it.
pub struct DiscogsHtmlClient {
    client: reqwest::Client,
    username: String,
    per_page: u32,
    retry: RetryPolicy,
}

impl DiscogsHtmlClient {
    pub fn new(cookie: &str, per_page: u32, retry: RetryPolicy) -> Result<Self> {
        let username = username_from_cookie(cookie)
            .ok_or_else(|| anyhow!("Session cookie has no ck_username entry"))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(cookie).context("Cookie is not a valid header value")?,
        );
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            username,
            per_page,
            retry,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Every rated release of the session user, in listing order.
    pub async fn release_ratings(&self) -> Result<Vec<ExportedRecord>> {
        pagination::collect_html_pages(|page| async move {
            let html = self.fetch_ratings_page(page).await?;
            let records = parse_ratings_page(&html)?;
            debug!(page, rows = records.len(), "Parsed ratings page");
            Ok(records)
        })
        .await
    }

    async fn fetch_ratings_page(&self, page: u32) -> Result<String> {
        let url = format!(
            "{}/users/ratings/{}?page={}&limit={}",
            WWW_BASE, self.username, page, self.per_page
        );
        let response = pagination::get_with_backoff(&self.client, &url, &self.retry).await?;
        let status = response.status();
        if !status.is_success() {
            bail!("Ratings page {} returned {}", page, status);
        }
        Ok(response.text().await?)
    }
}

/// The session cookie carries the login name as its `ck_username` pair.
fn username_from_cookie(cookie: &str) -> Option<String> {
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == "ck_username")
        .map(|(_, value)| value.trim().to_string())
}

/// Parse one ratings listing page into records. Rating rows may have zero
/// artist anchors, but a missing release anchor or rating element fails the
/// whole page.
pub fn parse_ratings_page(html: &str) -> Result<Vec<ExportedRecord>, ExtractError> {
    let row_selector = Selector::parse("table.release_list_table tbody tr").unwrap();
    let release_selector = Selector::parse(r#"span.release_title a[href^="/release"]"#).unwrap();
    let artist_selector = Selector::parse(r#"span.release_title a[href^="/artist"]"#).unwrap();
    let rating_selector = Selector::parse("span.rating").unwrap();

    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for (row_index, row) in document.select(&row_selector).enumerate() {
        let release_anchor = row
            .select(&release_selector)
            .next()
            .ok_or(ExtractError::MissingRelease { row: row_index })?;
        let release_path = url_short_form_of(&release_anchor);
        let release = ReleaseRef {
            name: release_anchor.text().collect::<String>().trim().to_string(),
            source_url: format!("{}{}", WWW_BASE, release_path),
            master_url: None,
        };

        let rating_element = row
            .select(&rating_selector)
            .next()
            .ok_or(ExtractError::MissingRating { row: row_index })?;
        let raw_value = rating_element
            .value()
            .attr("data-value")
            .unwrap_or_default()
            .to_string();
        let rating = raw_value.parse::<u8>().map_err(|_| ExtractError::BadRatingValue {
            row: row_index,
            value: raw_value,
        })?;

        let artists = row
            .select(&artist_selector)
            .map(|anchor| ArtistRef {
                name: anchor.text().collect::<String>().trim().to_string(),
                name_variation: None,
                source_url: format!("{}{}", WWW_BASE, url_short_form_of(&anchor)),
            })
            .collect();

        records.push(ExportedRecord {
            artists,
            release,
            rating: Some(rating),
        });
    }

    Ok(records)
}

fn url_short_form_of(anchor: &scraper::ElementRef) -> String {
    urls::url_short_form(anchor.value().attr("href").unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="release_list_table"><tbody>
          <tr>
            <td><span class="release_title">
              <a href="/artist/4531-Boards-Of-Canada">Boards of Canada</a>
              <a href="/release/67913-Geogaddi">Geogaddi</a>
            </span></td>
            <td><span class="rating" data-value="5"></span></td>
          </tr>
          <tr>
            <td><span class="release_title">
              <a href="/release/1000">Untitled</a>
            </span></td>
            <td><span class="rating" data-value="3"></span></td>
          </tr>
        </tbody></table>
        </body></html>
    "#;

    #[test]
    fn parses_rows_with_short_form_urls() {
        let records = parse_ratings_page(PAGE).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.release.name, "Geogaddi");
        assert_eq!(first.release.source_url, "https://www.discogs.com/release/67913");
        assert_eq!(first.rating, Some(5));
        assert_eq!(first.artists.len(), 1);
        assert_eq!(first.artists[0].source_url, "https://www.discogs.com/artist/4531");

        // artist anchors are optional on rating rows
        assert!(records[1].artists.is_empty());
        assert_eq!(records[1].rating, Some(3));
    }

    #[test]
    fn missing_rating_fails_the_page() {
        let page = r#"
            <table class="release_list_table"><tbody>
              <tr><td><span class="release_title">
                <a href="/release/1">X</a>
              </span></td></tr>
            </tbody></table>
        "#;
        let err = parse_ratings_page(page).unwrap_err();
        assert!(matches!(err, ExtractError::MissingRating { row: 0 }));
    }

    #[test]
    fn non_numeric_rating_fails_the_page() {
        let page = r#"
            <table class="release_list_table"><tbody>
              <tr><td><span class="release_title">
                <a href="/release/1">X</a>
              </span>
              <span class="rating" data-value="five"></span></td></tr>
            </tbody></table>
        "#;
        let err = parse_ratings_page(page).unwrap_err();
        assert!(matches!(err, ExtractError::BadRatingValue { .. }));
    }

    #[test]
    fn empty_page_parses_to_no_rows() {
        assert!(parse_ratings_page("<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn username_comes_from_ck_username_pair() {
        let cookie = "sid=abc123; ck_username=record_fan; other=1";
        assert_eq!(username_from_cookie(cookie), Some("record_fan".to_string()));
        assert_eq!(username_from_cookie("sid=abc123"), None);
    }
}
