//! Google Books catalog implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::catalog::{validate_query, CatalogClient, CatalogError};
use crate::config::CatalogConfig;
use crate::models::{BookRecord, BookRecordBuilder};
use crate::utils::HttpClient;

/// Google Books catalog
///
/// Uses the public `volumes` search endpoint; no API key is required.
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    http: HttpClient,
    base_url: Url,
}

impl GoogleBooksClient {
    /// Create a client for the public Google Books API
    pub fn new() -> Result<Self, CatalogError> {
        Self::from_config(&CatalogConfig::default())
    }

    /// Create a client from catalog configuration
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let http = HttpClient::from_config(config)?;
        Self::with_client(http, &config.base_url)
    }

    /// Create a client with an existing HTTP client and base URL
    pub fn with_client(http: HttpClient, base_url: &str) -> Result<Self, CatalogError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
        })
    }

    /// Build the search URL for a query.
    ///
    /// The query goes in verbatim apart from the escaping `Url` applies to
    /// query strings (spaces, quotes, `#`, `<`, `>`); an `&` in the query
    /// still splits it into separate parameters.
    pub fn volumes_url(&self, query: &str) -> Result<Url, CatalogError> {
        let mut url = self.base_url.join("volumes")?;
        url.set_query(Some(&format!("q={}", query)));
        Ok(url)
    }
}

#[async_trait]
impl CatalogClient for GoogleBooksClient {
    fn id(&self) -> &str {
        "google_books"
    }

    fn name(&self) -> &str {
        "Google Books"
    }

    async fn search(&self, query: &str) -> Result<Vec<BookRecord>, CatalogError> {
        let query = validate_query(query)?;
        let url = self.volumes_url(query)?;
        tracing::debug!("Searching Google Books: {}", url);

        let response = self
            .http
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(format!("Failed to search Google Books: {}", e)))?;

        if !response.status().is_success() {
            return Err(CatalogError::Api(format!(
                "Google Books API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(format!("Failed to read response: {}", e)))?;

        let books = parse_volumes(&body)?;
        tracing::info!("Found {} books for \"{}\"", books.len(), query);
        Ok(books)
    }
}

/// Parse a `volumes` search response body.
///
/// Fails only when the body is not a JSON object. A missing `items` array
/// yields no books; items that are not objects are skipped; every other
/// field falls back to empty/zero on its own.
pub fn parse_volumes(body: &str) -> Result<Vec<BookRecord>, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(CatalogError::Parse(
            "Expected a JSON object at the top level".to_string(),
        ));
    }

    let response: VolumesResponse = serde_json::from_value(value)?;
    let books = response
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<GbItem>(item) {
            Ok(item) => Some(item.into_record()),
            Err(e) => {
                tracing::debug!("Skipping malformed volume: {}", e);
                None
            }
        })
        .collect();

    Ok(books)
}

/// Deserialize a field, turning a wrong type into `None` instead of an error.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// ===== Google Books API Types =====

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default, deserialize_with = "lenient")]
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GbItem {
    #[serde(default, deserialize_with = "lenient")]
    volume_info: Option<GbVolumeInfo>,
    #[serde(default, deserialize_with = "lenient")]
    sale_info: Option<GbSaleInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GbVolumeInfo {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    authors: Option<Vec<serde_json::Value>>,
    #[serde(default, deserialize_with = "lenient")]
    publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    published_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    page_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    image_links: Option<GbImageLinks>,
    #[serde(default, deserialize_with = "lenient")]
    preview_link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    info_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GbImageLinks {
    #[serde(default, deserialize_with = "lenient")]
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GbSaleInfo {
    #[serde(default, deserialize_with = "lenient")]
    buy_link: Option<String>,
}

impl GbItem {
    fn into_record(self) -> BookRecord {
        let info = self.volume_info.unwrap_or_default();

        let authors: Vec<String> = info
            .authors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| match a {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect();

        let page_count = info
            .page_count
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);

        let thumbnail = info
            .image_links
            .and_then(|links| links.thumbnail)
            .unwrap_or_default();

        let buy_link = self
            .sale_info
            .and_then(|sale| sale.buy_link)
            .unwrap_or_default();

        BookRecordBuilder::new(info.title.unwrap_or_default())
            .subtitle(info.subtitle.unwrap_or_default())
            .authors(authors)
            .publisher(info.publisher.unwrap_or_default())
            .published_date(info.published_date.unwrap_or_default())
            .description(info.description.unwrap_or_default())
            .page_count(page_count)
            .thumbnail(thumbnail)
            .preview_link(info.preview_link.unwrap_or_default())
            .info_link(info.info_link.unwrap_or_default())
            .buy_link(buy_link)
            .build()
    }
}
