/// OpenFoodFacts API client.
///
/// - Barcode lookup: `GET {base}/api/v2/product/{barcode}.json`
/// - Text search:    `GET {base}/api/v2/search?search_terms=..&page_size=..&fields=..`
///
/// Responses are handed back as raw, untyped products.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use super::{FoodDatabase, FoodDbError};
use crate::config::FoodDbConfig;
use crate::records::raw::{RawProduct, RawSearchPage};

/// Product fields requested from the search endpoint.
pub const SEARCH_FIELDS: &str =
    "product_name,nutriments,code,brands,image_url,serving_size,nutriscore_grade,nova_group";

/// Largest page size accepted by [`OpenFoodFactsClient::search`].
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct OpenFoodFactsClient {
    client: Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    /// Build a client from configuration; the User-Agent is sent on every request.
    pub fn new(config: &FoodDbConfig) -> Result<Self, FoodDbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FoodDbError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, FoodDbError> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FoodDbError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FoodDbError::Status {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        resp.json()
            .await
            .map_err(|e| FoodDbError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FoodDatabase for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> Result<Option<RawProduct>, FoodDbError> {
        let barcode = barcode.trim();
        if barcode.is_empty() || !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(FoodDbError::InvalidInput(format!(
                "barcode must be non-empty and alphanumeric: {barcode:?}"
            )));
        }

        let url = format!("{}/api/v2/product/{barcode}.json", self.base_url);
        let mut body = match self.get_json(&url, &[]).await {
            Ok(body) => body,
            Err(FoodDbError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                info!("Product not found for barcode {barcode}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        // OpenFoodFacts signals a miss with `status: 0` and no product.
        let found = body.get("status").and_then(Value::as_i64) != Some(0);
        match body.get_mut("product").map(Value::take) {
            Some(product @ Value::Object(_)) if found => Ok(Some(RawProduct::from_value(product))),
            _ => {
                info!("Product not found for barcode {barcode}");
                Ok(None)
            }
        }
    }

    async fn search(&self, query: &str, page_size: u32) -> Result<RawSearchPage, FoodDbError> {
        if query.trim().is_empty() {
            return Err(FoodDbError::InvalidInput("search query cannot be empty".into()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(FoodDbError::InvalidInput(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let url = format!("{}/api/v2/search", self.base_url);
        let page_size = page_size.to_string();
        let body = self
            .get_json(
                &url,
                &[
                    ("search_terms", query),
                    ("page_size", &page_size),
                    ("fields", SEARCH_FIELDS),
                ],
            )
            .await?;

        let page = RawSearchPage::from_value(body);
        info!("Search {query:?} returned {} products", page.products.len());
        Ok(page)
    }
}
