//! Wire models for the price server's `/sync` response.

use crate::retailers::RetailerStatus;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One retailer's price for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Retailer display name
    pub supermarket: String,
    /// Price in whole Colombian pesos. Best-price comparison works on this
    /// rounded value, so prices that round to the same peso tie.
    #[serde(deserialize_with = "deserialize_price")]
    pub price: u64,
    /// Product page at the retailer
    pub url: String,
}

impl PriceObservation {
    pub fn new(supermarket: impl Into<String>, price: u64, url: impl Into<String>) -> Self {
        Self { supermarket: supermarket.into(), price, url: url.into() }
    }
}

/// Scrapers report prices as JSON floats (`12900.0`); round to the nearest peso.
fn deserialize_price<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 {
        return Err(de::Error::custom(format!("invalid price: {}", raw)));
    }
    Ok(raw.round() as u64)
}

/// A product grouped by name and size, with every retailer price found for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 1-based grouping index assigned by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Brand derived from the search term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub category: String,
    /// Observations in the order the server emitted them
    pub prices: Vec<PriceObservation>,
}

impl Product {
    /// Number of retailer prices for this product.
    pub fn price_count(&self) -> usize {
        self.prices.len()
    }
}

/// Progress report for a single retailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Retailer name as sent by the server; may be outside the catalog.
    pub retailer: String,
    pub status: RetailerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEntry {
    pub fn new(retailer: impl Into<String>, status: RetailerStatus) -> Self {
        Self { retailer: retailer.into(), status, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Outcome flag of a sync response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    #[serde(other)]
    Error,
}

/// Body of a `/sync` response, for both successful and failed scrapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub status: ResponseStatus,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub results: Vec<Product>,
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: Vec<ProgressEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parses progress entries one at a time; a malformed entry is skipped so the
/// rest of the response still counts.
fn deserialize_progress<'de, D>(deserializer: D) -> Result<Vec<ProgressEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;

    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ProgressEntry>(value.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed progress entry {}: {}", value, e);
                None
            }
        })
        .collect())
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Total number of retailer prices across all products.
    pub fn total_prices(&self) -> usize {
        self.results.iter().map(Product::price_count).sum()
    }
}

/// The product set of the most recent successful sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub products: Vec<Product>,
    /// Search term the products were found for
    pub query: String,
    /// Server timestamp of the scrape
    pub last_update: String,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn total_prices(&self) -> usize {
        self.products.iter().map(Product::price_count).sum()
    }
}
