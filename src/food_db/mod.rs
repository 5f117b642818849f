/// Food database access.
///
/// The pipeline only ever sees [`RawProduct`]s coming out of this module;
/// turning them into canonical records is the normalizer's job.
pub mod openfoodfacts;

use async_trait::async_trait;
use thiserror::Error;

use crate::records::raw::{RawProduct, RawSearchPage};

/// Errors that can occur while querying the food database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoodDbError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("food database returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Trait for food database clients.
#[async_trait]
pub trait FoodDatabase: Send + Sync {
    /// Look up a product by barcode. `Ok(None)` means "no such product",
    /// which is not an error.
    async fn lookup(&self, barcode: &str) -> Result<Option<RawProduct>, FoodDbError>;

    /// Full-text search, returning at most `page_size` products.
    async fn search(&self, query: &str, page_size: u32) -> Result<RawSearchPage, FoodDbError>;
}
