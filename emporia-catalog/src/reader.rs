use async_trait::async_trait;
use uuid::Uuid;

use crate::product::Product;

/// One product's share of a checkout, to be taken from stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockClaim {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Read access to the catalog, plus the one write this core performs:
/// taking purchased quantities out of stock.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, CatalogError>;

    /// Decrement stock for every claim, all-or-nothing.
    ///
    /// A claim that would push stock below zero fails the whole batch with
    /// `InsufficientStock` and leaves every product untouched.
    async fn decrement_stock(&self, claims: &[StockClaim]) -> Result<(), CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    NotFound(Uuid),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("catalog storage failure: {0}")]
    Storage(String),
}
