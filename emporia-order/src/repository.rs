use async_trait::async_trait;
use emporia_cart::CartError;
use emporia_catalog::{CatalogError, StockClaim};
use emporia_shared::OwnerKey;
use uuid::Uuid;

use crate::models::{Address, Order};

/// Durable order storage.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist the order with its frozen lines, take the claimed quantities
    /// out of stock, and clear the source cart — as one all-or-nothing unit.
    /// No side effect may remain visible if any step fails.
    async fn commit_checkout(
        &self,
        order: &Order,
        claims: &[StockClaim],
        clear_owner: &OwnerKey,
    ) -> Result<(), OrderError>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>, OrderError>;

    /// All orders for an account, newest first.
    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Order>, OrderError>;

    /// Persist the mutable tail of an order: status, status timestamps,
    /// updated_at. Everything else is immutable and must not be touched.
    async fn save_status(&self, order: &Order) -> Result<(), OrderError>;
}

/// Read access to the external address store. Orders reference addresses by
/// id; the snapshot is only used to populate responses.
#[async_trait]
pub trait AddressReader: Send + Sync {
    async fn get_address(&self, id: Uuid) -> Result<Option<Address>, OrderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid order state: {0}")]
    InvalidState(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("order storage failure: {0}")]
    Storage(String),
}

impl From<CatalogError> for OrderError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::NotFound(format!("product {}", id)),
            CatalogError::InsufficientStock {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            CatalogError::Storage(msg) => Self::Storage(msg),
        }
    }
}

impl From<CartError> for OrderError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotFound(what) => Self::NotFound(what),
            CartError::InvalidInput(msg) => Self::InvalidInput(msg),
            CartError::Storage(msg) => Self::Storage(msg),
        }
    }
}
