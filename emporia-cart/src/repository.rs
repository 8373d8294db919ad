use async_trait::async_trait;
use emporia_shared::OwnerKey;
use uuid::Uuid;

use crate::models::CartLineItem;

/// Storage primitives for cart lines.
///
/// Two implementations exist: a server-persisted store for authenticated
/// carts and a session-keyed key-value store for anonymous carts. Callers
/// pick one based on authentication state; the semantics layered on top
/// (`CartStore`, `CartMergeResolver`) are identical for both.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn list(&self, owner: &OwnerKey) -> Result<Vec<CartLineItem>, CartError>;

    async fn find(&self, owner: &OwnerKey, line_id: Uuid) -> Result<Option<CartLineItem>, CartError>;

    async fn find_by_product(
        &self,
        owner: &OwnerKey,
        product_id: Uuid,
    ) -> Result<Option<CartLineItem>, CartError>;

    async fn insert(&self, line: CartLineItem) -> Result<CartLineItem, CartError>;

    /// Overwrite the stored quantity of an existing line.
    async fn set_quantity(
        &self,
        owner: &OwnerKey,
        line_id: Uuid,
        quantity: i64,
    ) -> Result<(), CartError>;

    /// Returns whether a line was actually removed.
    async fn delete(&self, owner: &OwnerKey, line_id: Uuid) -> Result<bool, CartError>;

    /// Drop every line for the owner. Idempotent.
    async fn clear(&self, owner: &OwnerKey) -> Result<(), CartError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("cart item not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cart storage failure: {0}")]
    Storage(String),
}

impl From<emporia_catalog::CatalogError> for CartError {
    fn from(err: emporia_catalog::CatalogError) -> Self {
        match err {
            emporia_catalog::CatalogError::NotFound(id) => {
                Self::NotFound(format!("product {}", id))
            }
            emporia_catalog::CatalogError::InsufficientStock { product_id, .. } => {
                // Carts never claim stock; surfacing this means a misuse upstream.
                Self::Storage(format!("unexpected stock claim for product {}", product_id))
            }
            emporia_catalog::CatalogError::Storage(msg) => Self::Storage(msg),
        }
    }
}
