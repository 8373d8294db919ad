use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::product::Product;
use crate::reader::{CatalogError, CatalogReader, StockClaim};

/// In-memory catalog backing tests and single-process deployments.
///
/// All claims of one checkout are applied under a single write guard, so a
/// multi-line decrement is atomic without touching the storage layer.
#[derive(Default)]
pub struct MemoryCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product: Product) -> Uuid {
        let id = product.id;
        self.products.write().await.insert(id, product);
        id
    }

    pub async fn set_price(&self, id: Uuid, price: Decimal) -> Result<(), CatalogError> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        product.price = price;
        product.updated_at = Utc::now();
        Ok(())
    }

    pub async fn rename(&self, id: Uuid, name: impl Into<String>) -> Result<(), CatalogError> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        product.name = name.into();
        product.updated_at = Utc::now();
        Ok(())
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<(), CatalogError> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        product.is_active = false;
        product.updated_at = Utc::now();
        Ok(())
    }

    pub async fn remove(&self, id: Uuid) -> Option<Product> {
        self.products.write().await.remove(&id)
    }

    pub async fn stock_of(&self, id: Uuid) -> Option<i64> {
        self.products.read().await.get(&id).map(|p| p.stock)
    }
}

#[async_trait]
impl CatalogReader for MemoryCatalog {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn decrement_stock(&self, claims: &[StockClaim]) -> Result<(), CatalogError> {
        let mut products = self.products.write().await;

        // Validate every claim before mutating anything.
        for claim in claims {
            let product = products
                .get(&claim.product_id)
                .ok_or(CatalogError::NotFound(claim.product_id))?;
            if product.stock < claim.quantity {
                return Err(CatalogError::InsufficientStock {
                    product_id: claim.product_id,
                    requested: claim.quantity,
                    available: product.stock,
                });
            }
        }

        let now = Utc::now();
        for claim in claims {
            if let Some(product) = products.get_mut(&claim.product_id) {
                product.stock -= claim.quantity;
                product.updated_at = now;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, stock: i64) -> Product {
        Product::new("Widget", "SKU-1", Decimal::from(price), stock)
    }

    #[tokio::test]
    async fn test_get_product_roundtrip() {
        let catalog = MemoryCatalog::new();
        let id = catalog.insert(product(10, 5)).await;

        let found = catalog.get_product(id).await.unwrap().unwrap();
        assert_eq!(found.stock, 5);
        assert!(catalog.get_product(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decrement_takes_exact_quantities() {
        let catalog = MemoryCatalog::new();
        let a = catalog.insert(product(10, 5)).await;
        let b = catalog.insert(product(20, 3)).await;

        catalog
            .decrement_stock(&[
                StockClaim { product_id: a, quantity: 2 },
                StockClaim { product_id: b, quantity: 3 },
            ])
            .await
            .unwrap();

        assert_eq!(catalog.stock_of(a).await, Some(3));
        assert_eq!(catalog.stock_of(b).await, Some(0));
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_batch_untouched() {
        let catalog = MemoryCatalog::new();
        let a = catalog.insert(product(10, 5)).await;
        let b = catalog.insert(product(20, 1)).await;

        let err = catalog
            .decrement_stock(&[
                StockClaim { product_id: a, quantity: 2 },
                StockClaim { product_id: b, quantity: 2 },
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::InsufficientStock { available: 1, .. }));
        // Nothing moved, including the satisfiable claim.
        assert_eq!(catalog.stock_of(a).await, Some(5));
        assert_eq!(catalog.stock_of(b).await, Some(1));
    }
}
