use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use emporia_shared::OwnerKey;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::CartLineItem;
use crate::repository::{CartError, CartRepository};

/// In-memory cart store, keyed the same way the redis implementation keys
/// its hashes. Backs tests and single-process deployments.
#[derive(Default)]
pub struct MemoryCartRepository {
    carts: RwLock<HashMap<String, Vec<CartLineItem>>>,
}

impl MemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for MemoryCartRepository {
    async fn list(&self, owner: &OwnerKey) -> Result<Vec<CartLineItem>, CartError> {
        let carts = self.carts.read().await;
        Ok(carts.get(&owner.storage_key()).cloned().unwrap_or_default())
    }

    async fn find(&self, owner: &OwnerKey, line_id: Uuid) -> Result<Option<CartLineItem>, CartError> {
        let carts = self.carts.read().await;
        Ok(carts
            .get(&owner.storage_key())
            .and_then(|lines| lines.iter().find(|l| l.id == line_id).cloned()))
    }

    async fn find_by_product(
        &self,
        owner: &OwnerKey,
        product_id: Uuid,
    ) -> Result<Option<CartLineItem>, CartError> {
        let carts = self.carts.read().await;
        Ok(carts
            .get(&owner.storage_key())
            .and_then(|lines| lines.iter().find(|l| l.product_id == product_id).cloned()))
    }

    async fn insert(&self, line: CartLineItem) -> Result<CartLineItem, CartError> {
        let mut carts = self.carts.write().await;
        carts
            .entry(line.owner.storage_key())
            .or_default()
            .push(line.clone());
        Ok(line)
    }

    async fn set_quantity(
        &self,
        owner: &OwnerKey,
        line_id: Uuid,
        quantity: i64,
    ) -> Result<(), CartError> {
        let mut carts = self.carts.write().await;
        let lines = carts
            .get_mut(&owner.storage_key())
            .ok_or_else(|| CartError::NotFound(line_id.to_string()))?;
        let line = lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CartError::NotFound(line_id.to_string()))?;
        line.quantity = quantity;
        line.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, owner: &OwnerKey, line_id: Uuid) -> Result<bool, CartError> {
        let mut carts = self.carts.write().await;
        if let Some(lines) = carts.get_mut(&owner.storage_key()) {
            let before = lines.len();
            lines.retain(|l| l.id != line_id);
            return Ok(lines.len() != before);
        }
        Ok(false)
    }

    async fn clear(&self, owner: &OwnerKey) -> Result<(), CartError> {
        self.carts.write().await.remove(&owner.storage_key());
        Ok(())
    }
}
