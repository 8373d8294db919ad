use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use emporia_cart::CartRepository;
use emporia_catalog::{CatalogReader, StockClaim};
use emporia_shared::OwnerKey;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Address, Order};
use crate::repository::{AddressReader, OrderError, OrderRepository};

/// In-memory order store backing tests and single-process deployments.
///
/// Checkout commits are all-or-nothing: the stock decrement is the only
/// fallible step and runs first (itself atomic per batch); the order insert
/// and cart clear that follow cannot fail.
pub struct MemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
    catalog: Arc<dyn CatalogReader>,
    carts: Arc<dyn CartRepository>,
}

impl MemoryOrderRepository {
    pub fn new(catalog: Arc<dyn CatalogReader>, carts: Arc<dyn CartRepository>) -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            catalog,
            carts,
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn commit_checkout(
        &self,
        order: &Order,
        claims: &[StockClaim],
        clear_owner: &OwnerKey,
    ) -> Result<(), OrderError> {
        self.catalog.decrement_stock(claims).await?;
        self.orders.write().await.insert(order.id, order.clone());
        self.carts.clear(clear_owner).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| o.account_id == account_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn save_status(&self, order: &Order) -> Result<(), OrderError> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(&order.id)
            .ok_or_else(|| OrderError::NotFound(format!("order {}", order.id)))?;
        stored.status = order.status;
        stored.shipped_at = order.shipped_at;
        stored.delivered_at = order.delivered_at;
        stored.cancelled_at = order.cancelled_at;
        stored.updated_at = order.updated_at;
        Ok(())
    }
}

/// In-memory stand-in for the external address store.
#[derive(Default)]
pub struct MemoryAddressBook {
    addresses: RwLock<HashMap<Uuid, Address>>,
}

impl MemoryAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, address: Address) -> Uuid {
        let id = address.id;
        self.addresses.write().await.insert(id, address);
        id
    }
}

#[async_trait]
impl AddressReader for MemoryAddressBook {
    async fn get_address(&self, id: Uuid) -> Result<Option<Address>, OrderError> {
        Ok(self.addresses.read().await.get(&id).cloned())
    }
}
