use std::sync::Arc;

use emporia_catalog::CatalogReader;
use emporia_shared::OwnerKey;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::models::{CartLineItem, CartSnapshot, CartSnapshotLine, LineProduct};
use crate::repository::{CartError, CartRepository};

/// Cart semantics over raw repository primitives: accumulating adds,
/// quantity edits that collapse to removal, and the live-priced snapshot.
pub struct CartStore {
    repo: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogReader>,
}

impl CartStore {
    pub fn new(repo: Arc<dyn CartRepository>, catalog: Arc<dyn CatalogReader>) -> Self {
        Self { repo, catalog }
    }

    /// Join the stored lines with whatever the catalog currently says.
    ///
    /// Never fails for stale lines: a deactivated product still prices, a
    /// vanished one contributes nothing but stays visible so the owner can
    /// remove it. What to do with stale entries is the caller's decision.
    pub async fn snapshot(&self, owner: &OwnerKey) -> Result<CartSnapshot, CartError> {
        let stored = self.repo.list(owner).await?;

        let mut lines = Vec::with_capacity(stored.len());
        let mut subtotal = Decimal::ZERO;
        let mut item_count = 0i64;

        for line in stored {
            let product = self
                .catalog
                .get_product(line.product_id)
                .await?
                .map(|p| LineProduct {
                    name: p.name,
                    sku: p.sku,
                    price: p.price,
                    stock: p.stock,
                    is_active: p.is_active,
                    image_url: p.image_url,
                });

            let snapshot_line = CartSnapshotLine {
                line_item_id: line.id,
                product_id: line.product_id,
                quantity: line.quantity,
                product,
            };

            subtotal += snapshot_line.line_total();
            item_count += line.quantity;
            lines.push(snapshot_line);
        }

        Ok(CartSnapshot {
            owner: owner.clone(),
            lines,
            subtotal,
            item_count,
        })
    }

    /// Put `quantity` of a product into the cart (default 1).
    ///
    /// An existing line for the same product accumulates; the quantity is
    /// added, never replaced.
    pub async fn add_item(
        &self,
        owner: &OwnerKey,
        product_id: Uuid,
        quantity: Option<i64>,
    ) -> Result<CartLineItem, CartError> {
        let quantity = quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(CartError::InvalidInput(format!(
                "quantity must be at least 1, got {}",
                quantity
            )));
        }

        if self.catalog.get_product(product_id).await?.is_none() {
            return Err(CartError::NotFound(format!("product {}", product_id)));
        }

        if let Some(existing) = self.repo.find_by_product(owner, product_id).await? {
            let new_quantity = existing.quantity + quantity;
            self.repo.set_quantity(owner, existing.id, new_quantity).await?;
            debug!(%owner, %product_id, quantity = new_quantity, "cart line accumulated");
            return Ok(CartLineItem {
                quantity: new_quantity,
                ..existing
            });
        }

        let line = self
            .repo
            .insert(CartLineItem::new(owner.clone(), product_id, quantity))
            .await?;
        debug!(%owner, %product_id, quantity, "cart line created");
        Ok(line)
    }

    /// Overwrite a line's quantity. A quantity of zero or less removes the
    /// line, exactly as `remove_item` would.
    pub async fn set_quantity(
        &self,
        owner: &OwnerKey,
        line_id: Uuid,
        quantity: i64,
    ) -> Result<(), CartError> {
        let line = self
            .repo
            .find(owner, line_id)
            .await?
            .ok_or_else(|| CartError::NotFound(line_id.to_string()))?;

        if quantity <= 0 {
            self.repo.delete(owner, line.id).await?;
            debug!(%owner, line_id = %line.id, "cart line removed via zero quantity");
            return Ok(());
        }

        self.repo.set_quantity(owner, line.id, quantity).await
    }

    pub async fn remove_item(&self, owner: &OwnerKey, line_id: Uuid) -> Result<(), CartError> {
        let removed = self.repo.delete(owner, line_id).await?;
        if !removed {
            return Err(CartError::NotFound(line_id.to_string()));
        }
        Ok(())
    }

    /// Always succeeds, present lines or not.
    pub async fn clear(&self, owner: &OwnerKey) -> Result<(), CartError> {
        self.repo.clear(owner).await
    }
}
