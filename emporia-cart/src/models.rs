use chrono::{DateTime, Utc};
use emporia_shared::OwnerKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product in a cart. Unique per (owner, product): a repeated add
/// increments the quantity of the existing line instead of creating a second.
///
/// Deliberately price-free — a cart line always prices against the live
/// catalog, so a cart's value can drift until the moment of checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: Uuid,
    pub owner: OwnerKey,
    pub product_id: Uuid,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLineItem {
    pub fn new(owner: OwnerKey, product_id: Uuid, quantity: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Live catalog data joined onto a cart line at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineProduct {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock: i64,
    pub is_active: bool,
    pub image_url: Option<String>,
}

/// A cart line as presented to callers: stored quantity plus whatever the
/// catalog currently says about the product. `product` is `None` when the
/// product has vanished from the catalog — the line is still shown so the
/// owner can decide to drop it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshotLine {
    pub line_item_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub product: Option<LineProduct>,
}

impl CartSnapshotLine {
    /// Current price × quantity, zero for unresolvable products.
    pub fn line_total(&self) -> Decimal {
        self.product
            .as_ref()
            .map(|p| p.price * Decimal::from(self.quantity))
            .unwrap_or(Decimal::ZERO)
    }
}

/// The joined read of a whole cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub owner: OwnerKey,
    pub lines: Vec<CartSnapshotLine>,
    pub subtotal: Decimal,
    pub item_count: i64,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
