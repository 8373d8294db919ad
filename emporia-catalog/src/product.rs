use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product as seen by the cart/order core.
///
/// The catalog is owned elsewhere; this core reads it for pricing and
/// availability and only ever writes the stock column, inside checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock: i64,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: Decimal, stock: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sku: sku.into(),
            price,
            stock,
            is_active: true,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
