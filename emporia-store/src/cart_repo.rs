use async_trait::async_trait;
use emporia_cart::{CartError, CartLineItem, CartRepository};
use emporia_shared::OwnerKey;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Server-persisted cart store, used for authenticated carts.
///
/// A UNIQUE (owner, product_id) constraint backs the one-line-per-product
/// rule at the storage layer.
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage(err: sqlx::Error) -> CartError {
    CartError::Storage(err.to_string())
}

fn line_from_row(owner: &OwnerKey, row: &PgRow) -> Result<CartLineItem, CartError> {
    Ok(CartLineItem {
        id: row.try_get("id").map_err(storage)?,
        owner: owner.clone(),
        product_id: row.try_get("product_id").map_err(storage)?,
        quantity: row.try_get("quantity").map_err(storage)?,
        created_at: row.try_get("created_at").map_err(storage)?,
        updated_at: row.try_get("updated_at").map_err(storage)?,
    })
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn list(&self, owner: &OwnerKey) -> Result<Vec<CartLineItem>, CartError> {
        let rows = sqlx::query(
            "SELECT id, product_id, quantity, created_at, updated_at \
             FROM cart_items WHERE owner = $1 ORDER BY created_at",
        )
        .bind(owner.storage_key())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(|row| line_from_row(owner, row)).collect()
    }

    async fn find(&self, owner: &OwnerKey, line_id: Uuid) -> Result<Option<CartLineItem>, CartError> {
        let row = sqlx::query(
            "SELECT id, product_id, quantity, created_at, updated_at \
             FROM cart_items WHERE owner = $1 AND id = $2",
        )
        .bind(owner.storage_key())
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(|row| line_from_row(owner, row)).transpose()
    }

    async fn find_by_product(
        &self,
        owner: &OwnerKey,
        product_id: Uuid,
    ) -> Result<Option<CartLineItem>, CartError> {
        let row = sqlx::query(
            "SELECT id, product_id, quantity, created_at, updated_at \
             FROM cart_items WHERE owner = $1 AND product_id = $2",
        )
        .bind(owner.storage_key())
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(|row| line_from_row(owner, row)).transpose()
    }

    async fn insert(&self, line: CartLineItem) -> Result<CartLineItem, CartError> {
        sqlx::query(
            "INSERT INTO cart_items (id, owner, product_id, quantity, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(line.id)
        .bind(line.owner.storage_key())
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.created_at)
        .bind(line.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(line)
    }

    async fn set_quantity(
        &self,
        owner: &OwnerKey,
        line_id: Uuid,
        quantity: i64,
    ) -> Result<(), CartError> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = $1, updated_at = NOW() \
             WHERE owner = $2 AND id = $3",
        )
        .bind(quantity)
        .bind(owner.storage_key())
        .bind(line_id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(CartError::NotFound(line_id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, owner: &OwnerKey, line_id: Uuid) -> Result<bool, CartError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE owner = $1 AND id = $2")
            .bind(owner.storage_key())
            .bind(line_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, owner: &OwnerKey) -> Result<(), CartError> {
        sqlx::query("DELETE FROM cart_items WHERE owner = $1")
            .bind(owner.storage_key())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }
}
