use async_trait::async_trait;
use emporia_catalog::{CatalogError, CatalogReader, Product, StockClaim};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage(err: sqlx::Error) -> CatalogError {
    CatalogError::Storage(err.to_string())
}

fn product_from_row(row: &PgRow) -> Result<Product, CatalogError> {
    Ok(Product {
        id: row.try_get("id").map_err(storage)?,
        name: row.try_get("name").map_err(storage)?,
        sku: row.try_get("sku").map_err(storage)?,
        price: row.try_get("price").map_err(storage)?,
        stock: row.try_get("stock").map_err(storage)?,
        is_active: row.try_get("is_active").map_err(storage)?,
        image_url: row.try_get("image_url").map_err(storage)?,
        created_at: row.try_get("created_at").map_err(storage)?,
        updated_at: row.try_get("updated_at").map_err(storage)?,
    })
}

#[async_trait]
impl CatalogReader for PgCatalog {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, CatalogError> {
        let row = sqlx::query(
            "SELECT id, name, sku, price, stock, is_active, image_url, created_at, updated_at \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn decrement_stock(&self, claims: &[StockClaim]) -> Result<(), CatalogError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        for claim in claims {
            // Conditional decrement: zero rows affected means the stock
            // guard failed (or the product is gone) and the batch rolls back.
            let result = sqlx::query(
                "UPDATE products SET stock = stock - $1, updated_at = NOW() \
                 WHERE id = $2 AND stock >= $1",
            )
            .bind(claim.quantity)
            .bind(claim.product_id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

            if result.rows_affected() == 0 {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                        .bind(claim.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(storage)?;

                return Err(match available {
                    Some(available) => CatalogError::InsufficientStock {
                        product_id: claim.product_id,
                        requested: claim.quantity,
                        available,
                    },
                    None => CatalogError::NotFound(claim.product_id),
                });
            }
        }

        tx.commit().await.map_err(storage)?;
        Ok(())
    }
}
