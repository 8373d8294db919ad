use async_trait::async_trait;
use emporia_catalog::StockClaim;
use emporia_order::{Order, OrderError, OrderLineItem, OrderRepository, OrderStatus, PaymentMethod};
use emporia_shared::OwnerKey;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

/// Durable order store. `orders.number` carries a UNIQUE constraint as the
/// cross-process backstop for order-number allocation.
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<OrderLineItem>, OrderError> {
        let rows = sqlx::query(
            "SELECT id, order_id, product_id, name, sku, unit_price, quantity \
             FROM order_items WHERE order_id = $1 ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(item_from_row).collect()
    }
}

fn storage(err: sqlx::Error) -> OrderError {
    OrderError::Storage(err.to_string())
}

fn item_from_row(row: &PgRow) -> Result<OrderLineItem, OrderError> {
    Ok(OrderLineItem {
        id: row.try_get("id").map_err(storage)?,
        order_id: row.try_get("order_id").map_err(storage)?,
        product_id: row.try_get("product_id").map_err(storage)?,
        name: row.try_get("name").map_err(storage)?,
        sku: row.try_get("sku").map_err(storage)?,
        unit_price: row.try_get("unit_price").map_err(storage)?,
        quantity: row.try_get("quantity").map_err(storage)?,
    })
}

fn order_from_row(row: &PgRow, items: Vec<OrderLineItem>) -> Result<Order, OrderError> {
    let id: Uuid = row.try_get("id").map_err(storage)?;

    let status: String = row.try_get("status").map_err(storage)?;
    let status: OrderStatus = status
        .parse()
        .map_err(|_| OrderError::Storage(format!("corrupt status on order {}", id)))?;

    let payment_method: String = row.try_get("payment_method").map_err(storage)?;
    let payment_method: PaymentMethod = payment_method
        .parse()
        .map_err(|_| OrderError::Storage(format!("corrupt payment method on order {}", id)))?;

    Ok(Order {
        id,
        number: row.try_get("number").map_err(storage)?,
        account_id: row.try_get("account_id").map_err(storage)?,
        address_id: row.try_get("address_id").map_err(storage)?,
        payment_method,
        notes: row.try_get("notes").map_err(storage)?,
        status,
        subtotal: row.try_get("subtotal").map_err(storage)?,
        shipping_cost: row.try_get("shipping_cost").map_err(storage)?,
        total: row.try_get("total").map_err(storage)?,
        items,
        created_at: row.try_get("created_at").map_err(storage)?,
        updated_at: row.try_get("updated_at").map_err(storage)?,
        shipped_at: row.try_get("shipped_at").map_err(storage)?,
        delivered_at: row.try_get("delivered_at").map_err(storage)?,
        cancelled_at: row.try_get("cancelled_at").map_err(storage)?,
    })
}

const ORDER_COLUMNS: &str = "id, number, account_id, address_id, payment_method, notes, status, \
     subtotal, shipping_cost, total, created_at, updated_at, shipped_at, delivered_at, cancelled_at";

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn commit_checkout(
        &self,
        order: &Order,
        claims: &[StockClaim],
        clear_owner: &OwnerKey,
    ) -> Result<(), OrderError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query(
            "INSERT INTO orders (id, number, account_id, address_id, payment_method, notes, \
             status, subtotal, shipping_cost, total, created_at, updated_at, shipped_at, \
             delivered_at, cancelled_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(order.id)
        .bind(&order.number)
        .bind(order.account_id)
        .bind(order.address_id)
        .bind(order.payment_method.to_string())
        .bind(&order.notes)
        .bind(order.status.to_string())
        .bind(order.subtotal)
        .bind(order.shipping_cost)
        .bind(order.total)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.cancelled_at)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, name, sku, unit_price, quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(item.id)
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(&item.sku)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        for claim in claims {
            // Conditional decrement inside the same transaction: a failed
            // guard rolls back the order and every prior decrement.
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
                    Some(available) => OrderError::InsufficientStock {
                        product_id: claim.product_id,
                        requested: claim.quantity,
                        available,
                    },
                    None => OrderError::NotFound(format!("product {}", claim.product_id)),
                });
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE owner = $1")
            .bind(clear_owner.storage_key())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        info!(order_id = %order.id, number = %order.number, "checkout committed");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        match row {
            Some(row) => {
                let items = self.load_items(id).await?;
                Ok(Some(order_from_row(&row, items)?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_account(&self, account_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM orders WHERE account_id = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: Uuid = row.try_get("id").map_err(storage)?;
            let items = self.load_items(id).await?;
            orders.push(order_from_row(row, items)?);
        }
        Ok(orders)
    }

    async fn save_status(&self, order: &Order) -> Result<(), OrderError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, shipped_at = $2, delivered_at = $3, \
             cancelled_at = $4, updated_at = $5 WHERE id = $6",
        )
        .bind(order.status.to_string())
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.cancelled_at)
        .bind(order.updated_at)
        .bind(order.id)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(format!("order {}", order.id)));
        }
        Ok(())
    }
}
