use async_trait::async_trait;
use emporia_cart::{CartError, CartLineItem, CartRepository};
use emporia_shared::OwnerKey;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::collections::HashMap;
use uuid::Uuid;

/// Anonymous carts as one redis hash per session.
///
/// Key `cart:{owner}`, one field per product holding the serialized line.
/// The hash TTL is refreshed on every write, so an abandoned cart ages out
/// on its own — cart rows are ephemeral and safe to lose, order rows are not.
#[derive(Clone)]
pub struct RedisCartRepository {
    client: redis::Client,
    ttl_seconds: u64,
}

impl RedisCartRepository {
    pub fn new(connection_string: &str, ttl_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client, ttl_seconds })
    }

    fn key(owner: &OwnerKey) -> String {
        format!("cart:{}", owner.storage_key())
    }

    async fn conn(&self) -> Result<MultiplexedConnection, CartError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(storage)
    }

    async fn touch(&self, conn: &mut MultiplexedConnection, key: &str) -> Result<(), CartError> {
        conn.expire::<_, ()>(key, self.ttl_seconds as i64)
            .await
            .map_err(storage)
    }
}

fn storage(err: impl std::fmt::Display) -> CartError {
    CartError::Storage(err.to_string())
}

fn decode(raw: &str) -> Result<CartLineItem, CartError> {
    serde_json::from_str(raw).map_err(storage)
}

fn encode(line: &CartLineItem) -> Result<String, CartError> {
    serde_json::to_string(line).map_err(storage)
}

#[async_trait]
impl CartRepository for RedisCartRepository {
    async fn list(&self, owner: &OwnerKey) -> Result<Vec<CartLineItem>, CartError> {
        let mut conn = self.conn().await?;
        let raw: HashMap<String, String> =
            conn.hgetall(Self::key(owner)).await.map_err(storage)?;

        let mut lines = raw
            .values()
            .map(|v| decode(v))
            .collect::<Result<Vec<_>, _>>()?;
        lines.sort_by_key(|l| l.created_at);
        Ok(lines)
    }

    async fn find(&self, owner: &OwnerKey, line_id: Uuid) -> Result<Option<CartLineItem>, CartError> {
        Ok(self.list(owner).await?.into_iter().find(|l| l.id == line_id))
    }

    async fn find_by_product(
        &self,
        owner: &OwnerKey,
        product_id: Uuid,
    ) -> Result<Option<CartLineItem>, CartError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .hget(Self::key(owner), product_id.to_string())
            .await
            .map_err(storage)?;
        raw.as_deref().map(decode).transpose()
    }

    async fn insert(&self, line: CartLineItem) -> Result<CartLineItem, CartError> {
        let mut conn = self.conn().await?;
        let key = Self::key(&line.owner);
        conn.hset::<_, _, _, ()>(&key, line.product_id.to_string(), encode(&line)?)
            .await
            .map_err(storage)?;
        self.touch(&mut conn, &key).await?;
        Ok(line)
    }

    async fn set_quantity(
        &self,
        owner: &OwnerKey,
        line_id: Uuid,
        quantity: i64,
    ) -> Result<(), CartError> {
        let mut line = self
            .find(owner, line_id)
            .await?
            .ok_or_else(|| CartError::NotFound(line_id.to_string()))?;

        line.quantity = quantity;
        line.updated_at = chrono::Utc::now();

        let mut conn = self.conn().await?;
        let key = Self::key(owner);
        conn.hset::<_, _, _, ()>(&key, line.product_id.to_string(), encode(&line)?)
            .await
            .map_err(storage)?;
        self.touch(&mut conn, &key).await
    }

    async fn delete(&self, owner: &OwnerKey, line_id: Uuid) -> Result<bool, CartError> {
        let Some(line) = self.find(owner, line_id).await? else {
            return Ok(false);
        };

        let mut conn = self.conn().await?;
        conn.hdel::<_, _, ()>(Self::key(owner), line.product_id.to_string())
            .await
            .map_err(storage)?;
        Ok(true)
    }

    async fn clear(&self, owner: &OwnerKey) -> Result<(), CartError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(Self::key(owner)).await.map_err(storage)
    }
}
