use std::sync::Arc;

use chrono::Utc;
use emporia_cart::CartRepository;
use emporia_catalog::{CatalogReader, StockClaim};
use emporia_shared::OwnerKey;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::{Address, Order, OrderLineItem, OrderStatus, PaymentMethod};
use crate::number::OrderNumberAllocator;
use crate::policy::CheckoutPolicy;
use crate::repository::{AddressReader, OrderError, OrderRepository};

/// A successfully placed order, with the address snapshot resolved for the
/// caller's convenience.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub address: Address,
}

/// The order factory: converts an account's cart into an immutable order.
///
/// Prices are frozen at the instant of order creation and never earlier —
/// the cart stores no prices, so whatever the catalog says at checkout is
/// what the order records.
pub struct CheckoutService {
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogReader>,
    addresses: Arc<dyn AddressReader>,
    orders: Arc<dyn OrderRepository>,
    numbers: OrderNumberAllocator,
    policy: CheckoutPolicy,
}

impl CheckoutService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        catalog: Arc<dyn CatalogReader>,
        addresses: Arc<dyn AddressReader>,
        orders: Arc<dyn OrderRepository>,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            carts,
            catalog,
            addresses,
            orders,
            numbers: OrderNumberAllocator::new(),
            policy,
        }
    }

    /// Place an order from the account's current cart.
    ///
    /// Order persistence, stock decrement and cart clearing happen as one
    /// all-or-nothing unit; a failure anywhere leaves no side effect behind.
    pub async fn create_order(
        &self,
        account_id: Uuid,
        address_id: Uuid,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<PlacedOrder, OrderError> {
        let owner = OwnerKey::account(account_id);

        let lines = self.carts.list(&owner).await?;
        if lines.is_empty() {
            return Err(OrderError::InvalidState("cart is empty".to_string()));
        }

        let address = self
            .addresses
            .get_address(address_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("address {}", address_id)))?;

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let mut items = Vec::with_capacity(lines.len());
        let mut claims = Vec::with_capacity(lines.len());
        let mut subtotal = Decimal::ZERO;

        for line in &lines {
            // Current catalog price and name, not anything the cart held.
            let product = self
                .catalog
                .get_product(line.product_id)
                .await?
                .ok_or_else(|| OrderError::NotFound(format!("product {}", line.product_id)))?;

            subtotal += product.price * Decimal::from(line.quantity);
            items.push(OrderLineItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: product.id,
                name: product.name,
                sku: product.sku,
                unit_price: product.price,
                quantity: line.quantity,
            });
            claims.push(StockClaim {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }

        let shipping_cost = self.policy.shipping_for(subtotal);
        let total = subtotal + shipping_cost;
        let number = self.numbers.allocate(now);

        let order = Order {
            id: order_id,
            number,
            account_id,
            address_id,
            payment_method,
            notes,
            status: OrderStatus::Pending,
            subtotal,
            shipping_cost,
            total,
            items,
            created_at: now,
            updated_at: now,
            shipped_at: None,
            delivered_at: None,
            cancelled_at: None,
        };

        self.orders.commit_checkout(&order, &claims, &owner).await?;

        info!(
            order_id = %order.id,
            number = %order.number,
            account_id = %account_id,
            %total,
            "order placed"
        );

        Ok(PlacedOrder { order, address })
    }
}
