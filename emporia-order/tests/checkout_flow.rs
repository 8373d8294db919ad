use std::sync::Arc;

use emporia_cart::{CartRepository, CartStore, MemoryCartRepository};
use emporia_catalog::{MemoryCatalog, Product};
use emporia_order::{
    Address, CheckoutPolicy, CheckoutService, MemoryAddressBook, MemoryOrderRepository,
    OrderError, OrderLifecycle, OrderStatus, PaymentMethod,
};
use emporia_shared::OwnerKey;
use rust_decimal::Decimal;
use uuid::Uuid;

struct Harness {
    catalog: Arc<MemoryCatalog>,
    cart_repo: Arc<MemoryCartRepository>,
    carts: CartStore,
    addresses: Arc<MemoryAddressBook>,
    checkout: CheckoutService,
    lifecycle: OrderLifecycle,
}

fn harness() -> Harness {
    let catalog = Arc::new(MemoryCatalog::new());
    let cart_repo = Arc::new(MemoryCartRepository::new());
    let addresses = Arc::new(MemoryAddressBook::new());
    let orders = Arc::new(MemoryOrderRepository::new(catalog.clone(), cart_repo.clone()));

    let carts = CartStore::new(cart_repo.clone(), catalog.clone());
    let checkout = CheckoutService::new(
        cart_repo.clone(),
        catalog.clone(),
        addresses.clone(),
        orders.clone(),
        CheckoutPolicy::default(),
    );
    let lifecycle = OrderLifecycle::new(orders);

    Harness {
        catalog,
        cart_repo,
        carts,
        addresses,
        checkout,
        lifecycle,
    }
}

async fn seed_address(h: &Harness) -> Uuid {
    h.addresses
        .insert(Address {
            id: Uuid::new_v4(),
            recipient: "Ada Lovelace".to_string(),
            street: "12 Analytical Row".to_string(),
            city: "London".to_string(),
            postal_code: "N1 9GU".to_string(),
            country: "GB".to_string(),
        })
        .await
}

#[tokio::test]
async fn test_checkout_on_empty_cart_fails_and_creates_nothing() {
    let h = harness();
    let account = Uuid::new_v4();
    let address = seed_address(&h).await;

    let err = h
        .checkout
        .create_order(account, address, PaymentMethod::Card, None)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::InvalidState(_)));
    assert!(h.lifecycle.list_for_account(account).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_above_threshold_ships_free() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);
    let address = seed_address(&h).await;

    let product_a = h
        .catalog
        .insert(Product::new("Desk Lamp", "LAMP-01", Decimal::from(300), 10))
        .await;
    let product_b = h
        .catalog
        .insert(Product::new("Bookend", "BOOK-07", Decimal::from(150), 10))
        .await;

    h.carts.add_item(&owner, product_a, Some(2)).await.unwrap();
    h.carts.add_item(&owner, product_b, Some(1)).await.unwrap();

    let placed = h
        .checkout
        .create_order(account, address, PaymentMethod::Card, None)
        .await
        .unwrap();

    assert_eq!(placed.order.subtotal, Decimal::from(750));
    assert_eq!(placed.order.shipping_cost, Decimal::ZERO);
    assert_eq!(placed.order.total, Decimal::from(750));
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.address.id, address);
}

#[tokio::test]
async fn test_order_below_threshold_pays_flat_rate() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);
    let address = seed_address(&h).await;

    let product = h
        .catalog
        .insert(Product::new("Notebook", "NOTE-03", Decimal::from(100), 10))
        .await;
    h.carts.add_item(&owner, product, Some(1)).await.unwrap();

    let placed = h
        .checkout
        .create_order(account, address, PaymentMethod::CashOnDelivery, None)
        .await
        .unwrap();

    assert_eq!(placed.order.subtotal, Decimal::from(100));
    assert_eq!(placed.order.shipping_cost, Decimal::new(4990, 2));
    assert_eq!(placed.order.total, Decimal::new(14990, 2));
    assert_eq!(
        placed.order.total,
        placed.order.subtotal + placed.order.shipping_cost
    );
}

#[tokio::test]
async fn test_checkout_clears_cart_and_decrements_stock() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);
    let address = seed_address(&h).await;

    let product = h
        .catalog
        .insert(Product::new("Chair", "CHAIR-11", Decimal::from(200), 8))
        .await;
    h.carts.add_item(&owner, product, Some(3)).await.unwrap();

    h.checkout
        .create_order(account, address, PaymentMethod::BankTransfer, None)
        .await
        .unwrap();

    assert!(h.cart_repo.list(&owner).await.unwrap().is_empty());
    assert_eq!(h.catalog.stock_of(product).await, Some(5));
}

#[tokio::test]
async fn test_order_lines_are_frozen_against_catalog_edits() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);
    let address = seed_address(&h).await;

    let product = h
        .catalog
        .insert(Product::new("Teapot", "TEA-02", Decimal::from(80), 5))
        .await;
    h.carts.add_item(&owner, product, Some(1)).await.unwrap();

    let placed = h
        .checkout
        .create_order(account, address, PaymentMethod::Card, None)
        .await
        .unwrap();

    // Rewrite the catalog after the fact.
    h.catalog.set_price(product, Decimal::from(999)).await.unwrap();
    h.catalog.rename(product, "Teapot Deluxe").await.unwrap();

    let reloaded = h.lifecycle.get_order(placed.order.id).await.unwrap();
    assert_eq!(reloaded.items.len(), 1);
    assert_eq!(reloaded.items[0].unit_price, Decimal::from(80));
    assert_eq!(reloaded.items[0].name, "Teapot");
    assert_eq!(reloaded.total, Decimal::new(12990, 2));
}

#[tokio::test]
async fn test_insufficient_stock_aborts_whole_checkout() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);
    let address = seed_address(&h).await;

    let plentiful = h
        .catalog
        .insert(Product::new("Pencil", "PEN-01", Decimal::from(5), 100))
        .await;
    let scarce = h
        .catalog
        .insert(Product::new("Easel", "EAS-09", Decimal::from(120), 2))
        .await;

    h.carts.add_item(&owner, plentiful, Some(10)).await.unwrap();
    h.carts.add_item(&owner, scarce, Some(3)).await.unwrap();

    let err = h
        .checkout
        .create_order(account, address, PaymentMethod::Card, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::InsufficientStock { requested: 3, available: 2, .. }
    ));

    // No partial effects: no order, cart intact, stock untouched.
    assert!(h.lifecycle.list_for_account(account).await.unwrap().is_empty());
    assert_eq!(h.cart_repo.list(&owner).await.unwrap().len(), 2);
    assert_eq!(h.catalog.stock_of(plentiful).await, Some(100));
    assert_eq!(h.catalog.stock_of(scarce).await, Some(2));
}

#[tokio::test]
async fn test_checkout_with_unknown_address_fails() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);

    let product = h
        .catalog
        .insert(Product::new("Vase", "VASE-04", Decimal::from(60), 4))
        .await;
    h.carts.add_item(&owner, product, Some(1)).await.unwrap();

    let err = h
        .checkout
        .create_order(account, Uuid::new_v4(), PaymentMethod::Card, None)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::NotFound(_)));
    // The cart survives the failed attempt.
    assert_eq!(h.cart_repo.list(&owner).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_numbers_follow_format_and_stay_unique() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);
    let address = seed_address(&h).await;

    let product = h
        .catalog
        .insert(Product::new("Socks", "SOCK-21", Decimal::from(12), 100))
        .await;

    let mut numbers = std::collections::HashSet::new();
    for _ in 0..5 {
        h.carts.add_item(&owner, product, Some(1)).await.unwrap();
        let placed = h
            .checkout
            .create_order(account, address, PaymentMethod::Card, None)
            .await
            .unwrap();
        assert!(placed.order.number.starts_with("ORD-"));
        numbers.insert(placed.order.number);
    }
    assert_eq!(numbers.len(), 5);
}

#[tokio::test]
async fn test_checkout_prices_at_checkout_not_at_add() {
    let h = harness();
    let account = Uuid::new_v4();
    let owner = OwnerKey::account(account);
    let address = seed_address(&h).await;

    let product = h
        .catalog
        .insert(Product::new("Kettle", "KET-05", Decimal::from(100), 5))
        .await;
    h.carts.add_item(&owner, product, Some(1)).await.unwrap();

    // Price moves between add and checkout; the order sees the new price.
    h.catalog.set_price(product, Decimal::from(550)).await.unwrap();

    let placed = h
        .checkout
        .create_order(account, address, PaymentMethod::Card, None)
        .await
        .unwrap();

    assert_eq!(placed.order.subtotal, Decimal::from(550));
    // And at 550 the order crossed the free-shipping threshold.
    assert_eq!(placed.order.shipping_cost, Decimal::ZERO);
}
