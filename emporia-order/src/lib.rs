pub mod checkout;
pub mod lifecycle;
pub mod memory;
pub mod models;
pub mod number;
pub mod policy;
pub mod repository;

pub use checkout::{CheckoutService, PlacedOrder};
pub use lifecycle::{OrderLifecycle, OrderStats};
pub use memory::{MemoryAddressBook, MemoryOrderRepository};
pub use models::{Address, Order, OrderLineItem, OrderStatus, PaymentMethod};
pub use number::OrderNumberAllocator;
pub use policy::CheckoutPolicy;
pub use repository::{AddressReader, OrderError, OrderRepository};
