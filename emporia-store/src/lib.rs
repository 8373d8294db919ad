pub mod app_config;
pub mod cart_repo;
pub mod catalog_repo;
pub mod database;
pub mod order_repo;
pub mod redis_cart;

pub use app_config::Config;
pub use cart_repo::PgCartRepository;
pub use catalog_repo::PgCatalog;
pub use database::Database;
pub use order_repo::PgOrderRepository;
pub use redis_cart::RedisCartRepository;
