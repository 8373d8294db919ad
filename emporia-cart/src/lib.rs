pub mod memory;
pub mod merge;
pub mod models;
pub mod repository;
pub mod store;

pub use memory::MemoryCartRepository;
pub use merge::{CartMergeResolver, MergeOutcome};
pub use models::{CartLineItem, CartSnapshot, CartSnapshotLine, LineProduct};
pub use repository::{CartError, CartRepository};
pub use store::CartStore;
