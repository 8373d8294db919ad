pub mod owner;

pub use owner::OwnerKey;
