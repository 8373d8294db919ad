use std::sync::Arc;

use emporia_shared::OwnerKey;
use tracing::info;

use crate::models::CartLineItem;
use crate::repository::{CartError, CartRepository};

/// Reconciles an anonymous cart with an account cart at login/registration.
///
/// Anonymous and authenticated carts may live in different stores (session
/// key-value vs. server-persisted), so the resolver spans a source and a
/// target repository. The source is consumed inside the same logical
/// operation, which is what makes a repeated merge a no-op.
pub struct CartMergeResolver {
    source: Arc<dyn CartRepository>,
    target: Arc<dyn CartRepository>,
}

/// What a merge did, for callers that want to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub lines_merged: usize,
    pub lines_created: usize,
}

impl CartMergeResolver {
    pub fn new(source: Arc<dyn CartRepository>, target: Arc<dyn CartRepository>) -> Self {
        Self { source, target }
    }

    /// Fold every line of `from` into `into`: quantities add onto an existing
    /// line for the same product, otherwise the line is created in the target.
    /// The source cart is cleared before returning.
    pub async fn merge(&self, from: &OwnerKey, into: &OwnerKey) -> Result<MergeOutcome, CartError> {
        let lines = self.source.list(from).await?;

        let mut merged = 0;
        let mut created = 0;

        for line in lines {
            match self.target.find_by_product(into, line.product_id).await? {
                Some(existing) => {
                    self.target
                        .set_quantity(into, existing.id, existing.quantity + line.quantity)
                        .await?;
                    merged += 1;
                }
                None => {
                    self.target
                        .insert(CartLineItem::new(into.clone(), line.product_id, line.quantity))
                        .await?;
                    created += 1;
                }
            }
        }

        // Consume the source so replaying the merge cannot double-count.
        self.source.clear(from).await?;

        info!(%from, %into, merged, created, "anonymous cart merged");
        Ok(MergeOutcome {
            lines_merged: merged,
            lines_created: created,
        })
    }
}
