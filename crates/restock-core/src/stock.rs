use crate::ProductRecord;
use std::collections::HashSet;

/// The SKUs the operator wants alerted on, fixed for one run
#[derive(Debug, Clone, Default)]
pub struct TrackedSet {
    skus: HashSet<String>,
}

impl TrackedSet {
    /// Build a tracked set from SKU strings
    pub fn new<I, S>(skus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skus: skus.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a SKU is tracked
    pub fn contains(&self, sku: &str) -> bool {
        self.skus.contains(sku)
    }

    pub fn len(&self) -> usize {
        self.skus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skus.is_empty()
    }
}

/// Select the records that are tracked and purchasable right now.
///
/// A record qualifies when its SKU is in the tracked set, its availability
/// flag is set, and it reports positive inventory. Input order is preserved
/// and no deduplication happens here - SKUs are unique per feed.
pub fn in_stock(products: &[ProductRecord], tracked: &TrackedSet) -> Vec<ProductRecord> {
    products
        .iter()
        .filter(|p| tracked.contains(&p.sku) && p.available && p.inventory_quantity > 0)
        .cloned()
        .collect()
}
