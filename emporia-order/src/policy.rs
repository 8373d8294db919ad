use rust_decimal::Decimal;

/// Flat free-shipping-threshold policy: orders at or above the threshold
/// ship free, everything else pays the standard rate. Independent of weight
/// and distance. Both values come from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPolicy {
    pub free_shipping_threshold: Decimal,
    pub standard_shipping_rate: Decimal,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::from(500),
            standard_shipping_rate: Decimal::new(4990, 2),
        }
    }
}

impl CheckoutPolicy {
    /// Build from raw configuration values. `None` when a value does not
    /// convert cleanly to a decimal.
    pub fn from_config(free_shipping_threshold: f64, standard_shipping_rate: f64) -> Option<Self> {
        Some(Self {
            free_shipping_threshold: Decimal::try_from(free_shipping_threshold).ok()?,
            standard_shipping_rate: Decimal::try_from(standard_shipping_rate).ok()?,
        })
    }

    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.standard_shipping_rate
        }
    }
}
