//! Catalog service records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A purchasable service from the catalog.
///
/// Read-only input to order placement: the admin surface that maintains
/// these records lives elsewhere. `provider_service_id` is the numeric
/// id the upstream provider knows the service by, and also serves as the
/// catalog key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// The service id on the provider's side.
    pub provider_service_id: u32,
    /// Display name.
    pub name: String,
    /// Free-form description shown to users.
    pub details: String,
    /// Price per 1000 units.
    pub rate: Decimal,
    /// Minimum order quantity (inclusive).
    pub min: u32,
    /// Maximum order quantity (inclusive).
    pub max: u32,
    /// Category name the service is listed under.
    pub category: String,
    /// Whether the provider offers refills for this service.
    pub refill: bool,
    /// Disabled services are hidden from the storefront.
    pub enabled: bool,
}

/// A quantity outside the service's accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityViolation {
    /// Quantity must be at least 1.
    #[error("quantity must be positive")]
    Zero,

    /// Quantity is below the service minimum.
    #[error("quantity {got} is below the minimum of {min}")]
    BelowMin { min: u32, got: u32 },

    /// Quantity is above the service maximum.
    #[error("quantity {got} is above the maximum of {max}")]
    AboveMax { max: u32, got: u32 },
}

impl Service {
    /// Checks a requested quantity against this service's `[min, max]`
    /// bounds (inclusive).
    pub fn validate_quantity(&self, quantity: u32) -> Result<(), QuantityViolation> {
        if quantity == 0 {
            return Err(QuantityViolation::Zero);
        }
        if quantity < self.min {
            return Err(QuantityViolation::BelowMin {
                min: self.min,
                got: quantity,
            });
        }
        if quantity > self.max {
            return Err(QuantityViolation::AboveMax {
                max: self.max,
                got: quantity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(min: u32, max: u32) -> Service {
        Service {
            provider_service_id: 42,
            name: "TikTok Views".to_string(),
            details: "Fast delivery".to_string(),
            rate: Decimal::from(10),
            min,
            max,
            category: "TikTok".to_string(),
            refill: false,
            enabled: true,
        }
    }

    #[test]
    fn test_quantity_within_bounds() {
        let s = service(100, 1000);
        assert!(s.validate_quantity(100).is_ok());
        assert!(s.validate_quantity(500).is_ok());
        assert!(s.validate_quantity(1000).is_ok());
    }

    #[test]
    fn test_quantity_below_min() {
        let s = service(100, 1000);
        assert_eq!(
            s.validate_quantity(50),
            Err(QuantityViolation::BelowMin { min: 100, got: 50 })
        );
    }

    #[test]
    fn test_quantity_above_max() {
        let s = service(100, 1000);
        assert_eq!(
            s.validate_quantity(1001),
            Err(QuantityViolation::AboveMax {
                max: 1000,
                got: 1001
            })
        );
    }

    #[test]
    fn test_zero_quantity() {
        let s = service(0, 1000);
        assert_eq!(s.validate_quantity(0), Err(QuantityViolation::Zero));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let s = service(100, 1000);
        let json = serde_json::to_string(&s).unwrap();
        let deserialized: Service = serde_json::from_str(&json).unwrap();
        assert_eq!(s, deserialized);
    }
}
