//! Discount Computation
//!
//! Uses rust_decimal for precise calculations, stores as f64.

use rust_decimal::prelude::*;
use shared::models::{DiscountType, Promotion};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compute the discount a promotion grants on an order amount.
///
/// - Percentage: order × value / 100, capped at `max_discount` when set.
/// - Fixed amount: the configured value.
///
/// The result is clamped to the order amount (a voucher can never discount
/// more than the order is worth) and never negative.
pub fn compute_discount(promotion: &Promotion, order_amount: f64) -> f64 {
    let order = to_decimal(order_amount);
    let value = to_decimal(promotion.discount_value);

    let raw = match promotion.discount_type {
        DiscountType::Percentage => {
            let pct = order * value / Decimal::ONE_HUNDRED;
            match promotion.max_discount {
                Some(cap) => pct.min(to_decimal(cap)),
                None => pct,
            }
        }
        DiscountType::FixedAmount => value,
    };

    let clamped = raw.min(order).max(Decimal::ZERO);
    to_f64(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{AppliesTo, PromotionStatus};

    fn make_promotion(
        discount_type: DiscountType,
        discount_value: f64,
        max_discount: Option<f64>,
    ) -> Promotion {
        Promotion {
            id: 1,
            code: "TEST".to_string(),
            name: "Test".to_string(),
            description: None,
            status: PromotionStatus::Active,
            discount_type,
            discount_value,
            max_discount,
            min_order_amount: None,
            usage_limit: None,
            usage_count: 0,
            usage_limit_per_user: None,
            applies_to: AppliesTo::All,
            target_services: vec![],
            target_categories: vec![],
            start_date: 0,
            end_date: i64::MAX,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_percentage_uncapped() {
        // 20% of 1000 = 200
        let promo = make_promotion(DiscountType::Percentage, 20.0, None);
        assert_eq!(compute_discount(&promo, 1000.0), 200.0);
    }

    #[test]
    fn test_percentage_capped() {
        // 50% of 1000 = 500, capped at 300
        let promo = make_promotion(DiscountType::Percentage, 50.0, Some(300.0));
        assert_eq!(compute_discount(&promo, 1000.0), 300.0);
    }

    #[test]
    fn test_percentage_cap_not_reached() {
        // 10% of 1000 = 100, cap of 300 is inert
        let promo = make_promotion(DiscountType::Percentage, 10.0, Some(300.0));
        assert_eq!(compute_discount(&promo, 1000.0), 100.0);
    }

    #[test]
    fn test_fixed_amount() {
        let promo = make_promotion(DiscountType::FixedAmount, 50.0, None);
        assert_eq!(compute_discount(&promo, 1000.0), 50.0);
    }

    #[test]
    fn test_fixed_amount_clamped_to_order() {
        // a 5000 voucher on a 1000 order discounts exactly 1000
        let promo = make_promotion(DiscountType::FixedAmount, 5000.0, None);
        assert_eq!(compute_discount(&promo, 1000.0), 1000.0);
    }

    #[test]
    fn test_percentage_clamped_to_order() {
        // cap above the order amount still clamps to the order
        let promo = make_promotion(DiscountType::Percentage, 150.0, None);
        assert_eq!(compute_discount(&promo, 80.0), 80.0);
    }

    #[test]
    fn test_rounding_half_up() {
        // 15% of 66.33 = 9.9495 → 9.95
        let promo = make_promotion(DiscountType::Percentage, 15.0, None);
        assert_eq!(compute_discount(&promo, 66.33), 9.95);
    }

    #[test]
    fn test_rounding_midpoint() {
        // 5% of 10.10 = 0.505 → 0.51 (half-up, not banker's)
        let promo = make_promotion(DiscountType::Percentage, 5.0, None);
        assert_eq!(compute_discount(&promo, 10.1), 0.51);
    }

    #[test]
    fn test_zero_order_amount() {
        let promo = make_promotion(DiscountType::FixedAmount, 50.0, None);
        assert_eq!(compute_discount(&promo, 0.0), 0.0);
    }
}
