//! Promo Code Validator
//!
//! Read-only decision function: given a code, order amount, user and item
//! scope, accept or reject with a typed reason and a computed discount.
//! Usage recording happens downstream as part of booking creation — this
//! module never writes.
//!
//! Checks run in a fixed order and the first failure wins:
//! lookup → status → date window → minimum order → global limit →
//! per-user limit → item scope → discount computation.

use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, promotion};
use shared::models::{AppliesTo, Promotion, PromotionStatus, RejectReason, ValidationResult};

use super::discount::compute_discount;

/// Inclusive validity window check (both endpoints redeemable)
fn within_window(promotion: &Promotion, now: i64) -> bool {
    now >= promotion.start_date && now <= promotion.end_date
}

/// Scope check: does the promotion cover any of the purchased items?
///
/// An empty allowlist imposes no constraint (same as `All`) — sets are
/// compared by intersection, order and duplicates are immaterial.
fn matches_scope(promotion: &Promotion, service_ids: &[i64], categories: &[String]) -> bool {
    match promotion.applies_to {
        AppliesTo::SpecificServices => {
            promotion.target_services.is_empty()
                || service_ids
                    .iter()
                    .any(|id| promotion.target_services.contains(id))
        }
        AppliesTo::Categories => {
            promotion.target_categories.is_empty()
                || categories
                    .iter()
                    .any(|c| promotion.target_categories.contains(c))
        }
        AppliesTo::All => true,
    }
}

/// Validate a promo code against an order.
///
/// Rejections come back as data (`ValidationResult { valid: false, .. }`),
/// never as errors — only repository failures surface as `Err`. The
/// per-user usage count is only queried when the promotion actually has a
/// per-user limit, so the global cap takes precedence.
pub async fn validate_promo_code(
    pool: &SqlitePool,
    code: &str,
    order_amount: f64,
    user_id: i64,
    service_ids: &[i64],
    categories: &[String],
) -> RepoResult<ValidationResult> {
    // 1. Lookup (canonicalized: trimmed, uppercase)
    let Some(promo) = promotion::find_by_code(pool, code).await? else {
        return Ok(ValidationResult::rejected(None, RejectReason::CodeInvalid));
    };

    // 2. Only ACTIVE promotions are redeemable, regardless of dates
    if promo.status != PromotionStatus::Active {
        return Ok(ValidationResult::rejected(
            Some(promo),
            RejectReason::CodeInvalid,
        ));
    }

    // 3. Date window — "not yet started" and "already ended" both map to
    // CodeInvalid (single generic reason in the client contract)
    if !within_window(&promo, shared::util::now_millis()) {
        return Ok(ValidationResult::rejected(
            Some(promo),
            RejectReason::CodeInvalid,
        ));
    }

    // 4. Minimum order amount (boundary-equal passes)
    if let Some(min) = promo.min_order_amount
        && order_amount < min
    {
        return Ok(ValidationResult::rejected(
            Some(promo),
            RejectReason::MinOrderNotMet,
        ));
    }

    // 5. Global redemption cap
    if let Some(limit) = promo.usage_limit
        && promo.usage_count >= limit
    {
        return Ok(ValidationResult::rejected(
            Some(promo),
            RejectReason::LimitReached,
        ));
    }

    // 6. Per-user redemption cap
    if let Some(limit) = promo.usage_limit_per_user {
        let used = promotion::count_usage_by_user(pool, promo.id, user_id).await?;
        if used >= limit {
            return Ok(ValidationResult::rejected(
                Some(promo),
                RejectReason::LimitReached,
            ));
        }
    }

    // 7. Item scope
    if !matches_scope(&promo, service_ids, categories) {
        return Ok(ValidationResult::rejected(
            Some(promo),
            RejectReason::NotApplicable,
        ));
    }

    // A negative discount value is data corruption (create/update refuse
    // it); reject the code rather than compute a negative discount
    if promo.discount_value < 0.0 {
        tracing::error!(
            promotion_id = promo.id,
            code = %promo.code,
            discount_value = promo.discount_value,
            "Promotion has negative discount_value, rejecting code"
        );
        return Ok(ValidationResult::rejected(
            Some(promo),
            RejectReason::CodeInvalid,
        ));
    }

    // 8. All checks passed — compute the discount
    let discount_amount = compute_discount(&promo, order_amount);
    Ok(ValidationResult::accepted(promo, discount_amount))
}
