//! Promotion Model
//!
//! A promotion is a discount campaign redeemable through a code.
//! Codes are stored canonicalized (trimmed, uppercase).

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Promotion lifecycle status
///
/// Only `Active` promotions are redeemable, regardless of date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PromotionStatus {
    Active,
    Inactive,
    Expired,
    Draft,
}

/// Discount type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

/// Item scope enum — which purchased items a promotion can discount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AppliesTo {
    All,
    SpecificServices,
    Categories,
}

/// Promotion entity (促销活动)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: i64,
    /// Redeemable code, canonical form (trimmed, uppercase)
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub status: PromotionStatus,
    pub discount_type: DiscountType,
    /// Percentage: 20 = 20%; fixed: amount in currency units
    pub discount_value: f64,
    /// Cap for percentage discounts (ignored for fixed amounts)
    pub max_discount: Option<f64>,
    pub min_order_amount: Option<f64>,
    /// Global redemption cap
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    /// Per-customer redemption cap
    pub usage_limit_per_user: Option<i64>,
    pub applies_to: AppliesTo,
    /// Service allowlist (JSON array), used when applies_to = SPECIFIC_SERVICES
    #[cfg_attr(feature = "db", sqlx(json))]
    pub target_services: Vec<i64>,
    /// Category allowlist (JSON array), used when applies_to = CATEGORIES
    #[cfg_attr(feature = "db", sqlx(json))]
    pub target_categories: Vec<String>,
    /// Valid from (Unix millis, inclusive)
    pub start_date: i64,
    /// Valid until (Unix millis, inclusive)
    pub end_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create promotion payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PromotionCreate {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub status: Option<PromotionStatus>,
    pub discount_type: DiscountType,
    #[validate(range(min = 0.0))]
    pub discount_value: f64,
    #[validate(range(min = 0.0))]
    pub max_discount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_order_amount: Option<f64>,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i64>,
    #[validate(range(min = 1))]
    pub usage_limit_per_user: Option<i64>,
    pub applies_to: Option<AppliesTo>,
    pub target_services: Option<Vec<i64>>,
    pub target_categories: Option<Vec<String>>,
    pub start_date: i64,
    pub end_date: i64,
}

/// Update promotion payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PromotionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<PromotionStatus>,
    pub discount_type: Option<DiscountType>,
    #[validate(range(min = 0.0))]
    pub discount_value: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_discount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_order_amount: Option<f64>,
    pub usage_limit: Option<i64>,
    pub usage_limit_per_user: Option<i64>,
    pub applies_to: Option<AppliesTo>,
    pub target_services: Option<Vec<i64>>,
    pub target_categories: Option<Vec<String>>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

/// Promotion usage record — one redemption by one user on one booking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PromotionUsage {
    pub id: i64,
    pub promotion_id: i64,
    pub user_id: i64,
    pub booking_id: i64,
    pub discount_amount: f64,
    pub created_at: i64,
}

/// Why a promo code was rejected
///
/// Returned as data (never an HTTP error) so clients can render a
/// localized message per kind. "Not yet started" and "already ended"
/// both map to `CodeInvalid` — the client contract has one generic
/// code for both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Unknown code, wrong status, or outside the validity window
    CodeInvalid,
    /// Order amount below the promotion's minimum
    MinOrderNotMet,
    /// Global or per-user redemption cap reached
    LimitReached,
    /// Promotion does not cover any of the purchased items
    NotApplicable,
}

/// Result of validating a promo code against an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// The matched promotion, when lookup succeeded (also set on most rejections)
    pub promotion: Option<Promotion>,
    /// Computed discount, 0.0 unless valid
    pub discount_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<RejectReason>,
}

impl ValidationResult {
    /// Accepted: discount computed, no error kind
    pub fn accepted(promotion: Promotion, discount_amount: f64) -> Self {
        Self {
            valid: true,
            promotion: Some(promotion),
            discount_amount,
            error_kind: None,
        }
    }

    /// Rejected with the promotion attached (fetched before the failing check)
    pub fn rejected(promotion: Option<Promotion>, reason: RejectReason) -> Self {
        Self {
            valid: false,
            promotion,
            discount_amount: 0.0,
            error_kind: Some(reason),
        }
    }
}
