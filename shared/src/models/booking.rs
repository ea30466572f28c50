//! Booking Model
//!
//! One booking is one purchase transaction: a primary service line,
//! optional secondary lines (multi-recipient), optional add-ons, and an
//! optional linked promotion redemption. The primary service is
//! denormalized onto the booking row for backward compatibility; the full
//! line list lives in `booking_service`.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Service format enum (单人 / 同时 / 先后)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ServiceFormat {
    Single,
    Simultaneous,
    Sequential,
}

/// Booking lifecycle status — always created as `Pending`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    /// Platform account of the paying customer (None for guest checkout)
    pub user_id: Option<i64>,
    /// Scheduled date (YYYY-MM-DD)
    pub booking_date: String,
    /// Scheduled start time (HH:MM)
    pub booking_time: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub service_format: ServiceFormat,
    pub recipient_count: i64,
    /// Denormalized primary service (recipient_index 0)
    pub service_id: i64,
    /// Primary service duration (minutes)
    pub duration: i64,
    /// Primary service price before discounts
    pub base_price: f64,
    pub is_multi_service: bool,
    pub final_price: f64,
    pub discount_amount: Option<f64>,
    pub promotion_id: Option<i64>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Booking service line item (one per recipient, primary included)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BookingService {
    pub id: i64,
    pub booking_id: i64,
    pub service_id: i64,
    pub duration: i64,
    pub price: f64,
    /// Zero-based; index 0 is the primary/payer recipient
    pub recipient_index: i64,
    pub recipient_name: Option<String>,
    pub sort_order: i64,
    pub created_at: i64,
}

/// Booking add-on line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BookingAddon {
    pub id: i64,
    pub booking_id: i64,
    pub service_addon_id: i64,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub total_price: f64,
    pub created_at: i64,
}

/// Booking creation payload (the bookingData half of the request)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingCreate {
    #[validate(length(min = 1))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub user_id: Option<i64>,
    #[validate(length(min = 1))]
    pub booking_date: String,
    #[validate(length(min = 1))]
    pub booking_time: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
    pub service_format: ServiceFormat,
    #[validate(range(min = 1))]
    pub recipient_count: i64,
    #[validate(range(min = 0.0))]
    pub final_price: f64,
    #[validate(range(min = 0.0))]
    pub discount_amount: Option<f64>,
    pub promotion_id: Option<i64>,
}

/// One service line in a booking request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingServiceInput {
    pub service_id: i64,
    #[validate(range(min = 1))]
    pub duration: i64,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub recipient_index: i64,
    pub recipient_name: Option<String>,
    pub sort_order: Option<i64>,
}

/// One add-on line in a booking request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingAddonInput {
    pub service_addon_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(range(min = 0.0))]
    pub price_per_unit: f64,
    #[validate(range(min = 0.0))]
    pub total_price: f64,
}

/// Full booking creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingCreateRequest {
    #[validate(nested)]
    pub booking: BookingCreate,
    /// One entry per recipient; must not be empty
    #[validate(length(min = 1), nested)]
    pub services: Vec<BookingServiceInput>,
    #[serde(default)]
    #[validate(nested)]
    pub addons: Vec<BookingAddonInput>,
}

/// Booking with its line items (for detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub services: Vec<BookingService>,
    pub addons: Vec<BookingAddon>,
}
