//! Booking Writer
//!
//! Creates a booking with all its line items in one transaction, then
//! records the promotion redemption as a best-effort follow-up. The
//! booking either lands complete (row + service lines + add-ons) or not
//! at all; a failed usage recording never unwinds a committed booking.

use sqlx::SqlitePool;

use crate::db::repository::{
    RepoError, RepoResult,
    booking::{insert_addon_lines, insert_booking, insert_service_lines},
    promotion,
};
use shared::models::{BookingCreateRequest, BookingServiceInput};

/// Pick the primary service line: recipient_index 0 by convention,
/// falling back to the first element when no line carries index 0.
fn primary_line(services: &[BookingServiceInput]) -> Option<&BookingServiceInput> {
    let by_index = services.iter().find(|s| s.recipient_index == 0);
    if by_index.is_none() && !services.is_empty() {
        tracing::warn!(
            line_count = services.len(),
            "No service line with recipient_index 0, falling back to first line"
        );
    }
    by_index.or_else(|| services.first())
}

/// Create a booking with its service lines and add-ons.
///
/// Returns the new booking ID. Promotion usage is recorded after the
/// commit and only when the booking actually redeemed a discount; a
/// failure there is logged and swallowed — the booking stands.
pub async fn create_booking_with_services(
    pool: &SqlitePool,
    request: &BookingCreateRequest,
) -> RepoResult<i64> {
    let primary = primary_line(&request.services).ok_or_else(|| {
        RepoError::Validation("Booking must include at least one service line".to_string())
    })?;
    let is_multi_service = request.services.len() > 1;

    let mut tx = pool.begin().await?;
    let booking_id = insert_booking(&mut tx, &request.booking, primary, is_multi_service).await?;
    insert_service_lines(&mut tx, booking_id, &request.services).await?;
    insert_addon_lines(&mut tx, booking_id, &request.addons).await?;
    tx.commit().await?;

    tracing::info!(
        booking_id,
        service_lines = request.services.len(),
        addons = request.addons.len(),
        "Booking created"
    );

    record_promotion_usage(pool, request, booking_id).await;

    Ok(booking_id)
}

/// Best-effort redemption recording. Skipped unless the booking carries a
/// promotion with a positive discount and a known user.
async fn record_promotion_usage(pool: &SqlitePool, request: &BookingCreateRequest, booking_id: i64) {
    let booking = &request.booking;
    let (Some(promotion_id), Some(discount)) = (booking.promotion_id, booking.discount_amount)
    else {
        return;
    };
    if discount <= 0.0 {
        return;
    }
    let Some(user_id) = booking.user_id else {
        tracing::warn!(
            booking_id,
            promotion_id,
            "Booking redeemed a promotion without a user account, usage not recorded"
        );
        return;
    };

    match promotion::record_usage(pool, promotion_id, user_id, booking_id, discount).await {
        Ok(true) => {
            tracing::info!(booking_id, promotion_id, user_id, "Promotion usage recorded");
        }
        Ok(false) => {
            tracing::warn!(
                booking_id,
                promotion_id,
                user_id,
                "Promotion limit hit at recording time, usage not recorded"
            );
        }
        Err(err) => {
            tracing::warn!(
                booking_id,
                promotion_id,
                user_id,
                error = %err,
                "Failed to record promotion usage"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::booking::{find_by_id, find_detail};
    use crate::db::test_support::test_pool;
    use shared::models::{
        BookingAddonInput, BookingCreate, BookingStatus, DiscountType, PaymentStatus,
        PromotionCreate, PromotionStatus, ServiceFormat,
    };

    fn base_booking() -> BookingCreate {
        BookingCreate {
            customer_name: "Alice".to_string(),
            customer_phone: Some("0400000000".to_string()),
            customer_email: None,
            user_id: Some(77),
            booking_date: "2026-09-01".to_string(),
            booking_time: "10:00".to_string(),
            address: None,
            latitude: None,
            longitude: None,
            notes: None,
            service_format: ServiceFormat::Single,
            recipient_count: 1,
            final_price: 120.0,
            discount_amount: None,
            promotion_id: None,
        }
    }

    fn line(service_id: i64, recipient_index: i64, price: f64) -> BookingServiceInput {
        BookingServiceInput {
            service_id,
            duration: 60,
            price,
            recipient_index,
            recipient_name: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_single_service_booking() {
        let pool = test_pool().await;
        let request = BookingCreateRequest {
            booking: base_booking(),
            services: vec![line(10, 0, 120.0)],
            addons: vec![],
        };
        let id = create_booking_with_services(&pool, &request).await.unwrap();

        let booking = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(booking.service_id, 10);
        assert_eq!(booking.base_price, 120.0);
        assert!(!booking.is_multi_service);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);

        let detail = find_detail(&pool, id).await.unwrap();
        assert_eq!(detail.services.len(), 1);
        assert!(detail.addons.is_empty());
    }

    #[tokio::test]
    async fn test_multi_service_denormalizes_primary() {
        let pool = test_pool().await;
        let mut booking = base_booking();
        booking.service_format = ServiceFormat::Simultaneous;
        booking.recipient_count = 2;
        let request = BookingCreateRequest {
            booking,
            // out of order on purpose: index 0 is second in the list
            services: vec![line(20, 1, 90.0), line(10, 0, 120.0)],
            addons: vec![],
        };
        let id = create_booking_with_services(&pool, &request).await.unwrap();

        let booking = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(booking.service_id, 10);
        assert!(booking.is_multi_service);

        // detail returns lines ordered by recipient_index
        let detail = find_detail(&pool, id).await.unwrap();
        assert_eq!(detail.services.len(), 2);
        assert_eq!(detail.services[0].service_id, 10);
        assert_eq!(detail.services[1].service_id, 20);
    }

    #[tokio::test]
    async fn test_missing_index_zero_falls_back_to_first() {
        let pool = test_pool().await;
        let request = BookingCreateRequest {
            booking: base_booking(),
            services: vec![line(30, 1, 80.0), line(40, 2, 70.0)],
            addons: vec![],
        };
        let id = create_booking_with_services(&pool, &request).await.unwrap();
        let booking = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(booking.service_id, 30);
    }

    #[tokio::test]
    async fn test_empty_services_rejected() {
        let pool = test_pool().await;
        let request = BookingCreateRequest {
            booking: base_booking(),
            services: vec![],
            addons: vec![],
        };
        let err = create_booking_with_services(&pool, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_failed_line_insert_rolls_back_booking() {
        // the second line violates the schema's duration check, so the
        // whole transaction must unwind, booking row included
        let pool = test_pool().await;
        let mut bad_line = line(20, 1, 90.0);
        bad_line.duration = 0;
        let request = BookingCreateRequest {
            booking: base_booking(),
            services: vec![line(10, 0, 120.0), bad_line],
            addons: vec![],
        };
        let err = create_booking_with_services(&pool, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Database(_)));
        assert!(
            crate::db::repository::booking::find_all(&pool)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_addons_persisted() {
        let pool = test_pool().await;
        let request = BookingCreateRequest {
            booking: base_booking(),
            services: vec![line(10, 0, 120.0)],
            addons: vec![BookingAddonInput {
                service_addon_id: 5,
                quantity: 2,
                price_per_unit: 15.0,
                total_price: 30.0,
            }],
        };
        let id = create_booking_with_services(&pool, &request).await.unwrap();
        let detail = find_detail(&pool, id).await.unwrap();
        assert_eq!(detail.addons.len(), 1);
        assert_eq!(detail.addons[0].total_price, 30.0);
    }

    async fn seed_promotion(pool: &SqlitePool, code: &str) -> i64 {
        let promo = promotion::create(
            pool,
            PromotionCreate {
                code: code.to_string(),
                name: "Test".to_string(),
                description: None,
                status: Some(PromotionStatus::Active),
                discount_type: DiscountType::Percentage,
                discount_value: 10.0,
                max_discount: None,
                min_order_amount: None,
                usage_limit: None,
                usage_limit_per_user: None,
                applies_to: None,
                target_services: None,
                target_categories: None,
                start_date: 0,
                end_date: i64::MAX,
            },
        )
        .await
        .unwrap();
        promo.id
    }

    #[tokio::test]
    async fn test_promotion_usage_recorded_after_booking() {
        let pool = test_pool().await;
        let promotion_id = seed_promotion(&pool, "TEN").await;
        let mut booking = base_booking();
        booking.promotion_id = Some(promotion_id);
        booking.discount_amount = Some(12.0);
        booking.final_price = 108.0;
        let request = BookingCreateRequest {
            booking,
            services: vec![line(10, 0, 120.0)],
            addons: vec![],
        };
        let id = create_booking_with_services(&pool, &request).await.unwrap();

        let usage = promotion::find_usage_by_booking(&pool, id).await.unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].promotion_id, promotion_id);
        assert_eq!(usage[0].user_id, 77);
        assert_eq!(usage[0].discount_amount, 12.0);

        let promo = promotion::find_by_id(&pool, promotion_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(promo.usage_count, 1);
    }

    #[tokio::test]
    async fn test_usage_recording_failure_keeps_booking() {
        // unknown promotion id: recording fails, the booking must stand
        let pool = test_pool().await;
        let mut booking = base_booking();
        booking.promotion_id = Some(999_999);
        booking.discount_amount = Some(5.0);
        let request = BookingCreateRequest {
            booking,
            services: vec![line(10, 0, 120.0)],
            addons: vec![],
        };
        let id = create_booking_with_services(&pool, &request).await.unwrap();
        assert!(find_by_id(&pool, id).await.unwrap().is_some());
        assert!(
            promotion::find_usage_by_booking(&pool, id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_zero_discount_skips_usage_recording() {
        let pool = test_pool().await;
        let promotion_id = seed_promotion(&pool, "ZERO").await;
        let mut booking = base_booking();
        booking.promotion_id = Some(promotion_id);
        booking.discount_amount = Some(0.0);
        let request = BookingCreateRequest {
            booking,
            services: vec![line(10, 0, 120.0)],
            addons: vec![],
        };
        let id = create_booking_with_services(&pool, &request).await.unwrap();
        assert!(
            promotion::find_usage_by_booking(&pool, id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_guest_booking_skips_usage_recording() {
        let pool = test_pool().await;
        let promotion_id = seed_promotion(&pool, "GUEST").await;
        let mut booking = base_booking();
        booking.user_id = None;
        booking.promotion_id = Some(promotion_id);
        booking.discount_amount = Some(12.0);
        let request = BookingCreateRequest {
            booking,
            services: vec![line(10, 0, 120.0)],
            addons: vec![],
        };
        create_booking_with_services(&pool, &request).await.unwrap();
        let promo = promotion::find_by_id(&pool, promotion_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(promo.usage_count, 0);
    }
}
