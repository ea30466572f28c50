//! Promotion Repository

use super::{RepoError, RepoResult};
use shared::models::{AppliesTo, Promotion, PromotionCreate, PromotionStatus, PromotionUpdate, PromotionUsage};
use sqlx::SqlitePool;

const PROMOTION_SELECT: &str = "SELECT id, code, name, description, status, discount_type, discount_value, max_discount, min_order_amount, usage_limit, usage_count, usage_limit_per_user, applies_to, target_services, target_categories, start_date, end_date, created_at, updated_at FROM promotion";

/// Canonical form of a promo code: trimmed, uppercase.
///
/// Applied on write (create) and on read (find_by_code) so lookup is
/// case-insensitive end to end.
pub fn canonical_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn targets_json<T: serde::Serialize>(targets: &T) -> RepoResult<String> {
    serde_json::to_string(targets)
        .map_err(|e| RepoError::Validation(format!("Invalid target list: {e}")))
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Promotion>> {
    let sql = format!("{} ORDER BY created_at DESC", PROMOTION_SELECT);
    let rows = sqlx::query_as::<_, Promotion>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Promotion>> {
    let sql = format!("{} WHERE id = ?", PROMOTION_SELECT);
    let row = sqlx::query_as::<_, Promotion>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Promotion>> {
    let sql = format!("{} WHERE code = ?", PROMOTION_SELECT);
    let row = sqlx::query_as::<_, Promotion>(&sql)
        .bind(canonical_code(code))
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: PromotionCreate) -> RepoResult<Promotion> {
    let code = canonical_code(&data.code);
    if code.is_empty() {
        return Err(RepoError::Validation("Promo code must not be blank".into()));
    }
    if find_by_code(pool, &code).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Promotion '{code}' already exists"
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let status = data.status.unwrap_or(PromotionStatus::Draft);
    let applies_to = data.applies_to.unwrap_or(AppliesTo::All);
    let target_services = targets_json(&data.target_services.unwrap_or_default())?;
    let target_categories = targets_json(&data.target_categories.unwrap_or_default())?;

    sqlx::query(
        "INSERT INTO promotion (id, code, name, description, status, discount_type, discount_value, max_discount, min_order_amount, usage_limit, usage_count, usage_limit_per_user, applies_to, target_services, target_categories, start_date, end_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
    )
    .bind(id)
    .bind(&code)
    .bind(&data.name)
    .bind(&data.description)
    .bind(status)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.max_discount)
    .bind(data.min_order_amount)
    .bind(data.usage_limit)
    .bind(data.usage_limit_per_user)
    .bind(applies_to)
    .bind(&target_services)
    .bind(&target_categories)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create promotion".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: PromotionUpdate) -> RepoResult<Promotion> {
    let now = shared::util::now_millis();
    let target_services = match &data.target_services {
        Some(list) => Some(targets_json(list)?),
        None => None,
    };
    let target_categories = match &data.target_categories {
        Some(list) => Some(targets_json(list)?),
        None => None,
    };

    let rows = sqlx::query(
        "UPDATE promotion SET name = COALESCE(?1, name), description = COALESCE(?2, description), status = COALESCE(?3, status), discount_type = COALESCE(?4, discount_type), discount_value = COALESCE(?5, discount_value), max_discount = COALESCE(?6, max_discount), min_order_amount = COALESCE(?7, min_order_amount), usage_limit = COALESCE(?8, usage_limit), usage_limit_per_user = COALESCE(?9, usage_limit_per_user), applies_to = COALESCE(?10, applies_to), target_services = COALESCE(?11, target_services), target_categories = COALESCE(?12, target_categories), start_date = COALESCE(?13, start_date), end_date = COALESCE(?14, end_date), updated_at = ?15 WHERE id = ?16",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.status)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.max_discount)
    .bind(data.min_order_amount)
    .bind(data.usage_limit)
    .bind(data.usage_limit_per_user)
    .bind(data.applies_to)
    .bind(&target_services)
    .bind(&target_categories)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Promotion {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Promotion {id} not found")))
}

/// Soft delete: mark the promotion INACTIVE (usage history stays intact)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE promotion SET status = 'INACTIVE', updated_at = ? WHERE id = ? AND status != 'INACTIVE'",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Count recorded redemptions of one promotion by one user
pub async fn count_usage_by_user(
    pool: &SqlitePool,
    promotion_id: i64,
    user_id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM promotion_usage WHERE promotion_id = ? AND user_id = ?",
    )
    .bind(promotion_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn find_usage_by_booking(
    pool: &SqlitePool,
    booking_id: i64,
) -> RepoResult<Vec<PromotionUsage>> {
    let rows = sqlx::query_as::<_, PromotionUsage>(
        "SELECT id, promotion_id, user_id, booking_id, discount_amount, created_at FROM promotion_usage WHERE booking_id = ?",
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Record one redemption: conditional increment of the global counter plus
/// the per-user recount plus the usage insert, all in one transaction.
///
/// The validator's read-only limit checks are advisory; this is where the
/// limits are actually enforced, so two concurrent redemptions cannot
/// double-spend a capped promotion. Returns `false` (no row written) when
/// a limit blocked the recording.
pub async fn record_usage(
    pool: &SqlitePool,
    promotion_id: i64,
    user_id: i64,
    booking_id: i64,
    discount_amount: f64,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let per_user_limit: Option<i64> = sqlx::query_scalar(
        "SELECT usage_limit_per_user FROM promotion WHERE id = ?",
    )
    .bind(promotion_id)
    .fetch_optional(&mut *tx)
    .await?
    .flatten();

    if let Some(limit) = per_user_limit {
        let used: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM promotion_usage WHERE promotion_id = ? AND user_id = ?",
        )
        .bind(promotion_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if used >= limit {
            tx.rollback().await?;
            return Ok(false);
        }
    }

    // increment-if-below-limit: the global cap is enforced by the WHERE
    // clause, not by a prior read
    let incremented = sqlx::query(
        "UPDATE promotion SET usage_count = usage_count + 1, updated_at = ?1 WHERE id = ?2 AND (usage_limit IS NULL OR usage_count < usage_limit)",
    )
    .bind(now)
    .bind(promotion_id)
    .execute(&mut *tx)
    .await?;
    if incremented.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO promotion_usage (id, promotion_id, user_id, booking_id, discount_amount, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(promotion_id)
    .bind(user_id)
    .bind(booking_id)
    .bind(discount_amount)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use shared::models::DiscountType;

    fn make_create(code: &str) -> PromotionCreate {
        PromotionCreate {
            code: code.to_string(),
            name: "Test promotion".to_string(),
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
        }
    }

    #[tokio::test]
    async fn test_create_canonicalizes_code() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create("  welcome10 ")).await.unwrap();
        assert_eq!(promo.code, "WELCOME10");
        assert_eq!(promo.usage_count, 0);
        assert_eq!(promo.applies_to, AppliesTo::All);
        assert!(promo.target_services.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_code_case_insensitive() {
        let pool = test_pool().await;
        create(&pool, make_create("SPRING")).await.unwrap();
        let found = find_by_code(&pool, " spring ").await.unwrap();
        assert!(found.is_some());
        assert!(find_by_code(&pool, "AUTUMN").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let pool = test_pool().await;
        create(&pool, make_create("TWICE")).await.unwrap();
        let err = create(&pool, make_create("twice")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create("GONE")).await.unwrap();
        assert!(delete(&pool, promo.id).await.unwrap());
        // row still there, just inactive
        let found = find_by_id(&pool, promo.id).await.unwrap().unwrap();
        assert_eq!(found.status, PromotionStatus::Inactive);
        // second delete is a no-op
        assert!(!delete(&pool, promo.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_usage_increments_counter() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create("COUNT")).await.unwrap();
        assert!(record_usage(&pool, promo.id, 7, 1001, 5.0).await.unwrap());
        let found = find_by_id(&pool, promo.id).await.unwrap().unwrap();
        assert_eq!(found.usage_count, 1);
        assert_eq!(count_usage_by_user(&pool, promo.id, 7).await.unwrap(), 1);
        assert_eq!(count_usage_by_user(&pool, promo.id, 8).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_usage_stops_at_global_limit() {
        let pool = test_pool().await;
        let mut data = make_create("CAPPED");
        data.usage_limit = Some(2);
        let promo = create(&pool, data).await.unwrap();

        assert!(record_usage(&pool, promo.id, 1, 2001, 5.0).await.unwrap());
        assert!(record_usage(&pool, promo.id, 2, 2002, 5.0).await.unwrap());
        // third redemption blocked, counter and usage rows unchanged
        assert!(!record_usage(&pool, promo.id, 3, 2003, 5.0).await.unwrap());
        let found = find_by_id(&pool, promo.id).await.unwrap().unwrap();
        assert_eq!(found.usage_count, 2);
        assert!(find_usage_by_booking(&pool, 2003).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_usage_stops_at_per_user_limit() {
        let pool = test_pool().await;
        let mut data = make_create("ONEPER");
        data.usage_limit_per_user = Some(1);
        let promo = create(&pool, data).await.unwrap();

        assert!(record_usage(&pool, promo.id, 9, 3001, 5.0).await.unwrap());
        assert!(!record_usage(&pool, promo.id, 9, 3002, 5.0).await.unwrap());
        // a different user is unaffected
        assert!(record_usage(&pool, promo.id, 10, 3003, 5.0).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let pool = test_pool().await;
        let promo = create(&pool, make_create("MERGE")).await.unwrap();
        let updated = update(
            &pool,
            promo.id,
            PromotionUpdate {
                name: Some("Renamed".to_string()),
                description: None,
                status: None,
                discount_type: None,
                discount_value: Some(25.0),
                max_discount: None,
                min_order_amount: None,
                usage_limit: None,
                usage_limit_per_user: None,
                applies_to: None,
                target_services: Some(vec![11, 12]),
                target_categories: None,
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.discount_value, 25.0);
        assert_eq!(updated.target_services, vec![11, 12]);
        // untouched fields survive
        assert_eq!(updated.status, PromotionStatus::Active);
        assert_eq!(updated.code, "MERGE");
    }
}
