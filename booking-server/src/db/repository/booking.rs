//! Booking Repository
//!
//! Inserts take `&mut SqliteConnection` so the booking writer can compose
//! them inside a single transaction; reads run against the pool.

use super::{RepoError, RepoResult};
use shared::models::{
    Booking, BookingAddon, BookingAddonInput, BookingCreate, BookingDetail, BookingService,
    BookingServiceInput,
};
use sqlx::{SqliteConnection, SqlitePool};

const BOOKING_SELECT: &str = "SELECT id, customer_name, customer_phone, customer_email, user_id, booking_date, booking_time, address, latitude, longitude, notes, service_format, recipient_count, service_id, duration, base_price, is_multi_service, final_price, discount_amount, promotion_id, status, payment_status, created_at, updated_at FROM booking";

/// Insert the booking row, denormalizing the primary service line onto it.
/// Returns the generated booking ID.
pub async fn insert_booking(
    conn: &mut SqliteConnection,
    data: &BookingCreate,
    primary: &BookingServiceInput,
    is_multi_service: bool,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO booking (id, customer_name, customer_phone, customer_email, user_id, booking_date, booking_time, address, latitude, longitude, notes, service_format, recipient_count, service_id, duration, base_price, is_multi_service, final_price, discount_amount, promotion_id, status, payment_status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, 'PENDING', 'PENDING', ?21, ?21)",
    )
    .bind(id)
    .bind(&data.customer_name)
    .bind(&data.customer_phone)
    .bind(&data.customer_email)
    .bind(data.user_id)
    .bind(&data.booking_date)
    .bind(&data.booking_time)
    .bind(&data.address)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.notes)
    .bind(data.service_format)
    .bind(data.recipient_count)
    .bind(primary.service_id)
    .bind(primary.duration)
    .bind(primary.price)
    .bind(is_multi_service)
    .bind(data.final_price)
    .bind(data.discount_amount)
    .bind(data.promotion_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

/// Insert one line per recipient (the primary line is duplicated here so
/// the child table carries the complete list).
pub async fn insert_service_lines(
    conn: &mut SqliteConnection,
    booking_id: i64,
    lines: &[BookingServiceInput],
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    for line in lines {
        let id = shared::util::snowflake_id();
        sqlx::query(
            "INSERT INTO booking_service (id, booking_id, service_id, duration, price, recipient_index, recipient_name, sort_order, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(id)
        .bind(booking_id)
        .bind(line.service_id)
        .bind(line.duration)
        .bind(line.price)
        .bind(line.recipient_index)
        .bind(&line.recipient_name)
        .bind(line.sort_order.unwrap_or(0))
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn insert_addon_lines(
    conn: &mut SqliteConnection,
    booking_id: i64,
    addons: &[BookingAddonInput],
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    for addon in addons {
        let id = shared::util::snowflake_id();
        sqlx::query(
            "INSERT INTO booking_addon (id, booking_id, service_addon_id, quantity, price_per_unit, total_price, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(id)
        .bind(booking_id)
        .bind(addon.service_addon_id)
        .bind(addon.quantity)
        .bind(addon.price_per_unit)
        .bind(addon.total_price)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Booking>> {
    let sql = format!("{} ORDER BY created_at DESC", BOOKING_SELECT);
    let rows = sqlx::query_as::<_, Booking>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Booking>> {
    let sql = format!("{} WHERE id = ?", BOOKING_SELECT);
    let row = sqlx::query_as::<_, Booking>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Full booking detail: the row plus its service and add-on lines
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<BookingDetail> {
    let booking = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Booking {id} not found")))?;

    let services = sqlx::query_as::<_, BookingService>(
        "SELECT id, booking_id, service_id, duration, price, recipient_index, recipient_name, sort_order, created_at FROM booking_service WHERE booking_id = ? ORDER BY recipient_index, sort_order",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let addons = sqlx::query_as::<_, BookingAddon>(
        "SELECT id, booking_id, service_addon_id, quantity, price_per_unit, total_price, created_at FROM booking_addon WHERE booking_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(BookingDetail {
        booking,
        services,
        addons,
    })
}
