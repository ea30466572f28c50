//! Booking API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use validator::Validate;

use crate::bookings::create_booking_with_services;
use crate::core::ServerState;
use crate::db::repository::booking;
use crate::utils::AppResult;
use shared::models::{Booking, BookingCreateRequest, BookingDetail};

/// 创建预约响应
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub id: i64,
}

/// GET /api/bookings - 获取所有预约
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Booking>>> {
    let bookings = booking::find_all(&state.pool).await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/:id - 获取预约详情 (含服务行和附加项)
pub async fn get_detail(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookingDetail>> {
    let detail = booking::find_detail(&state.pool, id).await?;
    Ok(Json(detail))
}

/// POST /api/bookings - 创建预约
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BookingCreateRequest>,
) -> AppResult<(StatusCode, Json<CreateBookingResponse>)> {
    payload.validate()?;
    let id = create_booking_with_services(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(CreateBookingResponse { id })))
}
