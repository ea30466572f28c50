//! Promotion API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::promotion;
use crate::promotions::validate_promo_code;
use crate::utils::{AppError, AppResult};
use shared::models::{Promotion, PromotionCreate, PromotionUpdate, ValidationResult};

/// GET /api/promotions - 获取所有促销活动
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Promotion>>> {
    let promotions = promotion::find_all(&state.pool).await?;
    Ok(Json(promotions))
}

/// GET /api/promotions/:id - 获取单个促销活动
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Promotion>> {
    let promo = promotion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Promotion {} not found", id)))?;
    Ok(Json(promo))
}

/// POST /api/promotions - 创建促销活动
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PromotionCreate>,
) -> AppResult<Json<Promotion>> {
    payload.validate()?;
    let promo = promotion::create(&state.pool, payload).await?;
    Ok(Json(promo))
}

/// PUT /api/promotions/:id - 更新促销活动
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PromotionUpdate>,
) -> AppResult<Json<Promotion>> {
    payload.validate()?;
    let promo = promotion::update(&state.pool, id, payload).await?;
    Ok(Json(promo))
}

/// DELETE /api/promotions/:id - 停用促销活动 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = promotion::delete(&state.pool, id).await?;
    Ok(Json(result))
}

/// 促销码验证请求
#[derive(Debug, Deserialize, Validate)]
pub struct ValidateRequest {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(range(min = 0.0))]
    pub order_amount: f64,
    pub user_id: i64,
    /// 订单中的服务 ID 列表
    #[serde(default)]
    pub service_ids: Vec<i64>,
    /// 订单中的服务分类列表
    #[serde(default)]
    pub categories: Vec<String>,
}

/// POST /api/promotions/validate - 验证促销码
///
/// 验证失败也返回 200：拒绝原因作为数据返回，客户端按 error_kind 渲染提示。
pub async fn validate(
    State(state): State<ServerState>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<ValidationResult>> {
    payload.validate()?;
    let result = validate_promo_code(
        &state.pool,
        &payload.code,
        payload.order_amount,
        payload.user_id,
        &payload.service_ids,
        &payload.categories,
    )
    .await?;
    Ok(Json(result))
}
