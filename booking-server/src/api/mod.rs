//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`promotions`] - 促销活动管理与促销码验证接口
//! - [`bookings`] - 预约管理接口

pub mod bookings;
pub mod health;
pub mod promotions;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
