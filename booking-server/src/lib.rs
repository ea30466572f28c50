//! Booking Server - 按摩预约平台服务端
//!
//! # 架构概述
//!
//! - **促销** (`promotions`): 促销码验证和折扣计算
//! - **预约** (`bookings`): 事务性预约创建
//! - **数据库** (`db`): SQLite 连接池、迁移和仓储层
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── promotions/    # 促销码验证、折扣计算
//! ├── bookings/      # 预约创建
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod bookings;
pub mod core;
pub mod db;
pub mod promotions;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
