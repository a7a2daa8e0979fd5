//! Warung Server - 餐厅点餐系统后端
//!
//! # 架构概述
//!
//! 本模块是点餐后端的主入口，提供以下核心功能：
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **目录** (`api`): 菜单/分类/选项管理，图片上传
//! - **订单** (`orders`): 订单生命周期状态机与排队号
//! - **库存** (`stock`): 库存台账 (reserve/restock/reduce)
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (models + repositories)
//! ├── orders/        # 订单生命周期
//! ├── stock/         # 库存台账
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod stock;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderAction, OrderError, OrdersManager};
pub use stock::{StockError, StockLedger};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
 _       __
| |     / /___ _________  ______  ____ _
| | /| / / __ `/ ___/ / / / __ \/ __ `/
| |/ |/ / /_/ / /  / /_/ / / / / /_/ /
|__/|__/\__,_/_/   \__,_/_/ /_/\__, /
                              /____/
    "#
    );
}
