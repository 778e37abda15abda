//! 会员积分 HTTP 服务
//!
//! 将积分引擎的操作以 REST API 形式对外提供。
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义与 HTTP 状态码映射
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态与存储装配
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use dto::{ApiResponse, HistoryQuery, PurchaseRequest, UsePointsRequest, UserQuery, UserRequest};
pub use error::{ApiError, Result};
pub use state::AppState;
