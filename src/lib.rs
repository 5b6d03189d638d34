/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// SQLite 连接池与建表
pub mod database;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 路由与中间件组装
pub mod app;

/// 请求上下文（request_id / 开发模式开关）
pub mod request_context;

/// CORS 中间件构建
pub mod cors;

/// OpenAPI 文档
pub mod openapi;

/// 优雅退出
pub mod shutdown;

// 导出常用类型供外部使用
pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;
