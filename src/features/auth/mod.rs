pub mod handler;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod session;
pub mod token;

// 对外导出路由构建函数，便于 lib.rs 引用
pub use handler::create_auth_router;
