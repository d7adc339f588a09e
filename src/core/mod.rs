//! 核心层：错误处理、中间件、共享状态与路由

pub mod error;
pub mod middleware;
pub mod router;
pub mod state;
