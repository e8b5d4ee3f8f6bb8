//! Web 路由处理器

pub mod engine_script;
pub mod health;
pub mod proxy;

pub use engine_script::*;
pub use health::*;
pub use proxy::*;
