//! Web 路由定义

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::edge::settings::constants::DEFAULT_ENGINE_SCRIPT_URL;
use crate::web::{handlers::*, types::AppState};

/// 健康检查路径
pub const HEALTH_PATH: &str = "/__weblingo/health";

/// 引擎脚本路径，与默认的 `engine_script_url` 一致
pub const ENGINE_SCRIPT_PATH: &str = DEFAULT_ENGINE_SCRIPT_URL;

/// 健康检查与引擎脚本之外的一切都交给代理
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(ENGINE_SCRIPT_PATH, get(engine_script))
        .fallback(proxy)
}
