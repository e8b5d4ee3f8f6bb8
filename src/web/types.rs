//! Web 模块的数据类型定义

use serde::Serialize;

use crate::edge::EdgeOrchestrator;

/// 应用状态
pub struct AppState {
    pub orchestrator: EdgeOrchestrator,
}

impl AppState {
    pub fn new(orchestrator: EdgeOrchestrator) -> Self {
        Self { orchestrator }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
