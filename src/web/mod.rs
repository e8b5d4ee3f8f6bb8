//! Web 服务器模块
//!
//! 把 axum 请求交给边缘编排器的反向代理

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::edge::{EdgeError, EdgeOrchestrator, EdgeResult};

/// Web 服务器
pub struct WebServer {
    config: ServerConfig,
    orchestrator: EdgeOrchestrator,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: ServerConfig, orchestrator: EdgeOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// 启动 Web 服务器
    pub async fn start(self) -> EdgeResult<()> {
        self.config
            .validate()
            .map_err(|e| EdgeError::Server(e.to_string()))?;

        let address = self.config.listen_address();
        let origin = self.orchestrator.origin_url().clone();
        let app = create_router(Arc::new(AppState::new(self.orchestrator)));

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| EdgeError::Server(format!("Failed to bind server: {}", e)))?;

        tracing::info!("Proxy starting at http://{} -> {}", address, origin);

        axum::serve(listener, app)
            .await
            .map_err(|e| EdgeError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
