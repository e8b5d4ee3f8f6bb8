//! 代理处理器
//!
//! 所有未被其他路由匹配的请求都交给编排器处理

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::edge::{InboundRequest, PageResponse};
use crate::web::types::AppState;

/// 请求体上限
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub async fn proxy(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!("读取请求体失败: {}", e);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|value| value.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let inbound = InboundRequest {
        method: parts.method,
        path_and_query,
        headers: parts.headers,
        body,
    };
    page_into_response(state.orchestrator.handle(inbound).await)
}

fn page_into_response(page: PageResponse) -> Response {
    let mut response = Response::new(Body::from(page.body));
    *response.status_mut() = page.status;
    *response.headers_mut() = page.headers;
    response
}
