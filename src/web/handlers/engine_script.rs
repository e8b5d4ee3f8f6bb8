//! 客户端翻译引擎脚本

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::edge::inject::{ENGINE_SCRIPT, ENGINE_SCRIPT_CONTENT_TYPE};

/// 引擎脚本的缓存时长与翻译页一致
const ENGINE_SCRIPT_CACHE_CONTROL: &str = "public, max-age=3600";

pub async fn engine_script() -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(ENGINE_SCRIPT_CONTENT_TYPE),
            ),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(ENGINE_SCRIPT_CACHE_CONTROL),
            ),
        ],
        ENGINE_SCRIPT,
    )
        .into_response()
}
