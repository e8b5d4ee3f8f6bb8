//! 源站请求
//!
//! 入站请求与页面响应的中立表示，以及基于 reqwest 的源站客户端

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::edge::error::{EdgeError, EdgeResult};

/// 逐跳头以及需要由代理重新计算的头
static STRIPPED_REQUEST_HEADERS: [HeaderName; 9] = [
    header::CONNECTION,
    header::HOST,
    header::ACCEPT_ENCODING,
    header::CONTENT_LENGTH,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

static STRIPPED_RESPONSE_HEADERS: [HeaderName; 5] = [
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::TRAILER,
    header::UPGRADE,
];

/// 入站请求
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl InboundRequest {
    pub fn get(path_and_query: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path_and_query: path_and_query.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn path(&self) -> &str {
        self.path_and_query
            .split('?')
            .next()
            .unwrap_or(&self.path_and_query)
    }

    /// 对外可见的源（scheme://host），依次参考转发头、Host 头和配置的源站
    pub fn public_origin(&self, fallback: &Url) -> String {
        let header_value = |name: &str| {
            self.headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let host = header_value("x-forwarded-host").or_else(|| header_value("host"));
        match host {
            Some(host) => {
                let scheme = header_value("x-forwarded-proto").unwrap_or(fallback.scheme());
                format!("{}://{}", scheme, host)
            }
            None => fallback.origin().ascii_serialization(),
        }
    }

    /// 页面的完整对外 URL，用作页面缓存键
    pub fn public_url(&self, fallback: &Url) -> String {
        format!("{}{}", self.public_origin(fallback), self.path_and_query)
    }
}

/// 页面响应
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl PageResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self { status, headers, body }
    }

    pub fn html(body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        Self::new(StatusCode::OK, headers, body.into().into_bytes())
    }

    pub fn bad_gateway() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self::new(StatusCode::BAD_GATEWAY, headers, b"Bad Gateway".to_vec())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    pub fn is_html(&self) -> bool {
        self.content_type()
            .and_then(|value| value.split(';').next())
            .map(|mime| mime.trim().eq_ignore_ascii_case("text/html"))
            .unwrap_or(false)
    }

    /// Content-Type 中声明的字符集
    pub fn charset(&self) -> Option<&str> {
        self.content_type()?.split(';').skip(1).find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"'))
            } else {
                None
            }
        })
    }
}

/// 源站协作方
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    /// 以入站请求的方法、头和请求体访问源站上的 `path_and_query`
    async fn fetch(&self, request: &InboundRequest, path_and_query: &str) -> EdgeResult<PageResponse>;
}

/// 基于 reqwest 的源站客户端，不跟随重定向
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    client: reqwest::Client,
    base: Url,
}

impl HttpOrigin {
    pub fn new(base: Url, timeout: Duration) -> EdgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| EdgeError::Settings(e.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn target_url(&self, path_and_query: &str) -> EdgeResult<Url> {
        Ok(self.base.join(path_and_query)?)
    }
}

#[async_trait]
impl OriginFetcher for HttpOrigin {
    async fn fetch(&self, request: &InboundRequest, path_and_query: &str) -> EdgeResult<PageResponse> {
        let url = self.target_url(path_and_query)?;

        let mut headers = request.headers.clone();
        for name in &STRIPPED_REQUEST_HEADERS {
            headers.remove(name);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EdgeError::Origin(format!("{}: {}", url, e)))?;

        let status = response.status();
        let mut headers = response.headers().clone();
        for name in &STRIPPED_RESPONSE_HEADERS {
            headers.remove(name);
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| EdgeError::Origin(format!("读取响应体失败: {}", e)))?;

        tracing::debug!("源站 {} {} -> {}", request.method, url, status);
        Ok(PageResponse::new(status, headers, body.to_vec()))
    }
}
