//! 边缘编排器集成测试
//!
//! 配置服务、翻译服务与源站都由 wiremock 模拟

use std::time::Duration;

use reqwest::header::{self, HeaderName};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weblingo::edge::{EdgeOrchestrator, EdgeSettings, InboundRequest, PageResponse};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::ABOUT_PAGE;

struct Harness {
    api: MockServer,
    origin: MockServer,
}

impl Harness {
    async fn start() -> Self {
        Self {
            api: MockServer::start().await,
            origin: MockServer::start().await,
        }
    }

    fn settings(&self, api_key: Option<&str>) -> EdgeSettings {
        EdgeSettings {
            api_key: api_key.map(str::to_string),
            api_base_url: format!("{}/", self.api.uri()),
            origin_url: format!("{}/", self.origin.uri()),
            request_timeout_secs: 5,
            ..EdgeSettings::default()
        }
    }

    fn orchestrator(&self, api_key: Option<&str>) -> EdgeOrchestrator {
        EdgeOrchestrator::from_settings(&self.settings(api_key)).expect("settings should be valid")
    }

    async fn mount_project(&self) {
        Mock::given(method("GET"))
            .and(path("/plan-status/"))
            .and(query_param("api_key", "key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "default_language": "en",
                "target_languages": ["fr", "de"]
            })))
            .mount(&self.api)
            .await;
        Mock::given(method("GET"))
            .and(path("/languages/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "languages": [
                    {"code": "en", "name": "English"},
                    {"code": "fr", "name": "Français"},
                    {"code": "de", "name": "Deutsch"}
                ]
            })))
            .mount(&self.api)
            .await;
    }

    async fn mount_page(&self, page_path: &str, body: &str, expected_fetches: u64) {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "text/html; charset=utf-8"),
            )
            .expect(expected_fetches)
            .mount(&self.origin)
            .await;
    }
}

fn body_text(page: &PageResponse) -> String {
    String::from_utf8(page.body.clone()).expect("body should be utf-8")
}

fn request(path_and_query: &str) -> InboundRequest {
    InboundRequest::get(path_and_query).with_header(header::HOST, "site.test")
}

#[tokio::test]
async fn test_locale_prefixed_request_is_augmented() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/about", ABOUT_PAGE, 1).await;
    let edge = harness.orchestrator(Some("key"));

    let page = edge.handle(request("/fr/about")).await;
    let html = body_text(&page);

    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.headers.get(header::CONTENT_LANGUAGE).unwrap(), "fr");
    assert_eq!(
        page.headers.get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=3600"
    );
    assert!(html.contains(r#"hreflang="de" href="http://site.test/de/about""#));
    assert!(html.contains(r#"hreflang="x-default" href="http://site.test/about""#));
    assert_eq!(html.matches("<option").count(), 3);
    assert!(html.contains(r#"<option value="fr" selected>Français</option>"#));
    assert!(html.contains(r#"<option value="de">Deutsch</option>"#));
    assert!(html.contains("window.__WEBLINGO__="));
}

#[tokio::test]
async fn test_missing_api_key_passes_through_untouched() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/plan-status/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.api)
        .await;
    harness.mount_page("/fr/about", ABOUT_PAGE, 1).await;
    let edge = harness.orchestrator(None);

    let page = edge.handle(request("/fr/about")).await;

    assert_eq!(body_text(&page), ABOUT_PAGE);
    assert_eq!(body_text(&page).matches("<script").count(), 0);
    assert!(page.headers.get(header::CONTENT_LANGUAGE).is_none());
}

#[tokio::test]
async fn test_cached_page_served_byte_identical() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/about", ABOUT_PAGE, 1).await;
    let edge = harness.orchestrator(Some("key"));

    let first = edge.handle(request("/fr/about?ref=nav")).await;
    // 写缓存是后台任务，让出执行权
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = edge.handle(request("/fr/about?ref=nav")).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cache_hit_does_not_replay_visitor_cookie() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=alice-secret")
                .set_body_raw(ABOUT_PAGE, "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&harness.origin)
        .await;
    let edge = harness.orchestrator(Some("key"));

    let alice = edge.handle(request("/fr/account")).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let bob = edge.handle(request("/fr/account")).await;

    assert_eq!(alice.headers.get(header::SET_COOKIE).unwrap(), "session=alice-secret");
    assert!(bob.headers.get(header::SET_COOKIE).is_none());
    assert_eq!(alice.body, bob.body);
}

#[tokio::test]
async fn test_cookie_varying_page_is_not_cached() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("vary", "Cookie")
                .set_body_raw(ABOUT_PAGE, "text/html; charset=utf-8"),
        )
        .expect(2)
        .mount(&harness.origin)
        .await;
    let edge = harness.orchestrator(Some("key"));

    edge.handle(request("/fr/dashboard")).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = edge.handle(request("/fr/dashboard")).await;

    assert_eq!(second.headers.get(header::CONTENT_LANGUAGE).unwrap(), "fr");
}

#[tokio::test]
async fn test_cache_key_includes_language() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/about", ABOUT_PAGE, 2).await;
    let edge = harness.orchestrator(Some("key"));

    let french = edge.handle(request("/fr/about")).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let german = edge.handle(request("/de/about")).await;

    assert_eq!(french.headers.get(header::CONTENT_LANGUAGE).unwrap(), "fr");
    assert_eq!(german.headers.get(header::CONTENT_LANGUAGE).unwrap(), "de");
}

#[tokio::test]
async fn test_non_html_and_error_responses_pass_through() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]),
        )
        .mount(&harness.origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw("<html><body>Not found</body></html>", "text/html"),
        )
        .mount(&harness.origin)
        .await;
    let edge = harness.orchestrator(Some("key"));

    let image = edge.handle(request("/fr/logo.png")).await;
    assert_eq!(image.body, vec![0x89, 0x50, 0x4e, 0x47]);
    assert!(image.headers.get(header::CONTENT_LANGUAGE).is_none());

    let missing = edge.handle(request("/fr/missing")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(body_text(&missing), "<html><body>Not found</body></html>");
}

#[tokio::test]
async fn test_config_failure_forwards_original_request() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/plan-status/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.api)
        .await;
    harness.mount_page("/fr/about", "<p>raw</p>", 1).await;
    let edge = harness.orchestrator(Some("key"));

    let page = edge.handle(request("/fr/about")).await;

    assert_eq!(body_text(&page), "<p>raw</p>");
}

#[tokio::test]
async fn test_empty_target_languages_pass_through() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/plan-status/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "default_language": "en",
            "target_languages": []
        })))
        .mount(&harness.api)
        .await;
    harness.mount_page("/about", ABOUT_PAGE, 1).await;
    let edge = harness.orchestrator(Some("key"));

    let page = edge.handle(request("/about")).await;

    assert_eq!(body_text(&page), ABOUT_PAGE);
}

#[tokio::test]
async fn test_default_page_gets_autodetect_and_switcher() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/about", ABOUT_PAGE, 1).await;
    let edge = harness.orchestrator(Some("key"));

    let page = edge.handle(request("/about")).await;
    let html = body_text(&page);

    assert!(html.contains(r#"data-weblingo="autodetect""#));
    assert!(html.contains(r#"<option value="en" selected>English</option>"#));
    assert!(!html.contains(r#"data-weblingo="engine""#));
    assert!(!html.contains("hreflang"));
    assert!(page.headers.get(header::CONTENT_LANGUAGE).is_none());
}

#[tokio::test]
async fn test_already_augmented_page_not_injected_twice() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/about", ABOUT_PAGE, 1).await;
    let edge = harness.orchestrator(Some("key"));

    let augmented = body_text(&edge.handle(request("/fr/about")).await);

    // 源站把已增强的页面原样返回（例如上游缓存了它）
    let stale = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(augmented.clone(), "text/html; charset=utf-8"),
        )
        .mount(&stale)
        .await;
    let settings = EdgeSettings {
        origin_url: format!("{}/", stale.uri()),
        ..harness.settings(Some("key"))
    };
    let edge = EdgeOrchestrator::from_settings(&settings).unwrap();

    let again = body_text(&edge.handle(request("/fr/about")).await);
    assert_eq!(again, augmented);
}

#[tokio::test]
async fn test_public_origin_from_forwarded_headers() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/", ABOUT_PAGE, 1).await;
    let edge = harness.orchestrator(Some("key"));

    let page = edge
        .handle(
            request("/de")
                .with_header(HeaderName::from_static("x-forwarded-proto"), "https")
                .with_header(HeaderName::from_static("x-forwarded-host"), "www.site.test"),
        )
        .await;

    assert!(body_text(&page).contains(r#"hreflang="fr" href="https://www.site.test/fr/""#));
}

#[tokio::test]
async fn test_prerender_translates_before_injection() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/about", ABOUT_PAGE, 1).await;
    Mock::given(method("POST"))
        .and(path("/translate/"))
        .and(body_partial_json(json!({"project_api_key": "key", "language": "fr"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translations": [
                {"original": "Hello", "translated": "Bonjour"},
                {"original": "World"}
            ]
        })))
        .mount(&harness.api)
        .await;

    let settings = EdgeSettings {
        prerender: true,
        ..harness.settings(Some("key"))
    };
    let edge = EdgeOrchestrator::from_settings(&settings).unwrap();

    let html = body_text(&edge.handle(request("/fr/about")).await);

    assert!(html.contains("<h1>Bonjour</h1>"));
    assert!(html.contains("<p>World</p>"));
    assert!(html.contains(r#"href="/fr/contact""#));
    assert!(html.contains(r#"data-weblingo="context""#));
    assert!(!html.contains(r#"data-weblingo="engine""#));
    assert!(!html.contains("weblingo-pending"));
}

#[tokio::test]
async fn test_failed_prerender_keeps_client_engine() {
    let harness = Harness::start().await;
    harness.mount_project().await;
    harness.mount_page("/about", ABOUT_PAGE, 1).await;
    Mock::given(method("POST"))
        .and(path("/translate/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&harness.api)
        .await;

    let settings = EdgeSettings {
        prerender: true,
        ..harness.settings(Some("key"))
    };
    let edge = EdgeOrchestrator::from_settings(&settings).unwrap();

    let html = body_text(&edge.handle(request("/fr/about")).await);

    assert!(html.contains("<h1>Hello</h1>"));
    assert!(html.contains(r#"data-weblingo="engine""#));
    assert!(html.contains("classList.remove('weblingo-pending')"));
}
