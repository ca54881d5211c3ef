//! The real esa client and HTTP downloader against a mock server.
//!
//! Both use reqwest's blocking client, which must not run on the async
//! runtime thread, so calls go through `spawn_blocking`.

use std::fs;
use std::time::Duration;

use esa_archiver::{
    ArchiveConfig, ArchiveError, EsaClient, HttpDownloader, PostSource, sequential,
};
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_json(number: u64, full_name: &str, name: &str, body: &str) -> serde_json::Value {
    json!({
        "number": number,
        "name": name,
        "full_name": full_name,
        "wip": false,
        "body_md": body,
        "created_at": "2024-03-01T09:00:00+09:00",
        "updated_at": "2024-03-01T09:00:00+09:00",
        "category": null,
        "comments": []
    })
}

fn page_json(posts: Vec<serde_json::Value>, page: u32, next_page: Option<u32>, total: usize) -> serde_json::Value {
    json!({
        "posts": posts,
        "prev_page": null,
        "next_page": next_page,
        "total_count": total,
        "page": page,
        "per_page": 100,
        "max_per_page": 100
    })
}

fn api_base(server: &MockServer) -> Url {
    Url::parse(&format!("{}/v1", server.uri())).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn follows_next_page_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/teams/docs/posts"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(query_param("include", "comments"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Remaining", "74")
                .set_body_json(page_json(vec![post_json(1, "A/One", "One", "1")], 1, Some(2), 2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/teams/docs/posts"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(vec![post_json(2, "Two", "Two", "2")], 2, None, 2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let base = api_base(&server);
    let posts = tokio::task::spawn_blocking(move || {
        EsaClient::with_base_url("secret", "docs", base)
            .unwrap()
            .fetch_all_posts()
    })
    .await
    .unwrap()
    .unwrap();

    let names: Vec<_> = posts.iter().map(|p| p.full_name.as_str()).collect();
    assert_eq!(names, ["A/One", "Two"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_error_is_an_upstream_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/teams/docs/posts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .mount(&server)
        .await;

    let base = api_base(&server);
    let err = tokio::task::spawn_blocking(move || {
        EsaClient::with_base_url("wrong", "docs", base)
            .unwrap()
            .fetch_all_posts()
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, ArchiveError::UpstreamFetch { page: 1, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn archives_posts_and_downloads_attachments() {
    let server = MockServer::start().await;
    let file_url = format!("{}/files/uploads/x.png", server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/teams/docs/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![post_json(
                1,
                "Eng/Design",
                "Design",
                &format!("See [diagram (2MB)]({file_url})"),
            )],
            1,
            None,
            1,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/uploads/x.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNGDATA".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = ArchiveConfig::new(tmp.path(), "docs");
    config.quiet = true;
    config.attachment_prefixes = vec![format!("{}/files/", server.uri())];

    let base = api_base(&server);
    let summary = tokio::task::spawn_blocking(move || {
        let client = EsaClient::with_base_url("secret", "docs", base)?;
        sequential::execute(&config, &client, &HttpDownloader::new()?)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.attachments, 1);
    assert_eq!(
        fs::read_to_string(tmp.path().join("Eng/Design.md")).unwrap(),
        "See [diagram (2MB)](./attachments/diagram)"
    );
    assert_eq!(fs::read(tmp.path().join("Eng/attachments/diagram")).unwrap(), b"PNGDATA");
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_attachment_is_a_download_failure() {
    let server = MockServer::start().await;
    let file_url = format!("{}/files/gone.png", server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/teams/docs/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![post_json(1, "Eng/Gone", "Gone", &format!("[gone (1KB)]({file_url})"))],
            1,
            None,
            1,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = ArchiveConfig::new(tmp.path(), "docs");
    config.quiet = true;
    config.attachment_prefixes = vec![format!("{}/files/", server.uri())];

    let base = api_base(&server);
    let err = tokio::task::spawn_blocking(move || {
        let client = EsaClient::with_base_url("secret", "docs", base)?;
        sequential::execute(&config, &client, &HttpDownloader::new()?)
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, ArchiveError::AttachmentDownload { .. }));
    assert!(!tmp.path().join("Eng/attachments/gone").exists());
    assert!(!tmp.path().join("Eng/Gone.md").exists());
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Each response is held back past reqwest's default 30s deadline.
async fn slow_responses_are_waited_for() {
    let server = MockServer::start().await;
    let file_url = format!("{}/files/big.bin", server.uri());
    let slow = Duration::from_secs(33);

    Mock::given(method("GET"))
        .and(path("/v1/teams/docs/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(slow)
                .set_body_json(page_json(
                    vec![post_json(1, "Big", "Big", &format!("[big.bin (900 MB)]({file_url})"))],
                    1,
                    None,
                    1,
                )),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/big.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(slow)
                .set_body_bytes(b"BIG".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = ArchiveConfig::new(tmp.path(), "docs");
    config.quiet = true;
    config.attachment_prefixes = vec![format!("{}/files/", server.uri())];

    let base = api_base(&server);
    let summary = tokio::task::spawn_blocking(move || {
        let client = EsaClient::with_base_url("secret", "docs", base)?;
        sequential::execute(&config, &client, &HttpDownloader::new()?)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.attachments, 1);
    assert_eq!(fs::read(tmp.path().join("attachments/big.bin")).unwrap(), b"BIG");
}
