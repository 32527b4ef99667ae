use std::time::Duration;

use page_engine::{FailureKind, FetchSettings, ReqwestRetriever, Retriever};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn retriever_returns_body_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let retriever = ReqwestRetriever::default();
    let url = format!("{}/doc", server.uri());

    let document = retriever.fetch(&url).await.expect("fetch ok");
    assert_eq!(document.metadata.original_url, url);
    assert_eq!(document.metadata.final_url, document.metadata.original_url);
    assert_eq!(document.metadata.redirect_count, 0);
    assert_eq!(document.metadata.byte_len, 15);
    assert!(document
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(document.content, b"<html>ok</html>");
}

#[tokio::test]
async fn retriever_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let retriever = ReqwestRetriever::default();
    let url = format!("{}/missing", server.uri());

    let err = retriever.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(err.message.contains("404"), "message: {}", err.message);
    assert!(err.to_string().starts_with("Error fetching URL: "));
}

#[tokio::test]
async fn retriever_times_out_only_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;
    let url = format!("{}/slow", server.uri());

    let patient = ReqwestRetriever::default();
    assert!(patient.fetch(&url).await.is_ok());

    let settings = FetchSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..FetchSettings::default()
    };
    let err = ReqwestRetriever::new(settings).fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn retriever_follows_redirects_and_counts_them() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let url = format!("{}/old", server.uri());
    let document = ReqwestRetriever::default().fetch(&url).await.expect("fetch ok");

    assert_eq!(document.metadata.original_url, url);
    assert_eq!(document.metadata.final_url, format!("{}/new", server.uri()));
    assert_eq!(document.metadata.redirect_count, 1);
    assert_eq!(document.content, b"moved");
}

#[tokio::test]
async fn retriever_enforces_configured_redirect_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        redirect_limit: 0,
        ..FetchSettings::default()
    };
    let url = format!("{}/loop", server.uri());
    let err = ReqwestRetriever::new(settings).fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::RedirectLimitExceeded);
}

#[tokio::test]
async fn retriever_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agent"))
        .and(header("user-agent", "page-extract-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hi"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        user_agent: Some("page-extract-test/1.0".to_string()),
        ..FetchSettings::default()
    };
    let url = format!("{}/agent", server.uri());
    let document = ReqwestRetriever::new(settings).fetch(&url).await.expect("fetch ok");
    assert_eq!(document.content, b"hi");
}

#[tokio::test]
async fn connection_refused_becomes_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/gone", listener.local_addr().unwrap());
    drop(listener);

    let err = ReqwestRetriever::default().fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(err.to_string().starts_with("Error fetching URL: "));
}
