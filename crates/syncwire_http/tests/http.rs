//! Transport tests against a local mock server.

use serde_json::json;
use std::time::Duration;
use syncwire_http::{HttpConfig, ReqwestTransport};
use syncwire_testkit::prelude::*;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer, cache: bool, http: HttpConfig) -> JsonAdapter {
    init_tracing();
    let transport = ReqwestTransport::with_config(http).expect("client should build");
    JsonAdapter::with_config(
        AdapterConfig::new()
            .with_base_api_url(server.uri())
            .with_cache(cache),
        transport,
    )
}

async fn events(pending: PendingRequest) -> Vec<SyncEvent> {
    let mut pending = pending;
    let mut events = Vec::new();
    while let Some(event) = pending.next_event().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn read_decodes_collection_and_busts_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .and(query_param("tag", "work"))
        .and(header("Cache-Control", "no-cache"))
        .and(header("Pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, false, HttpConfig::new());
    let data = adapter
        .sync(
            &TestCollection::new("/notes").entity(),
            OperationType::Read,
            Options::new().with_param("tag", "work"),
            None,
        )
        .unwrap()
        .unwrap()
        .finish()
        .await
        .unwrap();
    assert_eq!(data, json!([{"id": 1}, {"id": 2}]));

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert!(request.url.query_pairs().any(|(key, _)| key == "_"));
    assert!(request.headers["accept"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert!(!request.headers.contains_key("content-type"));
}

#[tokio::test]
async fn cached_reads_are_sent_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": 4}"#))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, true, HttpConfig::new());
    adapter
        .sync(&TestRecord::new("/notes/4").entity(), OperationType::Read, Options::new(), None)
        .unwrap()
        .unwrap()
        .finish()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
    assert!(!requests[0].headers.contains_key("cache-control"));
}

#[tokio::test]
async fn save_posts_attributes_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(header("Content-Type", "application/json"))
        .and(header("X-Client", "notes"))
        .and(body_json(json!({"title": "groceries"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9, "title": "groceries"})))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, false, HttpConfig::new());
    let record = TestRecord::new("/notes")
        .unsaved()
        .with_attributes(json!({"title": "groceries"}));
    let pending = adapter
        .sync(
            &record.entity(),
            TypeHint::Save,
            Options::new().with_header("X-Client", "notes"),
            None,
        )
        .unwrap()
        .unwrap();

    let events = events(pending).await;
    assert!(matches!(
        &events[0],
        SyncEvent::Success { data, status: ResponseStatus::Success } if data["id"] == 9
    ));
    assert!(matches!(
        events[1],
        SyncEvent::Complete {
            status: ResponseStatus::Success
        }
    ));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn no_content_yields_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/notes/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, false, HttpConfig::new());
    let pending = adapter
        .sync(&TestRecord::new("/notes/3").entity(), "delete", Options::new(), None)
        .unwrap()
        .unwrap();

    let events = events(pending).await;
    assert!(matches!(
        &events[0],
        SyncEvent::Success { data, status: ResponseStatus::NoContent } if data == &json!({})
    ));
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
    assert!(!requests[0].headers.contains_key("content-type"));
}

#[tokio::test]
async fn empty_ok_body_parses_to_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/8"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, true, HttpConfig::new());
    let data = adapter
        .sync(&TestRecord::new("/notes/8").entity(), OperationType::Read, Options::new(), None)
        .unwrap()
        .unwrap()
        .finish()
        .await
        .unwrap();
    assert_eq!(data, json!({}));
}

#[tokio::test]
async fn blank_body_is_a_parser_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, true, HttpConfig::new());
    let pending = adapter
        .sync(&TestRecord::new("/notes/8").entity(), OperationType::Read, Options::new(), None)
        .unwrap()
        .unwrap();

    let events = events(pending).await;
    assert!(matches!(
        events[0],
        SyncEvent::Error(SyncError::MalformedResponseBody {
            origin: BodySource::Data,
            ..
        })
    ));
    assert!(matches!(
        events[1],
        SyncEvent::Complete {
            status: ResponseStatus::ParserError
        }
    ));
}

#[tokio::test]
async fn error_status_reaches_error_handler() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/notes/5"))
        .respond_with(ResponseTemplate::new(409).set_body_string("version conflict"))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, false, HttpConfig::new());
    let pending = adapter
        .sync(
            &TestRecord::new("/notes/5").entity(),
            TypeHint::Save,
            Options::new().with_data(json!({"title": "x"})),
            None,
        )
        .unwrap()
        .unwrap();

    let events = events(pending).await;
    assert_eq!(events.len(), 2);
    match &events[0] {
        SyncEvent::Error(err) => {
            assert_eq!(err.status(), Some(409));
            assert!(err.to_string().contains("version conflict"));
        }
        other => panic!("expected an error, got {other:?}"),
    }
    assert!(matches!(
        events[1],
        SyncEvent::Complete {
            status: ResponseStatus::Error
        }
    ));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let adapter = adapter_for(
        &server,
        false,
        HttpConfig::new().with_timeout(Duration::from_millis(100)),
    );
    let pending = adapter
        .sync(&TestCollection::new("/notes").entity(), OperationType::Read, Options::new(), None)
        .unwrap()
        .unwrap();

    let events = events(pending).await;
    assert!(matches!(&events[0], SyncEvent::Error(err) if err.is_transport() && err.status().is_none()));
    assert!(matches!(
        events[1],
        SyncEvent::Complete {
            status: ResponseStatus::Timeout
        }
    ));
}

#[tokio::test]
async fn abort_cancels_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, false, HttpConfig::new());
    let pending = adapter
        .sync(&TestCollection::new("/notes").entity(), OperationType::Read, Options::new(), None)
        .unwrap()
        .unwrap();
    assert!(pending.abort());

    let err = pending.finish().await.unwrap_err();
    assert!(matches!(err, SyncError::Aborted));
}

#[tokio::test]
async fn unreachable_host_reports_status_zero() {
    init_tracing();
    let transport = ReqwestTransport::with_config(HttpConfig::new()).unwrap();
    let adapter = JsonAdapter::with_config(
        AdapterConfig::new().with_base_api_url("http://127.0.0.1:1"),
        transport,
    );

    let err = adapter
        .sync(&TestCollection::new("/notes").entity(), OperationType::Read, Options::new(), None)
        .unwrap()
        .unwrap()
        .finish()
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}
