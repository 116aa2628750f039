mod common;

use std::sync::Arc;
use std::thread;

use common::{header, MockPlatform, SETTINGS, TOKEN};
use serde::{Deserialize, Serialize};
use serde_json::json;
use swi_client::{Error, ErrorKind, QueryRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Invitation {
    email: String,
    note: String,
}

#[derive(Debug, Serialize)]
struct InviteVars<'a> {
    email: &'a str,
    note: &'a str,
}

fn mount_graphql(platform: &MockPlatform, template: ResponseTemplate) {
    platform.mount(
        Mock::given(method("POST"))
            .and(path("/common/graphql"))
            .respond_with(template),
    );
}

fn graphql_requests(platform: &MockPlatform) -> Vec<wiremock::Request> {
    platform
        .received()
        .into_iter()
        .filter(|r| r.url.path() == "/common/graphql")
        .collect()
}

#[test]
fn failure_envelope_is_application_error() {
    let platform = MockPlatform::start();
    let client = platform.bootstrapped_client();
    mount_graphql(
        &platform,
        ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "not authorized"
        })),
    );

    let err = client
        .execute::<_, serde_json::Value>(&QueryRequest::new("query Users { users { id } }"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Application);
    assert!(matches!(err, Error::Application(ref m) if m == "not authorized"));
}

#[test]
fn success_envelope_returns_payload_with_markup_intact() {
    let platform = MockPlatform::start();
    let client = platform.bootstrapped_client();
    mount_graphql(
        &platform,
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "email": "a@example.com", "note": "<b>welcome</b> & enjoy" }
        })),
    );

    let query = QueryRequest::new(
        "mutation Invite($email: String!, $note: String) { invite(email: $email, note: $note) { email note } }",
    )
    .operation_name("Invite")
    .variables(InviteVars {
        email: "a@example.com",
        note: "<b>welcome</b> & enjoy",
    });
    let invitation: Invitation = client.execute(&query).unwrap();

    assert_eq!(
        invitation,
        Invitation {
            email: "a@example.com".into(),
            note: "<b>welcome</b> & enjoy".into(),
        }
    );

    let sent = graphql_requests(&platform);
    assert_eq!(sent.len(), 1);
    let raw = String::from_utf8(sent[0].body.clone()).unwrap();
    assert!(raw.contains("<b>welcome</b> & enjoy"), "escaped body: {raw}");
    let body: serde_json::Value = serde_json::from_slice(&sent[0].body).unwrap();
    assert_eq!(body["operationName"], "Invite");
    assert_eq!(body["variables"]["email"], "a@example.com");
}

#[test]
fn every_query_carries_session_artifacts() {
    let platform = MockPlatform::start();
    let client = platform.bootstrapped_client();
    mount_graphql(
        &platform,
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": null })),
    );

    for _ in 0..3 {
        let _: Option<serde_json::Value> = client.execute(&QueryRequest::new("{ me { id } }")).unwrap();
    }

    let sent = graphql_requests(&platform);
    assert_eq!(sent.len(), 3);
    for req in &sent {
        assert_eq!(header(req, "x-csrf-token"), Some(TOKEN));
        assert_eq!(
            header(req, "cookie"),
            Some(format!("swi-settings={SETTINGS}").as_str())
        );
        assert_eq!(header(req, "content-type"), Some("application/json"));
    }
}

#[test]
fn session_is_shared_across_threads() {
    let platform = MockPlatform::start();
    let client = Arc::new(platform.bootstrapped_client());
    mount_graphql(
        &platform,
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": { "ok": true } })),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                client
                    .execute::<_, serde_json::Value>(&QueryRequest::new("{ ok }"))
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), json!({ "ok": true }));
    }

    let sent = graphql_requests(&platform);
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|r| header(r, "x-csrf-token") == Some(TOKEN)));
}

#[test]
fn execute_before_init_sends_nothing() {
    let platform = MockPlatform::start();
    let client = platform.client();

    let err = client
        .execute::<_, serde_json::Value>(&QueryRequest::new("{ me { id } }"))
        .unwrap_err();

    assert!(matches!(err, Error::NotInitialized));
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(platform.received().is_empty());
}

#[test]
fn undecodable_body_is_transport_error() {
    let platform = MockPlatform::start();
    let client = platform.bootstrapped_client();
    mount_graphql(&platform, ResponseTemplate::new(200).set_body_string("<html>oops</html>"));

    let err = client
        .execute::<_, serde_json::Value>(&QueryRequest::new("{ me { id } }"))
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn error_status_without_envelope_is_status_error() {
    let platform = MockPlatform::start();
    let client = platform.bootstrapped_client();
    mount_graphql(&platform, ResponseTemplate::new(502).set_body_string("bad gateway"));

    let err = client
        .execute::<_, serde_json::Value>(&QueryRequest::new("{ me { id } }"))
        .unwrap_err();
    assert!(matches!(err, Error::Status { status: 502, .. }));
}

#[test]
fn failure_envelope_on_error_status_keeps_message() {
    let platform = MockPlatform::start();
    let client = platform.bootstrapped_client();
    mount_graphql(
        &platform,
        ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "message": "invalid csrf token"
        })),
    );

    let err = client
        .execute::<_, serde_json::Value>(&QueryRequest::new("{ me { id } }"))
        .unwrap_err();
    assert!(matches!(err, Error::Application(ref m) if m == "invalid csrf token"));
}
