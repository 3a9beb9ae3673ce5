use std::collections::VecDeque;
use std::fs;
use std::sync::Mutex;

use serde_json::{Map, Value, json};
use tempfile::tempdir;

use crate::config::AstrometryConfig;
use crate::error::{AstrometryError, Result};
use crate::models::{ConnectOutcome, Session, UploadOptions};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};

use super::AstrometryClient;
use super::auth_service::session_from_login_response;
use super::upload_service::merge_protected;

const JOBS_URL: &str = "http://nova.astrometry.net/api/jobs";

#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn with(responses: Vec<Result<HttpResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn push_json(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(HttpResponse::new(status, body.to_string())));
    }

    fn push(&self, response: Result<HttpResponse>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("at least one request")
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().expect("requests lock").push(request);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(AstrometryError::Transport("no scripted response".into())))
    }
}

fn probe_ok() -> Result<HttpResponse> {
    Ok(HttpResponse::new(200, "<html>login page</html>"))
}

fn login_ok(session: &str) -> Result<HttpResponse> {
    Ok(HttpResponse::new(
        200,
        json!({"status": "success", "message": "authenticated user: a@b.c", "session": session})
            .to_string(),
    ))
}

fn request_json(request: &HttpRequest) -> Value {
    let raw = request.body.field("request-json").expect("request-json field");
    serde_json::from_str(raw).expect("request-json is json")
}

fn connected_client(session: &str) -> AstrometryClient<ScriptedTransport> {
    let transport = ScriptedTransport::with(vec![probe_ok(), login_ok(session)]);
    let mut client = AstrometryClient::new(transport, AstrometryConfig::new("key-1"));
    let outcome = client.connect().expect("connect");
    assert_eq!(outcome, ConnectOutcome::Authenticated);
    client
}

#[test]
fn new_client_performs_no_io() {
    let client = AstrometryClient::new(ScriptedTransport::default(), AstrometryConfig::new("k"));
    assert!(client.transport().requests().is_empty());
    assert!(!client.is_reachable());
    assert_eq!(client.session(), &Session::Unauthenticated);
}

#[test]
fn blank_api_key_fails_before_any_request() {
    for key in ["", "   ", "\t\n"] {
        let mut client = AstrometryClient::new(
            ScriptedTransport::with(vec![probe_ok(), login_ok("S")]),
            AstrometryConfig::new(key),
        );
        let err = client.connect().expect_err("blank key must fail");
        assert!(matches!(err, AstrometryError::Config(_)), "{err:?}");
        assert!(client.transport().requests().is_empty());
        assert!(!client.is_authenticated());
    }
}

#[test]
fn successful_login_stores_session() {
    let client = connected_client("S");
    assert!(client.is_reachable());
    assert_eq!(client.session().token(), Some("S"));

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].url, "http://nova.astrometry.net/api/login");
    assert_eq!(requests[0].body, RequestBody::Empty);
    assert_eq!(requests[1].method, HttpMethod::Post);
    assert_eq!(requests[1].url, "http://nova.astrometry.net/api/login");
    assert_eq!(request_json(&requests[1]), json!({"apikey": "key-1"}));
}

#[test]
fn rejected_login_surfaces_remote_message() {
    let transport = ScriptedTransport::with(vec![probe_ok()]);
    transport.push_json(200, json!({"status": "error", "errormessage": "bad key"}));
    let mut client = AstrometryClient::new(transport, AstrometryConfig::new("wrong"));

    let err = client.connect().expect_err("login rejected");
    match &err {
        AstrometryError::Auth(message) => assert!(message.contains("bad key")),
        other => panic!("expected auth error, got {other:?}"),
    }
    assert!(err.to_string().contains("bad key"));
    assert!(!client.is_authenticated());
}

#[test]
fn unrecognized_login_status_is_auth_error() {
    let transport = ScriptedTransport::with(vec![probe_ok()]);
    transport.push_json(200, json!({"status": "maintenance"}));
    let mut client = AstrometryClient::new(transport, AstrometryConfig::new("k"));

    let err = client.connect().expect_err("unknown status");
    match err {
        AstrometryError::Auth(message) => assert!(message.contains("unknown problem")),
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[test]
fn login_response_shapes() {
    assert_eq!(
        session_from_login_response(&json!({"status": "success", "session": "abc"}))
            .expect("session"),
        "abc"
    );
    for response in [
        json!({"status": "success"}),
        json!({"status": "success", "session": ""}),
        json!({"status": "success", "session": 17}),
        json!({"session": "abc"}),
        json!("success"),
    ] {
        let err = session_from_login_response(&response).expect_err("no usable session");
        assert_eq!(err.code(), "AUTH_ERROR", "{response}");
    }
}

#[test]
fn unreachable_service_skips_login_without_error() {
    let transport = ScriptedTransport::with(vec![Ok(HttpResponse::new(503, "down"))]);
    let mut client = AstrometryClient::new(transport, AstrometryConfig::new("k"));

    let outcome = client.connect().expect("unreachable is not an error");
    assert_eq!(outcome, ConnectOutcome::Unreachable);
    assert!(!client.is_reachable());
    assert!(!client.is_authenticated());
    assert_eq!(client.transport().requests().len(), 1);
}

#[test]
fn probe_requires_exact_200() {
    let transport = ScriptedTransport::with(vec![Ok(HttpResponse::new(204, ""))]);
    let mut client = AstrometryClient::new(transport, AstrometryConfig::new("k"));
    assert_eq!(client.connect().expect("connect"), ConnectOutcome::Unreachable);
}

#[test]
fn unreachable_reconnect_drops_existing_session() {
    let mut client = connected_client("S");
    client.transport().push(Ok(HttpResponse::new(503, "")));

    assert_eq!(client.connect().expect("connect"), ConnectOutcome::Unreachable);
    assert!(!client.is_reachable());
    assert!(!client.is_authenticated());
    assert!(matches!(
        client.job_status("42"),
        Err(AstrometryError::Unauthenticated)
    ));
}

#[test]
fn probe_transport_failure_counts_as_unreachable() {
    let transport = ScriptedTransport::with(vec![Err(AstrometryError::Transport(
        "connection refused".to_string(),
    ))]);
    let mut client = AstrometryClient::new(transport, AstrometryConfig::new("k"));
    assert_eq!(client.connect().expect("connect"), ConnectOutcome::Unreachable);
}

#[test]
fn operations_fail_fast_without_session() {
    let transport = ScriptedTransport::with(vec![Ok(HttpResponse::new(500, ""))]);
    let mut client = AstrometryClient::new(transport, AstrometryConfig::new("k"));
    client.connect().expect("connect");
    let before = client.transport().requests().len();

    let options = Map::new();
    assert!(matches!(
        client.submit_url("http://example.com/img.jpg", &options),
        Err(AstrometryError::Unauthenticated)
    ));
    assert!(matches!(
        client.job_status("42"),
        Err(AstrometryError::Unauthenticated)
    ));
    assert!(matches!(
        client.known_objects("42"),
        Err(AstrometryError::Unauthenticated)
    ));
    assert!(matches!(
        client.upload_bytes("m31.jpg", vec![0xff, 0xd8], &options),
        Err(AstrometryError::Unauthenticated)
    ));
    assert_eq!(client.transport().requests().len(), before);
}

#[test]
fn invalid_url_is_rejected_without_request() {
    let client = connected_client("S");
    let before = client.transport().requests().len();

    for raw in [
        "not a url",
        "http://example.com/a b.jpg",
        "http:example.com/img.jpg",
        "http:\\\\example.com\\img.jpg",
        "http://example.com/img.jpg\"",
    ] {
        let err = client.submit_url(raw, &Map::new()).expect_err(raw);
        assert!(matches!(err, AstrometryError::InvalidUrl(_)), "{raw}: {err:?}");
    }
    assert_eq!(client.transport().requests().len(), before);
}

#[test]
fn submit_url_merges_options_under_protected_fields() {
    let client = connected_client("S");
    let envelope = json!({
        "status": "success",
        "subid": 1234,
        "hash": "abc",
        "ratio": 0.25,
        "queued": true,
        "previous": null,
        "jobs": [null, 7],
        "meta": {"tags": ["m31", "andromeda"], "calibration": {"ra": 10.68, "dec": 41.27}}
    });
    client.transport().push_json(200, envelope.clone());

    let mut options = Map::new();
    options.insert("scale_units".to_string(), json!("degwidth"));
    let response = client
        .submit_url("http://example.com/img.jpg", &options)
        .expect("submit");
    assert_eq!(response, envelope);

    let request = client.transport().last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, "http://nova.astrometry.net/api/url_upload");
    let raw = request.body.field("request-json").expect("field");
    assert!(raw.contains("http://example.com/img.jpg"), "{raw}");
    assert_eq!(
        request_json(&request),
        json!({
            "scale_units": "degwidth",
            "session": "S",
            "url": "http://example.com/img.jpg"
        })
    );
}

#[test]
fn options_cannot_spoof_session_or_url() {
    let client = connected_client("S");
    client.transport().push_json(200, json!({"status": "success"}));

    let mut options = Map::new();
    options.insert("scale_units".to_string(), json!("degwidth"));
    options.insert("session".to_string(), json!("spoofed"));
    options.insert("url".to_string(), json!("http://evil.example/x.jpg"));
    client
        .submit_url("http://example.com/img.jpg", &options)
        .expect("submit");

    assert_eq!(
        request_json(&client.transport().last_request()),
        json!({
            "scale_units": "degwidth",
            "session": "S",
            "url": "http://example.com/img.jpg"
        })
    );
}

#[test]
fn typed_upload_options_feed_submit() {
    let client = connected_client("S");
    client.transport().push_json(200, json!({"status": "success"}));

    let options = UploadOptions {
        center_ra: Some(10.68),
        center_dec: Some(41.27),
        radius: Some(2.0),
        ..UploadOptions::default()
    }
    .to_map()
    .expect("options");
    client
        .submit_url("https://example.com/m31.png", &options)
        .expect("submit");

    let sent = request_json(&client.transport().last_request());
    assert_eq!(sent["center_ra"], 10.68);
    assert_eq!(sent["center_dec"], 41.27);
    assert_eq!(sent["radius"], 2.0);
    assert_eq!(sent["session"], "S");
}

#[test]
fn job_status_is_passed_through_unchanged() {
    let client = connected_client("S");
    let envelope = json!({
        "status": "success",
        "job_calibrations": [[1, 2]],
        "nested": {"keep": [null, true, 1.5, "x"]}
    });
    client.transport().push_json(200, envelope.clone());

    let response = client.job_status("42").expect("status");
    assert_eq!(response, envelope);

    let request = client.transport().last_request();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, format!("{JOBS_URL}/42"));
    assert_eq!(request.body, RequestBody::Empty);
}

#[test]
fn known_objects_targets_objects_in_field() {
    let client = connected_client("S");
    let envelope = json!({"objects_in_field": ["M 31", "NGC 224", "M 32"]});
    client.transport().push_json(200, envelope.clone());

    let response = client.known_objects(42).expect("objects");
    assert_eq!(response, envelope);
    assert_eq!(
        client.transport().last_request().url,
        format!("{JOBS_URL}/42/objects_in_field/")
    );
}

#[test]
fn error_envelopes_are_not_interpreted() {
    let client = connected_client("S");
    let envelope = json!({"status": "error", "errormessage": "no such job"});
    client.transport().push_json(200, envelope.clone());
    assert_eq!(client.job_status("999").expect("passthrough"), envelope);
}

#[test]
fn transport_failures_propagate() {
    let client = connected_client("S");

    client
        .transport()
        .push(Err(AstrometryError::Transport("connection reset".to_string())));
    let err = client.job_status("42").expect_err("transport");
    assert!(err.is_transport());

    client
        .transport()
        .push(Ok(HttpResponse::new(200, "<html>not json</html>")));
    let err = client.known_objects("42").expect_err("decode");
    assert!(matches!(err, AstrometryError::Json(_)));

    client
        .transport()
        .push(Ok(HttpResponse::new(502, "bad gateway")));
    let err = client
        .submit_url("http://example.com/img.jpg", &Map::new())
        .expect_err("status");
    match err {
        AstrometryError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn relogin_replaces_session() {
    let mut client = connected_client("S1");
    client.transport().push(login_ok("S2"));
    client.login().expect("relogin");
    assert_eq!(client.session().token(), Some("S2"));
}

#[test]
fn failed_relogin_keeps_existing_session() {
    let mut client = connected_client("S1");
    client
        .transport()
        .push_json(200, json!({"status": "error", "errormessage": "expired key"}));
    client.login().expect_err("relogin rejected");
    assert_eq!(client.session().token(), Some("S1"));
}

#[test]
fn upload_bytes_sends_multipart_with_session() {
    let client = connected_client("S");
    client
        .transport()
        .push_json(200, json!({"status": "success", "subid": 77}));

    let mut options = Map::new();
    options.insert("publicly_visible".to_string(), json!("n"));
    options.insert("session".to_string(), json!("spoofed"));
    let response = client
        .upload_bytes("m31.fits", vec![1, 2, 3], &options)
        .expect("upload");
    assert_eq!(response["subid"], 77);

    let request = client.transport().last_request();
    assert_eq!(request.url, "http://nova.astrometry.net/api/upload");
    match &request.body {
        RequestBody::Multipart { file, .. } => {
            assert_eq!(file.field_name, "file");
            assert_eq!(file.file_name, "m31.fits");
            assert_eq!(file.bytes, vec![1, 2, 3]);
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
    assert_eq!(
        request_json(&request),
        json!({"publicly_visible": "n", "session": "S"})
    );
}

#[test]
fn upload_file_reads_from_disk() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("field.jpg");
    fs::write(&path, b"\xff\xd8\xff\xe0").expect("write image");

    let client = connected_client("S");
    client.transport().push_json(200, json!({"status": "success"}));
    client.upload_file(&path, &Map::new()).expect("upload");

    match client.transport().last_request().body {
        RequestBody::Multipart { file, .. } => {
            assert_eq!(file.file_name, "field.jpg");
            assert_eq!(file.bytes, b"\xff\xd8\xff\xe0".to_vec());
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
}

#[test]
fn upload_file_missing_path_is_io_error() {
    let temp = tempdir().expect("tempdir");
    let client = connected_client("S");
    let err = client
        .upload_file(&temp.path().join("missing.fits"), &Map::new())
        .expect_err("missing file");
    assert!(matches!(err, AstrometryError::Io(_)));
}

#[test]
fn upload_bytes_rejects_blank_file_name() {
    let client = connected_client("S");
    let err = client
        .upload_bytes("  ", vec![1], &Map::new())
        .expect_err("blank name");
    assert!(matches!(err, AstrometryError::Config(_)));
}

#[test]
fn merge_protected_overrides_reserved_keys() {
    let mut options = Map::new();
    options.insert("session".to_string(), json!("x"));
    options.insert("tweak_order".to_string(), json!(3));
    let merged = merge_protected(&options, [("session", "real".to_string())]);
    assert_eq!(merged, json!({"session": "real", "tweak_order": 3}));
    assert_eq!(options["session"], "x");
}

#[test]
fn debug_output_hides_session_token() {
    let client = connected_client("very-secret-token");
    let rendered = format!("{client:?}");
    assert!(!rendered.contains("very-secret-token"));
    assert!(rendered.contains("Authenticated(..)"));
}

#[test]
fn connected_client_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AstrometryClient<ScriptedTransport>>();
    assert_send_sync::<AstrometryClient>();

    let client = connected_client("S");
    client.transport().push_json(200, json!({"status": "success", "id": 1}));
    client.transport().push_json(200, json!({"status": "success", "id": 2}));

    let client = &client;
    let statuses = std::thread::scope(|scope| {
        let handles = ["1", "2"]
            .map(|id| scope.spawn(move || client.job_status(id).expect("status")));
        handles.map(|handle| handle.join().expect("join"))
    });
    let mut ids = statuses
        .iter()
        .map(|value| value["id"].as_i64().expect("id"))
        .collect::<Vec<_>>();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(client.session().token(), Some("S"));
}
