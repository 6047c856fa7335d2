//! Web API client against an in-process axum server standing in for
//! `slack.com/api`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use sb_domain::config::WebApiConfig;
use sb_domain::error::Error;
use sb_webapi::{ImageUpload, RestWebApiClient, WebApi};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Recorded {
    responses: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn post_message(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    if bearer(&headers) != "Bearer xoxb-test" {
        return Json(json!({ "ok": false, "error": "not_authed" }));
    }
    if form.get("channel").map(String::as_str) == Some("C404") {
        return Json(json!({ "ok": false, "error": "channel_not_found" }));
    }
    Json(json!({
        "ok": true,
        "channel": form.get("channel"),
        "ts": "1503435956.000247",
        "message": { "type": "message", "text": form.get("text"), "bot_id": "B1", "ts": "1503435956.000247" }
    }))
}

async fn users_list() -> Json<Value> {
    Json(json!({
        "ok": true,
        "members": [
            { "id": "U0OLD", "name": "echobot", "deleted": true },
            { "id": "U1", "team_id": "T1", "name": "ana", "real_name": "Ana" },
            { "id": "UBOT", "team_id": "T1", "name": "echobot", "is_bot": true }
        ]
    }))
}

async fn files_upload(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    rec.uploads.lock().push((content_type, body.to_vec()));
    Json(json!({ "ok": true, "file": { "id": "F1" } }))
}

async fn respond(State(rec): State<Recorded>, Json(body): Json<Value>) -> StatusCode {
    rec.responses.lock().push(body);
    StatusCode::OK
}

async fn serve(rec: Recorded) -> String {
    let app = Router::new()
        .route("/api/chat.postMessage", post(post_message))
        .route("/api/users.list", post(users_list))
        .route("/api/files.upload", post(files_upload))
        .route("/commands/respond", post(respond))
        .with_state(rec);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(origin: &str) -> RestWebApiClient {
    let cfg = WebApiConfig {
        base_url: format!("{origin}/api"),
        ..Default::default()
    };
    RestWebApiClient::new(&cfg, "xoxb-test").unwrap()
}

#[tokio::test]
async fn post_message_returns_echoed_message() {
    let origin = serve(Recorded::default()).await;
    let resp = client(&origin).post_message("C1", "hello").await.unwrap();
    assert_eq!(resp.channel, "C1");
    assert_eq!(resp.message.text, "hello");
    assert_eq!(resp.message.bot_id, "B1");
}

#[tokio::test]
async fn post_message_ok_false_is_slack_api_error() {
    let origin = serve(Recorded::default()).await;
    match client(&origin).post_message("C404", "hello").await {
        Err(Error::SlackApi { method, message }) => {
            assert_eq!(method, "chat.postMessage");
            assert_eq!(message, "channel_not_found");
        }
        other => panic!("expected SlackApi error, got {other:?}"),
    }
}

#[tokio::test]
async fn user_cache_lookups_skip_deleted_users() {
    let origin = serve(Recorded::default()).await;
    let c = client(&origin);

    assert_eq!(c.users_list().await.unwrap().len(), 3);
    assert!(c.user("U1").is_none(), "cache is empty until refreshed");

    c.refresh_users_cache().await.unwrap();
    assert_eq!(c.cached_user_count(), 3);
    assert_eq!(c.user("U1").unwrap().real_name, "Ana");
    assert_eq!(c.user_id("echobot").as_deref(), Some("UBOT"));
    assert_eq!(c.user_id("nobody"), None);

    // Clones share the cache.
    let clone = c.clone();
    assert!(clone.user("UBOT").unwrap().is_bot);
}

#[tokio::test]
async fn users_map_is_keyed_by_id() {
    let origin = serve(Recorded::default()).await;
    let users = client(&origin).users().await.unwrap();
    assert_eq!(users["U0OLD"].name, "echobot");
    assert!(users["U0OLD"].deleted);
}

#[tokio::test]
async fn respond_to_command_sets_response_type() {
    let rec = Recorded::default();
    let origin = serve(rec.clone()).await;
    let c = client(&origin);
    let url = format!("{origin}/commands/respond");

    c.respond_to_command(&url, "for everyone", true).await.unwrap();
    c.respond_to_command(&url, "just you", false).await.unwrap();

    let seen = rec.responses.lock().clone();
    assert_eq!(seen[0], json!({ "response_type": "in_channel", "text": "for everyone" }));
    assert_eq!(seen[1], json!({ "response_type": "ephemeral", "text": "just you" }));
}

#[tokio::test]
async fn upload_image_sends_multipart_form() {
    let rec = Recorded::default();
    let origin = serve(rec.clone()).await;

    client(&origin)
        .upload_image(ImageUpload {
            channels: vec!["C1".into(), "C2".into()],
            title: "chart".into(),
            file_name: "chart.png".into(),
            file_type: "png".into(),
            initial_comment: "weekly".into(),
            bytes: b"\x89PNG fake".to_vec(),
        })
        .await
        .unwrap();

    let uploads = rec.uploads.lock().clone();
    let (content_type, body) = &uploads[0];
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(body);
    assert!(body.contains(r#"filename="chart.png""#));
    assert!(body.contains("C1,C2"));
    assert!(body.contains("weekly"));
}

#[tokio::test]
async fn missing_scope_reports_needed_and_provided() {
    let app = Router::new().route(
        "/api/users.list",
        post(|| async {
            Json(json!({
                "ok": false,
                "error": "missing_scope",
                "needed": "users:read",
                "provided": "chat:write"
            }))
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let err = client(&format!("http://{addr}"))
        .refresh_users_cache()
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("missing_scope"));
    assert!(msg.contains("users:read"));
    assert!(msg.contains("chat:write"));
}

#[tokio::test]
async fn server_error_is_http_error() {
    let app = Router::new().route(
        "/api/chat.postMessage",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let err = client(&format!("http://{addr}"))
        .post_message("C1", "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
