mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{harness, harness_with, reply_to, wait_for, FakeApi, Harness};
use live_coach::session::{CoachEvent, Stage};
use live_coach::{create_router, AppState, Profile};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(h: &Harness) -> Router {
    create_router(AppState::new(h.session.clone(), h.feed.clone()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, value))
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let h = harness(FakeApi::new());
    let response = router(&h)
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"OK");
    Ok(())
}

#[tokio::test]
async fn test_start_and_stop_listening() -> Result<()> {
    let h = harness(FakeApi::new());
    let app = router(&h);

    let (status, body) = send(&app, "POST", "/coach/listen/start", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "listening");
    assert_eq!(body["session_id"], "S1");

    let (_, status_body) = send(&app, "GET", "/coach/status", None).await?;
    assert_eq!(status_body["listening"], true);
    assert_eq!(status_body["session_id"], "S1");
    assert_eq!(status_body["mood"], "professional");

    let (status, body) = send(&app, "POST", "/coach/listen/stop", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "idle");
    assert_eq!(body["session_id"], "S1");
    assert_eq!(h.session.stage().await, Stage::Idle);
    Ok(())
}

#[tokio::test]
async fn test_start_twice_conflicts() -> Result<()> {
    let h = harness(FakeApi::new());
    let app = router(&h);

    send(&app, "POST", "/coach/listen/start", None).await?;
    let (status, body) = send(&app, "POST", "/coach/listen/start", None).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("listening"));
    assert_eq!(h.api.creates().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_backend_failure_maps_to_bad_gateway() -> Result<()> {
    let api = FakeApi::new();
    api.create_outcomes
        .lock()
        .unwrap()
        .push_back(Err(StatusCode::SERVICE_UNAVAILABLE));
    let h = harness(api);
    let app = router(&h);

    let (status, body) = send(&app, "POST", "/coach/listen/toggle", None).await?;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("503"));
    let (_, snapshot) = send(&app, "GET", "/coach/status", None).await?;
    assert_eq!(snapshot["stage"], "idle");
    assert!(snapshot["listen_error"].as_str().unwrap().contains("503"));
    Ok(())
}

#[tokio::test]
async fn test_toggle_rejected_while_starting() -> Result<()> {
    let (api, gate) = FakeApi::new().with_create_gate();
    let mut h = harness(api);
    let app = router(&h);

    let session = h.session.clone();
    let pending = tokio::spawn(async move { session.start_listening().await });
    wait_for(&mut h.events, |e| {
        matches!(e, CoachEvent::StageChanged { stage: Stage::Starting })
    })
    .await;

    let (status, _) = send(&app, "POST", "/coach/listen/toggle", None).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    gate.add_permits(1);
    pending.await??;
    assert_eq!(h.session.stage().await, Stage::Listening);
    Ok(())
}

#[tokio::test]
async fn test_speech_frames_drive_the_conversation() -> Result<()> {
    let mut h = harness(FakeApi::new());
    let app = router(&h);

    let frame = json!({ "results": [{ "transcript": "Hello", "is_final": true }] });
    let (_, body) = send(&app, "POST", "/coach/speech", Some(frame.clone())).await?;
    assert_eq!(body["delivered"], false, "nothing is capturing yet");

    send(&app, "POST", "/coach/listen/start", None).await?;
    let (_, body) = send(&app, "POST", "/coach/speech", Some(frame)).await?;
    assert_eq!(body["delivered"], true);

    wait_for(&mut h.events, |e| matches!(e, CoachEvent::Subtitle { .. })).await;
    let (_, snapshot) = send(&app, "GET", "/coach/status", None).await?;
    assert_eq!(snapshot["subtitle"], reply_to("Hello"));
    assert_eq!(snapshot["turn_count"], 2);
    Ok(())
}

#[tokio::test]
async fn test_speech_end_restarts_capture() -> Result<()> {
    let mut h = harness(FakeApi::new());
    let app = router(&h);
    send(&app, "POST", "/coach/listen/start", None).await?;

    let (_, body) = send(&app, "POST", "/coach/speech/end", None).await?;
    assert_eq!(body["delivered"], true);

    let feed = h.feed.clone();
    common::wait_until(|| feed.capturing_engines() == 1).await;
    let frame = json!({ "results": [{ "transcript": "Again", "is_final": true }] });
    send(&app, "POST", "/coach/speech", Some(frame)).await?;
    wait_for(&mut h.events, |e| matches!(e, CoachEvent::Subtitle { .. })).await;
    Ok(())
}

#[tokio::test]
async fn test_mood_and_mode_updates() -> Result<()> {
    let h = harness(FakeApi::new());
    let app = router(&h);

    let mood = json!({ "mood": "skeptical" });
    let (status, body) = send(&app, "PUT", "/coach/mood", Some(mood)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mood"], "skeptical");

    let mode = json!({ "mode": "role_play" });
    let (status, body) = send(&app, "PUT", "/coach/mode", Some(mode)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "role_play");
    assert!(!body["tip"].as_str().unwrap().is_empty());

    let (status, _) = send(&app, "PUT", "/coach/mood", Some(json!({ "mood": "furious" }))).await?;
    assert!(status.is_client_error());
    Ok(())
}

#[tokio::test]
async fn test_transcript_edit_and_rendering() -> Result<()> {
    let profile = Profile {
        name: "Sarah Connor".to_string(),
        ..Default::default()
    };
    let h = harness_with(FakeApi::new(), Some(profile), true);
    let app = router(&h);

    let text = "You: Hi Sarah\nSarah: Who is this?\nfollow up next week";
    let edit = json!({ "text": text });
    let (status, body) = send(&app, "PUT", "/coach/transcript", Some(edit)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["edited"], true);
    assert_eq!(body["text"], text);
    assert_eq!(
        body["lines"],
        json!([
            { "kind": "user", "text": "Hi Sarah" },
            { "kind": "coach", "label": "Sarah", "text": "Who is this?" },
            { "kind": "note", "text": "follow up next week" }
        ])
    );

    let (_, body) = send(&app, "GET", "/coach/transcript", None).await?;
    assert_eq!(body["text"], text);
    Ok(())
}

#[tokio::test]
async fn test_stop_while_idle_is_ok() -> Result<()> {
    let h = harness(FakeApi::new());
    let app = router(&h);

    let (status, body) = send(&app, "POST", "/coach/listen/stop", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], Value::Null);
    assert!(h.api.calls().is_empty());
    Ok(())
}
