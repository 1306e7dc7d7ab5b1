//! API Integration Tests
//!
//! Full router over the in-memory backend, driven with `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::util::ServiceExt;

use changelog_service::config::TrackingSettings;
use changelog_service::Settings;

mod common;

use common::{setup_app, setup_app_with, DAY, JAN_15_2023};

#[tokio::test]
async fn test_health() {
    let app = setup_app(JAN_15_2023);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_log_and_query_events() {
    let app = setup_app(JAN_15_2023);

    let (status, event) = app
        .post_as(
            "/api/v1/admin/events",
            json!({
                "event_type": "deploy",
                "source": "system",
                "message": "Deployed build 42",
                "section_hint": "changed"
            }),
            "7",
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["timestamp"], JAN_15_2023);
    assert_eq!(event["user_id"], 7);
    assert_eq!(event["metadata"], json!({}));

    let (status, body) = app
        .get("/api/v1/admin/events?section_hint=changed&source=")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["events"][0]["message"], "Deployed build 42");

    let (_, body) = app.get("/api/v1/admin/events?section_hint=added").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_log_event_validation_error() {
    let app = setup_app(JAN_15_2023);

    let (status, body) = app
        .post(
            "/api/v1/admin/events",
            json!({"event_type": "deploy", "source": "system", "message": ""}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "missing_field");
    assert_eq!(body["details"], "message");

    let (_, body) = app.get("/api/v1/admin/events").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_invalid_user_header_is_rejected() {
    let app = setup_app(JAN_15_2023);

    let (status, body) = app
        .post_as(
            "/api/v1/admin/events",
            json!({"event_type": "deploy", "source": "system", "message": "x"}),
            "not-a-number",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_user_id");
}

#[tokio::test]
async fn test_change_notifications() {
    let app = setup_app(JAN_15_2023);

    let (status, body) = app
        .post(
            "/api/v1/admin/changes",
            json!({
                "type": "content_created",
                "content": {
                    "entity_id": 3,
                    "bundle": "page",
                    "type_label": "Basic page",
                    "title": "About",
                    "path": "/about"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["events_logged"], 1);
    assert_eq!(body["events"][0]["message"], "Created Basic page: \"About\"");
    assert_eq!(body["events"][0]["entity_type_id"], "node");

    let (status, body) = app
        .post(
            "/api/v1/admin/changes",
            json!({"type": "modules_installed", "modules": ["views"], "is_syncing": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events_logged"], 0);
}

#[tokio::test]
async fn test_disabled_tracking_logs_nothing() {
    let settings = Settings {
        tracking: TrackingSettings {
            track_users: false,
            ..TrackingSettings::default()
        },
        ..Settings::default()
    };
    let app = setup_app_with(JAN_15_2023, settings);

    let (status, body) = app
        .post(
            "/api/v1/admin/changes",
            json!({"type": "user_created", "user": {"user_id": 4, "account_name": "ann"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events_logged"], 0);
}

#[tokio::test]
async fn test_generate_edit_publish_flow() {
    let app = setup_app(JAN_15_2023);

    for (message, hint) in [("New blog", "added"), ("Fixed login", "fixed")] {
        let (status, _) = app
            .post(
                "/api/v1/admin/events",
                json!({
                    "event_type": "manual",
                    "source": "system",
                    "message": message,
                    "section_hint": hint,
                    "timestamp": JAN_15_2023 - DAY
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Generate a draft
    let (status, body) = app
        .post_as(
            "/api/v1/admin/releases/generate",
            json!({"mode": "since_last", "version": "1.0.0"}),
            "2",
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let release_id = body["release"]["id"].as_i64().unwrap();
    assert_eq!(body["edit_url"], format!("/api/v1/admin/releases/{}", release_id));
    assert_eq!(body["release"]["label_type"], "semantic_version");
    assert_eq!(body["release"]["title"], "Release - January 2023");
    assert_eq!(body["release"]["published"], false);
    assert_eq!(body["release"]["owner"], 2);

    // Drafts are not public
    let (status, body) = app.get(&format!("/changelog/{}", release_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "not_found");
    let (_, body) = app.get("/changelog").await;
    assert_eq!(body["total"], 0);

    // Editable form
    let (status, body) = app
        .get(&format!("/api/v1/admin/releases/{}", release_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sections_text"]["added"], "New blog");

    // Edit and publish
    let (status, body) = app
        .patch(
            &format!("/api/v1/admin/releases/{}", release_id),
            json!({
                "title": "Version 1.0",
                "published": true,
                "sections_text": {"security": "Hardened sessions"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published"], true);

    // Public listing and view
    let (status, body) = app.get("/changelog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["releases"][0]["title"], "Version 1.0");
    assert_eq!(body["releases"][0]["excerpt"], "New blog • Fixed login");

    let (status, body) = app.get(&format!("/changelog/{}", release_id)).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = body["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Added", "Fixed", "Security"]);

    // Dashboard reflects the published boundary
    let (_, body) = app.get("/api/v1/admin/dashboard").await;
    assert_eq!(body["events_last_7_days"], 2);
    assert_eq!(body["events_since_last_release"], 0);
    assert_eq!(body["recent_releases"][0]["id"], release_id);
}

#[tokio::test]
async fn test_generate_custom_requires_both_dates() {
    let app = setup_app(JAN_15_2023);

    let (status, body) = app
        .post(
            "/api/v1/admin/releases/generate",
            json!({"mode": "custom", "start_date": "2023-01-01"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");

    let (_, body) = app.get("/api/v1/admin/releases").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_generate_custom_range() {
    let app = setup_app(JAN_15_2023 + 30 * DAY);

    let (status, body) = app
        .post(
            "/api/v1/admin/releases/generate",
            json!({"mode": "custom", "start_date": "2023-01-01", "end_date": "2023-01-31"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["release"]["date_start"], 1_672_531_200i64);
    assert_eq!(body["release"]["date_end"], 1_675_209_599i64);
    assert_eq!(body["release"]["label_type"], "date_range");
}

#[tokio::test]
async fn test_release_listing_and_delete() {
    let app = setup_app(JAN_15_2023);

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, body) = app
            .post("/api/v1/admin/releases/generate", json!({}))
            .await;
        ids.push(body["release"]["id"].as_i64().unwrap());
        app.clock.advance(60);
    }

    let (_, body) = app.get("/api/v1/admin/releases").await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["per_page"], 25);
    // Newest first
    assert_eq!(body["releases"][0]["id"], ids[2]);

    let status = app
        .delete(&format!("/api/v1/admin/releases/{}", ids[0]))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let status = app
        .delete(&format!("/api/v1/admin/releases/{}", ids[0]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/v1/admin/releases?page=1").await;
    assert_eq!(body["page"], 1);
    assert!(body["releases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_section_in_edit_is_rejected() {
    let app = setup_app(JAN_15_2023);
    let (_, body) = app
        .post("/api/v1/admin/releases/generate", json!({}))
        .await;
    let release_id = body["release"]["id"].as_i64().unwrap();

    let (status, body) = app
        .patch(
            &format!("/api/v1/admin/releases/{}", release_id),
            json!({"sections_text": {"deprecated": "Old API"}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_section");
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let app = setup_app(JAN_15_2023);
    let correlation_id = "6f1c2b1e-3f5a-4d55-9a43-0c7e0d7a9b11";

    let request = Request::builder()
        .uri("/health")
        .header("X-Correlation-Id", correlation_id)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        correlation_id
    );

    // Generated when the caller sends none
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    let generated = response.headers().get("x-correlation-id").unwrap();
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_manual_release_and_cleared_window() {
    let app = setup_app(JAN_15_2023);
    let released_at = JAN_15_2023 - 2 * DAY;

    let (status, body) = app
        .post_as(
            "/api/v1/admin/releases",
            json!({
                "title": "Hotfix notes",
                "release_date": released_at,
                "published": true,
                "sections_text": {"fixed": "Login loop"}
            }),
            "5",
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let manual_id = body["release"]["id"].as_i64().unwrap();
    assert_eq!(body["edit_url"], format!("/api/v1/admin/releases/{}", manual_id));
    assert_eq!(body["release"]["label_type"], "custom");
    assert_eq!(body["release"]["date_end"], serde_json::Value::Null);
    assert_eq!(body["release"]["owner"], 5);

    // Without a window end the release date is the boundary
    let (_, body) = app.get("/api/v1/admin/dashboard").await;
    assert_eq!(body["last_release_boundary"], released_at);

    let (_, body) = app
        .post("/api/v1/admin/releases/generate", json!({}))
        .await;
    assert_eq!(body["release"]["date_start"], released_at);
    let draft_id = body["release"]["id"].as_i64().unwrap();

    // null clears the generated window end
    let (status, body) = app
        .patch(
            &format!("/api/v1/admin/releases/{}", draft_id),
            json!({"date_end": null, "published": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date_end"], serde_json::Value::Null);
    assert_eq!(body["date_start"], released_at);

    let (_, body) = app.get("/api/v1/admin/dashboard").await;
    assert_eq!(body["last_release_boundary"], JAN_15_2023);

    let (_, body) = app.get("/changelog").await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_manual_release_requires_title() {
    let app = setup_app(JAN_15_2023);

    let (status, body) = app
        .post("/api/v1/admin/releases", json!({"published": true}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "missing_field");
    assert_eq!(body["details"], "title");

    let (_, body) = app.get("/api/v1/admin/releases").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_dashboard_ignores_future_events() {
    let app = setup_app(JAN_15_2023);

    for timestamp in [JAN_15_2023 - DAY, JAN_15_2023 + 10_000] {
        let (status, _) = app
            .post(
                "/api/v1/admin/events",
                json!({
                    "event_type": "manual",
                    "source": "system",
                    "message": "Scheduled",
                    "timestamp": timestamp
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get("/api/v1/admin/dashboard").await;
    assert_eq!(body["events_since_last_release"], 1);

    // Matches what a since-last generation picks up
    let (_, body) = app
        .post("/api/v1/admin/releases/generate", json!({}))
        .await;
    assert_eq!(body["release"]["sections"]["other"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_public_changelog_on_custom_path() {
    let settings = Settings {
        changelog_path: "/news".to_string(),
        ..Settings::default()
    };
    let app = setup_app_with(JAN_15_2023, settings);

    let (_, body) = app
        .post(
            "/api/v1/admin/releases",
            json!({"title": "Launch", "published": true, "sections_text": {"added": "Everything"}}),
        )
        .await;
    let release_id = body["release"]["id"].as_i64().unwrap();

    let (status, body) = app.get("/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["releases"][0]["excerpt"], "Everything");

    let (status, body) = app.get(&format!("/news/{}", release_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sections"][0]["label"], "Added");

    let (status, _) = app.get("/changelog").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
