//! API Module
//!
//! HTTP API layer for the sidecar.
//! Each submodule handles endpoints for a specific resource.

pub mod config_map;
pub mod cronjob;
pub mod error;
pub mod health;
pub mod job;
mod workload;

use axum::{
    Router,
    http::StatusCode,
    routing::get,
};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::service::workload_service::WorkloadManager;

/// Create the main API router with all endpoints
///
/// `request_timeout` bounds every request, waits included; an expired
/// request is dropped along with any in-flight cluster call.
pub fn create_router(manager: WorkloadManager, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // ConfigMap endpoints
        .route("/watch/configmap", get(config_map::watch_config_maps))
        .route("/configmap/{key}", get(config_map::get_config_value))
        // CronJob endpoints
        .route(
            "/cronjob",
            get(cronjob::list_cron_jobs).post(cronjob::create_cron_job),
        )
        .route(
            "/cronjob/{name}",
            get(cronjob::get_cron_job).delete(cronjob::delete_cron_job),
        )
        // Job endpoints
        .route("/job", get(job::list_jobs).post(job::create_job))
        .route("/job/{name}", get(job::get_job).delete(job::delete_job))
        // Add state and middleware
        .with_state(manager)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::{InMemoryRepository, ScriptedStatus};
    use crate::service::template::fixtures::{cron_template, job_template};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use k8s_openapi::api::batch::v1::JobStatus;
    use serde_json::{Value, json};
    use sidecar_core::domain::workload::WorkloadKind;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn setup() -> (Arc<InMemoryRepository>, Router) {
        setup_with_timeout(Duration::from_secs(180))
    }

    fn setup_with_timeout(request_timeout: Duration) -> (Arc<InMemoryRepository>, Router) {
        let repository = Arc::new(InMemoryRepository::new());
        let manager = WorkloadManager::new(repository.clone(), "default", "sidecar-config");
        (repository, create_router(manager, request_timeout))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (_repository, app) = setup();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_job_lifecycle() {
        let (_repository, app) = setup();

        let (status, body) = send(
            &app,
            Method::POST,
            "/job",
            Some(json!({ "template": job_template("batch-7") })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "batch-7");
        assert_eq!(body["namespace"], "default");
        assert_eq!(body["kind"], "Job");

        let (status, body) = send(&app, Method::GET, "/job/batch-7", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["job"]["active"], 0);

        let (status, body) = send(&app, Method::GET, "/job", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, Method::DELETE, "/job/batch-7", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, "/job/batch-7", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_create_in_requested_namespace() {
        let (repository, app) = setup();

        let (status, body) = send(
            &app,
            Method::POST,
            "/cronjob",
            Some(json!({
                "namespace": "reports",
                "template": cron_template("nightly-report", "Forbid"),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["namespace"], "reports");
        assert!(
            repository
                .stored("reports", WorkloadKind::CronJob, "nightly-report")
                .is_some()
        );

        let (status, _) = send(&app, Method::GET, "/cronjob/nightly-report", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::GET,
            "/cronjob/nightly-report?namespace=reports",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let (_repository, app) = setup();
        let body = json!({ "template": job_template("batch-7") });

        send(&app, Method::POST, "/job", Some(body.clone())).await;
        let (status, body) = send(&app, Method::POST, "/job", Some(body)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "conflict");
    }

    #[tokio::test]
    async fn test_bad_template_is_decode_error() {
        let (_repository, app) = setup();

        let (status, body) = send(
            &app,
            Method::POST,
            "/job",
            Some(json!({ "template": "{ not json" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "decode");

        let (status, body) = send(
            &app,
            Method::POST,
            "/cronjob",
            Some(json!({ "template": job_template("batch-7") })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "decode");
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_wait_deadline_is_gateway_timeout() {
        let (repository, app) = setup();
        repository.script(
            "default",
            WorkloadKind::Job,
            "batch-7",
            vec![ScriptedStatus::Job(JobStatus::default())],
        );

        let (status, body) = send(
            &app,
            Method::POST,
            "/job",
            Some(json!({ "template": job_template("batch-7"), "wait": true })),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["kind"], "deadline_exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout_cuts_wait_short() {
        let (repository, app) = setup_with_timeout(Duration::from_secs(22));
        repository.script(
            "default",
            WorkloadKind::Job,
            "batch-7",
            vec![ScriptedStatus::Job(JobStatus::default())],
        );
        let start = tokio::time::Instant::now();

        let (status, body) = send(
            &app,
            Method::POST,
            "/job",
            Some(json!({ "template": job_template("batch-7"), "wait": true })),
        )
        .await;

        // Answered by the timeout layer, well before the Job's 60s window
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body, Value::Null);
        assert_eq!(start.elapsed(), Duration::from_secs(22));

        // Checks at 0, 5, 10, 15 and 20; the dropped wait polls no more
        let checks = repository.get_count();
        assert_eq!(checks, 5);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(repository.get_count(), checks);
    }

    #[tokio::test]
    async fn test_collection_words_are_valid_names() {
        let (_repository, app) = setup();

        for (kind, template) in [
            ("job", job_template("list")),
            ("job", job_template("create")),
            ("cronjob", cron_template("list", "Allow")),
            ("cronjob", cron_template("create", "Allow")),
        ] {
            let collection = format!("/{}", kind);
            let (status, body) = send(
                &app,
                Method::POST,
                &collection,
                Some(json!({ "template": template })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);

            let item = format!("/{}/{}", kind, body["name"].as_str().unwrap());
            let (status, body) = send(&app, Method::GET, &item, None).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_object());

            let (status, _) = send(&app, Method::DELETE, &item, None).await;
            assert_eq!(status, StatusCode::NO_CONTENT);

            let (status, body) = send(&app, Method::GET, &item, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["kind"], "not_found");
        }

        let (status, body) = send(&app, Method::GET, "/job", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (_repository, app) = setup();
        let (status, body) = send(&app, Method::DELETE, "/cronjob/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_unavailable() {
        let (repository, app) = setup();
        repository.set_unreachable(true);

        let (status, body) = send(&app, Method::GET, "/job", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "unavailable");
    }

    #[tokio::test]
    async fn test_config_value() {
        let (repository, app) = setup();
        repository.set_config_value("default", "sidecar-config", "schedule", "0 2 * * *");
        repository.set_config_value("default", "scheduler", "region", "eu-west");

        let (status, body) = send(&app, Method::GET, "/configmap/schedule", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], "0 2 * * *");

        let (status, body) = send(&app, Method::GET, "/configmap/region?name=scheduler", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], "eu-west");

        let (status, body) = send(&app, Method::GET, "/configmap/absent", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_watch_without_names_is_invalid() {
        let (_repository, app) = setup();
        let (status, body) = send(&app, Method::GET, "/watch/configmap?names=,", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid");
    }
}
