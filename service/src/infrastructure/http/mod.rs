use anyhow::Context;
use axum::Router;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tokio::net;

use crate::domain::AppState;
use crate::infrastructure::http::handlers::{
    categories::{create_category, delete_category, get_category, list_categories, update_category},
    dashboard::get_dashboard,
    health_check,
    resources::{
        delete_resource, edit_resource, get_resource, list_resources, moderate_resource,
        submit_resource, vote_resource,
    },
    tags::{create_tag, delete_tag, get_tag, list_tags},
};

mod api;
mod auth;
mod handlers;
mod querystring;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        // see: https://github.com/Ptrskay3/axum-prometheus
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = router(state)
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        let address = self
            .listener
            .local_addr()
            .context("failed to read listener address")?;
        tracing::info!("listening on {}", address);
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

/// Health check and API routes with request tracing, without metrics.
pub fn router<S: AppState>(state: S) -> Router {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        },
    );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(trace_layer)
        .with_state(state)
}

fn api_routes<S: AppState>() -> Router<S> {
    Router::new()
        .route(
            "/resources",
            get(list_resources::<S>).post(submit_resource::<S>),
        )
        .route(
            "/resources/{id}",
            get(get_resource::<S>)
                .patch(edit_resource::<S>)
                .delete(delete_resource::<S>),
        )
        .route(
            "/resources/{id}/moderate",
            axum::routing::post(moderate_resource::<S>),
        )
        .route("/resources/{id}/vote", axum::routing::post(vote_resource::<S>))
        .route(
            "/categories",
            get(list_categories::<S>).post(create_category::<S>),
        )
        .route(
            "/categories/{id}",
            get(get_category::<S>)
                .patch(update_category::<S>)
                .delete(delete_category::<S>),
        )
        .route("/tags", get(list_tags::<S>).post(create_tag::<S>))
        .route("/tags/{id}", get(get_tag::<S>).delete(delete_tag::<S>))
        .route("/dashboard", get(get_dashboard::<S>))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::{InMemoryStore, MODERATOR_TOKEN, TestAppState};

    fn app() -> Router {
        router(TestAppState::new(InMemoryStore::default()))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        moderator: bool,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if moderator {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", MODERATOR_TOKEN));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
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
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn submit(app: &Router, body: Value) -> i64 {
        let (status, created) = send(app, Method::POST, "/api/resources", Some(body), false).await;
        assert_eq!(status, StatusCode::CREATED);
        created["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn health_check_responds() {
        let (status, _) = send(&app(), Method::GET, "/health", None, false).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn submission_is_always_pending() {
        let app = app();

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/resources",
            Some(json!({
                "title": "Sleep Guide",
                "resource_type": "article",
                "status": "approved",
                "tags": ["baby", "Sleep", " SLEEP "]
            })),
            false,
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["status"], "pending");
        assert_eq!(created["data"]["approved_at"], Value::Null);
        assert_eq!(created["data"]["tags"], json!(["baby", "sleep"]));
    }

    #[tokio::test]
    async fn invalid_submission_is_unprocessable() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/resources",
            Some(json!({"title": "   ", "resource_type": "article"})),
            false,
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status_code"], 422);
    }

    #[tokio::test]
    async fn moderation_scenario() {
        let app = app();
        let id = submit(
            &app,
            json!({"title": "Sleep Guide", "resource_type": "article", "tags": ["baby", "sleep"]}),
        )
        .await;
        let moderate = format!("/api/resources/{id}/moderate");
        let vote = format!("/api/resources/{id}/vote");

        let (status, _) = send(&app, Method::POST, &vote, Some(json!({"vote_type": "up"})), false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::POST, &moderate, Some(json!({"decision": "approved"})), false).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send(&app, Method::POST, &moderate, Some(json!({"decision": "pending"})), true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, approved) =
            send(&app, Method::POST, &moderate, Some(json!({"decision": "approved"})), true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["data"]["status"], "approved");
        assert!(approved["data"]["approved_at"].is_string());

        let (status, voted) = send(&app, Method::POST, &vote, Some(json!({"vote_type": "up"})), false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(voted["data"]["vote_score"], 1);
    }

    #[tokio::test]
    async fn edits_require_a_moderator_and_never_reset_to_pending() {
        let app = app();
        let id = submit(&app, json!({"title": "Naps", "resource_type": "tip", "tags": ["sleep"]})).await;
        let uri = format!("/api/resources/{id}");

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"title": "Better naps"})), false).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"status": "pending"})), true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, edited) =
            send(&app, Method::PATCH, &uri, Some(json!({"title": "Better naps"})), true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["data"]["title"], "Better naps");
        assert_eq!(edited["data"]["tags"], json!(["sleep"]));

        let (status, _) = send(&app, Method::PATCH, "/api/resources/999", Some(json!({"title": "x"})), true).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_filters_and_reports_page() {
        let app = app();
        submit(&app, json!({"title": "One", "resource_type": "book", "tags": ["sleep"]})).await;
        submit(&app, json!({"title": "Two", "resource_type": "book", "tags": ["food"]})).await;
        submit(&app, json!({"title": "Three", "resource_type": "book"})).await;

        let (status, page) = send(&app, Method::GET, "/api/resources?limit=2", None, false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["meta"], json!({"count": 2, "limit": 2, "offset": 0}));
        assert_eq!(page["data"][0]["title"], "Three");

        let (_, tagged) = send(&app, Method::GET, "/api/resources?tag=Sleep", None, false).await;
        assert_eq!(tagged["meta"]["count"], 1);
        assert_eq!(tagged["data"][0]["title"], "One");

        let (status, _) = send(&app, Method::GET, "/api/resources?status=archived", None, false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn removal_is_moderated() {
        let app = app();
        let id = submit(&app, json!({"title": "Gone", "resource_type": "link"})).await;
        let uri = format!("/api/resources/{id}");

        let (status, _) = send(&app, Method::DELETE, &uri, None, false).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::DELETE, &uri, None, true).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::DELETE, &uri, None, true).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::GET, &uri, None, false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn categories_and_tags() {
        let app = app();

        let (status, _) =
            send(&app, Method::POST, "/api/categories", Some(json!({"name": "Sleep"})), false).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) =
            send(&app, Method::POST, "/api/categories", Some(json!({"name": "Sleep"})), true).await;
        assert_eq!(status, StatusCode::CREATED);
        let category_id = created["data"]["id"].as_i64().unwrap();

        let (status, _) =
            send(&app, Method::POST, "/api/categories", Some(json!({"name": "Sleep"})), true).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &format!("/api/categories/{category_id}"),
            Some(json!({"description": "Naps and nights"})),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["name"], "Sleep");
        assert_eq!(updated["data"]["description"], "Naps and nights");

        submit(&app, json!({"title": "Naps", "resource_type": "tip", "tags": ["Sleep"]})).await;
        let (status, tags) = send(&app, Method::GET, "/api/tags", None, false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tags["data"][0]["name"], "sleep");
        assert_eq!(tags["data"][0]["resource_count"], 1);

        let (status, tag) = send(&app, Method::POST, "/api/tags", Some(json!({"name": " SLEEP"})), true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tag["data"]["id"], tags["data"][0]["id"]);
    }

    #[tokio::test]
    async fn dashboard_is_for_moderators() {
        let app = app();
        submit(&app, json!({"title": "One", "resource_type": "video"})).await;

        let (status, _) = send(&app, Method::GET, "/api/dashboard", None, false).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, dashboard) = send(&app, Method::GET, "/api/dashboard", None, true).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["data"]["resources_by_status"]["pending"], 1);
        assert_eq!(dashboard["data"]["total_resources"], 1);
        assert_eq!(dashboard["data"]["recent_resources"][0]["title"], "One");
    }
}
