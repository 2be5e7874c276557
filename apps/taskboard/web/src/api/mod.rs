//! API routes module

pub mod health;
pub mod tasks;

use axum::{
    Router,
    response::Redirect,
    routing::get,
};
use axum_helpers::server::{create_router, health_router};
use domain_tasks::entity;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Page routes. Returns a stateless Router (sub-routers have state applied).
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(entity::Model::URL) }))
        .nest(entity::Model::URL, tasks::router(state))
}

/// Router with the /ready endpoint that pings the database.
///
/// Merged after `create_router`, so probes skip the page middleware.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

/// The complete application: pages with docs and middleware, plus probes
pub fn app(state: &AppState) -> Router {
    create_router::<ApiDoc>(routes(state), &state.config.server)
        .merge(health_router(state.config.app))
        .merge(ready_router(state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use core_config::{app_info, server::ServerConfig};
    use database::postgres::PostgresConfig;
    use domain_tasks::TaskViews;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    use crate::config::{Config, Environment};

    fn state(db: MockDatabase) -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                database: PostgresConfig::new("postgres://unused"),
                server: ServerConfig::default(),
                environment: Environment::Development,
                run_migrations: false,
            },
            db: db.into_connection(),
            views: Arc::new(TaskViews::new().unwrap()),
        }
    }

    fn empty_db() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    async fn body_text(body: Body) -> String {
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_home_redirects_to_task_list() {
        let app = app(&state(empty_db()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/tasks");
    }

    #[tokio::test]
    async fn test_task_list_sets_csrf_cookie() {
        let db = empty_db().append_query_results([Vec::<entity::Model>::new()]);
        let app = app(&state(db));

        let response = app
            .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("csrf_token="));

        let token = cookie
            .trim_start_matches("csrf_token=")
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let html = body_text(response.into_body()).await;
        assert!(html.contains("No tasks yet"));
        assert!(html.contains(&token));
    }

    #[tokio::test]
    async fn test_post_without_token_is_forbidden() {
        let app = app(&state(empty_db()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tasks")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("title=Sneaky"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = app(&state(empty_db()));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response.into_body()).await;
        assert!(body.contains("taskboard_web"));

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response.into_body()).await;
        assert!(body.contains("\"database\":\"connected\""));
    }

    #[tokio::test]
    async fn test_openapi_lists_task_paths() {
        let app = app(&state(empty_db()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response.into_body()).await;
        assert!(body.contains("/tasks/{id}/toggle"));
    }
}
