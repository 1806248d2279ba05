// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, courses, questions, test},
    openapi,
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, student_middleware},
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Public: registration, logins, course catalog, OpenAPI document.
/// * Student: profile, question delivery, the test flow.
/// * Admin: profile, catalog management, reports.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let public_routes = Router::new()
        .route("/student/register", post(auth::register_student))
        .route("/student/login", post(auth::login_student))
        .route("/admin/login", post(auth::login_admin))
        .route("/courses", get(courses::list_courses))
        .route("/openapi.json", get(openapi::openapi_json));

    let student_routes = Router::new()
        .route("/student/me", get(auth::student_me))
        .route(
            "/questions/{course_id}",
            get(questions::list_questions_for_student),
        )
        .route("/student/test/start", post(test::start_test))
        .route("/student/test/answer", post(test::submit_answer))
        .route("/student/test/complete", post(test::complete_test))
        .route("/student/test/history", get(test::test_history))
        .route("/student/test/results/{id}", get(test::test_results))
        // Auth first, then the role check
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/admin/me", get(auth::admin_me))
        .route("/admin/courses", post(courses::create_course))
        .route(
            "/admin/courses/{id}",
            put(courses::update_course).delete(courses::delete_course),
        )
        .route(
            "/admin/courses/{id}/questions",
            get(questions::list_course_questions),
        )
        .route(
            "/admin/questions",
            get(questions::list_all_questions).post(questions::create_question),
        )
        .route(
            "/admin/questions/{id}",
            put(questions::update_question).delete(questions::delete_question),
        )
        .route("/admin/stats", get(admin::get_stats))
        .route("/admin/student-results", get(admin::get_student_results))
        .route("/admin/recent-activity", get(admin::get_recent_activity))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .merge(public_routes)
        .merge(student_routes)
        .merge(admin_routes);

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, store::MemoryStore};

    fn test_state() -> AppState {
        let config = Config {
            database_url: None,
            jwt_secret: "routes_test_secret".to_string(),
            jwt_expiration: 60,
            rust_log: "error".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            admin_seed: None,
        };
        AppState::new(Arc::new(MemoryStore::new()), config)
    }

    #[tokio::test]
    async fn test_preflight_allows_configured_origin() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/courses")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:5173"))
        );
    }

    #[tokio::test]
    async fn test_student_routes_require_token() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/student/test/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_catalog_is_open() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/api/courses").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
