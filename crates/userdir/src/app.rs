use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{
    handlers::{
        root::{index, ping},
        users::{create_user, delete_user, get_user, list_users, update_user},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
///
/// Every response carries the permissive CORS headers the original clients
/// rely on. The admin token check runs per-route through the `AdminToken`
/// extractor rather than a global layer, so `POST /users` stays open.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ping", get(ping))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;

    const TOKEN: &str = "test-admin-token";

    fn test_config() -> Config {
        Config {
            region: "us-east-1".to_string(),
            table_name: "userdir-test".to_string(),
            admin_token: Some(TOKEN.to_string()),
            env: "test".to_string(),
        }
    }

    fn test_app() -> Router {
        create_app(AppState::in_memory(test_config()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn post_user(email: &str, fullname: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": email, "fullname": fullname }).to_string(),
            ))
            .unwrap()
    }

    fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn create(app: &Router, email: &str, fullname: &str) -> Value {
        let (status, body) = send(app, post_user(email, fullname)).await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    // ========================================================================
    // Root and ping
    // ========================================================================

    #[tokio::test]
    async fn test_index_reports_app_version_and_env() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Request::builder().uri("/").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["app"], "userdir");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["env"], "test");
    }

    #[tokio::test]
    async fn test_ping() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Request::builder().uri("/ping").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "pong");
    }

    #[tokio::test]
    async fn test_cors_headers_on_every_response() {
        let app = test_app();

        // A plain 200 and an unauthorized 401 both carry the headers.
        for request in [
            Request::builder().uri("/ping").body(Body::empty()).unwrap(),
            Request::builder()
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
        ] {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(
                response
                    .headers()
                    .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                    .unwrap(),
                "*"
            );
            assert_eq!(
                response
                    .headers()
                    .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                    .unwrap(),
                "true"
            );
        }
    }

    // ========================================================================
    // Create
    // ========================================================================

    #[tokio::test]
    async fn test_create_user_returns_projection_with_location() {
        let app = test_app();
        let body = create(&app, "alice@example.com", "Alice Smith").await;

        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["fullname"], "Alice Smith");
        assert_eq!(body["verified"], false);
        assert!(body["verified_date"].is_null());
        assert!(body["created_at"].is_string());
        assert!(body.get("roles").is_none());

        let id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();
        assert_eq!(body["meta"]["location"], format!("/users/{id}"));
    }

    #[tokio::test]
    async fn test_create_users_get_distinct_ids() {
        let app = test_app();
        let first = create(&app, "a@example.com", "A").await;
        let second = create(&app, "b@example.com", "B").await;

        assert_ne!(first["id"], second["id"]);
    }

    #[tokio::test]
    async fn test_create_user_missing_fields() {
        let app = test_app();

        for payload in [
            json!({}),
            json!({ "email": "a@example.com" }),
            json!({ "fullname": "A" }),
            json!({ "email": "", "fullname": "A" }),
            json!({ "email": "a@example.com", "fullname": "" }),
        ] {
            let request = Request::builder()
                .method("POST")
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap();
            let (status, body) = send(&app, request).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
            assert_eq!(body["message"], "Email and fullname are required.");
        }

        // Nothing was written.
        let (status, body) = send(&app, authed("GET", "/users", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_user_malformed_body() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let app = test_app();
        create(&app, "alice@example.com", "Alice").await;

        let (status, body) = send(&app, post_user("alice@example.com", "Other Alice")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already exists.");
    }

    // ========================================================================
    // Auth
    // ========================================================================

    #[tokio::test]
    async fn test_guarded_routes_reject_missing_token() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        for request in [
            Request::builder()
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
            Request::builder()
                .uri(format!("/users/{id}"))
                .body(Body::empty())
                .unwrap(),
            Request::builder()
                .method("PUT")
                .uri(format!("/users/{id}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/{id}"))
                .body(Body::empty())
                .unwrap(),
        ] {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Missing token.");
        }
    }

    #[tokio::test]
    async fn test_mismatched_token_yields_401_even_for_nonexistent_id() {
        let app = test_app();

        let request = Request::builder()
            .uri(format!("/users/{}", Uuid::new_v4()))
            .header(header::AUTHORIZATION, "Bearer wrong-token")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        // 401, not 404: auth must not leak resource existence.
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token mismatch.");
    }

    #[tokio::test]
    async fn test_token_via_query_parameter() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        let request = Request::builder()
            .uri(format!("/users/{id}?token={TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_unconfigured_admin_token_rejects_all_guarded_requests() {
        let app = create_app(AppState::in_memory(Config {
            admin_token: None,
            ..test_config()
        }));

        // Whatever token the caller supplies, the route stays closed.
        let request = Request::builder()
            .uri("/users")
            .header(header::AUTHORIZATION, "Bearer anything")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Admin token not configured.");

        // Creation stays open.
        let (status, _) = send(&app, post_user("a@example.com", "A")).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // ========================================================================
    // Read
    // ========================================================================

    #[tokio::test]
    async fn test_get_user_returns_projection() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&app, authed("GET", &format!("/users/{id}"), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], created["id"]);
        assert_eq!(body["email"], "alice@example.com");
        assert_eq!(body["fullname"], "Alice");
        assert_eq!(body["verified"], false);
        assert!(body.get("roles").is_none());
        assert!(body.get("meta").is_none());
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let app = test_app();
        let (status, body) = send(
            &app,
            authed("GET", &format!("/users/{}", Uuid::new_v4()), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found.");
    }

    // ========================================================================
    // Update
    // ========================================================================

    #[tokio::test]
    async fn test_update_sets_verified_date_once() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        // First verification stamps verified_date.
        let (status, verified) = send(
            &app,
            authed(
                "PUT",
                &format!("/users/{id}"),
                Some(json!({ "verified": true })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verified["verified"], true);
        let stamped = verified["verified_date"].as_str().unwrap().to_string();
        DateTime::parse_from_rfc3339(&stamped).unwrap();

        // An explicit false is honored and leaves verified_date untouched.
        let (status, unverified) = send(
            &app,
            authed(
                "PUT",
                &format!("/users/{id}"),
                Some(json!({ "verified": false })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unverified["verified"], false);
        assert_eq!(unverified["verified_date"], stamped.as_str());

        // updated_at moved forward.
        let first: DateTime<Utc> = verified["updated_at"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        let second: DateTime<Utc> = unverified["updated_at"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(second > first);

        // Re-verifying does not move the original stamp.
        let (_, reverified) = send(
            &app,
            authed(
                "PUT",
                &format!("/users/{id}"),
                Some(json!({ "verified": true })),
            ),
        )
        .await;
        assert_eq!(reverified["verified_date"], stamped.as_str());
    }

    #[tokio::test]
    async fn test_update_fullname_only_keeps_verified_state() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            authed(
                "PUT",
                &format!("/users/{id}"),
                Some(json!({ "fullname": "Alice Smith" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fullname"], "Alice Smith");
        assert_eq!(body["verified"], false);
        assert!(body["verified_date"].is_null());
        assert_eq!(body["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_persists() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        send(
            &app,
            authed(
                "PUT",
                &format!("/users/{id}"),
                Some(json!({ "fullname": "Alice Smith", "verified": true })),
            ),
        )
        .await;

        let (_, fetched) = send(&app, authed("GET", &format!("/users/{id}"), None)).await;
        assert_eq!(fetched["fullname"], "Alice Smith");
        assert_eq!(fetched["verified"], true);
        assert!(fetched["verified_date"].is_string());
    }

    #[tokio::test]
    async fn test_update_rejects_non_boolean_verified() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        let (status, _) = send(
            &app,
            authed(
                "PUT",
                &format!("/users/{id}"),
                Some(json!({ "verified": "yes" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let app = test_app();
        let (status, body) = send(
            &app,
            authed(
                "PUT",
                &format!("/users/{}", Uuid::new_v4()),
                Some(json!({ "verified": true })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found.");
    }

    // ========================================================================
    // List
    // ========================================================================

    #[tokio::test]
    async fn test_list_users_empty() {
        let app = test_app();
        let (status, body) = send(&app, authed("GET", "/users", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_list_users_with_email_filter() {
        let app = test_app();
        create(&app, "alice@example.com", "Alice").await;
        create(&app, "albert@example.com", "Albert").await;
        create(&app, "bob@example.com", "Bob").await;

        let (status, all) = send(&app, authed("GET", "/users", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (status, filtered) = send(&app, authed("GET", "/users?email=al", None)).await;
        assert_eq!(status, StatusCode::OK);
        let emails: Vec<&str> = filtered
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["email"].as_str().unwrap())
            .collect();
        assert_eq!(emails, vec!["albert@example.com", "alice@example.com"]);

        let (status, none) = send(&app, authed("GET", "/users?email=zz", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(none, json!([]));
    }

    #[tokio::test]
    async fn test_list_filter_is_url_decoded() {
        let app = test_app();
        create(&app, "alice@example.com", "Alice").await;

        let (status, body) = send(
            &app,
            authed("GET", "/users?email=alice%40example.com", None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    // ========================================================================
    // Delete
    // ========================================================================

    #[tokio::test]
    async fn test_delete_then_get_returns_404() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&app, authed("DELETE", &format!("/users/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted.");

        let (status, _) = send(&app, authed("GET", &format!("/users/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let app = test_app();
        let (status, body) = send(
            &app,
            authed("DELETE", &format!("/users/{}", Uuid::new_v4()), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found.");
    }

    #[tokio::test]
    async fn test_delete_frees_the_email_for_reuse() {
        let app = test_app();
        let created = create(&app, "alice@example.com", "Alice").await;
        let id = created["id"].as_str().unwrap();

        send(&app, authed("DELETE", &format!("/users/{id}"), None)).await;

        let (status, _) = send(&app, post_user("alice@example.com", "Alice Again")).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // ========================================================================
    // End to end
    // ========================================================================

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let app = test_app();

        // Create
        let (status, created) = send(&app, post_user("a@b.com", "A B")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["email"], "a@b.com");
        assert_eq!(created["fullname"], "A B");
        assert_eq!(created["verified"], false);
        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

        // Duplicate
        let (status, dup) = send(&app, post_user("a@b.com", "Someone Else")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(dup["message"], "Email already exists.");

        // Read
        let (status, fetched) = send(&app, authed("GET", &format!("/users/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], created["id"]);
        assert_eq!(fetched["email"], "a@b.com");
        assert_eq!(fetched["fullname"], "A B");

        // Delete
        let (status, _) = send(&app, authed("DELETE", &format!("/users/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);

        // Gone
        let (status, _) = send(&app, authed("GET", &format!("/users/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
