//! Router-level tests over in-memory stores and sessions.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionStore, session::Id};

use crowdfund_core::{DonationId, ProjectId, UserId};

use crate::config::WebConfig;
use crate::db::memory::{MemoryProjectStore, MemoryUserStore};
use crate::middleware::create_session_layer;
use crate::middleware::request_id::REQUEST_ID_HEADER;
use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::models::{Donation, Project};
use crate::services::auth::tests::test_passwords;
use crate::state::AppState;

struct Harness {
    app: Router,
    users: Arc<MemoryUserStore>,
    projects: Arc<MemoryProjectStore>,
    sessions: MemoryStore,
}

fn test_config() -> WebConfig {
    WebConfig {
        database_url: SecretString::from("postgres://localhost/crowdfund_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_ttl_days: 7,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

fn harness() -> Harness {
    let config = test_config();
    let users = Arc::new(MemoryUserStore::default());
    let projects = Arc::new(MemoryProjectStore::default());
    let sessions = MemoryStore::default();

    let session_layer = create_session_layer(sessions.clone(), &config);
    let state = AppState::new(config, users.clone(), projects.clone(), test_passwords());

    Harness {
        app: crate::app(state, session_layer),
        users,
        projects,
        sessions,
    }
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_owned())).unwrap())
            .await
    }

    async fn register(&self, first: &str, email: &str, password: &str) {
        let body = format!(
            "first_name={first}&last_name=Tester&email={email}&password={password}\
             &password_confirm={password}&city=Hoboken&state=NJ"
        );
        let response = self.post_form("/users", &body, None).await;
        assert_eq!(location(&response), Some("/users/signin"));
    }

    /// Sign in and return the `Cookie` header value for the new session.
    async fn sign_in(&self, email: &str, password: &str) -> String {
        let body = format!("email={email}&password={password}");
        let response = self.post_form("/users/signin", &body, None).await;
        assert_eq!(location(&response), Some("/projects"));
        session_cookie(&response).unwrap()
    }

    async fn session_data(&self, cookie: &str) -> Option<serde_json::Value> {
        let (_, value) = cookie.split_once('=')?;
        let id = Id::from_str(value).ok()?;
        let record = self.sessions.load(&id).await.unwrap()?;
        record.data.get("user").cloned()
    }
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE_NAME))
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn is_redirect_to(response: &Response, path: &str) -> bool {
    response.status() == StatusCode::SEE_OTHER && location(response) == Some(path)
}

fn project(id: i32, creator: UserId, day: u32, donors: &[UserId]) -> Project {
    Project {
        id: ProjectId::new(id),
        title: format!("Project {id}"),
        creator,
        date: Utc.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap(),
        pledge_goal: Decimal::from_str("25000").unwrap(),
        collected: Decimal::from_str("1234.5").unwrap(),
        donations: donors
            .iter()
            .enumerate()
            .map(|(i, donor)| donation(i32::try_from(i).unwrap() + 1, id, *donor, None))
            .collect(),
    }
}

fn donation(id: i32, project_id: i32, user_id: UserId, amount: Option<&str>) -> Donation {
    Donation {
        id: DonationId::new(id),
        project_id: ProjectId::new(project_id),
        user_id,
        amount: amount.map(|a| Decimal::from_str(a).unwrap()),
        created_at: Utc::now(),
    }
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_signin_page_renders_for_anonymous() {
    let h = harness();
    let response = h.get("/users/signin", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<title>Sign In"));
    assert!(body.contains("action=\"/users/signin\""));
}

#[tokio::test]
async fn test_signin_and_register_pages_redirect_when_signed_in() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    let cookie = h.sign_in("ada%40example.com", "analytical").await;

    let response = h.get("/users/signin", Some(&cookie)).await;
    assert!(is_redirect_to(&response, "/projects"));

    let response = h.get("/users/register", Some(&cookie)).await;
    assert!(is_redirect_to(&response, "/projects"));
}

#[tokio::test]
async fn test_signin_lists_every_missing_field() {
    let h = harness();
    let response = h.post_form("/users/signin", "", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    let body = body_text(response).await;
    assert!(body.contains("Please enter your email"));
    assert!(body.contains("Please enter your password"));
}

#[tokio::test]
async fn test_signin_missing_email_only() {
    let h = harness();
    let response = h.post_form("/users/signin", "email=&password=x", None).await;

    let body = body_text(response).await;
    assert!(body.contains("Please enter your email"));
    assert!(!body.contains("Please enter your password"));
    assert!(!body.contains("Invalid email and/or password"));
}

#[tokio::test]
async fn test_signin_stores_exactly_the_session_user() {
    let h = harness();
    h.register("Ada", "Ada%40Example.com", "analytical").await;
    let cookie = h.sign_in("ADA%40example.com", "analytical").await;

    let stored = h.session_data(&cookie).await.unwrap();
    assert_eq!(
        stored,
        json!({"firstName": "Ada", "lastName": "Tester", "userId": 1})
    );
}

#[tokio::test]
async fn test_signin_failures_are_identical() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;

    let wrong_password = h
        .post_form("/users/signin", "email=ada%40example.com&password=difference", None)
        .await;
    let unknown_email = h
        .post_form("/users/signin", "email=bob%40example.com&password=analytical", None)
        .await;

    assert_eq!(wrong_password.status(), StatusCode::OK);
    assert_eq!(unknown_email.status(), StatusCode::OK);
    assert!(session_cookie(&wrong_password).is_none());
    assert!(session_cookie(&unknown_email).is_none());

    let wrong_password = body_text(wrong_password).await;
    let unknown_email = body_text(unknown_email).await;
    assert!(wrong_password.contains("Invalid email and/or password"));
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_signin_store_failure_is_server_error() {
    let h = harness();
    h.users.break_store();

    let response = h
        .post_form("/users/signin", "email=ada%40example.com&password=analytical", None)
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].is_string());
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_page_renders_for_anonymous() {
    let h = harness();
    let response = h.get("/users/register", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<title>Register"));
}

#[tokio::test]
async fn test_register_persists_lowercased_sanitized_user() {
    let h = harness();
    let body = "first_name=%3Cb%3EAda%3C%2Fb%3E&last_name=Lovelace&email=Ada%40Example.COM\
                &password=analytical&password_confirm=analytical&city=London&state=LDN";
    let response = h.post_form("/users", body, None).await;

    assert!(is_redirect_to(&response, "/users/signin"));

    let stored = h.users.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email.as_str(), "ada@example.com");
    assert_eq!(stored[0].first_name, "Ada");
    assert_ne!(stored[0].password_hash, "analytical");
}

#[tokio::test]
async fn test_register_accepts_ampersand_in_email() {
    let h = harness();
    h.register("Tom", "tom%26jerry%40example.com", "cartoons1").await;

    let stored = h.users.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email.as_str(), "tom&jerry@example.com");

    h.sign_in("tom%26jerry%40example.com", "cartoons1").await;
}

#[tokio::test]
async fn test_ampersand_name_renders_once_escaped_on_history() {
    let h = harness();
    h.register("Tom%20%26%20Jerry", "tom%40example.com", "cartoons1")
        .await;
    h.register("Bob", "bob%40example.com", "builder1").await;
    let tom = UserId::new(1);
    let bob = UserId::new(2);
    assert_eq!(h.users.all()[0].first_name, "Tom & Jerry");

    h.projects.insert(project(10, tom, 3, &[bob]));
    h.users.push_donation(bob, donation(1, 10, bob, Some("20")));

    let cookie = h.sign_in("tom%40example.com", "cartoons1").await;
    let response = h.get("/users/history/1", Some(&cookie)).await;
    let body = body_text(response).await;
    assert!(body.contains("Tom &amp; Jerry Tester"));
    assert!(!body.contains("&amp;amp;"));

    let cookie = h.sign_in("bob%40example.com", "builder1").await;
    let response = h.get("/users/history/2", Some(&cookie)).await;
    let body = body_text(response).await;
    assert!(body.contains("by Tom &amp; Jerry Tester"));
    assert!(!body.contains("&amp;amp;"));
}

#[tokio::test]
async fn test_register_duplicate_email_is_case_insensitive() {
    let h = harness();
    h.register("Ann", "a%40b.com", "password1").await;

    let body = "first_name=Al&last_name=B&email=A%40B.com\
                &password=password1&password_confirm=password1&city=X&state=Y";
    let response = h.post_form("/users", body, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("An account with this email already exists."));
    assert_eq!(h.users.all().len(), 1);
}

#[tokio::test]
async fn test_register_reports_short_and_mismatched_password_together() {
    let h = harness();
    let body = "first_name=Ada&last_name=Lovelace&email=ada%40example.com\
                &password=short&password_confirm=shorter&city=London&state=LDN";
    let response = h.post_form("/users", body, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Password should contain at least 8 characters"));
    assert!(body.contains("Passwords don"));
    assert!(h.users.all().is_empty());
}

#[tokio::test]
async fn test_register_echoes_input_but_not_passwords() {
    let h = harness();
    let body = "first_name=Ada&last_name=&email=Ada%40Example.com\
                &password=secretpass&password_confirm=secretpass&city=London&state=LDN";
    let response = h.post_form("/users", body, None).await;

    let body = body_text(response).await;
    assert!(body.contains("No last name provided"));
    assert!(body.contains("value=\"Ada\""));
    assert!(body.contains("value=\"ada@example.com\""));
    assert!(body.contains("value=\"London\""));
    assert!(!body.contains("secretpass"));
}

#[tokio::test]
async fn test_register_store_failure_is_server_error() {
    let h = harness();
    h.users.break_store();

    let body = "first_name=Ada&last_name=Lovelace&email=ada%40example.com\
                &password=analytical&password_confirm=analytical&city=London&state=LDN";
    let response = h.post_form("/users", body, None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Auth error"));
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_without_session_redirects() {
    let h = harness();
    let response = h.get("/users/logout", None).await;
    assert!(is_redirect_to(&response, "/projects"));
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    let cookie = h.sign_in("ada%40example.com", "analytical").await;

    let response = h.get("/users/logout", Some(&cookie)).await;
    assert!(is_redirect_to(&response, "/projects"));
    assert!(h.session_data(&cookie).await.is_none());

    let response = h.get("/users/history/1", Some(&cookie)).await;
    assert!(is_redirect_to(&response, "/projects"));
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_history_redirects_anonymous_and_other_users() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    h.register("Bob", "bob%40example.com", "builder1").await;
    let cookie = h.sign_in("ada%40example.com", "analytical").await;

    let response = h.get("/users/history/1", None).await;
    assert!(is_redirect_to(&response, "/projects"));

    let response = h.get("/users/history/2", Some(&cookie)).await;
    assert!(is_redirect_to(&response, "/projects"));
    assert!(!body_text(response).await.contains("My Projects"));

    let response = h.get("/users/history/not-a-number", Some(&cookie)).await;
    assert!(is_redirect_to(&response, "/projects"));
}

#[tokio::test]
async fn test_history_renders_projects_and_donations() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    h.register("Bob", "bob%40example.com", "builder1").await;
    let ada = UserId::new(1);
    let bob = UserId::new(2);

    h.projects.insert(project(10, ada, 3, &[bob]));
    h.projects.insert(project(11, ada, 20, &[bob, bob]));
    h.projects.insert(project(12, bob, 8, &[ada]));
    h.users.push_donation(ada, donation(1, 12, ada, Some("2500.75")));

    let cookie = h.sign_in("ada%40example.com", "analytical").await;
    let response = h.get("/users/history/1", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<title>My Projects"));

    let newer = body.find("Project 11").unwrap();
    let older = body.find("Project 10").unwrap();
    assert!(newer < older);
    assert!(body.contains("May 20, 2026"));
    assert!(body.contains("$25,000"));
    assert!(body.contains("$1,234.5"));

    assert!(body.contains("Project 12"));
    assert!(body.contains("by Bob Tester"));
    assert!(body.contains("$2,500.75"));
}

#[tokio::test]
async fn test_history_without_projects_is_empty_success() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    let cookie = h.sign_in("ada%40example.com", "analytical").await;

    let response = h.get("/users/history/1", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("You have not created any projects yet."));
    assert!(body.contains("You have not backed any projects yet."));
}

#[tokio::test]
async fn test_history_dangling_donation_is_server_error() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    h.users
        .push_donation(UserId::new(1), donation(1, 404, UserId::new(1), None));
    let cookie = h.sign_in("ada%40example.com", "analytical").await;

    let response = h.get("/users/history/1", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_history_store_failure_is_server_error() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    let cookie = h.sign_in("ada%40example.com", "analytical").await;
    h.projects.break_store();

    let response = h.get("/users/history/1", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Listing, health and request ids
// =============================================================================

#[tokio::test]
async fn test_root_redirects_to_listing() {
    let h = harness();
    let response = h.get("/", None).await;
    assert!(is_redirect_to(&response, "/projects"));
}

#[tokio::test]
async fn test_listing_shows_projects_and_navigation() {
    let h = harness();
    h.register("Ada", "ada%40example.com", "analytical").await;
    h.projects.insert(project(10, UserId::new(1), 3, &[]));

    let response = h.get("/projects", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Project 10"));
    assert!(body.contains("by Ada Tester"));
    assert!(body.contains("/users/signin"));

    let cookie = h.sign_in("ada%40example.com", "analytical").await;
    let body = body_text(h.get("/projects", Some(&cookie)).await).await;
    assert!(body.contains("/users/logout"));
    assert!(body.contains("/users/history/1"));
}

#[tokio::test]
async fn test_health_and_readiness() {
    let h = harness();

    let response = h.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    assert_eq!(h.get("/health/ready", None).await.status(), StatusCode::OK);
    h.users.break_store();
    assert_eq!(
        h.get("/health/ready", None).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_every_response_has_request_id() {
    let h = harness();
    for uri in ["/projects", "/users/signin", "/users/logout", "/health"] {
        let response = h.get(uri, None).await;
        assert!(response.headers().contains_key(REQUEST_ID_HEADER), "{uri}");
    }
}
