//! End-to-end test helpers for Crowdfund.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p crowdfund-cli -- migrate
//! cargo run -p crowdfund-web &
//! cargo test -p crowdfund-integration-tests -- --ignored
//! ```
//!
//! `CROWDFUND_TEST_URL` points the tests at a server other than
//! `http://localhost:3000`.

use reqwest::{Client, Response, header::LOCATION, redirect::Policy};
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("CROWDFUND_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client with its own cookie jar that does not follow redirects.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4().simple())
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Register an account through the form.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn register(client: &Client, email: &str, password: &str) -> Response {
    client
        .post(format!("{}/users", base_url()))
        .form(&[
            ("first_name", "Integration"),
            ("last_name", "Tester"),
            ("email", email),
            ("password", password),
            ("password_confirm", password),
            ("city", "Hoboken"),
            ("state", "NJ"),
        ])
        .send()
        .await
        .expect("Failed to register")
}

/// Submit the sign-in form.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn sign_in(client: &Client, email: &str, password: &str) -> Response {
    client
        .post(format!("{}/users/signin", base_url()))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .expect("Failed to sign in")
}
