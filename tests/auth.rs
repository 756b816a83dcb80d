mod common;

use reqwest::{header, StatusCode};
use serde_json::{json, Value};

use common::{location, spawn_app, USER_PASSWORD};

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;
    app.register("shopper").await;

    let response = app
        .client
        .post(app.url("/login"))
        .json(&json!({
            "username": "shopper",
            "password": USER_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("Login did not set a cookie")
        .to_owned();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let body = response.json::<Value>().await.expect("login JSON");
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/register"))
        .json(&json!({
            "username": "shopper",
            "email": "shopper@example.com",
            "password1": "Muzion1515",
            "password2": "Muzion1516"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>().await.expect("register JSON");
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("Passwords do not match."));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = spawn_app().await;
    app.register("shopper").await;

    let response = app
        .client
        .post(app.url("/register"))
        .json(&json!({
            "username": "shopper",
            "email": "other@example.com",
            "password1": USER_PASSWORD,
            "password2": USER_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = spawn_app().await;
    app.register("shopper").await;

    let response = app
        .client
        .post(app.url("/login"))
        .json(&json!({
            "username": "shopper",
            "password": "not-the-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_session_reaches_profile() {
    let app = spawn_app().await;
    let token = app.shopper("shopper").await;

    let response = app
        .client
        .get(app.url("/profile"))
        .header(header::COOKIE, format!("token={token}"))
        .send()
        .await
        .expect("Failed to send profile request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<Value>().await.expect("profile JSON");
    assert_eq!(body["username"], "shopper");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_patch_profile() {
    let app = spawn_app().await;
    let token = app.shopper("shopper").await;

    let response = app
        .patch(
            "/profile",
            &token,
            json!({ "first_name": "Jane", "address": "1 Main St" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = app.get("/profile", &token).await.json::<Value>().await.expect("profile JSON");
    assert_eq!(body["first_name"], "Jane");
    assert_eq!(body["address"], "1 Main St");

    let invalid = app
        .patch("/profile", &token, json!({ "email": "nope" }))
        .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/logout"))
        .send()
        .await
        .expect("Failed to send logout request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("Logout did not reset the cookie");
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_garbage_token_redirects_to_login() {
    let app = spawn_app().await;

    let response = app.get("/profile", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}
