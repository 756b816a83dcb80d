#![allow(dead_code)]
use reqwest::{header, redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use rust_storefront::config::{AdminSeed, AppConfig};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Secret15";
pub const USER_PASSWORD: &str = "Muzion1515";

pub struct TestApp {
    pub base: String,
    pub client: Client,
}

/// Boots the full router on an ephemeral port against a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_database("sqlite::memory:").await
}

/// Same as `spawn_app`, for callers that need a pooled file database so
/// requests really run side by side.
pub async fn spawn_app_with_database(database_url: &str) -> TestApp {
    let config = AppConfig {
        database_url: database_url.to_owned(),
        secret: "test-secret".to_owned(),
        bind_addr: "127.0.0.1:0".to_owned(),
        token_ttl_hours: 1,
        admin: Some(AdminSeed {
            username: ADMIN_USERNAME.to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
        }),
    };

    let db = rust_storefront::connect(&config.database_url)
        .await
        .expect("Failed to open test database");
    rust_storefront::init(&db, &config)
        .await
        .expect("Failed to initialize test database");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    let app = rust_storefront::app(Arc::new(db), Arc::new(config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client");

    TestApp {
        base: format!("http://{addr}"),
        client,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn register(&self, username: &str) {
        let response = self
            .client
            .post(self.url("/register"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password1": USER_PASSWORD,
                "password2": USER_PASSWORD
            }))
            .send()
            .await
            .expect("Failed to send register request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({
                "username": username,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(response.status(), StatusCode::OK);

        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse login response JSON");
        body["token"]
            .as_str()
            .expect("Token not found in login response")
            .to_owned()
    }

    /// Registers a shopper and returns their token.
    pub async fn shopper(&self, username: &str) -> String {
        self.register(username).await;
        self.login(username, USER_PASSWORD).await
    }

    pub async fn admin(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .headers(bearer(token))
            .send()
            .await
            .expect("Failed to send GET request")
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .headers(bearer(token))
            .json(&body)
            .send()
            .await
            .expect("Failed to send POST request")
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .headers(bearer(token))
            .json(&body)
            .send()
            .await
            .expect("Failed to send PATCH request")
    }

    /// Creates a visible category and brand and returns their ids.
    pub async fn catalog(&self, admin: &str) -> (i64, i64) {
        let category = self
            .post("/management/categories", admin, json!({ "title": "Phones" }))
            .await;
        assert_eq!(category.status(), StatusCode::CREATED);
        let category = category.json::<Value>().await.expect("category JSON");

        let brand = self
            .post("/management/brands", admin, json!({ "name": "Acme" }))
            .await;
        assert_eq!(brand.status(), StatusCode::CREATED);
        let brand = brand.json::<Value>().await.expect("brand JSON");

        (
            category["id"].as_i64().expect("category id"),
            brand["id"].as_i64().expect("brand id"),
        )
    }

    pub async fn deal(&self, admin: &str, name: &str, discount: &str) -> i64 {
        let response = self
            .post(
                "/management/deals",
                admin,
                json!({
                    "name": name,
                    "discount": discount,
                    "start_date": "2024-01-01",
                    "end_date": "2030-12-31"
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.json::<Value>().await.expect("deal JSON");
        body["id"].as_i64().expect("deal id")
    }

    pub async fn product(
        &self,
        admin: &str,
        (category_id, brand_id): (i64, i64),
        title: &str,
        price: &str,
        deal_id: Option<i64>,
    ) -> i64 {
        let response = self
            .post(
                "/management/products/create",
                admin,
                json!({
                    "title": title,
                    "category_id": category_id,
                    "brand_id": brand_id,
                    "deal_id": deal_id,
                    "normal_price": price,
                    "stock": 10
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.json::<Value>().await.expect("product JSON");
        body["id"].as_i64().expect("product id")
    }
}

pub fn bearer(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}"))
            .expect("Failed to create Authorization header"),
    );
    headers
}

pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
