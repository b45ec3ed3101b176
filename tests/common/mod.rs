#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use user_api::auth::hash_password;
use user_api::configuration::JwtSettings;
use user_api::startup::run;
use user_api::user_store::{InMemoryUserStore, Role, User, UserStore};
use uuid::Uuid;

pub const PASSWORD: &str = "SecurePass123";

pub struct TestApp {
    pub address: String,
    pub users: InMemoryUserStore,
    pub jwt: JwtSettings,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        access_secret: "test-access-secret-at-least-32-characters".to_string(),
        refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let users = InMemoryUserStore::new();
    let jwt = jwt_settings();
    let server = run(listener, Arc::new(users.clone()), jwt.clone())
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        users,
        jwt,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POST /users and return the new id
    pub async fn register(&self, email: &str) -> Uuid {
        let response = self
            .client
            .post(self.url("/users"))
            .json(&json!({ "name": "Test User", "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());

        let body: Value = response.json().await.expect("Failed to parse response");
        body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("No id in response")
    }

    /// Insert an admin straight into the store
    pub async fn create_admin(&self, email: &str) -> Uuid {
        let user = User::new(
            email.to_string(),
            "Admin".to_string(),
            hash_password(PASSWORD).expect("Failed to hash password"),
            Role::Admin,
        );
        self.users.insert(&user).await.expect("Failed to insert admin");
        user.id
    }

    pub async fn post_login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Log in and return the token response body
    pub async fn login(&self, email: &str) -> Value {
        let response = self.post_login(email, PASSWORD).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    /// Log in and return only the access token
    pub async fn access_token(&self, email: &str) -> String {
        self.login(email).await["access_token"]
            .as_str()
            .expect("No access token in response")
            .to_string()
    }

    pub async fn post_refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/refresh"))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
