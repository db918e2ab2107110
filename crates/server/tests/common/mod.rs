//! # Common Test Utilities
//!
//! An application wired to a migrated in-memory SQLite database, an
//! in-process revocation store and a temporary attachment directory.

#![allow(dead_code)]

use std::sync::Arc;

use auth::{
    create_token,
    hash_password,
    secrecy::{ExposeSecret, SecretString},
    JwtConfig,
    PasswordConfig,
    Principal,
    TokenType,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use entity::{sea_orm_active_enums::GlobalRole, users};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::Value;
use server::{create_app_router, AppState, AttachmentStore, MemoryRevocationStore};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

/// Password given to every user created through [`TestApp::create_user`].
pub const PASSWORD: &str = "correct-horse-42";

/// Attachment limit used by the test application.
pub const MAX_ATTACHMENT_BYTES: u64 = 1024;

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        // base64 of "test-secret-key-that-is-at-least-32-bytes-long"
        secret:              SecretString::from(
            "dGVzdC1zZWNyZXQta2V5LXRoYXQtaXMtYXQtbGVhc3QtMzItYnl0ZXMtbG9uZw==".to_string(),
        ),
        issuer:              "trellis-test".to_string(),
        audience:            "trellis-api".to_string(),
        access_ttl_seconds:  900,
        refresh_ttl_seconds: 86_400,
    }
}

pub struct TestApp {
    pub state:   AppState,
    pub router:  Router,
    pub db:      DatabaseConnection,
    _files: TempDir,
}

/// A user created directly in the database with a ready access token.
pub struct TestUser {
    pub id:    Uuid,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let files = TempDir::new().unwrap();
        let state = AppState::new(
            db.clone(),
            jwt_config(),
            Arc::new(MemoryRevocationStore::new()),
            AttachmentStore::new(files.path().to_path_buf(), MAX_ATTACHMENT_BYTES),
        )
        .with_password_config(PasswordConfig::insecure_fast());
        let router = create_app_router(state.clone());

        Self {
            state,
            router,
            db,
            _files: files,
        }
    }

    pub async fn create_user(&self, email: &str, role: GlobalRole) -> TestUser {
        let hash = hash_password(
            &SecretString::from(PASSWORD.to_string()),
            Some(PasswordConfig::insecure_fast()),
        )
        .unwrap();
        let now = Utc::now();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            full_name: Set(format!("User {email}")),
            password_hash: Set(hash.expose_secret().to_string()),
            role: Set(role),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .unwrap();
        let principal = Principal::from(user);
        let (token, _) = create_token(&self.state.jwt_config, &principal, TokenType::Access).unwrap();

        TestUser {
            id: principal.id,
            email: principal.email,
            token,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response { self.router.clone().oneshot(request).await.unwrap() }

    /// Sends a JSON request and returns the status with the decoded body.
    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            },
            None => Body::empty(),
        };
        let response = self.send(builder.body(body).unwrap()).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.json(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.json(Method::DELETE, uri, Some(token), None).await
    }

    /// Creates a project as `owner` and returns its id.
    pub async fn create_project(&self, owner: &TestUser, name: &str, members: Value) -> Uuid {
        let (status, body) = self
            .post(
                "/api/v1/projects",
                &owner.token,
                serde_json::json!({ "name": name, "members": members }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    pub async fn create_task(&self, user: &TestUser, project_id: Uuid, title: &str) -> Uuid {
        let (status, body) = self
            .post(
                &format!("/api/v1/projects/{project_id}/tasks"),
                &user.token,
                serde_json::json!({ "title": title }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> { response.into_body().collect().await.unwrap().to_bytes().to_vec() }

pub async fn body_json(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// `data.id` of a success envelope.
pub fn id_of(body: &Value) -> Uuid { body["data"]["id"].as_str().unwrap().parse().unwrap() }

pub fn error_code(body: &Value) -> &str { body["code"].as_str().unwrap_or_default() }
