#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use casework_api::auth::{generate_jwt, Claims};
use casework_api::config::AppConfig;
use casework_api::database::models::{Case, NewCase, NewNotification, NewUser, User};
use casework_api::database::{MemoryRepository, Repository};
use casework_api::services::case_service::generate_reference_number;
use casework_api::services::{Notifier, NotifyError};
use casework_api::types::Role;
use casework_api::{app, serve, AppState};

/// One in-process server per test, backed by its own in-memory store and rate limiter.
pub struct TestApp {
    pub base_url: String,
    pub repo: Arc<MemoryRepository>,
    pub client: reqwest::Client,
    secret: String,
}

pub async fn spawn() -> Result<TestApp> {
    spawn_with(AppConfig::development(), None).await
}

pub async fn spawn_with(config: AppConfig, notifier: Option<Arc<dyn Notifier>>) -> Result<TestApp> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind test port {}", port))?;

    let secret = config.security.jwt_secret.clone();
    let repo = Arc::new(MemoryRepository::new());
    let mut state = AppState::new(config, repo.clone())?;
    if let Some(notifier) = notifier {
        state = state.with_notifier(notifier);
    }

    let router = app(state);
    tokio::spawn(async move {
        let _ = serve(listener, router, std::future::pending()).await;
    });

    let test_app = TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        repo,
        client: reqwest::Client::new(),
        secret,
    };
    test_app.wait_ready(Duration::from_secs(5)).await?;
    Ok(test_app)
}

impl TestApp {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn user(&self, role: Role, email: &str) -> Result<User> {
        let (first_name, last_name) = match role {
            Role::Client => ("Amina", "Okafor"),
            Role::Agent => ("Luis", "Ortega"),
            Role::Admin => ("Dana", "Kim"),
        };
        Ok(self
            .repo
            .create_user(NewUser {
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                phone: Some("+44 20 7946 0000".to_string()),
                nationality: Some("Nigerian".to_string()),
                role,
                is_verified: true,
            })
            .await?)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.token_for_hours(user, 1)
    }

    pub fn token_for_hours(&self, user: &User, hours: u64) -> String {
        let claims = Claims::new(user.id, user.email.clone(), user.role, hours);
        generate_jwt(&claims, &self.secret).expect("sign test token")
    }

    /// Seed a case straight into the store, bypassing the API.
    pub async fn case_for(&self, client: &User, agent: Option<&User>) -> Result<Case> {
        Ok(self
            .repo
            .create_case(NewCase {
                reference_number: generate_reference_number(),
                title: "Skilled worker visa".to_string(),
                case_type: "WORK_VISA".to_string(),
                description: None,
                client_id: client.id,
                agent_id: agent.map(|a| a.id),
                created_by: client.id,
            })
            .await?)
    }

    pub fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn patch(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }
}

/// Read the envelope and check its `success` flag matches the status class.
pub async fn envelope(resp: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = resp.status();
    let body: Value = resp.json().await.context("response body is not JSON")?;
    assert_eq!(
        body["success"].as_bool(),
        Some(status.is_success()),
        "envelope success flag disagrees with status {}: {}",
        status,
        body
    );
    Ok((status, body))
}

/// Notifier whose every delivery fails, as if the push service were down.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: NewNotification) -> Result<(), NotifyError> {
        Err(NotifyError::Push("push service unreachable".to_string()))
    }
}
