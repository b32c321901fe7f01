mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use casework_api::config::{AppConfig, RateLimitQuota};
use casework_api::types::Role;

fn tight_config(strict: RateLimitQuota) -> AppConfig {
    let mut config = AppConfig::development();
    config.api.strict = strict;
    config
}

#[tokio::test]
async fn request_past_quota_gets_429_with_retry_after() -> Result<()> {
    let app = common::spawn_with(tight_config(RateLimitQuota::new(3, 60)), None).await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let token = app.token_for(&client);

    for expected_remaining in ["2", "1", "0"] {
        let resp = app
            .patch("/api/profile", &token)
            .json(&json!({ "nationality": "Ghanaian" }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["x-ratelimit-limit"], "3");
        assert_eq!(resp.headers()["x-ratelimit-remaining"], expected_remaining);
    }

    let resp = app
        .patch("/api/profile", &token)
        .json(&json!({ "nationality": "Ghanaian" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("numeric Retry-After header");
    assert!((1..=60).contains(&retry_after));

    let (_, body) = common::envelope(resp).await?;
    assert_eq!(body["error"]["code"], "TOO_MANY_REQUESTS");
    assert!(body["error"]["retryAfter"].as_u64().is_some());
    Ok(())
}

#[tokio::test]
async fn presets_count_separately() -> Result<()> {
    let app = common::spawn_with(tight_config(RateLimitQuota::new(1, 60)), None).await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let token = app.token_for(&client);

    let patch = || app.patch("/api/profile", &token).json(&json!({ "lastName": "Mensah" }));
    assert_eq!(patch().send().await?.status(), StatusCode::OK);
    assert_eq!(patch().send().await?.status(), StatusCode::TOO_MANY_REQUESTS);

    // STANDARD reads are unaffected by the exhausted STRICT window
    assert_eq!(app.get("/api/profile", &token).send().await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn callers_count_separately() -> Result<()> {
    let app = common::spawn_with(tight_config(RateLimitQuota::new(1, 60)), None).await?;
    let alice = app.user(Role::Client, "alice@example.com").await?;
    let bob = app.user(Role::Client, "bob@example.com").await?;

    for user in [&alice, &bob] {
        let resp = app
            .patch("/api/profile", &app.token_for(user))
            .json(&json!({ "phone": "+233 30 123 4567" }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK, "first request for {}", user.email);
    }
    Ok(())
}

#[tokio::test]
async fn disabled_rate_limiting_admits_everything() -> Result<()> {
    let mut config = tight_config(RateLimitQuota::new(1, 60));
    config.api.enable_rate_limiting = false;
    let app = common::spawn_with(config, None).await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let token = app.token_for(&client);

    for _ in 0..5 {
        let resp = app
            .patch("/api/profile", &token)
            .json(&json!({ "firstName": "Kofi" }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("x-ratelimit-limit").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn rotating_invalid_tokens_share_the_peer_window() -> Result<()> {
    let app = common::spawn_with(tight_config(RateLimitQuota::new(3, 60)), None).await?;

    let mut statuses = Vec::new();
    for i in 0..4 {
        let resp = app
            .post("/api/cases", &format!("junk-{}", i))
            .json(&json!({ "title": "Visa renewal", "caseType": "VISA" }))
            .send()
            .await?;
        statuses.push(resp.status());
    }

    assert_eq!(
        statuses,
        [
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn fresh_tokens_for_one_user_share_a_window() -> Result<()> {
    let app = common::spawn_with(tight_config(RateLimitQuota::new(1, 60)), None).await?;
    let client = app.user(Role::Client, "client@example.com").await?;

    let first = app.token_for_hours(&client, 1);
    let second = app.token_for_hours(&client, 2);
    assert_ne!(first, second);

    let resp = app.patch("/api/profile", &first).json(&json!({ "firstName": "Ama" })).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.patch("/api/profile", &second).json(&json!({ "firstName": "Ama" })).send().await?;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    Ok(())
}
