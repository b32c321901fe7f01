mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use casework_api::database::Repository;
use casework_api::types::Role;

#[tokio::test]
async fn client_opens_case_for_self() -> Result<()> {
    let app = common::spawn().await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let token = app.token_for(&client);

    let resp = app
        .post("/api/cases", &token)
        .json(&json!({ "title": "Spouse visa", "caseType": "FAMILY", "description": "Joining partner" }))
        .send()
        .await?;
    let (status, body) = common::envelope(resp).await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["clientId"], client.id.to_string());
    assert_eq!(body["data"]["status"], "SUBMITTED");
    assert!(body["data"]["agentId"].is_null());
    assert!(body["data"]["referenceNumber"].as_str().unwrap_or_default().starts_with("IMM-"));

    let case_id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    let (_, history) = common::envelope(app.get(&format!("/api/cases/{}/history", case_id), &token).send().await?).await?;
    assert_eq!(history["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(history["data"][0]["status"], "SUBMITTED");
    Ok(())
}

#[tokio::test]
async fn create_case_validates_fields() -> Result<()> {
    let app = common::spawn().await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let token = app.token_for(&client);

    let resp = app
        .post("/api/cases", &token)
        .json(&json!({ "title": "  ", "caseType": "STUDY" }))
        .send()
        .await?;
    let (status, body) = common::envelope(resp).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["fieldErrors"]["title"].is_string());
    Ok(())
}

#[tokio::test]
async fn agent_must_name_a_client_and_is_auto_assigned() -> Result<()> {
    let app = common::spawn().await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let agent = app.user(Role::Agent, "agent@example.com").await?;
    let token = app.token_for(&agent);

    let resp = app
        .post("/api/cases", &token)
        .json(&json!({ "title": "Work permit", "caseType": "WORK_VISA" }))
        .send()
        .await?;
    let (status, body) = common::envelope(resp).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fieldErrors"]["clientId"].is_string());

    let resp = app
        .post("/api/cases", &token)
        .json(&json!({ "title": "Work permit", "caseType": "WORK_VISA", "clientId": client.id }))
        .send()
        .await?;
    let (status, body) = common::envelope(resp).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["clientId"], client.id.to_string());
    assert_eq!(body["data"]["agentId"], agent.id.to_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_invalid_json() -> Result<()> {
    let app = common::spawn().await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let token = app.token_for(&client);

    let resp = app
        .post("/api/cases", &token)
        .header("content-type", "application/json")
        .body("{\"title\": \"Spouse visa\",")
        .send()
        .await?;
    let (status, body) = common::envelope(resp).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn listing_is_scoped_by_role() -> Result<()> {
    let app = common::spawn().await?;
    let alice = app.user(Role::Client, "alice@example.com").await?;
    let bob = app.user(Role::Client, "bob@example.com").await?;
    let agent = app.user(Role::Agent, "agent@example.com").await?;
    let admin = app.user(Role::Admin, "admin@example.com").await?;

    app.case_for(&alice, Some(&agent)).await?;
    app.case_for(&alice, None).await?;
    app.case_for(&bob, None).await?;

    for (user, expected) in [(&alice, 2), (&bob, 1), (&agent, 1), (&admin, 3)] {
        let (status, body) = common::envelope(app.get("/api/cases", &app.token_for(user)).send().await?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(expected), "cases visible to {}", user.email);
    }

    let (status, _) = common::envelope(app.get("/api/cases?status=bogus", &app.token_for(&admin)).send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn history_is_forbidden_to_other_clients_and_newest_first_for_owner() -> Result<()> {
    let app = common::spawn().await?;
    let owner = app.user(Role::Client, "owner@example.com").await?;
    let stranger = app.user(Role::Client, "stranger@example.com").await?;
    let agent = app.user(Role::Agent, "agent@example.com").await?;
    let case = app.case_for(&owner, Some(&agent)).await?;
    let agent_token = app.token_for(&agent);

    for status in ["UNDER_REVIEW", "DOCUMENTS_REQUIRED"] {
        let resp = app
            .patch(&format!("/api/cases/{}/status", case.id), &agent_token)
            .json(&json!({ "status": status, "notes": "Checked passport scan" }))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let path = format!("/api/cases/{}/history", case.id);
    let (status, body) = common::envelope(app.get(&path, &app.token_for(&stranger)).send().await?).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = common::envelope(app.get(&path, &app.token_for(&owner)).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<&str> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["status"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(statuses, ["DOCUMENTS_REQUIRED", "UNDER_REVIEW", "SUBMITTED"]);
    assert_eq!(body["data"][0]["changedByUser"]["id"], agent.id.to_string());
    assert_eq!(body["data"][0]["changedByUser"]["lastName"], "Ortega");
    Ok(())
}

#[tokio::test]
async fn status_change_rules() -> Result<()> {
    let app = common::spawn().await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let assigned = app.user(Role::Agent, "assigned@example.com").await?;
    let other_agent = app.user(Role::Agent, "other@example.com").await?;
    let case = app.case_for(&client, Some(&assigned)).await?;
    let path = format!("/api/cases/{}/status", case.id);

    let (status, _) = common::envelope(
        app.patch(&path, &app.token_for(&other_agent))
            .json(&json!({ "status": "APPROVED" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::envelope(
        app.patch(&path, &app.token_for(&client))
            .json(&json!({ "status": "CLOSED" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = common::envelope(
        app.patch(&path, &app.token_for(&assigned))
            .json(&json!({ "status": "ON_HOLD" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = common::envelope(
        app.patch(&path, &app.token_for(&assigned))
            .json(&json!({ "status": "APPROVED" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["case"]["status"], "APPROVED");
    assert_eq!(body["data"]["history"]["status"], "APPROVED");

    // The client hears about it
    let notifications = app.repo.list_notifications(client.id, true).await?;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].case_id, Some(case.id));
    Ok(())
}

#[tokio::test]
async fn missing_case_is_not_found() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.user(Role::Admin, "admin@example.com").await?;
    let token = app.token_for(&admin);

    let (status, _) = common::envelope(app.get(&format!("/api/cases/{}", uuid::Uuid::new_v4()), &token).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = common::envelope(app.get("/api/cases/not-a-uuid", &token).send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fieldErrors"]["id"].is_string());
    Ok(())
}

#[tokio::test]
async fn messages_are_oldest_first_and_notify_the_other_party() -> Result<()> {
    let app = common::spawn().await?;
    let client = app.user(Role::Client, "client@example.com").await?;
    let agent = app.user(Role::Agent, "agent@example.com").await?;
    let case = app.case_for(&client, Some(&agent)).await?;
    let path = format!("/api/cases/{}/messages", case.id);

    let (status, body) = common::envelope(
        app.post(&path, &app.token_for(&client))
            .json(&json!({ "body": "I uploaded my bank statements" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["sender"]["id"], client.id.to_string());

    app.post(&path, &app.token_for(&agent))
        .json(&json!({ "body": "Thanks, reviewing now" }))
        .send()
        .await?;

    let (_, body) = common::envelope(app.get(&path, &app.token_for(&client)).send().await?).await?;
    let bodies: Vec<&str> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["body"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(bodies, ["I uploaded my bank statements", "Thanks, reviewing now"]);

    assert_eq!(app.repo.list_notifications(agent.id, false).await?.len(), 1);
    assert_eq!(app.repo.list_notifications(client.id, false).await?.len(), 1);

    let (status, _) = common::envelope(
        app.post(&path, &app.token_for(&client))
            .json(&json!({ "body": "" }))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
