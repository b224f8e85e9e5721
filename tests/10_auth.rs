mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn register_then_login_issues_token() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };

    let (email, token) = common::register_and_login(server, "auth-basic").await?;
    assert!(email.contains('@'));
    assert_eq!(token.split('.').count(), 3);

    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let email = common::unique_email("auth-dup");
    let payload = serde_json::json!({ "email": email, "password": "testpass123", "name": "dup" });

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (email, _) = common::register_and_login(server, "auth-wrongpw").await?;

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&serde_json::json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn short_password_fails_validation() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&serde_json::json!({
            "email": common::unique_email("auth-shortpw"),
            "password": "pw",
            "name": "short"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["code"], "VALIDATION_ERROR");

    Ok(())
}
