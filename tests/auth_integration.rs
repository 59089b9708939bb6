mod common;

use chirpy::auth::validate_access_token;
use common::{spawn_app, TEST_SECRET};
use serde_json::{json, Value};

// --- Account Tests ---

#[tokio::test]
async fn create_user_returns_201_without_password_hash() {
    let app = spawn_app("production");

    let response = app.create_user("saul@bettercall.com", "123456").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "saul@bettercall.com");
    assert!(body.get("id").is_some());
    assert!(body.get("created_at").is_some());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn create_user_returns_409_for_duplicate_email() {
    let app = spawn_app("production");

    assert_eq!(201, app.create_user("saul@bettercall.com", "123456").await.status().as_u16());
    assert_eq!(409, app.create_user("saul@bettercall.com", "654321").await.status().as_u16());
}

#[tokio::test]
async fn create_user_returns_400_for_bad_input() {
    let app = spawn_app("production");

    let test_cases = vec![
        (json!({"email": "notanemail", "password": "pw"}), "invalid email"),
        (json!({"password": "pw"}), "missing email"),
        (json!({"email": "a@example.com"}), "missing password"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = app.post_json("/api/users", &body).await;
        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_tokens_for_valid_credentials() {
    let app = spawn_app("production");
    let body = app.logged_in_user("walt@breakingbad.com", "04234").await;

    for field in ["id", "created_at", "updated_at", "email", "token", "refresh_token"] {
        assert!(body.get(field).is_some(), "missing field {}", field);
    }

    let token = body["token"].as_str().unwrap();
    let user_id = validate_access_token(token, TEST_SECRET.as_bytes()).expect("token should validate");
    assert_eq!(user_id.to_string(), body["id"].as_str().unwrap());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app("production");
    app.create_user("walt@breakingbad.com", "04234").await;

    let wrong_password = app.login("walt@breakingbad.com", "wrong").await;
    let unknown_email = app.login("jesse@breakingbad.com", "04234").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_email.status().as_u16());

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_email: Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password["message"], unknown_email["message"]);
    assert_eq!(wrong_password["code"], unknown_email["code"]);
}

// --- Refresh / Revoke Tests ---

#[tokio::test]
async fn refresh_returns_new_access_token() {
    let app = spawn_app("production");
    let body = app.logged_in_user("walt@breakingbad.com", "04234").await;
    let refresh_token = body["refresh_token"].as_str().unwrap();

    let response = app.post_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, response.status().as_u16());

    let refreshed: Value = response.json().await.unwrap();
    let token = refreshed["token"].as_str().expect("token in response");
    let user_id = validate_access_token(token, TEST_SECRET.as_bytes()).unwrap();
    assert_eq!(user_id.to_string(), body["id"].as_str().unwrap());
}

#[tokio::test]
async fn refresh_without_header_returns_400() {
    let app = spawn_app("production");

    let response = app
        .client
        .post(&format!("{}/api/refresh", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn refresh_and_revoke_accept_padded_bearer_header() {
    let app = spawn_app("production");
    let body = app.logged_in_user("walt@breakingbad.com", "04234").await;
    let padded = format!("  {}  ", body["refresh_token"].as_str().unwrap());

    let response = app.post_bearer_header("/api/refresh", &padded).await;
    assert_eq!(200, response.status().as_u16());

    let response = app.post_bearer_header("/api/revoke", &padded).await;
    assert_eq!(204, response.status().as_u16());

    let response = app.post_bearer_header("/api/refresh", &padded).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_with_unknown_token_returns_401() {
    let app = spawn_app("production");

    let response = app.post_bearer("/api/refresh", "does-not-exist").await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn revoke_returns_204_and_blocks_refresh() {
    let app = spawn_app("production");
    let body = app.logged_in_user("walt@breakingbad.com", "04234").await;
    let refresh_token = body["refresh_token"].as_str().unwrap();

    let response = app.post_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, response.status().as_u16());

    // Second revoke is a no-op success
    let response = app.post_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, response.status().as_u16());

    let response = app.post_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn revoked_and_unknown_tokens_look_the_same() {
    let app = spawn_app("production");
    let body = app.logged_in_user("walt@breakingbad.com", "04234").await;
    let refresh_token = body["refresh_token"].as_str().unwrap();
    app.post_bearer("/api/revoke", refresh_token).await;

    let revoked: Value = app.post_bearer("/api/refresh", refresh_token).await.json().await.unwrap();
    let unknown: Value = app.post_bearer("/api/refresh", "nope").await.json().await.unwrap();

    assert_eq!(revoked["message"], unknown["message"]);
    assert_eq!(revoked["code"], unknown["code"]);
}

// --- Account Update Tests ---

#[tokio::test]
async fn update_user_requires_access_token() {
    let app = spawn_app("production");
    let body = app.logged_in_user("walt@breakingbad.com", "04234").await;
    let update = json!({"email": "walter@breakingbad.com", "password": "losPollos"});

    let missing = app
        .client
        .put(&format!("{}/api/users", app.address))
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(400, missing.status().as_u16());

    // A refresh token is not an access token
    let wrong_kind = app
        .client
        .put(&format!("{}/api/users", app.address))
        .bearer_auth(body["refresh_token"].as_str().unwrap())
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(401, wrong_kind.status().as_u16());
}

#[tokio::test]
async fn update_user_changes_credentials() {
    let app = spawn_app("production");
    let body = app.logged_in_user("walt@breakingbad.com", "04234").await;

    let response = app
        .client
        .put(&format!("{}/api/users", app.address))
        .bearer_auth(body["token"].as_str().unwrap())
        .json(&json!({"email": "walter@breakingbad.com", "password": "losPollos"}))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["id"], body["id"]);
    assert_eq!(updated["email"], "walter@breakingbad.com");

    assert_eq!(401, app.login("walt@breakingbad.com", "04234").await.status().as_u16());
    assert_eq!(200, app.login("walter@breakingbad.com", "losPollos").await.status().as_u16());
}

// --- Admin Tests ---

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let app = spawn_app("production");

    let response = app.post_json("/admin/reset", &json!({})).await;
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn reset_deletes_users_on_dev() {
    let app = spawn_app("dev");
    app.logged_in_user("walt@breakingbad.com", "04234").await;

    let response = app.post_json("/admin/reset", &json!({})).await;
    assert_eq!(200, response.status().as_u16());

    assert_eq!(401, app.login("walt@breakingbad.com", "04234").await.status().as_u16());
}
