/// End-to-end tests for the Chirpy HTTP API
///
/// Each test builds the full router on in-memory stores and drives it
/// request by request:
/// - Registration, login, refresh and revoke
/// - Protected routes without or with bad credentials
/// - Chirp ownership on delete
/// - Payment webhook
/// - Admin pages and the static file hit counter

mod common;

use axum::http::{Method, StatusCode};
use chirpy_shared::auth::jwt::{create_token, AccessClaims, ISSUER};
use common::{bearer, field, TestContext, POLKA_KEY};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let res = ctx.send(Method::GET, "/api/healthz", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "healthy");
    assert_eq!(res.body["database"], "connected");
}

#[tokio::test]
async fn test_register_returns_profile_without_hash() {
    let ctx = TestContext::new();

    let user = ctx.register("alice@example.com", "correct horse").await;

    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["is_chirpy_red"], false);
    assert!(Uuid::parse_str(field(&user, "id")).is_ok());
    assert!(user.get("password_hash").is_none());
    assert!(user.get("hashed_password").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicate_and_invalid_input() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw1").await;

    let dup = ctx
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "alice@example.com", "password": "pw2" })),
        )
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let bad_email = ctx
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "not-an-email", "password": "pw" })),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(bad_email.body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();

    let res = ctx
        .send(Method::POST, "/api/login", None, Some(json!("just a string")))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_issues_both_tokens() {
    let ctx = TestContext::new();
    let user = ctx.register("alice@example.com", "hunter2").await;

    let login = ctx.login("alice@example.com", "hunter2").await;

    assert_eq!(login["id"], user["id"]);
    assert_eq!(login["email"], "alice@example.com");

    let refresh = field(&login, "refresh_token");
    assert_eq!(refresh.len(), 64);
    assert!(refresh.chars().all(|c| c.is_ascii_hexdigit()));

    let verified = ctx
        .state
        .sessions
        .verify_access_token(field(&login, "token"))
        .unwrap();
    assert_eq!(verified.user_id.to_string(), field(&user, "id"));
    assert_eq!(verified.expires_at - verified.issued_at, chrono::Duration::hours(1));
}

#[tokio::test]
async fn test_login_honors_shorter_expiry_and_clamps_longer() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw").await;

    let short = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "pw", "expires_in_seconds": 60 })),
        )
        .await;
    let verified = ctx
        .state
        .sessions
        .verify_access_token(field(&short.body, "token"))
        .unwrap();
    assert_eq!(verified.expires_at - verified.issued_at, chrono::Duration::seconds(60));

    let long = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "pw", "expires_in_seconds": 86400 })),
        )
        .await;
    let verified = ctx
        .state
        .sessions
        .verify_access_token(field(&long.body, "token"))
        .unwrap();
    assert_eq!(verified.expires_at - verified.issued_at, chrono::Duration::hours(1));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "right").await;

    let wrong_password = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong" })),
        )
        .await;
    let unknown_email = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "right" })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
}

#[tokio::test]
async fn test_refresh_then_revoke() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw").await;
    let login = ctx.login("alice@example.com", "pw").await;
    let refresh = bearer(field(&login, "refresh_token"));

    let refreshed = ctx.send(Method::POST, "/api/refresh", Some(&refresh), None).await;
    assert_eq!(refreshed.status, StatusCode::OK);
    assert!(ctx
        .state
        .sessions
        .verify_access_token(field(&refreshed.body, "token"))
        .is_ok());

    // Not rotated: the same refresh token keeps working
    let again = ctx.send(Method::POST, "/api/refresh", Some(&refresh), None).await;
    assert_eq!(again.status, StatusCode::OK);

    let revoked = ctx.send(Method::POST, "/api/revoke", Some(&refresh), None).await;
    assert_eq!(revoked.status, StatusCode::NO_CONTENT);
    assert!(revoked.text.is_empty());

    let after = ctx.send(Method::POST, "/api/refresh", Some(&refresh), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    // Revoking twice still succeeds
    let twice = ctx.send(Method::POST, "/api/revoke", Some(&refresh), None).await;
    assert_eq!(twice.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_refresh_rejects_missing_unknown_and_access_tokens() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw").await;
    let login = ctx.login("alice@example.com", "pw").await;

    let missing = ctx.send(Method::POST, "/api/refresh", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let unknown = ctx
        .send(Method::POST, "/api/refresh", Some(&bearer(&"ab".repeat(32))), None)
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);

    // An access token is not a refresh token
    let access = ctx
        .send(Method::POST, "/api/refresh", Some(&bearer(field(&login, "token"))), None)
        .await;
    assert_eq!(access.status, StatusCode::UNAUTHORIZED);

    let unknown_revoke = ctx
        .send(Method::POST, "/api/revoke", Some(&bearer(&"cd".repeat(32))), None)
        .await;
    assert_eq!(unknown_revoke.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_reject_bad_credentials() {
    let ctx = TestContext::new();
    let user = ctx.register("alice@example.com", "pw").await;
    let login = ctx.login("alice@example.com", "pw").await;
    let body = Some(json!({ "body": "hello" }));

    let no_header = ctx.send(Method::POST, "/api/chirps", None, body.clone()).await;
    assert_eq!(no_header.status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_header.body["error"], "unauthorized");

    let wrong_scheme = ctx
        .send(Method::POST, "/api/chirps", Some("Basic dXNlcjpwYXNz"), body.clone())
        .await;
    assert_eq!(wrong_scheme.status, StatusCode::UNAUTHORIZED);

    // A refresh token is not an access token
    let refresh = ctx
        .send(
            Method::POST,
            "/api/chirps",
            Some(&bearer(field(&login, "refresh_token"))),
            body.clone(),
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    // Signed with another secret
    let user_id = Uuid::parse_str(field(&user, "id")).unwrap();
    let claims = AccessClaims::new(user_id, chrono::Duration::hours(1));
    let forged = create_token(&claims, "some-other-secret-that-is-32-bytes-long").unwrap();
    let foreign = ctx
        .send(Method::POST, "/api/chirps", Some(&bearer(&forged)), body.clone())
        .await;
    assert_eq!(foreign.status, StatusCode::UNAUTHORIZED);

    // Expired
    let mut expired_claims = AccessClaims::new(user_id, chrono::Duration::hours(1));
    expired_claims.iat -= 7200;
    expired_claims.exp -= 7200;
    assert_eq!(expired_claims.iss, ISSUER);
    let expired = create_token(&expired_claims, common::JWT_SECRET).unwrap();
    let res = ctx
        .send(Method::POST, "/api/chirps", Some(&bearer(&expired)), body)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_credentials() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "old").await;
    let login = ctx.login("alice@example.com", "old").await;
    let token = bearer(field(&login, "token"));

    let res = ctx
        .send(
            Method::PUT,
            "/api/users",
            Some(&token),
            Some(json!({ "email": "alice@new.example.com", "password": "new" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "alice@new.example.com");
    assert_eq!(res.body["id"], login["id"]);

    ctx.login("alice@new.example.com", "new").await;

    let old = ctx
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "old" })),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let anonymous = ctx
        .send(
            Method::PUT,
            "/api/users",
            None,
            Some(json!({ "email": "x@example.com", "password": "x" })),
        )
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chirp_lifecycle_with_ownership() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw").await;
    ctx.register("bob@example.com", "pw").await;
    let alice = ctx.login("alice@example.com", "pw").await;
    let bob = ctx.login("bob@example.com", "pw").await;
    let alice_token = bearer(field(&alice, "token"));
    let bob_token = bearer(field(&bob, "token"));

    let created = ctx
        .send(
            Method::POST,
            "/api/chirps",
            Some(&alice_token),
            Some(json!({ "body": "first chirp" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["user_id"], alice["id"]);
    let chirp_id = field(&created.body, "id").to_string();
    let chirp_uri = format!("/api/chirps/{}", chirp_id);

    let fetched = ctx.send(Method::GET, &chirp_uri, None, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["body"], "first chirp");

    // Bob is authenticated but not the author
    let forbidden = ctx.send(Method::DELETE, &chirp_uri, Some(&bob_token), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let anonymous = ctx.send(Method::DELETE, &chirp_uri, None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let deleted = ctx.send(Method::DELETE, &chirp_uri, Some(&alice_token), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = ctx.send(Method::GET, &chirp_uri, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let delete_again = ctx.send(Method::DELETE, &chirp_uri, Some(&alice_token), None).await;
    assert_eq!(delete_again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_chirp_rejects_blank_body() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw").await;
    let login = ctx.login("alice@example.com", "pw").await;

    let res = ctx
        .send(
            Method::POST,
            "/api/chirps",
            Some(&bearer(field(&login, "token"))),
            Some(json!({ "body": "   " })),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["details"][0]["message"], "Chirp body must not be empty");
}

#[tokio::test]
async fn test_list_chirps_filters_and_sorts() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw").await;
    ctx.register("bob@example.com", "pw").await;
    let alice = ctx.login("alice@example.com", "pw").await;
    let bob = ctx.login("bob@example.com", "pw").await;

    for (login, body) in [(&alice, "a1"), (&bob, "b1"), (&alice, "a2")] {
        let res = ctx
            .send(
                Method::POST,
                "/api/chirps",
                Some(&bearer(field(login, "token"))),
                Some(json!({ "body": body })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let all = ctx.send(Method::GET, "/api/chirps", None, None).await;
    let bodies: Vec<&str> = all.body.as_array().unwrap().iter().map(|c| field(c, "body")).collect();
    assert_eq!(bodies, vec!["a1", "b1", "a2"]);

    let uri = format!("/api/chirps?author_id={}&sort=desc", field(&alice, "id"));
    let filtered = ctx.send(Method::GET, &uri, None, None).await;
    let bodies: Vec<&str> = filtered
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| field(c, "body"))
        .collect();
    assert_eq!(bodies, vec!["a2", "a1"]);

    let bad = ctx.send(Method::GET, "/api/chirps?sort=sideways", None, None).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_polka_webhook_upgrades_user() {
    let ctx = TestContext::new();
    let user = ctx.register("alice@example.com", "pw").await;
    let api_key = format!("ApiKey {}", POLKA_KEY);

    let payload = json!({ "event": "user.upgraded", "data": { "user_id": user["id"] } });

    let no_key = ctx
        .send(Method::POST, "/api/polka/webhooks", None, Some(payload.clone()))
        .await;
    assert_eq!(no_key.status, StatusCode::UNAUTHORIZED);

    let wrong_key = ctx
        .send(
            Method::POST,
            "/api/polka/webhooks",
            Some("ApiKey not-the-key"),
            Some(payload.clone()),
        )
        .await;
    assert_eq!(wrong_key.status, StatusCode::UNAUTHORIZED);

    let ok = ctx
        .send(Method::POST, "/api/polka/webhooks", Some(&api_key), Some(payload))
        .await;
    assert_eq!(ok.status, StatusCode::NO_CONTENT);

    let login = ctx.login("alice@example.com", "pw").await;
    assert_eq!(login["is_chirpy_red"], true);

    let ignored = ctx
        .send(
            Method::POST,
            "/api/polka/webhooks",
            Some(&api_key),
            Some(json!({ "event": "user.payment_failed", "data": { "user_id": user["id"] } })),
        )
        .await;
    assert_eq!(ignored.status, StatusCode::NO_CONTENT);

    let unknown = ctx
        .send(
            Method::POST,
            "/api/polka/webhooks",
            Some(&api_key),
            Some(json!({ "event": "user.upgraded", "data": { "user_id": Uuid::new_v4() } })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_files_count_hits() {
    let ctx = TestContext::new();

    for _ in 0..3 {
        let res = ctx.send(Method::GET, "/app/index.html", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.text.contains("Welcome to Chirpy"));
    }

    // API traffic is not counted
    ctx.send(Method::GET, "/api/healthz", None, None).await;

    let metrics = ctx.send(Method::GET, "/admin/metrics", None, None).await;
    assert_eq!(metrics.status, StatusCode::OK);
    assert!(metrics.text.contains("Chirpy has been visited 3 times!"));
}

#[tokio::test]
async fn test_admin_reset_in_dev() {
    let ctx = TestContext::new();
    ctx.register("alice@example.com", "pw").await;
    ctx.send(Method::GET, "/app/index.html", None, None).await;

    let res = ctx.send(Method::POST, "/admin/reset", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["users_deleted"], 1);
    assert_eq!(ctx.state.hits.get(), 0);

    // The email is free again
    ctx.register("alice@example.com", "pw").await;
}

#[tokio::test]
async fn test_admin_reset_forbidden_in_prod() {
    let ctx = TestContext::with_platform("prod");
    ctx.register("alice@example.com", "pw").await;

    let res = ctx.send(Method::POST, "/admin/reset", None, None).await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    ctx.login("alice@example.com", "pw").await;
}
