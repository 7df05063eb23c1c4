//! Client sign-up, updates and the email/password token exchange.

mod common;

use assert_matches::assert_matches;
use common::*;
use flock_core::auth::jwt::{validate_token, JwtConfig};
use flock_core::error::CoreError;
use flock_core::roles::PermissionScope;
use flock_db::gateway::{QueryOutput, SqlValue};
use flock_db::models::client::{ClientUpdate, NewClient};
use flock_db::repositories::ClientRepo;
use flock_db::row::Row;

fn jwt() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-for-client-auth".into(),
        expiry_secs: 3600,
    }
}

/// Client 4 is `pastor@example.org` with password `correct horse`.
fn credentials_gateway(active: bool) -> ScriptedGateway {
    ScriptedGateway::new(move |sql, params| {
        if sql.contains("password_hash") && sql.starts_with("SELECT") {
            return Ok(match params.first() {
                Some(SqlValue::Text(email)) if email == "pastor@example.org" => rows(vec![
                    credentials_row(4, "pastor@example.org", "correct horse", active),
                ]),
                _ => QueryOutput::default(),
            });
        }
        Ok(QueryOutput::affected(1))
    })
}

fn client_row(id: i64) -> Row {
    Row::new()
        .with("id", id)
        .with("email", "pastor@example.org")
        .with("scope", "admin")
        .with("active", true)
        .with("last_login", SqlValue::Null)
        .with("created_by", ACTOR)
        .with("modified_by", SqlValue::Null)
        .with("creation_timestamp", 1_700_000_000_i64)
        .with("modification_timestamp", SqlValue::Null)
        .with("archived", false)
}

// ---------------------------------------------------------------------------
// Token exchange
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_password_is_forbidden_after_one_lookup() {
    let gw = credentials_gateway(true);
    let log_gw = credentials_gateway(true);
    let hasher = CountingHasher::default();

    let err = ClientRepo::get_token(&gw, &log_gw, &hasher, &jwt(), "pastor@example.org", "guess")
        .await
        .unwrap_err();

    assert_matches!(err, CoreError::Forbidden(_));
    assert_eq!(hasher.verifications(), 1);
    assert_eq!(gw.statements().len(), 1);
    assert!(log_gw.statements().is_empty());
}

#[tokio::test]
async fn inactive_account_is_forbidden_even_with_right_password() {
    let gw = credentials_gateway(false);
    let log_gw = credentials_gateway(false);
    let hasher = CountingHasher::default();

    let err = ClientRepo::get_token(
        &gw,
        &log_gw,
        &hasher,
        &jwt(),
        "pastor@example.org",
        "correct horse",
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::Forbidden(msg) if msg.contains("deactivated"));
    assert!(log_gw.statements().is_empty());
}

#[tokio::test]
async fn unknown_email_is_not_found_without_verifying() {
    let gw = credentials_gateway(true);
    let log_gw = credentials_gateway(true);
    let hasher = CountingHasher::default();

    let err = ClientRepo::get_token(&gw, &log_gw, &hasher, &jwt(), "nobody@example.org", "x")
        .await
        .unwrap_err();

    assert_matches!(
        err,
        CoreError::NotFoundBy { entity: "Client", key } if key == "nobody@example.org"
    );
    assert_eq!(hasher.verifications(), 0);
}

#[tokio::test]
async fn valid_credentials_issue_token_and_stamp_login() {
    let gw = credentials_gateway(true);
    let log_gw = credentials_gateway(true);
    let hasher = CountingHasher::default();
    let config = jwt();

    let token = ClientRepo::get_token(
        &gw,
        &log_gw,
        &hasher,
        &config,
        "pastor@example.org",
        "correct horse",
    )
    .await
    .unwrap();

    let claims = validate_token(&token, &config).unwrap();
    assert_eq!(claims.sub, 4);
    assert_eq!(claims.email, "pastor@example.org");
    assert_eq!(claims.scope, PermissionScope::Admin);

    assert!(gw.writes().is_empty());
    let logged = log_gw.calls();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].0, "UPDATE clients SET last_login = NOW() WHERE id = $1");
    assert_eq!(logged[0].1, vec![SqlValue::Int(4)]);
}

#[tokio::test]
async fn failed_login_stamp_does_not_block_the_token() {
    let gw = credentials_gateway(true);
    let log_gw = ScriptedGateway::failing();
    let hasher = CountingHasher::default();

    let token = ClientRepo::get_token(
        &gw,
        &log_gw,
        &hasher,
        &jwt(),
        "pastor@example.org",
        "correct horse",
    )
    .await;
    assert!(token.is_ok());
}

// ---------------------------------------------------------------------------
// Sign-up and update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sign_up_stores_hash_and_default_scope() {
    let gw = ScriptedGateway::new(|_, _| Ok(id_row(12)));
    let hasher = CountingHasher::default();
    let input = NewClient {
        email: "clerk@example.org".into(),
        password: "long enough password".into(),
        scope: None,
    };

    let id = ClientRepo::add_client(&gw, &hasher, &input, ACTOR).await.unwrap();
    assert_eq!(id, 12);

    let calls = gw.calls();
    let (sql, params) = &calls[0];
    assert!(sql.starts_with("INSERT INTO clients (email, password_hash, scope"));
    assert_eq!(params[1], SqlValue::from("hashed:long enough password"));
    assert_eq!(params[2], SqlValue::from("admin"));
}

#[tokio::test]
async fn sign_up_rejects_short_password_and_bad_email() {
    let gw = ScriptedGateway::new(|_, _| Ok(id_row(12)));
    let hasher = CountingHasher::default();

    let short = NewClient {
        email: "clerk@example.org".into(),
        password: "short".into(),
        scope: None,
    };
    assert_matches!(
        ClientRepo::add_client(&gw, &hasher, &short, ACTOR).await,
        Err(CoreError::Validation(_))
    );

    let bad_email = NewClient {
        email: "clerk-at-example".into(),
        password: "long enough password".into(),
        scope: None,
    };
    assert_matches!(
        ClientRepo::add_client(&gw, &hasher, &bad_email, ACTOR).await,
        Err(CoreError::Validation(_))
    );
    assert!(gw.statements().is_empty());
}

#[tokio::test]
async fn deactivating_client_writes_flag_and_logs() {
    let gw = ScriptedGateway::new(|sql, _| {
        Ok(if sql.starts_with("SELECT") {
            rows(vec![client_row(4)])
        } else {
            QueryOutput::affected(1)
        })
    });
    let logger = RecordingLogger::default();
    let hasher = CountingHasher::default();
    let input = ClientUpdate {
        id: 4,
        active: Some(false),
        ..ClientUpdate::default()
    };

    ClientRepo::update_client(&gw, &logger, &hasher, &input, ACTOR)
        .await
        .unwrap();

    assert_eq!(
        gw.writes(),
        vec!["UPDATE clients SET active = $1, modified_by = $2 WHERE id = $3".to_string()]
    );
    assert_eq!(logger.entries().len(), 1);
}
