use jsonwebtoken::{DecodingKey, Validation, decode};
use tokio::test;
use uuid::Uuid;
use xeber_portal::auth::{Claims, hash_password, issue_token, verify_password};

#[test]
async fn password_hash_verifies_and_rejects() {
    let hash = hash_password("fourth-estate".to_string())
        .await
        .expect("hashing should succeed");
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("fourth-estate".to_string(), hash.clone()).await);
    assert!(!verify_password("third-estate".to_string(), hash).await);
}

#[test]
async fn hashing_salts_independently() {
    let first = hash_password("same-password".to_string()).await.unwrap();
    let second = hash_password("same-password".to_string()).await.unwrap();
    assert_ne!(first, second);
}

#[test]
async fn issued_token_round_trips_subject() {
    let user_id = Uuid::from_u128(99);
    let token = issue_token(user_id, "test-secret").expect("token should issue");

    let data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret("test-secret".as_bytes()),
        &Validation::default(),
    )
    .expect("token should decode with the same secret");
    assert_eq!(data.claims.sub, user_id);
    assert!(data.claims.exp > data.claims.iat);
}

#[test]
async fn token_is_rejected_under_wrong_secret() {
    let token = issue_token(Uuid::from_u128(1), "secret-a").expect("token should issue");
    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret("secret-b".as_bytes()),
        &Validation::default(),
    );
    assert!(result.is_err());
}
