mod common;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::Algorithm;
use serde_json::{Value, json};

use statelessauth::domain::auth::{Group, Permission, PermissionWire, User, UserWire};
use statelessauth::services::auth::{AuthEngine, TokenError};

use common::{ed_key, other_rsa_key, rsa_key};

fn user() -> User {
    User::authenticated("user").staff(true).with_groups(vec![Group::new(
        "editors",
        vec![Permission::new("Can edit", "edit")],
    )])
}

fn segment(token: &str, index: usize) -> Value {
    let part = token.split('.').nth(index).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(part).unwrap()).unwrap()
}

#[test]
fn rsa_round_trip() {
    let engine = AuthEngine::new("default", rsa_key(), UserWire::new());
    assert_eq!(engine.algorithms, vec![Algorithm::RS256]);

    let token = engine.encode(&user()).unwrap();

    assert_eq!(token.split('.').count(), 3);
    assert_eq!(segment(&token, 0), json!({ "alg": "RS256", "typ": "JWT" }));
    assert_eq!(segment(&token, 1)["username"], json!("user"));
    assert_eq!(engine.decode(&token).unwrap(), user());
    assert_eq!(engine.decode_opt(&token), Some(user()));
}

#[test]
fn ed25519_round_trip() {
    let engine = AuthEngine::new("default", ed_key(), PermissionWire);
    let permission = Permission::new("p1", "c1");

    let token = engine.encode(&permission).unwrap();

    assert_eq!(segment(&token, 0)["alg"], json!("EdDSA"));
    assert_eq!(engine.decode(&token).unwrap(), permission);
}

#[test]
fn algorithm_outside_the_list_fails_even_with_the_right_key() {
    let signer = AuthEngine::new("default", rsa_key(), PermissionWire)
        .with_algorithms(vec![Algorithm::RS512]);
    let verifier = AuthEngine::new("default", rsa_key(), PermissionWire)
        .with_algorithms(vec![Algorithm::RS256, Algorithm::PS256]);

    let token = signer.encode(&Permission::new("p", "c")).unwrap();

    assert!(matches!(
        verifier.decode(&token),
        Err(TokenError::UnsupportedAlgorithm(Algorithm::RS512))
    ));
    assert_eq!(verifier.decode_opt(&token), None);
}

#[test]
fn listed_algorithm_of_another_family_is_not_accepted() {
    let rsa = AuthEngine::new("default", rsa_key(), PermissionWire);
    let mut ed = AuthEngine::new("default", ed_key(), PermissionWire);
    ed.algorithms = vec![Algorithm::EdDSA, Algorithm::RS256];

    let token = rsa.encode(&Permission::new("p", "c")).unwrap();

    assert!(matches!(
        ed.decode(&token),
        Err(TokenError::UnsupportedAlgorithm(Algorithm::RS256))
    ));
}

#[test]
fn wrong_key_fails() {
    let engine = AuthEngine::new("default", rsa_key(), UserWire::new());
    let mut other = AuthEngine::new("default", rsa_key(), UserWire::new());
    other.key = other_rsa_key();

    let token = engine.encode(&user()).unwrap();

    assert!(matches!(
        other.decode(&token),
        Err(TokenError::InvalidSignature)
    ));
    assert_eq!(other.decode_opt(&token), None);
}

#[test]
fn tampering_fails() {
    let engine = AuthEngine::new("default", rsa_key(), UserWire::new());
    let token = engine.encode(&user()).unwrap();

    assert!(engine.decode(&format!("{token}a")).is_err());
    assert_eq!(engine.decode_opt(&format!("{token}a")), None);

    // re-encode the payload with another username, keep the signature
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let mut payload = segment(&token, 1);
    payload["username"] = json!("admin");
    parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
    assert!(engine.decode(&parts.join(".")).is_err());
}

#[test]
fn verify_only_and_sign_only_keys() {
    let signer = AuthEngine::new("default", rsa_key().private_only(), UserWire::new());
    let verifier = AuthEngine::new("default", rsa_key().public_only(), UserWire::new());

    let token = signer.encode(&user()).unwrap();

    assert_eq!(verifier.decode(&token).unwrap(), user());
    assert!(matches!(
        signer.decode(&token),
        Err(TokenError::KeyUnavailable("public"))
    ));
    assert!(matches!(
        verifier.encode(&user()),
        Err(TokenError::KeyUnavailable("private"))
    ));
}

#[test]
fn anonymous_user_round_trips() {
    let engine = AuthEngine::new("default", rsa_key(), UserWire::new());
    let token = engine.encode(&User::anonymous()).unwrap();

    let decoded = engine.decode(&token).unwrap();
    assert!(decoded.is_anonymous());
    assert!(!decoded.is_authenticated());
}
