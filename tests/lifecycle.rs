//! End-to-end key lifecycle through `KeyServer`.

use chrono::Utc;
use vicat_keys::accounts::{LoginOutcome, Registration};
use vicat_keys::crypto::credential::HashCost;
use vicat_keys::keys::format::is_key_format;
use vicat_keys::store::document::RedeemCode;
use vicat_keys::store::file::FileStore;
use vicat_keys::store::memory::MemoryStore;
use vicat_keys::{AuthError, DenyReason, KeyServer, Verdict, VicatError};

fn server() -> KeyServer {
    let server = KeyServer::with_store(MemoryStore::new(), HashCost::minimal()).unwrap();
    server.accounts().ensure_admin("admin", "adminpw").unwrap();
    server
}

fn seed_code(server: &KeyServer, code: &str) {
    server
        .vault()
        .transact(|doc| {
            doc.redeem_codes.push(RedeemCode {
                code: code.to_string(),
                redeemed: false,
                redeemed_by: None,
                redeemed_at: None,
                created_at: Utc::now(),
            });
            Ok(())
        })
        .unwrap();
}

#[test]
fn register_redeem_check_blacklist() {
    let server = server();

    server
        .accounts()
        .register(Registration {
            username: "alice1".to_string(),
            password: "pw123456".to_string(),
            email: Some("alice@example.com".to_string()),
        })
        .unwrap();

    let LoginOutcome::User { user, session } =
        server.accounts().login("alice1", "pw123456").unwrap()
    else {
        panic!("expected user login");
    };

    let authed = server
        .gate()
        .user_guard(Some(session.token.as_str()))
        .unwrap();
    assert_eq!(authed.user.id, user.id);

    seed_code(&server, "ABC123XYZ000");
    let key = server.keys().redeem("ABC123XYZ000", user.id).unwrap();
    assert!(is_key_format(&key), "{key}");

    assert_eq!(server.keys().check_key(&key).unwrap(), Verdict::Ok);

    let owned = server.keys().list_user_keys(user.id).unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].key, key);

    server.gate().admin_guard(Some("admin"), Some("adminpw")).unwrap();
    server.keys().blacklist_key(&key).unwrap();

    assert_eq!(
        server.keys().check_key(&key).unwrap(),
        Verdict::Denied(DenyReason::Blacklisted)
    );
    let inventory = server.keys().list_all_keys().unwrap();
    assert!(inventory.active_keys.iter().all(|k| k.key != key));
    assert_eq!(inventory.blacklist.len(), 1);
}

#[test]
fn codes_are_single_use() {
    let server = server();
    let user = server
        .accounts()
        .register(Registration {
            username: "bob".to_string(),
            password: "pw".to_string(),
            email: None,
        })
        .unwrap();

    let codes = server.keys().issue_redeem_codes(2).unwrap();
    server.keys().redeem(&codes[0], user.id).unwrap();

    assert!(matches!(
        server.keys().redeem(&codes[0], user.id),
        Err(VicatError::CodeAlreadyUsed)
    ));
    assert!(matches!(
        server.keys().redeem("NOPE00000000", user.id),
        Err(VicatError::CodeNotFound)
    ));

    let user_keys = server.keys().list_user_keys(user.id).unwrap();
    assert_eq!(user_keys.len(), 1);
}

#[test]
fn admin_guard_rejects_wrong_password() {
    let server = server();
    assert!(matches!(
        server.gate().admin_guard(Some("admin"), Some("wrong")),
        Err(VicatError::Auth(AuthError::InvalidCredentials))
    ));
    assert!(matches!(
        server.gate().admin_guard(None, None),
        Err(VicatError::Auth(AuthError::MissingCredentials))
    ));
}

#[test]
fn file_backed_state_persists() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("state.json");

    let key = {
        let server =
            KeyServer::with_store(FileStore::new(path.clone()).unwrap(), HashCost::minimal())
                .unwrap();
        let user = server
            .accounts()
            .register(Registration {
                username: "carol".to_string(),
                password: "pw".to_string(),
                email: None,
            })
            .unwrap();
        let codes = server.keys().issue_redeem_codes(1).unwrap();
        server.keys().redeem(&codes[0], user.id).unwrap()
    };

    let reopened =
        KeyServer::with_store(FileStore::new(path).unwrap(), HashCost::minimal()).unwrap();
    assert_eq!(reopened.keys().check_key(&key).unwrap(), Verdict::Ok);
    assert!(matches!(
        reopened.accounts().login("carol", "pw").unwrap(),
        LoginOutcome::User { .. }
    ));
}
