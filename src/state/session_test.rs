use super::*;
use crate::net::api::Method;
use crate::state::storage::Storage;
use crate::test_support::{Harness, user_with_profile};
use futures::executor::block_on;
use serde_json::json;

fn credentials(email: &str, password: &str, profile: &str) -> Credentials {
    Credentials {
        email: email.to_owned(),
        password: password.to_owned(),
        profile: profile.to_owned(),
    }
}

fn script_login(h: &Harness, profile: &str) {
    h.transport.respond(
        Method::Post,
        "/api/auth/login",
        200,
        json!({
            "hasil": {
                "token": "jwt-123",
                "info": {
                    "idUser": "u-9",
                    "namaLengkap": "Rina",
                    "email": "rina@hr.id",
                    "profile": profile
                }
            }
        }),
    );
}

// =============================================================
// Validation
// =============================================================

#[test]
fn invalid_email_rejects_before_any_request() {
    let h = Harness::new();
    let err = block_on(h.session.login(&credentials("not-an-email", "x", "ADMIN"))).unwrap_err();
    assert!(matches!(err, AuthError::Validation(ValidationError::InvalidEmail)));
    assert_eq!(err.to_string(), "Email tidak valid");
    assert_eq!(h.transport.request_count(), 0);
}

#[test]
fn missing_password_and_profile_are_reported_in_order() {
    let h = Harness::new();
    let err = block_on(h.session.login(&credentials("a@b.co", "", ""))).unwrap_err();
    assert_eq!(err.to_string(), "Password harus diisi");
    let err = block_on(h.session.login(&credentials("a@b.co", "pw", " "))).unwrap_err();
    assert_eq!(err.to_string(), "Profile harus dipilih");
    assert_eq!(h.transport.request_count(), 0);
}

// =============================================================
// Login / logout
// =============================================================

#[test]
fn login_commits_token_and_user_together() {
    let h = Harness::new();
    script_login(&h, "HRD");

    let user = block_on(h.session.login(&credentials("rina@hr.id", "rahasia", "HRD"))).unwrap();

    assert_eq!(user.id_user, "u-9");
    assert!(h.session.is_authenticated());
    let stored = h.session.user().unwrap();
    assert_eq!(stored.id_user, "u-9");
    assert_eq!(stored.profile, "HRD");
    assert_eq!(h.session.role(), Some(Role::Hrd));
}

#[test]
fn logout_clears_everything_and_is_idempotent() {
    let h = Harness::new();
    script_login(&h, "ADMIN");
    block_on(h.session.login(&credentials("rina@hr.id", "rahasia", "ADMIN"))).unwrap();
    h.store.set_settings(&json!({"sidebar": "collapsed"})).unwrap();

    h.session.logout();
    assert!(!h.session.is_authenticated());
    assert!(h.session.user().is_none());
    assert!(h.storage.is_empty());

    h.session.logout();
    assert!(!h.session.is_authenticated());
}

#[test]
fn missing_token_in_response_stores_nothing() {
    let h = Harness::new();
    h.transport.respond(
        Method::Post,
        "/api/auth/login",
        200,
        json!({"hasil": {"info": {"idUser": "u", "namaLengkap": "n", "email": "e@x.id", "profile": "ADMIN"}}}),
    );
    let err = block_on(h.session.login(&credentials("e@x.id", "pw", "ADMIN"))).unwrap_err();
    assert!(matches!(err, AuthError::MalformedResponse("token")));
    assert!(h.storage.is_empty());
}

#[test]
fn missing_info_in_response_stores_nothing() {
    let h = Harness::new();
    h.transport
        .respond(Method::Post, "/api/auth/login", 200, json!({"hasil": {"token": "t"}}));
    let err = block_on(h.session.login(&credentials("e@x.id", "pw", "ADMIN"))).unwrap_err();
    assert!(matches!(err, AuthError::MalformedResponse("info")));
    assert!(!h.session.is_authenticated());
}

#[test]
fn failed_user_write_rolls_back_token() {
    let h = Harness::new();
    script_login(&h, "ADMIN");
    h.storage.fail_writes_to("hr_system_user");
    let err = block_on(h.session.login(&credentials("rina@hr.id", "pw", "ADMIN"))).unwrap_err();
    assert!(matches!(err, AuthError::Storage(_)));
    assert!(!h.session.is_authenticated());
}

#[test]
fn failed_relogin_drops_previous_user_too() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    script_login(&h, "ADMIN");
    h.storage.fail_writes_to("hr_system_user");
    let err = block_on(h.session.login(&credentials("rina@hr.id", "pw", "ADMIN"))).unwrap_err();
    assert!(matches!(err, AuthError::Storage(_)));
    assert!(!h.session.is_authenticated());
    assert!(h.session.user().is_none());
    assert_eq!(h.storage.get("hr_system_user"), None);
}

#[test]
fn server_rejection_is_an_api_error() {
    let h = Harness::new();
    h.transport.respond(
        Method::Post,
        "/api/auth/login",
        401,
        json!({"message": "Password salah"}),
    );
    let err = block_on(h.session.login(&credentials("rina@hr.id", "pw", "ADMIN"))).unwrap_err();
    assert!(matches!(err, AuthError::Api(ApiError::Status { status: 401, .. })));
    assert!(!h.session.is_authenticated());
}

// =============================================================
// Stored state
// =============================================================

#[test]
fn corrupt_user_with_token_is_authenticated_without_user() {
    let h = Harness::new();
    h.store.set_token("t").unwrap();
    h.storage.set("hr_system_user", "{{{").unwrap();
    assert!(h.session.is_authenticated());
    assert!(h.session.user().is_none());
    assert!(!h.session.has_permission(&[Role::Admin]));
}

#[test]
fn has_permission_checks_membership() {
    let h = Harness::new();
    assert!(!h.session.has_permission(&[Role::Admin]));
    h.sign_in("PEGAWAI");
    assert!(h.session.has_permission(&[Role::Pegawai, Role::Manager]));
    assert!(!h.session.has_permission(&[Role::Admin, Role::Hrd]));
    assert!(!h.session.has_permission(&[]));
}

#[test]
fn unknown_profile_fails_every_role_check() {
    let h = Harness::new();
    h.sign_in("INTERN");
    assert!(h.session.is_authenticated());
    assert!(!h.session.has_permission(&Role::ALL));
}

#[test]
fn update_user_requires_session() {
    let h = Harness::new();
    let user = user_with_profile("ADMIN");
    h.session.update_user(&user).unwrap();
    assert!(h.session.user().is_none());

    h.sign_in("ADMIN");
    let renamed = User {
        nama_lengkap: "Budi S.".to_owned(),
        ..user
    };
    h.session.update_user(&renamed).unwrap();
    assert_eq!(h.session.user().unwrap().nama_lengkap, "Budi S.");
}

// =============================================================
// Setup
// =============================================================

#[test]
fn initialize_system_requires_both_fields() {
    let h = Harness::new();
    let err = block_on(h.session.initialize_system("Admin", "  ")).unwrap_err();
    assert!(matches!(err, AuthError::Validation(ValidationError::Required(_))));
    assert_eq!(h.transport.request_count(), 0);
}

#[test]
fn initialize_system_returns_generated_credentials() {
    let h = Harness::new();
    h.transport.respond(
        Method::Post,
        "/api/auth/init-data",
        200,
        json!({"email": "admin@maju.co.id", "password": "Xy12ab"}),
    );
    let result = block_on(h.session.initialize_system(" Admin ", "PT Maju")).unwrap();
    assert_eq!(result.email, "admin@maju.co.id");
    let body = h.transport.requests()[0].body.clone().unwrap();
    assert!(body.contains("\"namaAdmin\":\"Admin\""));
}

#[test]
fn check_system_initialized_passes_through() {
    let h = Harness::new();
    h.transport
        .respond(Method::Get, "/api/auth/check-init", 200, json!({"initialized": false}));
    assert!(!block_on(h.session.check_system_initialized()).unwrap());
}
