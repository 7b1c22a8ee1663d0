use super::*;
use crate::test_support::{Harness, BASE_URL};
use futures::executor::block_on;
use serde_json::json;

// =============================================================
// Response policy
// =============================================================

fn raw(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        body: body.to_owned(),
    }
}

#[test]
fn interpret_passes_success_body_through() {
    assert_eq!(interpret(&raw(200, r#"{"a":1}"#)).unwrap(), json!({"a": 1}));
}

#[test]
fn interpret_treats_unparseable_success_body_as_empty_object() {
    assert_eq!(interpret(&raw(200, "<html>")).unwrap(), json!({}));
    assert_eq!(interpret(&raw(204, "")).unwrap(), json!({}));
}

#[test]
fn interpret_uses_server_message_on_error() {
    let err = interpret(&raw(401, r#"{"message":"Token kadaluarsa"}"#)).unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 401,
            message: "Token kadaluarsa".to_owned()
        }
    );
    assert_eq!(err.to_string(), "Token kadaluarsa");
}

#[test]
fn interpret_falls_back_to_generic_message() {
    let err = interpret(&raw(500, "oops")).unwrap_err();
    assert_eq!(err.to_string(), "API Error");
    assert_eq!(err.status(), Some(500));
}

#[test]
fn user_message_prefers_server_text() {
    let server = ApiError::Status {
        status: 400,
        message: "Email sudah dipakai".to_owned(),
    };
    assert_eq!(server.user_message("Gagal"), "Email sudah dipakai");
    let generic = ApiError::Status {
        status: 500,
        message: "API Error".to_owned(),
    };
    assert_eq!(generic.user_message("Gagal"), "Gagal");
    assert_eq!(ApiError::Timeout.user_message("Gagal"), "Gagal");
}

// =============================================================
// Requests
// =============================================================

#[test]
fn login_posts_json_without_bearer() {
    let h = Harness::new();
    h.sign_in("ADMIN");
    h.transport.respond(
        Method::Post,
        "/api/auth/login",
        200,
        json!({"hasil": {"token": "t"}}),
    );
    let req = LoginRequest {
        email: "a@b.co".to_owned(),
        password: "x".to_owned(),
        profile: "ADMIN".to_owned(),
    };
    let resp = block_on(h.api.login(&req)).unwrap();
    assert_eq!(resp.hasil.unwrap().token.as_deref(), Some("t"));

    let sent = &h.transport.requests()[0];
    assert_eq!(sent.url, format!("{BASE_URL}/api/auth/login"));
    assert!(sent.bearer.is_none());
    let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["profile"], "ADMIN");
}

#[test]
fn authenticated_calls_carry_stored_token() {
    let h = Harness::new();
    h.sign_in("HRD");
    h.transport.respond(Method::Get, "/api/pegawai/daftar", 200, json!([]));
    let list = block_on(h.api.list_pegawai()).unwrap();
    assert!(list.is_empty());
    assert_eq!(h.transport.requests()[0].bearer.as_deref(), Some("test-token"));
}

#[test]
fn check_init_reads_flag_and_defaults_false() {
    let h = Harness::new();
    h.transport
        .respond(Method::Get, "/api/auth/check-init", 200, json!({"initialized": true}));
    assert!(block_on(h.api.check_init()).unwrap());
    h.transport.respond(Method::Get, "/api/auth/check-init", 200, json!({}));
    assert!(!block_on(h.api.check_init()).unwrap());
}

#[test]
fn attendance_range_is_sent_as_query() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    h.transport.respond(Method::Get, "/presensi/daftar/pegawai", 200, json!([]));
    block_on(h.api.attendance_employee(100, 200)).unwrap();
    assert_eq!(
        h.transport.requests()[0].url,
        format!("{BASE_URL}/presensi/daftar/pegawai?tglAwal=100&tglAkhir=200")
    );
}

#[test]
fn change_password_encodes_query_values() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    h.transport
        .respond(Method::Post, "/api/auth/ubah-password-sendiri", 200, json!({}));
    let req = ChangePassword {
        password_asli: "lama 1".to_owned(),
        password_baru1: "baru&2".to_owned(),
        password_baru2: "baru&2".to_owned(),
    };
    block_on(h.api.change_password(&req)).unwrap();
    let url = &h.transport.requests()[0].url;
    assert!(url.ends_with("?passwordAsli=lama%201&passwordBaru1=baru%262&passwordBaru2=baru%262"));
}

#[test]
fn combo_path_uses_kind_segment() {
    let h = Harness::new();
    h.sign_in("ADMIN");
    h.transport.respond(
        Method::Get,
        "/api/pegawai/combo/unit-kerja",
        200,
        json!([{"kode": 1, "nama": "Pusat"}]),
    );
    let combos = block_on(h.api.combo(ComboKind::UnitKerja)).unwrap();
    assert_eq!(combos[0].nama, "Pusat");
}

#[test]
fn wrong_shape_is_a_decode_error() {
    let h = Harness::new();
    h.sign_in("ADMIN");
    h.transport
        .respond(Method::Get, "/api/pegawai/daftar", 200, json!({"not": "a list"}));
    assert!(matches!(block_on(h.api.list_pegawai()), Err(ApiError::Decode(_))));
}

#[test]
fn transport_failure_propagates() {
    let h = Harness::new();
    h.transport.fail(Method::Get, "/presensi/in", ApiError::Timeout);
    assert_eq!(block_on(h.api.check_in()), Err(ApiError::Timeout));
}
