use super::*;

// =============================================================
// Role
// =============================================================

#[test]
fn role_parses_wire_names() {
    assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
    assert_eq!("HRD".parse::<Role>(), Ok(Role::Hrd));
    assert_eq!("PEGAWAI".parse::<Role>(), Ok(Role::Pegawai));
}

#[test]
fn role_rejects_lowercase() {
    assert_eq!("admin".parse::<Role>(), Err(UnknownRole("admin".to_owned())));
}

#[test]
fn role_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"MANAGER\"");
}

#[test]
fn role_staff_manager_is_admin_or_hrd() {
    assert!(Role::Admin.is_staff_manager());
    assert!(Role::Hrd.is_staff_manager());
    assert!(!Role::Pegawai.is_staff_manager());
    assert!(!Role::Manager.is_staff_manager());
}

// =============================================================
// Pegawai
// =============================================================

#[test]
fn pegawai_decodes_login_info_shape() {
    let json = serde_json::json!({
        "profile": "HRD",
        "idUser": "u-7",
        "namaLengkap": "Sari Dewi",
        "email": "sari@hr.id",
        "password": "ignored",
        "kdDepartemen": 2,
        "namaDepartemen": "Keuangan",
        "tanggalLahir": 631152000
    });
    let user: Pegawai = serde_json::from_value(json).unwrap();
    assert_eq!(user.id_user, "u-7");
    assert_eq!(user.role(), Some(Role::Hrd));
    assert_eq!(user.kd_departemen, Some(2));
    assert_eq!(user.tanggal_lahir, Some(631_152_000));
    assert_eq!(user.photo, None);
}

#[test]
fn pegawai_unknown_profile_has_no_role() {
    let user = Pegawai {
        profile: "INTERN".to_owned(),
        ..Pegawai::default()
    };
    assert_eq!(user.role(), None);
}

#[test]
fn pegawai_serializes_camel_case_and_skips_empty() {
    let user = Pegawai {
        id_user: "u-1".to_owned(),
        nama_lengkap: "Budi".to_owned(),
        email: "budi@hr.id".to_owned(),
        profile: "PEGAWAI".to_owned(),
        ..Pegawai::default()
    };
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["idUser"], "u-1");
    assert_eq!(value["namaLengkap"], "Budi");
    assert!(value.get("photo").is_none());
}

// =============================================================
// Presensi
// =============================================================

fn presensi(jam_masuk: Option<&str>, status: Option<&str>) -> Presensi {
    Presensi {
        id_user: "u-1".to_owned(),
        jam_masuk: jam_masuk.map(str::to_owned),
        nama_status: status.map(str::to_owned),
        ..Presensi::default()
    }
}

#[test]
fn presensi_present_requires_check_in_without_status() {
    assert!(presensi(Some("08:00"), None).is_present());
    assert!(!presensi(Some("08:00"), Some("Sakit")).is_present());
    assert!(!presensi(None, None).is_present());
}

#[test]
fn presensi_absent_when_status_set() {
    assert!(presensi(None, Some("Izin")).is_absent());
    assert!(!presensi(None, Some("")).is_absent());
}

#[test]
fn presensi_late_from_nine() {
    assert!(presensi(Some("09:05"), None).is_late());
    assert!(!presensi(Some("08:55"), None).is_late());
}

// =============================================================
// Requests
// =============================================================

#[test]
fn pegawai_form_renames_confirmation_field() {
    let form = PegawaiForm {
        password: Some("rahasia".to_owned()),
        password_confirmation: Some("rahasia".to_owned()),
        ..PegawaiForm::default()
    };
    let value = serde_json::to_value(&form).unwrap();
    assert_eq!(value["passwordC"], "rahasia");
    assert!(value.get("nikUser").is_none());
}

#[test]
fn init_data_request_uses_camel_case() {
    let req = InitDataRequest {
        nama_admin: "Admin".to_owned(),
        perusahaan: "PT Maju".to_owned(),
    };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["namaAdmin"], "Admin");
}

#[test]
fn login_response_tolerates_missing_hasil() {
    let resp: LoginResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.hasil.is_none());
}
