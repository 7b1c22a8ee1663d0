use super::*;
use crate::net::api::Method;
use crate::state::notify::NotificationKind;
use crate::test_support::Harness;
use futures::executor::block_on;
use serde_json::json;

fn attendance() -> serde_json::Value {
    json!([
        {"idUser": "u-2", "namaLengkap": "Sari", "tglAbsensi": 1_700_000_000, "jamMasuk": "08:10", "jamKeluar": "17:00"},
        {"idUser": "u-3", "namaLengkap": "Andi", "tglAbsensi": 1_700_200_000, "jamMasuk": "09:15"},
        {"idUser": "u-4", "namaLengkap": "Dewi", "tglAbsensi": 1_700_100_000, "namaStatus": "Sakit"}
    ])
}

fn employees(count: usize) -> serde_json::Value {
    let list: Vec<_> = (0..count)
        .map(|i| json!({"idUser": format!("u-{i}"), "namaLengkap": "X", "email": "x@hr.id", "profile": "PEGAWAI"}))
        .collect();
    json!(list)
}

fn loaded(h: &Harness) -> DashboardPage {
    let page = DashboardPage::new(&h.app);
    block_on(page.init(&RouteContext::default())).unwrap();
    page
}

// ===== staff managers =====

#[test]
fn admin_sees_company_figures_for_today() {
    let h = Harness::new();
    h.sign_in("ADMIN");
    h.transport.respond(Method::Get, "/api/pegawai/daftar", 200, employees(3));
    h.transport.respond(Method::Get, "/presensi/daftar/admin", 200, attendance());

    let page = loaded(&h);

    assert_eq!(
        page.stats(),
        Stats::Admin(AdminStats {
            total_employees: 3,
            present_today: 2,
            absent_today: 1,
            late_today: 1,
            attendance_percentage: 67,
        })
    );
    assert!(h.transport.requests_to("/presensi/daftar/pegawai").is_empty());
}

#[test]
fn recent_attendance_is_newest_first() {
    let h = Harness::new();
    h.sign_in("HRD");
    h.transport.respond(Method::Get, "/presensi/daftar/admin", 200, attendance());

    let page = loaded(&h);
    let names: Vec<_> = page.recent().into_iter().map(|p| p.nama_lengkap).collect();
    assert_eq!(names, ["Andi", "Dewi", "Sari"]);
    assert!(page.render().contains("Andi"));
}

#[test]
fn failed_loads_degrade_to_empty_figures() {
    let h = Harness::new();
    h.sign_in("ADMIN");
    h.transport.respond(Method::Get, "/api/pegawai/daftar", 500, json!({}));
    h.transport.respond(Method::Get, "/presensi/daftar/admin", 500, json!({}));

    let page = loaded(&h);

    assert_eq!(page.stats(), Stats::Admin(AdminStats::default()));
    assert!(page.recent().is_empty());
    assert!(page.render().contains("Belum ada data presensi"));
}

// ===== employees =====

#[test]
fn employee_sees_own_thirty_day_figures() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    h.transport.respond(Method::Get, "/presensi/daftar/pegawai", 200, attendance());

    let page = loaded(&h);

    assert_eq!(
        page.stats(),
        Stats::Employee(EmployeeStats {
            present_days: 2,
            absent_days: 1,
            attendance_percentage: 7,
        })
    );
    assert!(h.transport.requests_to("/presensi/daftar/admin").is_empty());
    assert!(h.transport.requests_to("/api/pegawai/daftar").is_empty());
}

#[test]
fn missing_session_fails_init() {
    let h = Harness::new();
    let page = DashboardPage::new(&h.app);
    let result = block_on(page.init(&RouteContext::default()));
    assert!(matches!(result, Err(PageError::Unauthenticated)));
}

// ===== actions =====

#[test]
fn check_in_notifies_and_reloads() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    let page = loaded(&h);
    let loads = h.transport.requests_to("/presensi/daftar/pegawai").len();
    h.transport.respond(Method::Get, "/presensi/in", 200, json!({"jamMasuk": "08:01"}));

    let next = block_on(page.handle(&Action::new("check-in"))).unwrap();

    assert_eq!(next, Followup::Stay);
    let shown = h.app.notifier.current().unwrap();
    assert_eq!(shown.kind, NotificationKind::Success);
    assert_eq!(shown.message, "Jam masuk: 08:01");
    assert!(h.transport.requests_to("/presensi/daftar/pegawai").len() > loads);
}

#[test]
fn rejected_check_out_shows_server_message() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    let page = loaded(&h);
    let loads = h.transport.requests_to("/presensi/daftar/pegawai").len();
    h.transport.respond(
        Method::Get,
        "/presensi/out",
        400,
        json!({"message": "Belum presensi masuk"}),
    );

    block_on(page.handle(&Action::new("check-out"))).unwrap();

    let shown = h.app.notifier.current().unwrap();
    assert_eq!(shown.kind, NotificationKind::Error);
    assert_eq!(shown.title, "Presensi Gagal");
    assert_eq!(shown.message, "Belum presensi masuk");
    assert_eq!(h.transport.requests_to("/presensi/daftar/pegawai").len(), loads);
}
