use super::*;
use crate::net::api::Method;
use crate::router::location::MemoryLocation;
use crate::test_support::Harness;
use futures::executor::block_on;
use serde_json::json;

fn app_at(h: &Harness, fragment: &str) -> (App, Rc<MemoryLocation>) {
    h.transport
        .respond(Method::Get, "/api/auth/check-init", 200, json!({"initialized": true}));
    let location = Rc::new(MemoryLocation::new(fragment));
    let app = App::new(h.app.clone(), location.clone(), h.screen.clone());
    (app, location)
}

fn active_kind(app: &App) -> Option<PageKind> {
    app.navigator().host().active().map(|page| page.kind())
}

fn mounted(h: &Harness) -> String {
    h.screen.page().unwrap_or_default()
}

// ===== route table =====

#[test]
fn routes_cover_every_page() {
    let routes = register_routes();
    assert_eq!(routes.len(), 7);

    let login = routes.get("#/login").unwrap();
    assert!(!login.auth_required);
    assert_eq!(login.title, "Login");

    let detail = routes.get("#/pegawai/:id").unwrap();
    assert_eq!(detail.handler, PageKind::Pegawai);
    assert_eq!(detail.roles, [Role::Admin, Role::Hrd]);
    assert_eq!(detail.title, "Detail Pegawai");

    let presensi = routes.get("#/presensi").unwrap();
    assert!(presensi.auth_required);
    assert!(presensi.roles.is_empty());
    assert_eq!(routes.get("#/laporan").unwrap().roles, [Role::Admin, Role::Hrd]);
}

#[test]
fn logout_paths_are_recognized() {
    assert!(is_logout("#/logout"));
    assert!(is_logout("#logout"));
    assert!(is_logout("#/logout?next=1"));
    assert!(!is_logout("#/login"));
    assert!(!is_logout(""));
}

// ===== startup =====

#[test]
fn signed_out_start_lands_on_bare_login() {
    let h = Harness::new();
    let (app, location) = app_at(&h, "#/dashboard");
    let navigation = block_on(app.start());
    assert_eq!(navigation.pattern(), Some("#/login"));
    assert_eq!(location.history(), ["#/dashboard", "#/login"]);
    assert_eq!(active_kind(&app), Some(PageKind::Login));
    assert_eq!(h.screen.title(), "Login - HR System");

    let html = mounted(&h);
    assert!(html.contains(r#"id="login-form""#));
    assert!(!html.contains("sidebar"));
}

#[test]
fn employee_is_kept_out_of_staff_pages() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    let (app, location) = app_at(&h, "#/pegawai");
    let navigation = block_on(app.start());
    assert_eq!(navigation.pattern(), Some("#/dashboard"));
    assert_eq!(location.history(), ["#/pegawai", "#/dashboard"]);

    let html = mounted(&h);
    assert!(html.contains("Selamat datang, Budi Santoso"));
    assert!(html.contains(r#"id="sidebar""#));
    assert!(!html.contains("Data Pegawai"));
}

#[test]
fn staff_sees_full_menu_with_active_entry() {
    let h = Harness::new();
    h.sign_in("HRD");
    let (app, _) = app_at(&h, "#/laporan");
    block_on(app.start());
    assert_eq!(active_kind(&app), Some(PageKind::Laporan));

    let html = mounted(&h);
    assert!(html.contains("Data Pegawai"));
    assert!(html.contains(r##"<a class="nav-link active" href="#/laporan">"##));
}

// ===== logout =====

#[test]
fn logout_location_clears_session_and_replaces_entry() {
    let h = Harness::new();
    h.sign_in("ADMIN");
    let (app, location) = app_at(&h, "#/dashboard");
    block_on(app.start());

    location.push("#/logout");
    let navigation = block_on(app.on_location_change());
    assert_eq!(navigation.pattern(), Some("#/login"));
    assert!(!h.session.is_authenticated());
    assert_eq!(location.history(), ["#/dashboard", "#/login"]);
    assert_eq!(active_kind(&app), Some(PageKind::Login));
}

#[test]
fn navigating_to_logout_signs_out() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    let (app, _) = app_at(&h, "#/presensi");
    block_on(app.start());

    let navigation = block_on(app.navigate("#/logout"));
    assert_eq!(navigation.pattern(), Some("#/login"));
    assert!(h.store.token().is_none());
}

// ===== dispatch =====

#[test]
fn login_action_follows_up_with_dashboard() {
    let h = Harness::new();
    let (app, location) = app_at(&h, "#/login");
    block_on(app.start());
    h.transport.respond(
        Method::Post,
        "/api/auth/login",
        200,
        json!({"hasil": {"token": "t", "info": {"idUser": "u", "namaLengkap": "Budi", "email": "budi@hr.id", "profile": "ADMIN"}}}),
    );

    let action = Action::new("login")
        .with_field("email", "budi@hr.id")
        .with_field("password", "rahasia")
        .with_field("profile", "ADMIN");
    let navigation = block_on(app.dispatch(&action)).unwrap();
    assert_eq!(navigation.pattern(), Some("#/dashboard"));
    assert_eq!(location.fragment(), "#/dashboard");
    assert_eq!(active_kind(&app), Some(PageKind::Dashboard));
}

#[test]
fn staying_action_rerenders_active_page() {
    let h = Harness::new();
    h.sign_in("PEGAWAI");
    let (app, _) = app_at(&h, "#/presensi");
    block_on(app.start());
    let mounts = h.screen.mount_count();

    let navigation = block_on(app.dispatch(&Action::new("open-absence")));
    assert!(navigation.is_none());
    assert_eq!(h.screen.mount_count(), mounts + 1);
    assert!(mounted(&h).contains(r#"id="absence-form""#));
}

#[test]
fn dispatch_without_page_does_nothing() {
    let h = Harness::new();
    let (app, _) = app_at(&h, "#/login");
    assert!(block_on(app.dispatch(&Action::new("open-absence"))).is_none());
    assert_eq!(h.screen.mount_count(), 0);
}

#[test]
fn dismiss_notification_by_id() {
    let h = Harness::new();
    let (app, _) = app_at(&h, "#/login");
    let id = h.app.notifier.info("Info", "pesan");
    assert!(h.screen.visible_notification().is_some());

    let action = Action::new("dismiss-notification").with_target(&id.to_string());
    assert!(block_on(app.dispatch(&action)).is_none());
    assert!(h.app.notifier.current().is_none());

    let bad = Action::new("dismiss-notification").with_target("not-a-uuid");
    assert!(block_on(app.dispatch(&bad)).is_none());
}

// ===== host =====

#[test]
fn replacing_a_page_destroys_the_previous_one() {
    let h = Harness::new();
    h.sign_in("ADMIN");
    let (app, _) = app_at(&h, "#/dashboard");
    block_on(app.start());
    let first = app.navigator().host().active().unwrap();

    block_on(app.navigate("#/profile"));
    let second = app.navigator().host().active().unwrap();
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(second.kind(), PageKind::Profile);
    assert!(!app.navigator().host().is_active(&first));
}
