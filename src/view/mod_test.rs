use super::*;

#[test]
fn document_title_appends_app_name() {
    assert_eq!(document_title("Dashboard", "HR System"), "Dashboard - HR System");
}

#[test]
fn memory_screen_records_calls() {
    let screen = MemoryScreen::new("HR System");
    screen.set_title("Login");
    screen.mount("<p>a</p>");
    screen.mount("<p>b</p>");
    screen.scroll_to_top();
    screen.show_error("boom");

    assert_eq!(screen.title(), "Login - HR System");
    assert_eq!(screen.mount_count(), 2);
    assert_eq!(screen.page().as_deref(), Some("<p>b</p>"));
    assert_eq!(screen.scroll_count(), 1);
    assert_eq!(screen.errors(), ["boom"]);
}

#[test]
fn memory_screen_clears_visible_error() {
    let screen = MemoryScreen::new("HR System");
    screen.show_error("boom");
    assert_eq!(screen.visible_error().as_deref(), Some("boom"));
    screen.clear_error();
    assert_eq!(screen.visible_error(), None);
    assert_eq!(screen.errors(), ["boom"]);
}
