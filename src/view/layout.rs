//! Application chrome around authenticated pages: header and sidebar.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::net::types::{Role, User};
use crate::util::format::{escape_html, role_badge};

pub const LOGOUT_ROUTE: &str = "#/logout";

#[derive(Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub route: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Empty allows every role.
    pub roles: &'static [Role],
}

const STAFF: &[Role] = &[Role::Admin, Role::Hrd];

pub const MENU: [MenuItem; 5] = [
    MenuItem {
        route: "#/dashboard",
        label: "Dashboard",
        icon: "bi-speedometer2",
        roles: &[],
    },
    MenuItem {
        route: "#/pegawai",
        label: "Data Pegawai",
        icon: "bi-people",
        roles: STAFF,
    },
    MenuItem {
        route: "#/presensi",
        label: "Presensi",
        icon: "bi-calendar-check",
        roles: &[],
    },
    MenuItem {
        route: "#/laporan",
        label: "Laporan",
        icon: "bi-file-earmark-bar-graph",
        roles: STAFF,
    },
    MenuItem {
        route: "#/profile",
        label: "Profile",
        icon: "bi-person-circle",
        roles: &[],
    },
];

/// Menu entries visible to `role`.
pub fn menu_for(role: Option<Role>) -> Vec<&'static MenuItem> {
    MENU.iter()
        .filter(|item| item.roles.is_empty() || role.is_some_and(|r| item.roles.contains(&r)))
        .collect()
}

/// `true` when `pattern` is `route` or one of its sub-routes.
fn is_active(route: &str, pattern: &str) -> bool {
    pattern == route
        || pattern
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
}

fn sidebar(role: Option<Role>, pattern: &str) -> String {
    let items: String = menu_for(role)
        .into_iter()
        .map(|item| {
            let active = if is_active(item.route, pattern) { " active" } else { "" };
            format!(
                r#"<li class="nav-item"><a class="nav-link{active}" href="{}"><i class="bi {}"></i> {}</a></li>"#,
                item.route, item.icon, item.label
            )
        })
        .collect();
    format!(r#"<nav id="sidebar" class="sidebar"><ul class="nav flex-column">{items}</ul></nav>"#)
}

fn header(user: &User, app_name: &str) -> String {
    format!(
        r#"<header class="navbar navbar-dark bg-primary px-3"><span class="navbar-brand">{app}</span><div class="d-flex align-items-center gap-2 text-white"><span id="user-name">{name}</span>{badge}<a class="btn btn-sm btn-outline-light" href="{LOGOUT_ROUTE}">Logout</a></div></header>"#,
        app = escape_html(app_name),
        name = escape_html(&user.nama_lengkap),
        badge = role_badge(&user.profile),
    )
}

/// Wrap page markup in the layout. Without a user (the login page) the
/// content is returned bare.
pub fn wrap(user: Option<&User>, pattern: &str, app_name: &str, content: &str) -> String {
    let Some(user) = user else {
        return format!(r#"<main id="page-container">{content}</main>"#);
    };
    format!(
        r#"{header}<div class="d-flex">{sidebar}<main id="page-container" class="flex-grow-1 p-4">{content}</main></div>"#,
        header = header(user, app_name),
        sidebar = sidebar(user.role(), pattern),
    )
}
