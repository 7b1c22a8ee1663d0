//! Login page with the one-time system setup form.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public route. On init it asks the backend whether an administrator
//! exists; if not, the setup form replaces the login form until setup
//! succeeds. A successful login hands `#/dashboard` back to the shell.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use super::{Action, Followup, Lifecycle, PageError, alert_markup};
use crate::app::AppContext;
use crate::net::types::Role;
use crate::router::RouteContext;
use crate::router::navigator::DASHBOARD_ROUTE;
use crate::state::session::{Credentials, Session};
use crate::util::format::escape_html;

const INVALID_INPUT: &str = "Harap isi data dengan benar.";
const LOGIN_FAILED: &str = "Email atau password salah.";
const SETUP_INCOMPLETE: &str = "Semua field harus diisi.";
const SETUP_FAILED: &str = "Gagal inisialisasi sistem";

#[derive(Clone, Debug, PartialEq, Eq)]
struct Alert {
    kind: &'static str,
    message: String,
}

#[derive(Debug, Default)]
struct LoginState {
    /// `false` shows the setup form.
    initialized: bool,
    email: String,
    profile: String,
    alert: Option<Alert>,
}

pub struct LoginPage {
    session: Rc<Session>,
    app_name: String,
    state: RefCell<LoginState>,
}

impl LoginPage {
    pub fn new(app: &AppContext) -> Self {
        Self {
            session: app.session.clone(),
            app_name: app.config.app_name.clone(),
            state: RefCell::new(LoginState {
                initialized: true,
                ..LoginState::default()
            }),
        }
    }

    pub fn shows_setup(&self) -> bool {
        !self.state.borrow().initialized
    }

    /// Current inline alert message, if any.
    pub fn alert(&self) -> Option<String> {
        self.state.borrow().alert.as_ref().map(|a| a.message.clone())
    }

    fn set_alert(&self, kind: &'static str, message: &str) {
        self.state.borrow_mut().alert = Some(Alert {
            kind,
            message: message.to_owned(),
        });
    }

    async fn submit_login(&self, action: &Action) -> Followup {
        let credentials = Credentials {
            email: action.field("email").trim().to_owned(),
            password: action.field("password").to_owned(),
            profile: action.field("profile").to_owned(),
        };
        {
            let mut state = self.state.borrow_mut();
            credentials.email.clone_into(&mut state.email);
            credentials.profile.clone_into(&mut state.profile);
        }
        if credentials.validate().is_err() {
            self.set_alert("warning", INVALID_INPUT);
            return Followup::Stay;
        }
        match self.session.login(&credentials).await {
            Ok(_) => {
                self.set_alert("success", "Login berhasil! Mengalihkan...");
                Followup::Navigate(DASHBOARD_ROUTE.to_owned())
            }
            Err(e) => {
                log::debug!("login rejected: {e}");
                self.set_alert("danger", LOGIN_FAILED);
                Followup::Stay
            }
        }
    }

    async fn submit_setup(&self, action: &Action) -> Followup {
        let nama_admin = action.field("namaAdmin").trim();
        let perusahaan = action.field("perusahaan").trim();
        if nama_admin.is_empty() || perusahaan.is_empty() {
            self.set_alert("warning", SETUP_INCOMPLETE);
            return Followup::Stay;
        }
        match self.session.initialize_system(nama_admin, perusahaan).await {
            Ok(result) => {
                let mut state = self.state.borrow_mut();
                state.initialized = true;
                state.email.clone_from(&result.email);
                state.alert = Some(Alert {
                    kind: "success",
                    message: format!(
                        "Inisialisasi berhasil! Email admin: {} Password: {}",
                        result.email, result.password
                    ),
                });
            }
            Err(e) => {
                log::warn!("system setup failed: {e}");
                self.set_alert("danger", SETUP_FAILED);
            }
        }
        Followup::Stay
    }

    fn setup_form() -> &'static str {
        r#"<div id="init-section"><h4 class="fw-bold text-center mb-3">System Initialization</h4>
<form id="init-form" data-action="init-system" novalidate>
<div class="mb-3"><label class="form-label" for="namaAdmin">Nama Admin *</label><input type="text" id="namaAdmin" name="namaAdmin" class="form-control" required></div>
<div class="mb-3"><label class="form-label" for="perusahaan">Nama Perusahaan *</label><input type="text" id="perusahaan" name="perusahaan" class="form-control" required></div>
<button type="submit" class="btn btn-primary w-100">Mulai Inisialisasi</button>
</form></div>"#
    }

    fn login_form(state: &LoginState) -> String {
        let options: String = Role::ALL
            .iter()
            .map(|role| {
                let selected = if state.profile == role.as_str() { " selected" } else { "" };
                let label = match role {
                    Role::Admin => "Admin",
                    Role::Hrd => "HRD",
                    Role::Pegawai => "Pegawai",
                    Role::Manager => "Manager",
                };
                format!(r#"<option value="{}"{selected}>{label}</option>"#, role.as_str())
            })
            .collect();
        format!(
            r#"<div id="login-section"><h4 class="fw-bold text-center mb-3">Login</h4>
<form id="login-form" data-action="login" novalidate>
<div class="mb-3"><label class="form-label" for="email">Email *</label><input type="email" id="email" name="email" class="form-control" value="{email}" required></div>
<div class="mb-3"><label class="form-label" for="password">Password *</label><input type="password" id="password" name="password" class="form-control" required></div>
<div class="mb-3"><label class="form-label" for="profile">Role *</label><select id="profile" name="profile" class="form-select" required><option value="">Pilih Role</option>{options}</select></div>
<button type="submit" class="btn btn-success w-100">Login</button>
</form></div>"#,
            email = escape_html(&state.email),
        )
    }
}

#[async_trait(?Send)]
impl Lifecycle for LoginPage {
    async fn init(&self, _context: &RouteContext) -> Result<(), PageError> {
        let initialized = match self.session.check_system_initialized().await {
            Ok(flag) => flag,
            Err(e) => {
                log::warn!("initialization check failed, showing login form: {e}");
                true
            }
        };
        self.state.borrow_mut().initialized = initialized;
        Ok(())
    }

    fn render(&self) -> String {
        let state = self.state.borrow();
        let body = if state.initialized {
            Self::login_form(&state)
        } else {
            Self::setup_form().to_owned()
        };
        let alert = state
            .alert
            .as_ref()
            .map(|a| alert_markup(a.kind, &a.message))
            .unwrap_or_default();
        format!(
            r#"<div id="login-page" class="container"><div class="row justify-content-center align-items-center min-vh-100"><div class="col-md-8 col-lg-6 col-xl-5"><div class="card shadow-lg border-0">
<div class="card-header text-center pt-4 pb-2"><h2 class="fw-bold mb-1">{app}</h2><p class="text-muted">Employee &amp; Attendance Management</p></div>
<div class="card-body px-4">{body}<div id="login-alert" class="mt-3">{alert}</div></div>
</div></div></div></div>"#,
            app = escape_html(&self.app_name),
        )
    }

    async fn handle(&self, action: &Action) -> Result<Followup, PageError> {
        Ok(match action.name.as_str() {
            "login" => self.submit_login(action).await,
            "init-system" => self.submit_setup(action).await,
            _ => Followup::Stay,
        })
    }
}
