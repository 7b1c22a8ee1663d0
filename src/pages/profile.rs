//! The signed-in user's own record, profile edit and password change.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use std::cell::RefCell;

use async_trait::async_trait;

use super::{Action, Followup, Lifecycle, PageError};
use crate::app::AppContext;
use crate::net::types::{ChangePassword, Pegawai, PegawaiForm};
use crate::router::RouteContext;
use crate::util::format::{escape_html, role_badge};
use crate::util::time::{format_date, format_iso_date, parse_date};
use crate::util::validate::{ValidationError, check_new_password, is_valid_email, require};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    EditProfile,
    ChangePassword,
}

#[derive(Debug, Default)]
struct ProfileState {
    record: Pegawai,
    panel: Option<Panel>,
}

pub struct ProfilePage {
    app: AppContext,
    state: RefCell<ProfileState>,
}

impl ProfilePage {
    pub fn new(app: &AppContext) -> Self {
        Self {
            app: app.clone(),
            state: RefCell::new(ProfileState::default()),
        }
    }

    pub fn record(&self) -> Pegawai {
        self.state.borrow().record.clone()
    }

    pub fn panel(&self) -> Option<Panel> {
        self.state.borrow().panel
    }

    /// The user's row from the employee list, else the session record.
    async fn load_record(&self, user: Pegawai) -> Pegawai {
        match self.app.api.list_pegawai().await {
            Ok(list) => list
                .into_iter()
                .find(|p| p.id_user == user.id_user)
                .unwrap_or(user),
            Err(e) => {
                log::debug!("employee list unavailable, using session record: {e}");
                user
            }
        }
    }

    async fn save_profile(&self, action: &Action) {
        let record = self.record();
        let form = match read_profile(action, &record) {
            Ok(form) => form,
            Err(e) => {
                self.app.notifier.error("Validasi Gagal", &e.to_string());
                return;
            }
        };
        if let Err(e) = self.app.api.update_pegawai(&record.id_user, &form).await {
            log::warn!("profile update failed: {e}");
            self.app
                .notifier
                .error("Gagal", &e.user_message("Gagal memperbarui profile"));
            return;
        }
        if let Some(mut user) = self.app.session.user() {
            form.nama_lengkap.clone_into(&mut user.nama_lengkap);
            form.email.clone_into(&mut user.email);
            if let Err(e) = self.app.session.update_user(&user) {
                log::warn!("could not persist updated user: {e}");
            }
        }
        let mut state = self.state.borrow_mut();
        state.record.nama_lengkap = form.nama_lengkap;
        state.record.email = form.email;
        state.record.tempat_lahir = Some(form.tempat_lahir);
        state.record.tanggal_lahir = Some(form.tanggal_lahir);
        state.panel = None;
        drop(state);
        self.app.notifier.success("Berhasil", "Profile berhasil diperbarui");
    }

    async fn change_password(&self, action: &Action) {
        let request = match read_password(action) {
            Ok(request) => request,
            Err(e) => {
                self.app.notifier.error("Validasi Gagal", &e.to_string());
                return;
            }
        };
        match self.app.api.change_password(&request).await {
            Ok(()) => {
                self.state.borrow_mut().panel = None;
                self.app.notifier.success("Berhasil", "Password berhasil diubah");
            }
            Err(e) => {
                log::warn!("password change failed: {e}");
                self.app
                    .notifier
                    .error("Gagal", &e.user_message("Gagal mengganti password"));
            }
        }
    }

    fn edit_markup(record: &Pegawai) -> String {
        format!(
            r#"<div class="card mb-4" id="edit-profile-card"><div class="card-header d-flex justify-content-between"><h5 class="mb-0">Edit Profile</h5><button type="button" class="btn-close" data-action="close-panel"></button></div><div class="card-body">
<form id="edit-profile-form" data-action="edit-profile" novalidate><div class="row">
<div class="col-md-6 mb-3"><label class="form-label" for="namaLengkap">Nama Lengkap *</label><input type="text" id="namaLengkap" name="namaLengkap" class="form-control" value="{nama}" required></div>
<div class="col-md-6 mb-3"><label class="form-label" for="email">Email *</label><input type="email" id="email" name="email" class="form-control" value="{email}" required></div>
<div class="col-md-6 mb-3"><label class="form-label" for="tempatLahir">Tempat Lahir</label><input type="text" id="tempatLahir" name="tempatLahir" class="form-control" value="{tempat}"></div>
<div class="col-md-6 mb-3"><label class="form-label" for="tanggalLahir">Tanggal Lahir</label><input type="date" id="tanggalLahir" name="tanggalLahir" class="form-control" value="{tanggal}"></div>
</div><p class="small text-muted">Untuk mengubah informasi pekerjaan, hubungi admin/HRD.</p><button type="submit" class="btn btn-primary">Simpan Perubahan</button></form></div></div>"#,
            nama = escape_html(&record.nama_lengkap),
            email = escape_html(&record.email),
            tempat = escape_html(record.tempat_lahir.as_deref().unwrap_or("")),
            tanggal = record.tanggal_lahir.map(format_iso_date).unwrap_or_default(),
        )
    }

    fn password_markup() -> &'static str {
        r#"<div class="card mb-4" id="change-password-card"><div class="card-header d-flex justify-content-between"><h5 class="mb-0">Ganti Password</h5><button type="button" class="btn-close" data-action="close-panel"></button></div><div class="card-body">
<form id="change-password-form" data-action="change-password" novalidate>
<div class="mb-3"><label class="form-label" for="passwordAsli">Password Lama *</label><input type="password" id="passwordAsli" name="passwordAsli" class="form-control" required></div>
<div class="mb-3"><label class="form-label" for="passwordBaru1">Password Baru *</label><input type="password" id="passwordBaru1" name="passwordBaru1" class="form-control" minlength="6" required></div>
<div class="mb-3"><label class="form-label" for="passwordBaru2">Konfirmasi Password Baru *</label><input type="password" id="passwordBaru2" name="passwordBaru2" class="form-control" minlength="6" required></div>
<button type="submit" class="btn btn-primary">Ganti Password</button></form></div></div>"#
    }
}

/// Merge the editable personal fields over `record`. Work-related codes
/// are carried over unchanged.
fn read_profile(action: &Action, record: &Pegawai) -> Result<PegawaiForm, ValidationError> {
    let nama_lengkap = require(action.field("namaLengkap"), "Nama lengkap")?.to_owned();
    let email = require(action.field("email"), "Email")?.to_owned();
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    let tempat_lahir = match action.field("tempatLahir").trim() {
        "" => record.tempat_lahir.clone().unwrap_or_default(),
        value => value.to_owned(),
    };
    let tanggal_lahir = match action.field("tanggalLahir").trim() {
        "" => record.tanggal_lahir.unwrap_or_default(),
        value => parse_date(value)?,
    };
    Ok(PegawaiForm {
        nama_lengkap,
        email,
        tempat_lahir,
        tanggal_lahir,
        kd_jenis_kelamin: record.kd_jenis_kelamin.unwrap_or_default(),
        kd_pendidikan: record.kd_pendidikan.unwrap_or_default(),
        kd_jabatan: record.kd_jabatan.unwrap_or_default(),
        kd_departemen: record.kd_departemen.unwrap_or_default(),
        kd_unit_kerja: record.kd_unit_kerja.unwrap_or_default(),
        password: None,
        password_confirmation: None,
        nik_user: record.nik_user.clone(),
    })
}

fn read_password(action: &Action) -> Result<ChangePassword, ValidationError> {
    let password_asli = action.field("passwordAsli");
    if password_asli.is_empty() {
        return Err(ValidationError::Required("Password lama"));
    }
    let password_baru1 = action.field("passwordBaru1");
    let password_baru2 = action.field("passwordBaru2");
    check_new_password(password_baru1, password_baru2)?;
    Ok(ChangePassword {
        password_asli: password_asli.to_owned(),
        password_baru1: password_baru1.to_owned(),
        password_baru2: password_baru2.to_owned(),
    })
}

#[async_trait(?Send)]
impl Lifecycle for ProfilePage {
    async fn init(&self, _context: &RouteContext) -> Result<(), PageError> {
        let user = self.app.session.user().ok_or(PageError::Unauthenticated)?;
        let record = self.load_record(user).await;
        self.state.borrow_mut().record = record;
        Ok(())
    }

    fn render(&self) -> String {
        let state = self.state.borrow();
        let r = &state.record;
        let panel = match state.panel {
            Some(Panel::EditProfile) => Self::edit_markup(r),
            Some(Panel::ChangePassword) => Self::password_markup().to_owned(),
            None => String::new(),
        };
        let row = |label: &str, value: &str| {
            format!(r#"<dt class="col-sm-4">{label}</dt><dd class="col-sm-8">{}</dd>"#, escape_html(value))
        };
        let details = [
            row("Email", &r.email),
            row("NIK", r.nik_user.as_deref().unwrap_or("-")),
            row("Tempat Lahir", r.tempat_lahir.as_deref().unwrap_or("-")),
            row("Tanggal Lahir", &format_date(r.tanggal_lahir)),
            row("Jabatan", r.nama_jabatan.as_deref().unwrap_or("-")),
            row("Departemen", r.nama_departemen.as_deref().unwrap_or("-")),
            row("Unit Kerja", r.nama_unit_kerja.as_deref().unwrap_or("-")),
        ]
        .concat();
        format!(
            r#"<div id="profile-page">
<div class="d-flex justify-content-between align-items-center mb-3"><h1 class="h3 mb-0">Profile</h1><div class="btn-group"><button class="btn btn-outline-primary" data-action="open-edit-profile">Edit Profile</button><button class="btn btn-outline-secondary" data-action="open-change-password">Ganti Password</button></div></div>
{panel}
<div class="card"><div class="card-body"><h4>{name} {badge}</h4><dl class="row mb-0">{details}</dl></div></div>
</div>"#,
            name = escape_html(&r.nama_lengkap),
            badge = role_badge(&r.profile),
        )
    }

    async fn handle(&self, action: &Action) -> Result<Followup, PageError> {
        match action.name.as_str() {
            "open-edit-profile" => self.state.borrow_mut().panel = Some(Panel::EditProfile),
            "open-change-password" => self.state.borrow_mut().panel = Some(Panel::ChangePassword),
            "close-panel" => self.state.borrow_mut().panel = None,
            "edit-profile" => self.save_profile(action).await,
            "change-password" => self.change_password(action).await,
            _ => {}
        }
        Ok(Followup::Stay)
    }
}
