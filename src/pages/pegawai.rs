//! Employee administration: list, detail and the add/edit form.
//!
//! SYSTEM CONTEXT
//! ==============
//! Served for `#/pegawai` and `#/pegawai/:id`, both restricted to staff
//! managers by the route table. `?action=add` opens the add form on load.
//! Search, sort and paging run over the list already fetched; only form
//! submissions go back to the server.

#[cfg(test)]
#[path = "pegawai_test.rs"]
mod pegawai_test;

use std::cell::RefCell;

use async_trait::async_trait;

use super::{Action, Followup, Lifecycle, PageError, combo_options, paginate, pagination_markup};
use crate::app::AppContext;
use crate::net::types::{Combo, ComboKind, Pegawai, PegawaiForm};
use crate::router::RouteContext;
use crate::util::format::{escape_html, role_badge};
use crate::util::time::{format_date, format_iso_date, parse_date};
use crate::util::validate::{ValidationError, check_new_password, is_valid_email, is_valid_nik, require};

/// Lookup lists offered by the employee form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Combos {
    pub jabatan: Vec<Combo>,
    pub departemen: Vec<Combo>,
    pub unit_kerja: Vec<Combo>,
    pub pendidikan: Vec<Combo>,
    pub jenis_kelamin: Vec<Combo>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Nama,
    Email,
    Jabatan,
    Departemen,
}

impl SortField {
    fn parse(value: &str) -> Self {
        match value {
            "email" => Self::Email,
            "namaJabatan" => Self::Jabatan,
            "namaDepartemen" => Self::Departemen,
            _ => Self::Nama,
        }
    }

    fn key(self, pegawai: &Pegawai) -> String {
        let value = match self {
            Self::Nama => pegawai.nama_lengkap.as_str(),
            Self::Email => pegawai.email.as_str(),
            Self::Jabatan => pegawai.nama_jabatan.as_deref().unwrap_or(""),
            Self::Departemen => pegawai.nama_departemen.as_deref().unwrap_or(""),
        };
        value.to_lowercase()
    }

    fn value(self) -> &'static str {
        match self {
            Self::Nama => "namaLengkap",
            Self::Email => "email",
            Self::Jabatan => "namaJabatan",
            Self::Departemen => "namaDepartemen",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(String),
}

#[derive(Debug, Default)]
struct PegawaiState {
    employees: Vec<Pegawai>,
    combos: Combos,
    search: String,
    sort: SortField,
    descending: bool,
    page: usize,
    /// `Some` on the detail route; the inner `None` means the id is unknown.
    detail: Option<Option<Pegawai>>,
    form: Option<FormMode>,
}

pub struct PegawaiPage {
    app: AppContext,
    state: RefCell<PegawaiState>,
}

impl PegawaiPage {
    pub fn new(app: &AppContext) -> Self {
        Self {
            app: app.clone(),
            state: RefCell::new(PegawaiState {
                page: 1,
                ..PegawaiState::default()
            }),
        }
    }

    /// Employees matching the search, in display order.
    pub fn visible(&self) -> Vec<Pegawai> {
        let state = self.state.borrow();
        filter_and_sort(&state.employees, &state.search, state.sort, state.descending)
    }

    pub fn current_page(&self) -> usize {
        self.state.borrow().page
    }

    pub fn form(&self) -> Option<FormMode> {
        self.state.borrow().form.clone()
    }

    pub fn detail(&self) -> Option<Pegawai> {
        self.state.borrow().detail.clone().flatten()
    }

    pub fn combos(&self) -> Combos {
        self.state.borrow().combos.clone()
    }

    async fn load_combo(&self, kind: ComboKind) -> Vec<Combo> {
        self.app.api.combo(kind).await.unwrap_or_else(|e| {
            log::warn!("combo {} unavailable: {e}", kind.path_segment());
            Vec::new()
        })
    }

    async fn load_combos(&self) -> Combos {
        let (jabatan, departemen, unit_kerja, pendidikan, jenis_kelamin) = futures::join!(
            self.load_combo(ComboKind::Jabatan),
            self.load_combo(ComboKind::Departemen),
            self.load_combo(ComboKind::UnitKerja),
            self.load_combo(ComboKind::Pendidikan),
            self.load_combo(ComboKind::JenisKelamin),
        );
        Combos {
            jabatan,
            departemen,
            unit_kerja,
            pendidikan,
            jenis_kelamin,
        }
    }

    async fn load_employees(&self) {
        match self.app.api.list_pegawai().await {
            Ok(list) => self.state.borrow_mut().employees = list,
            Err(e) => {
                log::error!("employee list failed: {e}");
                self.app
                    .notifier
                    .error("Gagal Memuat Data", "Tidak dapat memuat data pegawai");
            }
        }
    }

    fn find(&self, id: &str) -> Option<Pegawai> {
        self.state
            .borrow()
            .employees
            .iter()
            .find(|p| p.id_user == id)
            .cloned()
    }

    async fn submit(&self, action: &Action, mode: FormMode) -> Followup {
        let form = match read_form(action, &mode) {
            Ok(form) => form,
            Err(e) => {
                self.app.notifier.error("Validasi Gagal", &e.to_string());
                return Followup::Stay;
            }
        };
        let (result, done, fallback) = match &mode {
            FormMode::Add => (
                self.app.api.add_pegawai(&form).await,
                "Pegawai berhasil ditambahkan",
                "Gagal menambahkan pegawai",
            ),
            FormMode::Edit(id) => (
                self.app.api.update_pegawai(id, &form).await,
                "Data pegawai berhasil diperbarui",
                "Gagal memperbarui data pegawai",
            ),
        };
        match result {
            Ok(()) => {
                self.app.notifier.success("Berhasil", done);
                self.state.borrow_mut().form = None;
                self.load_employees().await;
                if let FormMode::Edit(id) = mode {
                    let refreshed = self.find(&id);
                    let mut state = self.state.borrow_mut();
                    if state.detail.is_some() {
                        state.detail = Some(refreshed);
                    }
                }
            }
            Err(e) => {
                log::warn!("employee save failed: {e}");
                self.app.notifier.error("Gagal", &e.user_message(fallback));
            }
        }
        Followup::Stay
    }

    fn list_markup(&self, state: &PegawaiState) -> String {
        let visible = filter_and_sort(&state.employees, &state.search, state.sort, state.descending);
        let (rows, pages) = paginate(&visible, state.page, self.app.config.page_size);
        let offset = (state.page.clamp(1, pages) - 1) * self.app.config.page_size;
        let body: String = if rows.is_empty() {
            let message = if state.search.is_empty() {
                "Belum ada data pegawai"
            } else {
                "Tidak ada pegawai yang cocok dengan pencarian"
            };
            format!(r#"<tr><td colspan="7" class="text-center text-muted">{message}</td></tr>"#)
        } else {
            rows.iter()
                .enumerate()
                .map(|(i, p)| {
                    let id = escape_html(&p.id_user);
                    format!(
                        r##"<tr><td>{no}</td><td>{name}</td><td>{email}</td><td>{jabatan}</td><td>{departemen}</td><td>{badge}</td><td><div class="btn-group btn-group-sm"><a class="btn btn-outline-primary" href="#/pegawai/{id}">Lihat</a><button class="btn btn-outline-warning" data-action="open-edit" data-target="{id}">Edit</button></div></td></tr>"##,
                        no = offset + i + 1,
                        name = escape_html(&p.nama_lengkap),
                        email = escape_html(&p.email),
                        jabatan = escape_html(p.nama_jabatan.as_deref().unwrap_or("-")),
                        departemen = escape_html(p.nama_departemen.as_deref().unwrap_or("-")),
                        badge = role_badge(&p.profile),
                    )
                })
                .collect()
        };
        let sort_option = |field: SortField, label: &str| {
            let selected = if state.sort == field { " selected" } else { "" };
            format!(r#"<option value="{}"{selected}>{label}</option>"#, field.value())
        };
        format!(
            r#"<div class="d-flex justify-content-between align-items-center mb-3"><h1 class="h3 mb-0">Data Pegawai</h1><button class="btn btn-primary" data-action="open-add">Tambah Pegawai</button></div>
<form class="row g-2 mb-3" data-action="search"><div class="col-md-6"><input type="search" name="q" class="form-control" placeholder="Cari nama, email, NIK..." value="{search}"></div><div class="col-md-2"><button type="submit" class="btn btn-outline-secondary w-100">Cari</button></div></form>
<form class="row g-2 mb-3" data-action="sort"><div class="col-md-4"><select name="field" class="form-select">{sort_fields}</select></div><div class="col-md-3"><select name="direction" class="form-select"><option value="asc"{asc}>A-Z</option><option value="desc"{desc}>Z-A</option></select></div><div class="col-md-2"><button type="submit" class="btn btn-outline-secondary w-100">Urutkan</button></div></form>
<div class="small text-muted mb-2">Total {total} pegawai</div>
<table class="table table-hover"><thead><tr><th>No</th><th>Nama</th><th>Email</th><th>Jabatan</th><th>Departemen</th><th>Role</th><th>Aksi</th></tr></thead><tbody>{body}</tbody></table>
{pagination}"#,
            search = escape_html(&state.search),
            sort_fields = [
                sort_option(SortField::Nama, "Nama"),
                sort_option(SortField::Email, "Email"),
                sort_option(SortField::Jabatan, "Jabatan"),
                sort_option(SortField::Departemen, "Departemen"),
            ]
            .concat(),
            asc = if state.descending { "" } else { " selected" },
            desc = if state.descending { " selected" } else { "" },
            total = visible.len(),
            pagination = pagination_markup(state.page.clamp(1, pages), pages),
        )
    }

    fn detail_markup(pegawai: Option<&Pegawai>) -> String {
        let Some(p) = pegawai else {
            return r##"<div class="alert alert-warning">Pegawai tidak ditemukan. <a href="#/pegawai">Kembali ke daftar</a></div>"##.to_owned();
        };
        let field = |label: &str, value: &str| {
            format!(r#"<dt class="col-sm-4">{label}</dt><dd class="col-sm-8">{}</dd>"#, escape_html(value))
        };
        let fields = [
            field("Nama Lengkap", &p.nama_lengkap),
            field("Email", &p.email),
            field("NIK", p.nik_user.as_deref().unwrap_or("-")),
            field("Tempat Lahir", p.tempat_lahir.as_deref().unwrap_or("-")),
            field("Tanggal Lahir", &format_date(p.tanggal_lahir)),
            field("Jenis Kelamin", p.nama_jenis_kelamin.as_deref().unwrap_or("-")),
            field("Pendidikan", p.nama_pendidikan.as_deref().unwrap_or("-")),
            field("Jabatan", p.nama_jabatan.as_deref().unwrap_or("-")),
            field("Departemen", p.nama_departemen.as_deref().unwrap_or("-")),
            field("Unit Kerja", p.nama_unit_kerja.as_deref().unwrap_or("-")),
        ]
        .concat();
        format!(
            r##"<div class="d-flex justify-content-between align-items-center mb-3"><h1 class="h3 mb-0">Detail Pegawai</h1><div><a class="btn btn-outline-secondary" href="#/pegawai">Kembali</a> <button class="btn btn-warning" data-action="open-edit" data-target="{id}">Edit</button></div></div>
<div class="card"><div class="card-body"><h4>{name} {badge}</h4><dl class="row mb-0">{fields}</dl></div></div>"##,
            id = escape_html(&p.id_user),
            name = escape_html(&p.nama_lengkap),
            badge = role_badge(&p.profile),
        )
    }

    fn form_markup(state: &PegawaiState, mode: &FormMode) -> String {
        let existing = match mode {
            FormMode::Add => None,
            FormMode::Edit(id) => state.employees.iter().find(|p| &p.id_user == id),
        };
        let text = |f: fn(&Pegawai) -> Option<&str>| {
            existing.and_then(f).map(escape_html).unwrap_or_default()
        };
        let (title, action, target, password_hint) = match mode {
            FormMode::Add => ("Tambah Pegawai", "add", String::new(), " *"),
            FormMode::Edit(id) => (
                "Edit Pegawai",
                "edit",
                format!(r#" data-target="{}""#, escape_html(id)),
                " (kosongkan jika tidak diubah)",
            ),
        };
        let select = |name: &str, label: &str, options: &[Combo], selected: Option<i64>| {
            format!(
                r#"<div class="col-md-6 mb-3"><label class="form-label" for="{name}">{label} *</label><select id="{name}" name="{name}" class="form-select" required>{}</select></div>"#,
                combo_options(options, selected, &format!("Pilih {label}"))
            )
        };
        let combos = &state.combos;
        format!(
            r#"<div class="card mb-4" id="employee-form-card"><div class="card-header d-flex justify-content-between"><h5 class="mb-0">{title}</h5><button type="button" class="btn-close" data-action="close-form"></button></div><div class="card-body">
<form id="employee-form" data-action="{action}"{target} novalidate><div class="row">
<div class="col-md-6 mb-3"><label class="form-label" for="namaLengkap">Nama Lengkap *</label><input type="text" id="namaLengkap" name="namaLengkap" class="form-control" value="{nama}" required></div>
<div class="col-md-6 mb-3"><label class="form-label" for="email">Email *</label><input type="email" id="email" name="email" class="form-control" value="{email}" required></div>
<div class="col-md-6 mb-3"><label class="form-label" for="nikUser">NIK</label><input type="text" id="nikUser" name="nikUser" class="form-control" maxlength="16" value="{nik}"></div>
<div class="col-md-6 mb-3"><label class="form-label" for="tempatLahir">Tempat Lahir *</label><input type="text" id="tempatLahir" name="tempatLahir" class="form-control" value="{tempat}" required></div>
<div class="col-md-6 mb-3"><label class="form-label" for="tanggalLahir">Tanggal Lahir *</label><input type="date" id="tanggalLahir" name="tanggalLahir" class="form-control" value="{tanggal}" required></div>
{jenis_kelamin}{pendidikan}{jabatan}{departemen}{unit_kerja}
<div class="col-md-6 mb-3"><label class="form-label" for="password">Password{password_hint}</label><input type="password" id="password" name="password" class="form-control"></div>
<div class="col-md-6 mb-3"><label class="form-label" for="passwordC">Konfirmasi Password{password_hint}</label><input type="password" id="passwordC" name="passwordC" class="form-control"></div>
</div><div class="d-flex justify-content-end gap-2"><button type="button" class="btn btn-secondary" data-action="close-form">Batal</button><button type="submit" class="btn btn-primary">Simpan</button></div></form></div></div>"#,
            nama = text(|p| Some(p.nama_lengkap.as_str())),
            email = text(|p| Some(p.email.as_str())),
            nik = text(|p| p.nik_user.as_deref()),
            tempat = text(|p| p.tempat_lahir.as_deref()),
            tanggal = existing
                .and_then(|p| p.tanggal_lahir)
                .map(format_iso_date)
                .unwrap_or_default(),
            jenis_kelamin = select(
                "kdJenisKelamin",
                "Jenis Kelamin",
                &combos.jenis_kelamin,
                existing.and_then(|p| p.kd_jenis_kelamin)
            ),
            pendidikan = select(
                "kdPendidikan",
                "Pendidikan",
                &combos.pendidikan,
                existing.and_then(|p| p.kd_pendidikan)
            ),
            jabatan = select("kdJabatan", "Jabatan", &combos.jabatan, existing.and_then(|p| p.kd_jabatan)),
            departemen = select(
                "kdDepartemen",
                "Departemen",
                &combos.departemen,
                existing.and_then(|p| p.kd_departemen)
            ),
            unit_kerja = select(
                "kdUnitKerja",
                "Unit Kerja",
                &combos.unit_kerja,
                existing.and_then(|p| p.kd_unit_kerja)
            ),
        )
    }
}

/// Case-insensitive search over name, email, NIK, position and department,
/// then a stable sort on `field`.
fn filter_and_sort(employees: &[Pegawai], search: &str, field: SortField, descending: bool) -> Vec<Pegawai> {
    let needle = search.trim().to_lowercase();
    let mut matches: Vec<Pegawai> = employees
        .iter()
        .filter(|p| {
            needle.is_empty()
                || [
                    Some(p.nama_lengkap.as_str()),
                    Some(p.email.as_str()),
                    p.nik_user.as_deref(),
                    p.nama_jabatan.as_deref(),
                    p.nama_departemen.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|v| v.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    matches.sort_by(|a, b| {
        let order = field.key(a).cmp(&field.key(b));
        if descending { order.reverse() } else { order }
    });
    matches
}

fn code(action: &Action, name: &str, label: &'static str) -> Result<i64, ValidationError> {
    require(action.field(name), label)?
        .parse()
        .map_err(|_| ValidationError::Required(label))
}

/// Validate the employee form fields into a request body.
fn read_form(action: &Action, mode: &FormMode) -> Result<PegawaiForm, ValidationError> {
    let nama_lengkap = require(action.field("namaLengkap"), "Nama lengkap")?.to_owned();
    let email = require(action.field("email"), "Email")?.to_owned();
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    let nik = action.field("nikUser").trim();
    if !is_valid_nik(nik) {
        return Err(ValidationError::InvalidNik);
    }
    let tempat_lahir = require(action.field("tempatLahir"), "Tempat lahir")?.to_owned();
    let tanggal_lahir = parse_date(require(action.field("tanggalLahir"), "Tanggal lahir")?)?;

    let password = action.field("password");
    let confirmation = action.field("passwordC");
    let password = match mode {
        FormMode::Add => {
            require(password, "Password")?;
            check_new_password(password, confirmation)?;
            Some(password.to_owned())
        }
        FormMode::Edit(_) if password.is_empty() && confirmation.is_empty() => None,
        FormMode::Edit(_) => {
            check_new_password(password, confirmation)?;
            Some(password.to_owned())
        }
    };

    Ok(PegawaiForm {
        nama_lengkap,
        email,
        tempat_lahir,
        tanggal_lahir,
        kd_jenis_kelamin: code(action, "kdJenisKelamin", "Jenis kelamin")?,
        kd_pendidikan: code(action, "kdPendidikan", "Pendidikan")?,
        kd_jabatan: code(action, "kdJabatan", "Jabatan")?,
        kd_departemen: code(action, "kdDepartemen", "Departemen")?,
        kd_unit_kerja: code(action, "kdUnitKerja", "Unit kerja")?,
        password_confirmation: password.clone(),
        password,
        nik_user: (!nik.is_empty()).then(|| nik.to_owned()),
    })
}

#[async_trait(?Send)]
impl Lifecycle for PegawaiPage {
    async fn init(&self, context: &RouteContext) -> Result<(), PageError> {
        let combos = self.load_combos().await;
        self.state.borrow_mut().combos = combos;
        self.load_employees().await;
        let detail = context.param("id").map(|id| self.find(id));
        let mut state = self.state.borrow_mut();
        state.detail = detail;
        if context.query_value("action") == Some("add") {
            state.form = Some(FormMode::Add);
        }
        Ok(())
    }

    fn render(&self) -> String {
        let state = self.state.borrow();
        let form = state
            .form
            .as_ref()
            .map(|mode| Self::form_markup(&state, mode))
            .unwrap_or_default();
        let body = match &state.detail {
            Some(detail) => Self::detail_markup(detail.as_ref()),
            None => self.list_markup(&state),
        };
        format!(r#"<div id="pegawai-page">{form}{body}</div>"#)
    }

    async fn handle(&self, action: &Action) -> Result<Followup, PageError> {
        match action.name.as_str() {
            "search" => {
                let mut state = self.state.borrow_mut();
                action.field("q").trim().clone_into(&mut state.search);
                state.page = 1;
            }
            "sort" => {
                let mut state = self.state.borrow_mut();
                state.sort = SortField::parse(action.field("field"));
                state.descending = action.field("direction") == "desc";
            }
            "page" => {
                if let Ok(page) = action.target().parse::<usize>() {
                    self.state.borrow_mut().page = page.max(1);
                }
            }
            "open-add" => self.state.borrow_mut().form = Some(FormMode::Add),
            "open-edit" => {
                let id = action.target();
                if self.find(id).is_some() {
                    self.state.borrow_mut().form = Some(FormMode::Edit(id.to_owned()));
                }
            }
            "close-form" => self.state.borrow_mut().form = None,
            "add" => return Ok(self.submit(action, FormMode::Add).await),
            "edit" => {
                let id = action.target().to_owned();
                return Ok(self.submit(action, FormMode::Edit(id)).await);
            }
            _ => {}
        }
        Ok(Followup::Stay)
    }
}
