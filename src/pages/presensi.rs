//! Attendance history with check-in, check-out and absence requests.
//!
//! DESIGN
//! ======
//! The page fetches one date range at a time (the last 30 days unless the
//! route carries `?tglAwal=&tglAkhir=` as `YYYY-MM-DD`) and filters the
//! rows locally by range and status. Staff managers see every employee;
//! other roles see their own rows.

#[cfg(test)]
#[path = "presensi_test.rs"]
mod presensi_test;

use std::cell::RefCell;

use async_trait::async_trait;

use super::{
    Action, Followup, Lifecycle, PageError, check_in, check_out, combo_options, paginate, pagination_markup,
};
use crate::app::AppContext;
use crate::net::api::ApiError;
use crate::net::types::{AbsenceRequest, Combo, Presensi};
use crate::router::RouteContext;
use crate::util::format::escape_html;
use crate::util::time::{DAY_SECS, format_date, format_iso_date, now_epoch, parse_date, start_of_day, work_duration};
use crate::util::validate::{ValidationError, require};

/// Default history window, in days.
pub const HISTORY_DAYS: i64 = 30;

/// Inclusive range of epoch seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

impl DateRange {
    /// The last [`HISTORY_DAYS`] days up to `now`.
    pub fn recent(now: i64) -> Self {
        Self {
            from: start_of_day(now) - HISTORY_DAYS * DAY_SECS,
            to: now,
        }
    }

    /// Range from two `YYYY-MM-DD` values; the end day is included whole.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidDate`] for an unparseable value and
    /// [`ValidationError::InvalidRange`] when the start is after the end.
    pub fn parse(from: &str, to: &str) -> Result<Self, ValidationError> {
        let from = parse_date(from)?;
        let to = parse_date(to)? + DAY_SECS - 1;
        if from > to {
            return Err(ValidationError::InvalidRange);
        }
        Ok(Self { from, to })
    }

    pub fn contains(self, epoch: Option<i64>) -> bool {
        epoch.is_some_and(|e| (self.from..=self.to).contains(&e))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Present,
    Absent,
    /// A specific absence status by name.
    Named(String),
}

impl StatusFilter {
    /// Form value: `all`, `hadir`, `tidak_hadir` or a status name.
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "all" => Self::All,
            "hadir" => Self::Present,
            "tidak_hadir" => Self::Absent,
            other => Self::Named(other.to_owned()),
        }
    }

    pub fn matches(&self, record: &Presensi) -> bool {
        match self {
            Self::All => true,
            Self::Present => record.is_present(),
            Self::Absent => record.is_absent(),
            Self::Named(name) => record.nama_status.as_deref() == Some(name.as_str()),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Present => "hadir",
            Self::Absent => "tidak_hadir",
            Self::Named(name) => name,
        }
    }
}

#[derive(Debug)]
struct PresensiState {
    records: Vec<Presensi>,
    statuses: Vec<Combo>,
    range: DateRange,
    status: StatusFilter,
    page: usize,
    absence_form: bool,
}

pub struct PresensiPage {
    app: AppContext,
    state: RefCell<PresensiState>,
}

impl PresensiPage {
    pub fn new(app: &AppContext) -> Self {
        Self {
            app: app.clone(),
            state: RefCell::new(PresensiState {
                records: Vec::new(),
                statuses: Vec::new(),
                range: DateRange::recent(now_epoch()),
                status: StatusFilter::All,
                page: 1,
                absence_form: false,
            }),
        }
    }

    pub fn range(&self) -> DateRange {
        self.state.borrow().range
    }

    pub fn current_page(&self) -> usize {
        self.state.borrow().page
    }

    pub fn shows_absence_form(&self) -> bool {
        self.state.borrow().absence_form
    }

    /// Rows passing the range and status filters, newest first.
    pub fn visible(&self) -> Vec<Presensi> {
        let state = self.state.borrow();
        state
            .records
            .iter()
            .filter(|r| state.range.contains(r.tgl_absensi) && state.status.matches(r))
            .cloned()
            .collect()
    }

    async fn fetch(&self, range: DateRange) -> Result<Vec<Presensi>, ApiError> {
        let staff = self.app.session.role().is_some_and(|r| r.is_staff_manager());
        if staff {
            self.app.api.attendance_admin(range.from, range.to).await
        } else {
            self.app.api.attendance_employee(range.from, range.to).await
        }
    }

    async fn reload(&self) {
        let range = self.range();
        match self.fetch(range).await {
            Ok(mut records) => {
                records.sort_by(|a, b| b.tgl_absensi.cmp(&a.tgl_absensi));
                self.state.borrow_mut().records = records;
            }
            Err(e) => {
                log::error!("attendance history failed: {e}");
                self.app
                    .notifier
                    .error("Gagal Memuat Data", "Tidak dapat memuat data presensi");
            }
        }
    }

    async fn load_statuses(&self) {
        let range = self.range();
        match self.app.api.status_combo(range.from, range.to).await {
            Ok(statuses) => self.state.borrow_mut().statuses = statuses,
            Err(e) => log::warn!("absence statuses unavailable: {e}"),
        }
    }

    async fn apply_filter(&self, action: &Action) {
        match DateRange::parse(action.field("tglAwal"), action.field("tglAkhir")) {
            Ok(range) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.range = range;
                    state.status = StatusFilter::parse(action.field("status"));
                    state.page = 1;
                }
                self.reload().await;
            }
            Err(e) => {
                self.app.notifier.error("Validasi Gagal", &e.to_string());
            }
        }
    }

    async fn reset_filter(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.range = DateRange::recent(now_epoch());
            state.status = StatusFilter::All;
            state.page = 1;
        }
        self.reload().await;
    }

    async fn submit_absence(&self, action: &Action) {
        let request = match read_absence(action) {
            Ok(request) => request,
            Err(e) => {
                self.app.notifier.error("Validasi Gagal", &e.to_string());
                return;
            }
        };
        match self.app.api.submit_absence(request).await {
            Ok(()) => {
                self.app
                    .notifier
                    .success("Berhasil", "Pengajuan absen berhasil dikirim");
                self.state.borrow_mut().absence_form = false;
                self.reload().await;
            }
            Err(e) => {
                log::warn!("absence request failed: {e}");
                self.app
                    .notifier
                    .error("Gagal", &e.user_message("Gagal mengajukan absen"));
            }
        }
    }

    fn rows_markup(rows: &[Presensi], offset: usize) -> String {
        if rows.is_empty() {
            return r#"<tr><td colspan="7" class="text-center text-muted">Tidak ada data presensi</td></tr>"#.to_owned();
        }
        rows.iter()
            .enumerate()
            .map(|(i, r)| {
                let masuk = r.jam_masuk.as_deref().unwrap_or("");
                let keluar = r.jam_keluar.as_deref().unwrap_or("");
                let duration = work_duration(masuk, keluar).unwrap_or_else(|| "-".to_owned());
                let status = if r.is_absent() {
                    format!(
                        r#"<span class="badge bg-danger">{}</span>"#,
                        escape_html(r.nama_status.as_deref().unwrap_or(""))
                    )
                } else if r.is_late() {
                    r#"<span class="badge bg-warning">Terlambat</span>"#.to_owned()
                } else if r.is_present() {
                    r#"<span class="badge bg-success">Hadir</span>"#.to_owned()
                } else {
                    "-".to_owned()
                };
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{status}</td></tr>",
                    offset + i + 1,
                    format_date(r.tgl_absensi),
                    escape_html(&r.nama_lengkap),
                    escape_html(if masuk.is_empty() { "-" } else { masuk }),
                    escape_html(if keluar.is_empty() { "-" } else { keluar }),
                    duration,
                )
            })
            .collect()
    }

    fn absence_markup(statuses: &[Combo]) -> String {
        format!(
            r#"<div class="card mb-4" id="absence-card"><div class="card-header d-flex justify-content-between"><h5 class="mb-0">Ajukan Absen</h5><button type="button" class="btn-close" data-action="close-absence"></button></div><div class="card-body">
<form id="absence-form" data-action="absence" novalidate><div class="row">
<div class="col-md-6 mb-3"><label class="form-label" for="tglAbsensi">Tanggal *</label><input type="date" id="tglAbsensi" name="tglAbsensi" class="form-control" required></div>
<div class="col-md-6 mb-3"><label class="form-label" for="kdStatus">Status *</label><select id="kdStatus" name="kdStatus" class="form-select" required>{options}</select></div>
</div><div class="d-flex justify-content-end gap-2"><button type="button" class="btn btn-secondary" data-action="close-absence">Batal</button><button type="submit" class="btn btn-primary">Ajukan</button></div></form></div></div>"#,
            options = combo_options(statuses, None, "Pilih Status"),
        )
    }
}

/// Validate the absence form into a request.
fn read_absence(action: &Action) -> Result<AbsenceRequest, ValidationError> {
    let tgl_absensi = parse_date(require(action.field("tglAbsensi"), "Tanggal")?)?;
    let kd_status = require(action.field("kdStatus"), "Status")?
        .parse()
        .map_err(|_| ValidationError::Required("Status"))?;
    Ok(AbsenceRequest { tgl_absensi, kd_status })
}

#[async_trait(?Send)]
impl Lifecycle for PresensiPage {
    async fn init(&self, context: &RouteContext) -> Result<(), PageError> {
        if let (Some(from), Some(to)) = (context.query_value("tglAwal"), context.query_value("tglAkhir")) {
            match DateRange::parse(from, to) {
                Ok(range) => self.state.borrow_mut().range = range,
                Err(e) => log::warn!("ignoring date filter {from}..{to}: {e}"),
            }
        }
        if let Some(status) = context.query_value("status") {
            self.state.borrow_mut().status = StatusFilter::parse(status);
        }
        self.load_statuses().await;
        self.reload().await;
        Ok(())
    }

    fn render(&self) -> String {
        let visible = self.visible();
        let state = self.state.borrow();
        let page_size = self.app.config.page_size;
        let (rows, pages) = paginate(&visible, state.page, page_size);
        let page = state.page.clamp(1, pages);
        let status_option = |value: &str, label: &str| {
            let selected = if state.status.value() == value { " selected" } else { "" };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                escape_html(value),
                escape_html(label)
            )
        };
        let mut status_options = [
            status_option("all", "Semua Status"),
            status_option("hadir", "Hadir"),
            status_option("tidak_hadir", "Tidak Hadir"),
        ]
        .concat();
        for status in &state.statuses {
            status_options.push_str(&status_option(&status.nama, &status.nama));
        }
        let absence = if state.absence_form {
            Self::absence_markup(&state.statuses)
        } else {
            String::new()
        };
        format!(
            r#"<div id="presensi-page">
<div class="d-flex justify-content-between align-items-center mb-3"><h1 class="h3 mb-0">Presensi</h1><div class="btn-group"><button class="btn btn-success" data-action="check-in">Presensi Masuk</button><button class="btn btn-outline-danger" data-action="check-out">Presensi Keluar</button><button class="btn btn-outline-primary" data-action="open-absence">Ajukan Absen</button></div></div>
{absence}
<form class="row g-2 mb-3" id="filter-form" data-action="filter">
<div class="col-md-3"><input type="date" name="tglAwal" class="form-control" value="{from}"></div>
<div class="col-md-3"><input type="date" name="tglAkhir" class="form-control" value="{to}"></div>
<div class="col-md-3"><select name="status" class="form-select">{status_options}</select></div>
<div class="col-md-3 d-flex gap-2"><button type="submit" class="btn btn-primary">Filter</button><button type="button" class="btn btn-outline-secondary" data-action="reset-filter">Reset</button></div>
</form>
<table class="table table-hover"><thead><tr><th>No</th><th>Tanggal</th><th>Nama</th><th>Masuk</th><th>Keluar</th><th>Durasi</th><th>Status</th></tr></thead><tbody>{rows}</tbody></table>
{pagination}
</div>"#,
            from = format_iso_date(state.range.from),
            to = format_iso_date(state.range.to),
            rows = Self::rows_markup(rows, (page - 1) * page_size),
            pagination = pagination_markup(page, pages),
        )
    }

    async fn handle(&self, action: &Action) -> Result<Followup, PageError> {
        match action.name.as_str() {
            "check-in" => {
                if check_in(&self.app).await {
                    self.reload().await;
                }
            }
            "check-out" => {
                if check_out(&self.app).await {
                    self.reload().await;
                }
            }
            "filter" => self.apply_filter(action).await,
            "reset-filter" => self.reset_filter().await,
            "page" => {
                if let Ok(page) = action.target().parse::<usize>() {
                    self.state.borrow_mut().page = page.max(1);
                }
            }
            "open-absence" => self.state.borrow_mut().absence_form = true,
            "close-absence" => self.state.borrow_mut().absence_form = false,
            "absence" => self.submit_absence(action).await,
            _ => {}
        }
        Ok(Followup::Stay)
    }
}
