//! Attendance reports for staff managers.
//!
//! DESIGN
//! ======
//! One fetch of company attendance per date range feeds every report
//! type. The attendance report lists rows filtered by department and
//! status, grouped by employee name with the newest day first. The
//! employee report rates every employee's presence against the days in
//! the range. The summary report counts present, absent and late days per
//! employee and derives an overall attendance average over the distinct
//! days on record.

#[cfg(test)]
#[path = "laporan_test.rs"]
mod laporan_test;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;

use super::presensi::{DateRange, StatusFilter};
use super::{Action, Followup, Lifecycle, PageError, combo_options};
use crate::app::AppContext;
use crate::net::types::{Combo, Pegawai, Presensi};
use crate::router::RouteContext;
use crate::util::format::{escape_html, percent};
use crate::util::time::{DAY_SECS, format_date, format_iso_date, now_epoch};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportType {
    #[default]
    Attendance,
    Employee,
    Summary,
}

impl ReportType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "attendance" => Some(Self::Attendance),
            "employee" => Some(Self::Employee),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filters {
    pub range: DateRange,
    /// Department code; `None` for every department.
    pub departemen: Option<i64>,
    pub status: StatusFilter,
}

impl Filters {
    fn initial() -> Self {
        Self {
            range: DateRange::recent(now_epoch()),
            departemen: None,
            status: StatusFilter::All,
        }
    }
}

/// Totals shown above the attendance report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttendanceTotals {
    pub records: usize,
    pub employees: usize,
    pub present: usize,
    pub absent: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeSummary {
    pub id_user: String,
    pub nama_lengkap: String,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

/// Attendance grade of one employee.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grade {
    /// 80% and up.
    Good,
    /// 60% and up.
    Fair,
    Poor,
}

impl Grade {
    pub fn of(rate: u32) -> Self {
        match rate {
            80.. => Self::Good,
            60.. => Self::Fair,
            _ => Self::Poor,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Good => "Baik",
            Self::Fair => "Cukup",
            Self::Poor => "Kurang",
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            Self::Good => "bg-success",
            Self::Fair => "bg-warning",
            Self::Poor => "bg-danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeRate {
    pub id_user: String,
    pub nama_lengkap: String,
    pub departemen: Option<String>,
    pub jabatan: Option<String>,
    pub present: usize,
    pub absent: usize,
    pub total_days: usize,
    /// Present days over the days in the range, rounded.
    pub rate: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeReport {
    pub employees: Vec<EmployeeRate>,
    pub average: u32,
    pub best: u32,
    pub worst: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub employees: Vec<EmployeeSummary>,
    pub total_employees: usize,
    pub days_on_record: usize,
    /// Present days over (employees with data × days on record), rounded.
    pub average_attendance: u32,
}

#[derive(Debug)]
struct LaporanState {
    report: ReportType,
    filters: Filters,
    employees: Vec<Pegawai>,
    records: Vec<Presensi>,
}

impl LaporanState {
    fn in_department(&self) -> Option<HashSet<&str>> {
        let code = self.filters.departemen?;
        Some(
            self.employees
                .iter()
                .filter(|p| p.kd_departemen == Some(code))
                .map(|p| p.id_user.as_str())
                .collect(),
        )
    }

    fn scoped(&self) -> impl Iterator<Item = &Presensi> {
        let members = self.in_department();
        let range = self.filters.range;
        self.records.iter().filter(move |r| {
            range.contains(r.tgl_absensi)
                && members.as_ref().is_none_or(|m| m.contains(r.id_user.as_str()))
        })
    }

    fn attendance_rows(&self) -> Vec<Presensi> {
        let mut rows: Vec<Presensi> = self
            .scoped()
            .filter(|r| self.filters.status.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.nama_lengkap
                .to_lowercase()
                .cmp(&b.nama_lengkap.to_lowercase())
                .then_with(|| b.tgl_absensi.cmp(&a.tgl_absensi))
        });
        rows
    }

    fn summary(&self) -> Summary {
        let mut per_employee: BTreeMap<&str, EmployeeSummary> = BTreeMap::new();
        let mut days = BTreeSet::new();
        for record in self.scoped() {
            if let Some(day) = record.tgl_absensi {
                days.insert(day);
            }
            let entry = per_employee
                .entry(record.id_user.as_str())
                .or_insert_with(|| EmployeeSummary {
                    id_user: record.id_user.clone(),
                    nama_lengkap: record.nama_lengkap.clone(),
                    present: 0,
                    absent: 0,
                    late: 0,
                });
            if record.is_present() {
                entry.present += 1;
                if record.is_late() {
                    entry.late += 1;
                }
            } else if record.is_absent() {
                entry.absent += 1;
            }
        }
        let mut employees: Vec<EmployeeSummary> = per_employee.into_values().collect();
        employees.sort_by(|a, b| a.nama_lengkap.to_lowercase().cmp(&b.nama_lengkap.to_lowercase()));
        let present: usize = employees.iter().map(|e| e.present).sum();
        Summary {
            average_attendance: percent(present, employees.len() * days.len()),
            total_employees: self.employees.len(),
            days_on_record: days.len(),
            employees,
        }
    }

    /// Every employee in the department filter, including those without
    /// records.
    fn employee_report(&self) -> EmployeeReport {
        let range = self.filters.range;
        let span = (range.to - range.from + DAY_SECS - 1).div_euclid(DAY_SECS);
        let total_days = usize::try_from(span).unwrap_or(0);
        let records: Vec<&Presensi> = self.scoped().collect();
        let mut employees: Vec<EmployeeRate> = self
            .employees
            .iter()
            .filter(|p| self.filters.departemen.is_none_or(|code| p.kd_departemen == Some(code)))
            .map(|p| {
                let own = records.iter().filter(|r| r.id_user == p.id_user);
                let present = own.clone().filter(|r| r.is_present()).count();
                let absent = own.filter(|r| r.is_absent()).count();
                EmployeeRate {
                    id_user: p.id_user.clone(),
                    nama_lengkap: p.nama_lengkap.clone(),
                    departemen: p.nama_departemen.clone(),
                    jabatan: p.nama_jabatan.clone(),
                    present,
                    absent,
                    total_days,
                    rate: percent(present, total_days),
                }
            })
            .collect();
        employees.sort_by(|a, b| a.nama_lengkap.to_lowercase().cmp(&b.nama_lengkap.to_lowercase()));

        let rates: Vec<u32> = employees.iter().map(|e| e.rate).collect();
        let sum: u32 = rates.iter().sum();
        EmployeeReport {
            average: u32::try_from(rates.len())
                .ok()
                .filter(|n| *n > 0)
                .map_or(0, |n| (sum + n / 2) / n),
            best: rates.iter().copied().max().unwrap_or(0),
            worst: rates.iter().copied().min().unwrap_or(0),
            employees,
        }
    }

    fn departments(&self) -> Vec<Combo> {
        let unique: BTreeMap<i64, &str> = self
            .employees
            .iter()
            .filter_map(|p| Some((p.kd_departemen?, p.nama_departemen.as_deref()?)))
            .collect();
        let mut list: Vec<Combo> = unique
            .into_iter()
            .map(|(kode, nama)| Combo {
                kode,
                nama: nama.to_owned(),
            })
            .collect();
        list.sort_by(|a, b| a.nama.cmp(&b.nama));
        list
    }
}

fn totals(rows: &[Presensi]) -> AttendanceTotals {
    AttendanceTotals {
        records: rows.len(),
        employees: rows.iter().map(|r| r.id_user.as_str()).collect::<HashSet<_>>().len(),
        present: rows.iter().filter(|r| r.is_present()).count(),
        absent: rows.iter().filter(|r| r.is_absent()).count(),
    }
}

pub struct LaporanPage {
    app: AppContext,
    state: RefCell<LaporanState>,
}

impl LaporanPage {
    pub fn new(app: &AppContext) -> Self {
        Self {
            app: app.clone(),
            state: RefCell::new(LaporanState {
                report: ReportType::Attendance,
                filters: Filters::initial(),
                employees: Vec::new(),
                records: Vec::new(),
            }),
        }
    }

    pub fn report(&self) -> ReportType {
        self.state.borrow().report
    }

    pub fn filters(&self) -> Filters {
        self.state.borrow().filters.clone()
    }

    pub fn attendance_rows(&self) -> Vec<Presensi> {
        self.state.borrow().attendance_rows()
    }

    pub fn attendance_totals(&self) -> AttendanceTotals {
        totals(&self.attendance_rows())
    }

    pub fn summary(&self) -> Summary {
        self.state.borrow().summary()
    }

    pub fn employee_report(&self) -> EmployeeReport {
        self.state.borrow().employee_report()
    }

    async fn load_records(&self) {
        let range = self.state.borrow().filters.range;
        match self.app.api.attendance_admin(range.from, range.to).await {
            Ok(records) => self.state.borrow_mut().records = records,
            Err(e) => {
                log::error!("report data failed: {e}");
                self.state.borrow_mut().records.clear();
                self.app.notifier.error("Gagal", "Tidak dapat membuat laporan");
            }
        }
    }

    async fn apply_filter(&self, action: &Action) {
        let range = match DateRange::parse(action.field("tglAwal"), action.field("tglAkhir")) {
            Ok(range) => range,
            Err(e) => {
                self.app.notifier.error("Validasi Gagal", &e.to_string());
                return;
            }
        };
        let refetch = {
            let mut state = self.state.borrow_mut();
            let refetch = state.filters.range != range;
            state.filters = Filters {
                range,
                departemen: action.field("departemen").parse().ok(),
                status: StatusFilter::parse(action.field("status")),
            };
            refetch
        };
        if refetch {
            self.load_records().await;
        }
    }

    fn attendance_markup(state: &LaporanState) -> String {
        let rows = state.attendance_rows();
        let t = totals(&rows);
        let body: String = if rows.is_empty() {
            r#"<tr><td colspan="5" class="text-center text-muted">Tidak ada data untuk filter ini</td></tr>"#.to_owned()
        } else {
            rows.iter()
                .map(|r| {
                    let status = if r.is_absent() {
                        escape_html(r.nama_status.as_deref().unwrap_or(""))
                    } else if r.is_late() {
                        "Terlambat".to_owned()
                    } else if r.is_present() {
                        "Hadir".to_owned()
                    } else {
                        "-".to_owned()
                    };
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{status}</td></tr>",
                        escape_html(&r.nama_lengkap),
                        format_date(r.tgl_absensi),
                        escape_html(r.jam_masuk.as_deref().unwrap_or("-")),
                        escape_html(r.jam_keluar.as_deref().unwrap_or("-")),
                    )
                })
                .collect()
        };
        format!(
            r#"<div class="row mb-3" id="report-totals"><div class="col">Total Data: <strong>{}</strong></div><div class="col">Pegawai: <strong>{}</strong></div><div class="col">Hadir: <strong>{}</strong></div><div class="col">Tidak Hadir: <strong>{}</strong></div></div>
<table class="table table-striped"><thead><tr><th>Nama</th><th>Tanggal</th><th>Masuk</th><th>Keluar</th><th>Status</th></tr></thead><tbody>{body}</tbody></table>"#,
            t.records, t.employees, t.present, t.absent
        )
    }

    fn employee_markup(state: &LaporanState) -> String {
        let report = state.employee_report();
        let body: String = if report.employees.is_empty() {
            r#"<tr><td colspan="8" class="text-center text-muted">Tidak ada data untuk filter ini</td></tr>"#.to_owned()
        } else {
            report
                .employees
                .iter()
                .map(|e| {
                    let grade = Grade::of(e.rate);
                    format!(
                        r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td><span class="badge {}">{}</span></td></tr>"#,
                        escape_html(&e.nama_lengkap),
                        escape_html(e.departemen.as_deref().unwrap_or("-")),
                        escape_html(e.jabatan.as_deref().unwrap_or("-")),
                        e.present,
                        e.absent,
                        e.total_days,
                        e.rate,
                        grade.css_class(),
                        grade.label(),
                    )
                })
                .collect()
        };
        format!(
            r#"<div class="row mb-3" id="report-totals"><div class="col">Total Pegawai: <strong>{}</strong></div><div class="col">Rata-rata Kehadiran: <strong>{}%</strong></div><div class="col">Kehadiran Tertinggi: <strong>{}%</strong></div><div class="col">Kehadiran Terendah: <strong>{}%</strong></div></div>
<table class="table table-striped"><thead><tr><th>Nama</th><th>Departemen</th><th>Jabatan</th><th>Hari Hadir</th><th>Hari Tidak Hadir</th><th>Total Hari</th><th>Persentase Hadir</th><th>Status</th></tr></thead><tbody>{body}</tbody></table>"#,
            report.employees.len(),
            report.average,
            report.best,
            report.worst
        )
    }

    fn summary_markup(state: &LaporanState) -> String {
        let summary = state.summary();
        let body: String = if summary.employees.is_empty() {
            r#"<tr><td colspan="4" class="text-center text-muted">Tidak ada data untuk filter ini</td></tr>"#.to_owned()
        } else {
            summary
                .employees
                .iter()
                .map(|e| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        escape_html(&e.nama_lengkap),
                        e.present,
                        e.absent,
                        e.late
                    )
                })
                .collect()
        };
        format!(
            r#"<div class="row mb-3" id="report-totals"><div class="col">Total Pegawai: <strong>{}</strong></div><div class="col">Hari Tercatat: <strong>{}</strong></div><div class="col">Rata-rata Kehadiran: <strong>{}%</strong></div></div>
<table class="table table-striped"><thead><tr><th>Nama</th><th>Hadir</th><th>Tidak Hadir</th><th>Terlambat</th></tr></thead><tbody>{body}</tbody></table>"#,
            summary.total_employees, summary.days_on_record, summary.average_attendance
        )
    }
}

#[async_trait(?Send)]
impl Lifecycle for LaporanPage {
    async fn init(&self, _context: &RouteContext) -> Result<(), PageError> {
        match self.app.api.list_pegawai().await {
            Ok(employees) => self.state.borrow_mut().employees = employees,
            Err(e) => {
                log::error!("report employee list failed: {e}");
                self.app
                    .notifier
                    .error("Gagal Memuat Data", "Tidak dapat memuat data laporan");
            }
        }
        self.load_records().await;
        Ok(())
    }

    fn render(&self) -> String {
        let state = self.state.borrow();
        let tab = |kind: ReportType, value: &str, label: &str| {
            let class = if state.report == kind { "btn-primary" } else { "btn-outline-primary" };
            format!(r#"<button class="btn {class}" data-action="report-type" data-target="{value}">{label}</button>"#)
        };
        let status_disabled = if state.report == ReportType::Attendance { "" } else { " disabled" };
        let status_option = |value: &str, label: &str| {
            let selected = if state.filters.status.value() == value { " selected" } else { "" };
            format!(r#"<option value="{value}"{selected}>{label}</option>"#)
        };
        let report = match state.report {
            ReportType::Attendance => Self::attendance_markup(&state),
            ReportType::Employee => Self::employee_markup(&state),
            ReportType::Summary => Self::summary_markup(&state),
        };
        format!(
            r#"<div id="laporan-page">
<div class="d-flex justify-content-between align-items-center mb-3"><h1 class="h3 mb-0">Laporan</h1><div class="btn-group">{attendance_tab}{employee_tab}{summary_tab}</div></div>
<form class="row g-2 mb-3" id="report-filter" data-action="filter">
<div class="col-md-2"><input type="date" name="tglAwal" class="form-control" value="{from}"></div>
<div class="col-md-2"><input type="date" name="tglAkhir" class="form-control" value="{to}"></div>
<div class="col-md-3"><select name="departemen" class="form-select">{departments}</select></div>
<div class="col-md-2"><select name="status" class="form-select"{status_disabled}>{statuses}</select></div>
<div class="col-md-3 d-flex gap-2"><button type="submit" class="btn btn-primary">Terapkan</button><button type="button" class="btn btn-outline-secondary" data-action="reset-filter">Reset</button></div>
</form>
<div class="small text-muted mb-2">Periode {period_from} - {period_to}</div>
{report}
</div>"#,
            attendance_tab = tab(ReportType::Attendance, "attendance", "Laporan Presensi"),
            employee_tab = tab(ReportType::Employee, "employee", "Performa Pegawai"),
            summary_tab = tab(ReportType::Summary, "summary", "Ringkasan Statistik"),
            from = format_iso_date(state.filters.range.from),
            to = format_iso_date(state.filters.range.to),
            departments = combo_options(&state.departments(), state.filters.departemen, "Semua Departemen"),
            statuses = [
                status_option("all", "Semua Status"),
                status_option("hadir", "Hadir"),
                status_option("tidak_hadir", "Tidak Hadir"),
            ]
            .concat(),
            period_from = format_date(Some(state.filters.range.from)),
            period_to = format_date(Some(state.filters.range.to)),
        )
    }

    async fn handle(&self, action: &Action) -> Result<Followup, PageError> {
        match action.name.as_str() {
            "report-type" => {
                if let Some(report) = ReportType::parse(action.target()) {
                    self.state.borrow_mut().report = report;
                }
            }
            "filter" => self.apply_filter(action).await,
            "reset-filter" => {
                self.state.borrow_mut().filters = Filters::initial();
                self.load_records().await;
            }
            _ => {}
        }
        Ok(Followup::Stay)
    }
}
