//! Landing page after login.
//!
//! DESIGN
//! ======
//! Staff managers (ADMIN, HRD) get company-wide figures for today; every
//! other role gets their own figures over the last 30 days. Both see the
//! last week of attendance. A failed load leaves the affected figures at
//! zero rather than failing the page.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use std::cell::RefCell;

use async_trait::async_trait;

use super::{Action, Followup, Lifecycle, PageError, check_in, check_out};
use crate::app::AppContext;
use crate::net::api::ApiError;
use crate::net::types::{Presensi, User};
use crate::router::RouteContext;
use crate::util::format::{escape_html, percent};
use crate::util::time::{DAY_SECS, format_date, now_epoch, start_of_day};

/// Window for an employee's own statistics, in days.
pub const EMPLOYEE_WINDOW_DAYS: i64 = 30;
/// Window for the recent attendance table, in days.
pub const RECENT_WINDOW_DAYS: i64 = 7;
const RECENT_ROWS: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_employees: usize,
    pub present_today: usize,
    pub absent_today: usize,
    pub late_today: usize,
    pub attendance_percentage: u32,
}

impl AdminStats {
    fn compute(employees: usize, today: &[Presensi]) -> Self {
        let present_today = today.iter().filter(|p| p.is_present()).count();
        Self {
            total_employees: employees,
            present_today,
            absent_today: today.iter().filter(|p| p.is_absent()).count(),
            late_today: today.iter().filter(|p| p.is_late()).count(),
            attendance_percentage: percent(present_today, employees),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeStats {
    pub present_days: usize,
    pub absent_days: usize,
    pub attendance_percentage: u32,
}

impl EmployeeStats {
    fn compute(records: &[Presensi]) -> Self {
        let present_days = records.iter().filter(|p| p.is_present()).count();
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let window = EMPLOYEE_WINDOW_DAYS as usize;
        Self {
            present_days,
            absent_days: records.iter().filter(|p| p.is_absent()).count(),
            attendance_percentage: percent(present_days, window),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stats {
    Admin(AdminStats),
    Employee(EmployeeStats),
}

#[derive(Debug)]
struct DashboardState {
    user: Option<User>,
    stats: Stats,
    recent: Vec<Presensi>,
}

pub struct DashboardPage {
    app: AppContext,
    state: RefCell<DashboardState>,
}

impl DashboardPage {
    pub fn new(app: &AppContext) -> Self {
        Self {
            app: app.clone(),
            state: RefCell::new(DashboardState {
                user: None,
                stats: Stats::Employee(EmployeeStats::default()),
                recent: Vec::new(),
            }),
        }
    }

    pub fn stats(&self) -> Stats {
        self.state.borrow().stats.clone()
    }

    /// Last week of attendance, newest first.
    pub fn recent(&self) -> Vec<Presensi> {
        self.state.borrow().recent.clone()
    }

    fn is_staff_manager(&self) -> bool {
        self.app.session.role().is_some_and(|r| r.is_staff_manager())
    }

    async fn attendance(&self, from: i64, to: i64) -> Result<Vec<Presensi>, ApiError> {
        if self.is_staff_manager() {
            self.app.api.attendance_admin(from, to).await
        } else {
            self.app.api.attendance_employee(from, to).await
        }
    }

    async fn load_stats(&self, now: i64) -> Stats {
        let today = start_of_day(now);
        if self.is_staff_manager() {
            let employees = match self.app.api.list_pegawai().await {
                Ok(list) => list.len(),
                Err(e) => {
                    log::warn!("dashboard: employee list unavailable: {e}");
                    0
                }
            };
            let records = self.app.api.attendance_admin(today, now).await.unwrap_or_else(|e| {
                log::warn!("dashboard: today's attendance unavailable: {e}");
                Vec::new()
            });
            Stats::Admin(AdminStats::compute(employees, &records))
        } else {
            let from = today - EMPLOYEE_WINDOW_DAYS * DAY_SECS;
            let records = self.app.api.attendance_employee(from, now).await.unwrap_or_else(|e| {
                log::warn!("dashboard: attendance history unavailable: {e}");
                Vec::new()
            });
            Stats::Employee(EmployeeStats::compute(&records))
        }
    }

    async fn load_recent(&self, now: i64) -> Vec<Presensi> {
        let mut records = self
            .attendance(now - RECENT_WINDOW_DAYS * DAY_SECS, now)
            .await
            .unwrap_or_else(|e| {
                log::warn!("dashboard: recent attendance unavailable: {e}");
                Vec::new()
            });
        records.sort_by(|a, b| b.tgl_absensi.cmp(&a.tgl_absensi));
        records
    }

    async fn reload(&self) {
        let now = now_epoch();
        let stats = self.load_stats(now).await;
        let recent = self.load_recent(now).await;
        let mut state = self.state.borrow_mut();
        state.stats = stats;
        state.recent = recent;
    }

    fn stat_card(label: &str, value: &str, tone: &str) -> String {
        format!(
            r#"<div class="col-md-3 mb-3"><div class="card stat-card border-{tone}"><div class="card-body"><h6 class="text-muted">{label}</h6><h2 class="card-title mb-0">{value}</h2></div></div></div>"#
        )
    }

    fn stats_markup(stats: &Stats) -> String {
        match stats {
            Stats::Admin(s) => [
                Self::stat_card("Total Pegawai", &s.total_employees.to_string(), "primary"),
                Self::stat_card("Hadir Hari Ini", &s.present_today.to_string(), "success"),
                Self::stat_card("Terlambat", &s.late_today.to_string(), "warning"),
                Self::stat_card("Tidak Hadir", &s.absent_today.to_string(), "danger"),
                Self::stat_card("Kehadiran", &format!("{}%", s.attendance_percentage), "info"),
            ]
            .concat(),
            Stats::Employee(s) => [
                Self::stat_card("Hadir (30 hari)", &s.present_days.to_string(), "success"),
                Self::stat_card("Tidak Hadir", &s.absent_days.to_string(), "danger"),
                Self::stat_card("Kehadiran", &format!("{}%", s.attendance_percentage), "info"),
            ]
            .concat(),
        }
    }

    fn recent_markup(recent: &[Presensi]) -> String {
        if recent.is_empty() {
            return r#"<p class="text-muted text-center">Belum ada data presensi</p>"#.to_owned();
        }
        let rows: String = recent
            .iter()
            .take(RECENT_ROWS)
            .map(|p| {
                let status = if p.is_absent() {
                    format!(
                        r#"<span class="badge bg-danger">{}</span>"#,
                        escape_html(p.nama_status.as_deref().unwrap_or(""))
                    )
                } else if p.is_late() {
                    r#"<span class="badge bg-warning">Terlambat</span>"#.to_owned()
                } else if p.is_present() {
                    r#"<span class="badge bg-success">Hadir</span>"#.to_owned()
                } else {
                    r#"<span class="badge bg-secondary">-</span>"#.to_owned()
                };
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{status}</td></tr>",
                    format_date(p.tgl_absensi),
                    escape_html(&p.nama_lengkap),
                    escape_html(p.jam_masuk.as_deref().unwrap_or("-")),
                    escape_html(p.jam_keluar.as_deref().unwrap_or("-")),
                )
            })
            .collect();
        format!(
            r#"<table class="table table-hover"><thead><tr><th>Tanggal</th><th>Nama</th><th>Masuk</th><th>Keluar</th><th>Status</th></tr></thead><tbody>{rows}</tbody></table>"#
        )
    }
}

#[async_trait(?Send)]
impl Lifecycle for DashboardPage {
    async fn init(&self, _context: &RouteContext) -> Result<(), PageError> {
        let user = self.app.session.user().ok_or(PageError::Unauthenticated)?;
        self.state.borrow_mut().user = Some(user);
        self.reload().await;
        Ok(())
    }

    fn render(&self) -> String {
        let state = self.state.borrow();
        let name = state.user.as_ref().map_or("", |u| u.nama_lengkap.as_str());
        format!(
            r#"<div id="dashboard-page">
<div class="d-flex justify-content-between align-items-center mb-4"><div><h1 class="h3 mb-0">Selamat datang, {name}</h1><div class="small text-muted">{today}</div></div>
<div class="btn-group"><button class="btn btn-success" data-action="check-in">Presensi Masuk</button><button class="btn btn-outline-danger" data-action="check-out">Presensi Keluar</button></div></div>
<div class="row">{stats}</div>
<div class="card mt-3"><div class="card-header"><h5 class="mb-0">Presensi 7 Hari Terakhir</h5></div><div class="card-body">{recent}</div></div>
</div>"#,
            name = escape_html(name),
            today = format_date(Some(now_epoch())),
            stats = Self::stats_markup(&state.stats),
            recent = Self::recent_markup(&state.recent),
        )
    }

    async fn handle(&self, action: &Action) -> Result<Followup, PageError> {
        let recorded = match action.name.as_str() {
            "check-in" => check_in(&self.app).await,
            "check-out" => check_out(&self.app).await,
            _ => false,
        };
        if recorded {
            self.reload().await;
        }
        Ok(Followup::Stay)
    }
}
