//! Route-level pages and their lifecycle contract.
//!
//! ARCHITECTURE
//! ============
//! Every page implements `Lifecycle`: `init` loads data for a route
//! context, `render` produces markup, `handle` reacts to user actions that
//! the shell collects from the DOM, and `destroy` releases whatever the
//! page holds. `Page` closes the set so the host can dispatch exhaustively.
//!
//! Page state sits in a `RefCell` that is never borrowed across an
//! `.await`; a page is shared as `Rc<Page>` while an action is in flight.

pub mod dashboard;
pub mod laporan;
pub mod login;
pub mod pegawai;
pub mod presensi;
pub mod profile;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::app::AppContext;
use crate::net::api::ApiError;
use crate::net::types::Combo;
use crate::router::RouteContext;
use crate::util::format::escape_html;

pub use dashboard::DashboardPage;
pub use laporan::LaporanPage;
pub use login::LoginPage;
pub use pegawai::PegawaiPage;
pub use presensi::PresensiPage;
pub use profile::ProfilePage;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Sesi tidak ditemukan, silakan login kembali")]
    Unauthenticated,
}

/// A user interaction collected from the page markup: the element's
/// `data-action`, its `data-target`, and the enclosing form's fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub target: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl Action {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_owned());
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Field value, `""` when absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }

    pub fn target(&self) -> &str {
        self.target.as_deref().unwrap_or("")
    }
}

/// What the shell does after an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Followup {
    /// Re-render the page in place.
    Stay,
    /// Navigate to a fragment.
    Navigate(String),
}

#[async_trait(?Send)]
pub trait Lifecycle {
    /// # Errors
    ///
    /// A [`PageError`] fails the navigation.
    async fn init(&self, context: &RouteContext) -> Result<(), PageError>;

    fn render(&self) -> String;

    /// # Errors
    ///
    /// A [`PageError`] is reported by the shell; the page stays mounted.
    async fn handle(&self, action: &Action) -> Result<Followup, PageError>;

    fn destroy(&self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    Login,
    Dashboard,
    Pegawai,
    Presensi,
    Profile,
    Laporan,
}

pub enum Page {
    Login(LoginPage),
    Dashboard(DashboardPage),
    Pegawai(PegawaiPage),
    Presensi(PresensiPage),
    Profile(ProfilePage),
    Laporan(LaporanPage),
}

impl Page {
    pub fn new(kind: PageKind, app: &AppContext) -> Self {
        match kind {
            PageKind::Login => Self::Login(LoginPage::new(app)),
            PageKind::Dashboard => Self::Dashboard(DashboardPage::new(app)),
            PageKind::Pegawai => Self::Pegawai(PegawaiPage::new(app)),
            PageKind::Presensi => Self::Presensi(PresensiPage::new(app)),
            PageKind::Profile => Self::Profile(ProfilePage::new(app)),
            PageKind::Laporan => Self::Laporan(LaporanPage::new(app)),
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Self::Login(_) => PageKind::Login,
            Self::Dashboard(_) => PageKind::Dashboard,
            Self::Pegawai(_) => PageKind::Pegawai,
            Self::Presensi(_) => PageKind::Presensi,
            Self::Profile(_) => PageKind::Profile,
            Self::Laporan(_) => PageKind::Laporan,
        }
    }

    fn inner(&self) -> &dyn Lifecycle {
        match self {
            Self::Login(p) => p,
            Self::Dashboard(p) => p,
            Self::Pegawai(p) => p,
            Self::Presensi(p) => p,
            Self::Profile(p) => p,
            Self::Laporan(p) => p,
        }
    }
}

#[async_trait(?Send)]
impl Lifecycle for Page {
    async fn init(&self, context: &RouteContext) -> Result<(), PageError> {
        self.inner().init(context).await
    }

    fn render(&self) -> String {
        self.inner().render()
    }

    async fn handle(&self, action: &Action) -> Result<Followup, PageError> {
        self.inner().handle(action).await
    }

    fn destroy(&self) {
        self.inner().destroy();
    }
}

/// Record today's check-in and report the result as a notification.
/// Returns whether the server accepted it.
pub(crate) async fn check_in(app: &AppContext) -> bool {
    match app.api.check_in().await {
        Ok(result) => {
            app.notifier
                .success("Presensi Berhasil", &format!("Jam masuk: {}", result.jam_masuk));
            true
        }
        Err(e) => {
            app.notifier
                .error("Presensi Gagal", &e.user_message("Gagal melakukan presensi"));
            false
        }
    }
}

/// Counterpart of [`check_in`] for check-out.
pub(crate) async fn check_out(app: &AppContext) -> bool {
    match app.api.check_out().await {
        Ok(result) => {
            app.notifier
                .success("Presensi Berhasil", &format!("Jam keluar: {}", result.jam_keluar));
            true
        }
        Err(e) => {
            app.notifier
                .error("Presensi Gagal", &e.user_message("Gagal melakukan presensi"));
            false
        }
    }
}

/// Rows of `items` on 1-based `page`, and the page count.
pub(crate) fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], usize) {
    let page_size = page_size.max(1);
    let pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    (&items[start.min(items.len())..end], pages)
}

/// Bootstrap pagination bar; each link carries `data-action="page"`.
pub(crate) fn pagination_markup(page: usize, pages: usize) -> String {
    if pages <= 1 {
        return String::new();
    }
    let items: String = (1..=pages)
        .map(|p| {
            let active = if p == page { " active" } else { "" };
            format!(
                r#"<li class="page-item{active}"><a class="page-link" href="javascript:void(0)" data-action="page" data-target="{p}">{p}</a></li>"#
            )
        })
        .collect();
    format!(r#"<nav><ul class="pagination justify-content-center">{items}</ul></nav>"#)
}

/// `<option>` list for a combo, preceded by an empty "pick one" entry.
pub(crate) fn combo_options(options: &[Combo], selected: Option<i64>, placeholder: &str) -> String {
    let mut out = format!(r#"<option value="">{}</option>"#, escape_html(placeholder));
    for combo in options {
        let mark = if selected == Some(combo.kode) { " selected" } else { "" };
        out.push_str(&format!(
            r#"<option value="{}"{mark}>{}</option>"#,
            combo.kode,
            escape_html(&combo.nama)
        ));
    }
    out
}

/// Inline alert box.
pub(crate) fn alert_markup(kind: &str, message: &str) -> String {
    format!(
        r#"<div class="alert alert-{kind}" role="alert">{}</div>"#,
        escape_html(message)
    )
}
