//! Wire DTOs for the HR backend.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's camelCase JSON. Everything beyond the
//! identity fields is optional so older or partial records still decode.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse permission tag carried in `User::profile`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Hrd,
    Pegawai,
    Manager,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Hrd, Role::Pegawai, Role::Manager];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Hrd => "HRD",
            Self::Pegawai => "PEGAWAI",
            Self::Manager => "MANAGER",
        }
    }

    /// ADMIN and HRD see organisation-wide data.
    pub fn is_staff_manager(self) -> bool {
        matches!(self, Self::Admin | Self::Hrd)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Employee record, also used as the logged-in user's profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pegawai {
    pub id_user: String,
    pub nama_lengkap: String,
    pub email: String,
    /// Role string as sent by the server (see [`Role`]).
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempat_lahir: Option<String>,
    /// Birth date in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tanggal_lahir: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nik_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd_jabatan: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_jabatan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd_departemen: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_departemen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd_unit_kerja: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_unit_kerja: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd_jenis_kelamin: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_jenis_kelamin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd_pendidikan: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama_pendidikan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// The session user is an employee record.
pub type User = Pegawai;

impl Pegawai {
    /// Parsed role, `None` for profiles this client does not know.
    pub fn role(&self) -> Option<Role> {
        self.profile.parse().ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub profile: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub hasil: Option<LoginResult>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResult {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub info: Option<User>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InitCheck {
    #[serde(default)]
    pub initialized: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDataRequest {
    pub nama_admin: String,
    pub perusahaan: String,
}

/// Credentials of the generated administrator account.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InitDataResult {
    pub email: String,
    pub password: String,
}

/// Lookup entry for select inputs (jabatan, departemen, status absen, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub kode: i64,
    pub nama: String,
}

/// One attendance day for one employee.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presensi {
    pub id_user: String,
    #[serde(default)]
    pub nama_lengkap: String,
    /// Day in epoch seconds.
    #[serde(default)]
    pub tgl_absensi: Option<i64>,
    #[serde(default)]
    pub jam_masuk: Option<String>,
    #[serde(default)]
    pub jam_keluar: Option<String>,
    /// Absence status; set when the day was an absence rather than a check-in.
    #[serde(default)]
    pub nama_status: Option<String>,
}

impl Presensi {
    /// Checked in and not recorded as an absence.
    pub fn is_present(&self) -> bool {
        self.jam_masuk.as_deref().is_some_and(|j| !j.is_empty()) && !self.is_absent()
    }

    pub fn is_absent(&self) -> bool {
        self.nama_status.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn is_late(&self) -> bool {
        self.is_present() && self.jam_masuk.as_deref().is_some_and(crate::util::time::is_late)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub jam_masuk: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOut {
    pub jam_keluar: String,
}

/// Body of the add/edit employee endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PegawaiForm {
    pub nama_lengkap: String,
    pub email: String,
    pub tempat_lahir: String,
    pub tanggal_lahir: i64,
    pub kd_jenis_kelamin: i64,
    pub kd_pendidikan: i64,
    pub kd_jabatan: i64,
    pub kd_departemen: i64,
    pub kd_unit_kerja: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "passwordC", skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nik_user: Option<String>,
}

/// Absence (izin, sakit, cuti) for one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbsenceRequest {
    /// Day in epoch seconds.
    pub tgl_absensi: i64,
    pub kd_status: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangePassword {
    pub password_asli: String,
    pub password_baru1: String,
    pub password_baru2: String,
}

/// Lookup tables served under `/api/pegawai/combo/{kind}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComboKind {
    Jabatan,
    Departemen,
    UnitKerja,
    Pendidikan,
    JenisKelamin,
    DepartemenHrd,
}

impl ComboKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Jabatan => "jabatan",
            Self::Departemen => "departemen",
            Self::UnitKerja => "unit-kerja",
            Self::Pendidikan => "pendidikan",
            Self::JenisKelamin => "jenis-kelamin",
            Self::DepartemenHrd => "departemen-hrd",
        }
    }
}
