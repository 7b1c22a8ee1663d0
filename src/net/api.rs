//! Typed REST client for the HR backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages and `Session` call `ApiClient`; the actual HTTP exchange happens
//! behind the `Transport` seam (`net::http::FetchTransport` in the browser,
//! a scripted fake in tests).
//!
//! ERROR HANDLING
//! ==============
//! Every response goes through the same policy: a body that is not JSON is
//! treated as `{}`, and a non-2xx status becomes `ApiError::Status` carrying
//! the body's `message` (or `"API Error"`). Timeouts and transport failures
//! surface as their own variants so pages can choose a fallback message.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    AbsenceRequest, ChangePassword, CheckIn, CheckOut, Combo, ComboKind, InitCheck, InitDataRequest,
    InitDataResult, LoginRequest, LoginResponse, Pegawai, PegawaiForm, Presensi,
};
use crate::state::storage::SessionStore;

const FALLBACK_MESSAGE: &str = "API Error";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-provided message when there is one, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } if message != FALLBACK_MESSAGE => message.clone(),
            _ => fallback.to_owned(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// One outgoing request. The transport always adds
/// `Content-Type: application/json` and, when `bearer` is set,
/// `Authorization: Bearer {bearer}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    pub bearer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange.
#[async_trait(?Send)]
pub trait Transport {
    /// # Errors
    ///
    /// Returns [`ApiError::Timeout`] or [`ApiError::Network`] when no
    /// response arrived. HTTP error statuses are not errors here.
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError>;
}

/// Apply the response policy to a raw response.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for non-2xx statuses.
pub fn interpret(response: &RawResponse) -> Result<Value, ApiError> {
    let data = serde_json::from_str::<Value>(&response.body)
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
    if !response.is_success() {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_MESSAGE)
            .to_owned();
        return Err(ApiError::Status {
            status: response.status,
            message,
        });
    }
    Ok(data)
}

fn query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub struct ApiClient {
    transport: Rc<dyn Transport>,
    store: Rc<SessionStore>,
    base_url: String,
}

impl ApiClient {
    pub fn new(transport: Rc<dyn Transport>, store: Rc<SessionStore>, base_url: &str) -> Self {
        Self {
            transport,
            store,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{}", self.base_url, query_string(params))
        }
    }

    async fn exchange(
        &self,
        method: Method,
        url: String,
        body: Option<String>,
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        let bearer = if authenticated { self.store.token() } else { None };
        let request = ApiRequest {
            method,
            url,
            body,
            bearer,
        };
        log::debug!("{} {}", request.method.as_str(), request.url);
        let response = self.transport.send(request).await?;
        interpret(&response)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&impl Serialize>,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self.exchange(method, self.url(path, params), body, authenticated).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn call_unit(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&impl Serialize>,
    ) -> Result<(), ApiError> {
        self.call::<Value>(method, path, params, body, true).await.map(|_| ())
    }

    // ===== auth =====

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.call(Method::Post, "/api/auth/login", &[], Some(request), false)
            .await
    }

    /// Whether the one-time setup has been run.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn check_init(&self) -> Result<bool, ApiError> {
        let check: InitCheck = self
            .call(Method::Get, "/api/auth/check-init", &[], None::<&()>, false)
            .await?;
        Ok(check.initialized)
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn init_system(&self, request: &InitDataRequest) -> Result<InitDataResult, ApiError> {
        self.call(Method::Post, "/api/auth/init-data", &[], Some(request), false)
            .await
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn change_password(&self, request: &ChangePassword) -> Result<(), ApiError> {
        let params = [
            ("passwordAsli", request.password_asli.clone()),
            ("passwordBaru1", request.password_baru1.clone()),
            ("passwordBaru2", request.password_baru2.clone()),
        ];
        self.call_unit(Method::Post, "/api/auth/ubah-password-sendiri", &params, None::<&()>)
            .await
    }

    // ===== pegawai =====

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn list_pegawai(&self) -> Result<Vec<Pegawai>, ApiError> {
        self.call(Method::Get, "/api/pegawai/daftar", &[], None::<&()>, true)
            .await
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn add_pegawai(&self, form: &PegawaiForm) -> Result<(), ApiError> {
        self.call_unit(Method::Post, "/api/pegawai/admin-tambah-pegawai", &[], Some(form))
            .await
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn update_pegawai(&self, id_user: &str, form: &PegawaiForm) -> Result<(), ApiError> {
        let params = [("idUser", id_user.to_owned())];
        self.call_unit(Method::Post, "/api/pegawai/admin-ubah-pegawai", &params, Some(form))
            .await
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn combo(&self, kind: ComboKind) -> Result<Vec<Combo>, ApiError> {
        let path = format!("/api/pegawai/combo/{}", kind.path_segment());
        self.call(Method::Get, &path, &[], None::<&()>, true).await
    }

    // ===== presensi =====

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn check_in(&self) -> Result<CheckIn, ApiError> {
        self.call(Method::Get, "/presensi/in", &[], None::<&()>, true)
            .await
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn check_out(&self) -> Result<CheckOut, ApiError> {
        self.call(Method::Get, "/presensi/out", &[], None::<&()>, true)
            .await
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn submit_absence(&self, request: AbsenceRequest) -> Result<(), ApiError> {
        let params = [
            ("tglAbsensi", request.tgl_absensi.to_string()),
            ("kdStatus", request.kd_status.to_string()),
        ];
        self.call_unit(Method::Post, "/presensi/absen", &params, None::<&()>)
            .await
    }

    /// Attendance of every employee between two epoch seconds.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn attendance_admin(&self, from: i64, to: i64) -> Result<Vec<Presensi>, ApiError> {
        self.call(Method::Get, "/presensi/daftar/admin", &range(from, to), None::<&()>, true)
            .await
    }

    /// The caller's own attendance between two epoch seconds.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn attendance_employee(&self, from: i64, to: i64) -> Result<Vec<Presensi>, ApiError> {
        self.call(Method::Get, "/presensi/daftar/pegawai", &range(from, to), None::<&()>, true)
            .await
    }

    /// # Errors
    ///
    /// Propagates any [`ApiError`].
    pub async fn status_combo(&self, from: i64, to: i64) -> Result<Vec<Combo>, ApiError> {
        self.call(Method::Get, "/presensi/combo/status-absen", &range(from, to), None::<&()>, true)
            .await
    }
}

fn range(from: i64, to: i64) -> [(&'static str, String); 2] {
    [("tglAwal", from.to_string()), ("tglAkhir", to.to_string())]
}
