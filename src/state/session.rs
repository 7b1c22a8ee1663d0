//! Session state: who is using this tab, and with which role.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigator asks `is_authenticated` and `has_permission` on every
//! navigation; the login page drives `login` and `initialize_system`; the
//! shell calls `logout`. All state lives in `SessionStore`, so a reload
//! keeps the user signed in.
//!
//! DESIGN
//! ======
//! Token and user record are one unit. `login` writes both or neither, and
//! `logout` clears both together with the settings blob.
//!
//! ERROR HANDLING
//! ==============
//! Credential problems are `AuthError::Validation` and are raised before
//! any request is sent. A 2xx login response without a token or user is
//! `AuthError::MalformedResponse` and leaves storage untouched.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::rc::Rc;

use super::storage::{SessionStore, StorageError};
use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{InitDataRequest, InitDataResult, LoginRequest, Role, User};
use crate::util::validate::{self, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("login response is missing {0}")]
    MalformedResponse(&'static str),
    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),
}

/// Login form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub profile: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns the first failing field check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !validate::is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !validate::is_present(&self.password) {
            return Err(ValidationError::MissingPassword);
        }
        if !validate::is_present(&self.profile) {
            return Err(ValidationError::MissingProfile);
        }
        Ok(())
    }
}

pub struct Session {
    store: Rc<SessionStore>,
    api: Rc<ApiClient>,
}

impl Session {
    pub fn new(store: Rc<SessionStore>, api: Rc<ApiClient>) -> Self {
        Self { store, api }
    }

    /// Authenticate and persist the session.
    ///
    /// # Errors
    ///
    /// See [`AuthError`]; on any error nothing is stored.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        credentials.validate()?;

        let request = LoginRequest {
            email: credentials.email.trim().to_owned(),
            password: credentials.password.clone(),
            profile: credentials.profile.clone(),
        };
        let response = self.api.login(&request).await?;
        let result = response.hasil.ok_or(AuthError::MalformedResponse("hasil"))?;
        let token = result
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedResponse("token"))?;
        let user = result.info.ok_or(AuthError::MalformedResponse("info"))?;

        self.commit(&token, &user)?;
        log::info!("signed in as {} ({})", user.id_user, user.profile);
        Ok(user)
    }

    fn commit(&self, token: &str, user: &User) -> Result<(), StorageError> {
        self.store.set_token(token)?;
        if let Err(e) = self.store.set_user(user) {
            self.store.remove_token();
            self.store.remove_user();
            return Err(e);
        }
        Ok(())
    }

    /// Run the one-time system setup and return the generated admin login.
    ///
    /// # Errors
    ///
    /// Validation of both fields happens before the request.
    pub async fn initialize_system(
        &self,
        nama_admin: &str,
        perusahaan: &str,
    ) -> Result<InitDataResult, AuthError> {
        let nama_admin = validate::require(nama_admin, "Nama admin")?;
        let perusahaan = validate::require(perusahaan, "Nama perusahaan")?;
        let request = InitDataRequest {
            nama_admin: nama_admin.to_owned(),
            perusahaan: perusahaan.to_owned(),
        };
        Ok(self.api.init_system(&request).await?)
    }

    /// Whether an administrator account exists yet.
    ///
    /// # Errors
    ///
    /// Propagates the request failure.
    pub async fn check_system_initialized(&self) -> Result<bool, ApiError> {
        self.api.check_init().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.token().is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.store.user()
    }

    pub fn role(&self) -> Option<Role> {
        self.user().and_then(|u| u.role())
    }

    /// True iff the current user's role is one of `roles`.
    pub fn has_permission(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|role| roles.contains(&role))
    }

    /// Replace the stored user record after a profile edit. Does nothing
    /// without a session.
    ///
    /// # Errors
    ///
    /// Propagates the storage write failure.
    pub fn update_user(&self, user: &User) -> Result<(), StorageError> {
        if !self.is_authenticated() {
            return Ok(());
        }
        self.store.set_user(user)
    }

    pub fn logout(&self) {
        self.store.clear();
        log::info!("signed out");
    }
}
