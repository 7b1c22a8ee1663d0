//! Form field validators.
//!
//! Validation runs before any request is issued; the error text is shown to
//! the user verbatim and is never logged.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static NIK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{16}$").expect("nik pattern compiles"));

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email tidak valid")]
    InvalidEmail,
    #[error("Password harus diisi")]
    MissingPassword,
    #[error("Profile harus dipilih")]
    MissingProfile,
    #[error("{0} harus diisi")]
    Required(&'static str),
    #[error("Format NIK tidak valid (16 digit)")]
    InvalidNik,
    #[error("Password tidak sama")]
    PasswordMismatch,
    #[error("Password minimal {0} karakter")]
    PasswordTooShort(usize),
    #[error("Format tanggal tidak valid")]
    InvalidDate,
    #[error("Tanggal awal harus sebelum tanggal akhir")]
    InvalidRange,
}

/// `true` when `value` has non-whitespace content.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Indonesian national ID: 16 digits with plausible region and birth-date
/// segments. Empty input is accepted because the field is optional.
pub fn is_valid_nik(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if !NIK.is_match(value) {
        return false;
    }
    let segment = |from: usize| value[from..from + 2].parse::<u32>().unwrap_or(0);
    let province = segment(0);
    let regency = segment(2);
    let district = segment(4);
    let day = segment(6);
    let month = segment(8);

    (11..=94).contains(&province)
        && (1..=99).contains(&regency)
        && (1..=99).contains(&district)
        // women encode the birth day plus 40
        && ((1..=31).contains(&day) || (41..=71).contains(&day))
        && (1..=12).contains(&month)
}

/// Trimmed value of a required field.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] naming `field` when the value is blank.
pub fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed)
    }
}

/// Check a new password and its confirmation.
///
/// # Errors
///
/// Returns [`ValidationError::PasswordMismatch`] or
/// [`ValidationError::PasswordTooShort`].
pub fn check_new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}
