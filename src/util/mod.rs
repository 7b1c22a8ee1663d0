//! Utility helpers shared across pages and services.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure functions only: validation, date/clock arithmetic, display
//! formatting. Nothing here touches the browser.

pub mod format;
pub mod time;
pub mod validate;
