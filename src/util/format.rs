//! Display formatting shared by page markup.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

/// Escape text for inclusion in element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Badge markup for a role string as stored on the user record.
pub fn role_badge(profile: &str) -> &'static str {
    match profile {
        "ADMIN" => r#"<span class="badge bg-danger">Admin</span>"#,
        "HRD" => r#"<span class="badge bg-warning">HRD</span>"#,
        "PEGAWAI" => r#"<span class="badge bg-primary">Pegawai</span>"#,
        "MANAGER" => r#"<span class="badge bg-success">Manager</span>"#,
        _ => r#"<span class="badge bg-secondary">Unknown</span>"#,
    }
}

/// Shorten `text` to `max_chars`, appending `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Rounded percentage of `part` in `total`; zero when `total` is zero.
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = ((part as f64 / total as f64) * 100.0).round() as u32;
    rounded
}
