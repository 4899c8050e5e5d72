//! Email lists for disable: CSV with an `email` column, or one address per line

use super::ValidationError;
use super::strip_bom;
use crate::naming::looks_like_email;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Read an email list file
pub fn read_email_file(path: &Path) -> Result<Vec<String>, ValidationError> {
    let bytes = std::fs::read(path).map_err(|e| ValidationError::io(path, e))?;
    parse_email_list(&bytes)
}

/// Parse either format.
///
/// The content is treated as CSV when its first non-blank line contains a
/// comma or is exactly an `email` header; otherwise it is a plain list.
pub fn parse_email_list(data: &[u8]) -> Result<Vec<String>, ValidationError> {
    let data = strip_bom(data);
    let text = std::str::from_utf8(data).map_err(|e| ValidationError::InvalidRow {
        line: 0,
        message: format!("file is not valid UTF-8: {e}"),
    })?;

    let Some(first) = text.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return Ok(Vec::new());
    };

    if is_csv_header(first) {
        parse_csv(data)
    } else {
        parse_plain(text)
    }
}

fn is_csv_header(line: &str) -> bool {
    line.contains(',') || line.eq_ignore_ascii_case("email")
}

fn parse_csv(data: &[u8]) -> Result<Vec<String>, ValidationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let email_idx = reader
        .headers()
        .map_err(ValidationError::from_csv)?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("email"))
        .ok_or_else(|| ValidationError::MissingColumns {
            columns: vec!["email".to_string()],
        })?;

    let mut emails = Vec::new();
    for result in reader.records() {
        let row = result.map_err(ValidationError::from_csv)?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let email = row.get(email_idx).unwrap_or_default();
        emails.push(validate(email, line)?);
    }
    Ok(emails)
}

fn parse_plain(text: &str) -> Result<Vec<String>, ValidationError> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i as u64 + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .map(|(line, l)| validate(l, line))
        .collect()
}

fn validate(email: &str, line: u64) -> Result<String, ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::InvalidRow {
            line,
            message: "missing email".to_string(),
        });
    }
    if !looks_like_email(email) {
        return Err(ValidationError::InvalidRow {
            line,
            message: format!("invalid email '{email}'"),
        });
    }
    Ok(email.to_lowercase())
}

/// Combine command-line emails with file emails.
///
/// Validates the command-line values, lowercases everything, drops
/// duplicates (first occurrence wins) and fails when nothing is left.
pub fn merge_emails(
    cli: &[String],
    from_file: Vec<String>,
) -> Result<Vec<String>, ValidationError> {
    let mut merged = Vec::new();
    let mut seen = HashSet::new();

    let cli = cli
        .iter()
        .enumerate()
        .map(|(i, e)| validate(e.trim(), i as u64 + 1))
        .collect::<Result<Vec<_>, _>>()?;

    for email in cli.into_iter().chain(from_file) {
        if seen.insert(email.clone()) {
            merged.push(email);
        } else {
            debug!("Ignoring duplicate email {email}");
        }
    }

    if merged.is_empty() {
        return Err(ValidationError::Empty("emails"));
    }
    Ok(merged)
}
