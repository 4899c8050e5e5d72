//! `users.csv` parsing for import
//!
//! Header: `firstname,lastname,email,team,tags`. Header names are matched
//! after trimming and lowercasing; column order is free. The whole file is
//! validated up front so a bad row aborts the batch before any remote call.

use super::ValidationError;
use super::strip_bom;
use crate::naming::looks_like_email;
use crate::schema::UserRecord;
use std::collections::HashMap;
use std::path::Path;

/// Columns every import file must have
pub const REQUIRED_COLUMNS: [&str; 5] = ["firstname", "lastname", "email", "team", "tags"];

/// Read and validate an import file
pub fn read_users_csv(path: &Path) -> Result<Vec<UserRecord>, ValidationError> {
    let bytes = std::fs::read(path).map_err(|e| ValidationError::io(path, e))?;
    parse_users_csv(&bytes)
}

/// Parse and validate import CSV data
pub fn parse_users_csv(data: &[u8]) -> Result<Vec<UserRecord>, ValidationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(strip_bom(data));

    let headers: Vec<String> = reader
        .headers()
        .map_err(ValidationError::from_csv)?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns { columns: missing });
    }

    let index = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
    let (first_idx, last_idx, email_idx, team_idx, tags_idx) = (
        index("firstname"),
        index("lastname"),
        index("email"),
        index("team"),
        index("tags"),
    );

    let mut records = Vec::new();
    let mut seen: HashMap<String, u64> = HashMap::new();

    for result in reader.records() {
        let row = result.map_err(ValidationError::from_csv)?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();

        let email = cell(email_idx).to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::InvalidRow {
                line,
                message: "missing email".to_string(),
            });
        }
        if !looks_like_email(&email) {
            return Err(ValidationError::InvalidRow {
                line,
                message: format!("invalid email '{email}'"),
            });
        }
        if let Some(first_line) = seen.get(&email) {
            return Err(ValidationError::DuplicateEmail {
                email,
                line,
                first_line: *first_line,
            });
        }
        seen.insert(email.clone(), line);

        records.push(UserRecord {
            first_name: cell(first_idx),
            last_name: cell(last_idx),
            email,
            team_label: cell(team_idx),
            tags: UserRecord::parse_tags(&cell(tags_idx)),
        });
    }

    if records.is_empty() {
        return Err(ValidationError::Empty("user rows"));
    }
    Ok(records)
}
