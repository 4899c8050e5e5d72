//! Membership export -> `users.csv` transform
//!
//! The export is semicolon separated with Dutch column names. `Labels` holds
//! `^`-separated labels; one of them names the player's squad (a letter with an
//! optional digit, e.g. `H1`, `D`), which becomes the channel label.

use super::ValidationError;
use super::strip_bom;
use crate::naming::is_squad_name;
use std::collections::HashSet;
use std::io::Write;

const COL_FIRST_NAME: &str = "Voornaam";
const COL_INFIX: &str = "Tussenvoegsel";
const COL_LAST_NAME: &str = "Achternaam";
const COL_EMAIL: &str = "E-mailadres voor contact";
const COL_LABELS: &str = "Labels";
const COL_MEMBER_NUMBER: &str = "Extern lidnummer";

/// Label that takes priority as squad when present anywhere in the labels
const RECREANT: &str = "recreant";

/// Split a `Labels` cell into (squad, tags).
///
/// Squad is `recreant` if any label contains it, else the first label shaped
/// like a squad. Remaining labels are kept as tags only when they are in
/// `allowed` (compared lowercase).
pub fn parse_labels(labels: &str, allowed: &HashSet<String>) -> (String, Vec<String>) {
    let parts: Vec<&str> = labels
        .split('^')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let recreant = parts
        .iter()
        .copied()
        .find(|p| p.to_lowercase().contains(RECREANT));
    let mut squad = if recreant.is_some() {
        RECREANT.to_string()
    } else {
        String::new()
    };

    let mut tags = Vec::new();
    for part in parts {
        if Some(part) == recreant {
            continue;
        }
        if squad.is_empty() && is_squad_name(part) {
            squad = part.to_string();
        } else if allowed.contains(&part.to_lowercase()) {
            tags.push(part.to_string());
        }
    }

    (squad, tags)
}

/// Transform an export into import CSV; returns the number of users written.
///
/// Rows without an email are dropped. The output always has the header
/// `firstname,lastname,email,team,tags`.
pub fn transform_export<W: Write>(
    data: &[u8],
    output: W,
    allowed_tags: &[String],
) -> Result<usize, ValidationError> {
    let allowed: HashSet<String> = allowed_tags.iter().map(|t| t.to_lowercase()).collect();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(strip_bom(data));

    let headers: Vec<String> = reader
        .headers()
        .map_err(ValidationError::from_csv)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let email_idx = column(COL_EMAIL).ok_or_else(|| ValidationError::MissingColumns {
        columns: vec![COL_EMAIL.to_string()],
    })?;
    let first_idx = column(COL_FIRST_NAME);
    let infix_idx = column(COL_INFIX);
    let last_idx = column(COL_LAST_NAME);
    let labels_idx = column(COL_LABELS);
    let number_idx = column(COL_MEMBER_NUMBER);

    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["firstname", "lastname", "email", "team", "tags"])?;

    let mut written = 0;
    for result in reader.records() {
        let row = result.map_err(ValidationError::from_csv)?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let email = cell(Some(email_idx));
        if email.is_empty() {
            continue;
        }

        let first_name = cell(first_idx);
        let last_name = format!("{} {}", cell(infix_idx), cell(last_idx))
            .trim()
            .to_string();
        let (squad, mut tags) = parse_labels(&cell(labels_idx), &allowed);
        let member_number = cell(number_idx);
        if !member_number.is_empty() {
            tags.push(member_number);
        }

        writer.write_record([
            first_name.as_str(),
            last_name.as_str(),
            email.as_str(),
            squad.as_str(),
            tags.join(",").as_str(),
        ])?;
        written += 1;
    }

    writer
        .flush()
        .map_err(|e| ValidationError::io("<output>", e))?;
    Ok(written)
}
