//! Derivation of platform handles, usernames and initial passwords

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use std::sync::LazyLock;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+";

/// Length of generated passwords
pub const PASSWORD_LENGTH: usize = 16;

static SQUAD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]\d?$").expect("SQUAD_NAME is a valid regex pattern"));

/// Whether a label or channel name is shaped like a squad: one letter and an
/// optional digit (`H1`, `D`).
pub fn is_squad_name(name: &str) -> bool {
    SQUAD_NAME.is_match(name.trim())
}

/// Platform handle for a team or channel display name.
///
/// Deterministic: lowercase, spaces become `-`. `"Heren 1"` -> `"heren-1"`.
pub fn slug(display_name: &str) -> String {
    display_name.trim().to_lowercase().replace(' ', "-")
}

/// Username for a new account: the email's local part, lowercased, with
/// characters the platform rejects replaced by `_`.
pub fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Random initial password containing at least one character of every class
/// the default password policy can demand.
pub fn generate_password() -> String {
    let mut rng = rand::thread_rng();
    let all: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();

    let mut chars: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS]
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    while chars.len() < PASSWORD_LENGTH {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

/// Loose email shape check used by input validation: `local@domain`, both non-empty,
/// no whitespace.
pub fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
