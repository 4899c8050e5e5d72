//! Batch input files
//!
//! Everything here is validated completely before a batch starts.

mod email_list;
mod error;
mod members_export;
mod users_csv;

pub use email_list::{merge_emails, parse_email_list, read_email_file};
pub use error::ValidationError;
pub use members_export::{parse_labels, transform_export};
pub use users_csv::{REQUIRED_COLUMNS, parse_users_csv, read_users_csv};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Drop a leading UTF-8 byte order mark
pub(crate) fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom(b"\xEF\xBB\xBFabc"), b"abc");
        assert_eq!(strip_bom(b"abc"), b"abc");
    }
}
