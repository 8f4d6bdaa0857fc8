use time::OffsetDateTime;

use crate::registration::{Registration, TIMESTAMP_FORMAT};

/// Fixed export column set. The registry has no schema version; this list is
/// the contract.
const HEADERS: [&str; 9] = [
    "ID",
    "Full Name",
    "Phone Number",
    "Email",
    "Gender",
    "Major",
    "Year",
    "Notes",
    "Registration Date",
];

/// Byte-order mark prepended so spreadsheet applications detect UTF-8.
const BOM: &str = "\u{feff}";

/// Serializes registrations in input order: a header row, then one line per
/// record. An empty input yields an empty string, without even the header.
///
/// Only the free-text columns (full name, notes) are quote-escaped; the
/// remaining columns come from tightly constrained inputs and are emitted
/// raw.
pub fn generate(registrations: &[Registration]) -> String {
    if registrations.is_empty() {
        return String::new();
    }

    let mut rows = vec![HEADERS.join(",")];

    for registration in registrations {
        let row = [
            registration.id().to_string(),
            escape(&registration.full_name),
            registration.phone_number.clone(),
            registration.email.clone().unwrap_or_default(),
            registration.gender.clone(),
            registration.major.clone(),
            registration.year.clone(),
            escape(registration.notes.as_deref().unwrap_or_default()),
            display_date(&registration.timestamp),
        ];
        rows.push(row.join(","));
    }

    rows.join("\n")
}

/// Prefixes the BOM, yielding the exact text to serve or write as a file.
pub fn with_bom(csv: &str) -> String {
    let mut text = String::with_capacity(BOM.len() + csv.len());
    text.push_str(BOM);
    text.push_str(csv);
    text
}

/// Filename for a manual admin export, stamped with an ISO date.
pub fn backup_filename(date: &str) -> String {
    format!("registrations_backup_{}.csv", date)
}

pub fn today() -> String {
    OffsetDateTime::now_utc().format("%F")
}

/// Wraps a field in quotes with internal quotes doubled. Empty fields stay
/// empty, unquoted.
fn escape(field: &str) -> String {
    if field.is_empty() {
        return String::new();
    }

    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Renders the stored ISO timestamp as a human-readable date-time. A lossy
/// projection for the spreadsheet column, not a round-trippable value; a
/// timestamp that fails to parse is emitted verbatim.
fn display_date(timestamp: &str) -> String {
    OffsetDateTime::parse(timestamp, TIMESTAMP_FORMAT)
        .map(|t| t.format("%d/%m/%Y %T"))
        .unwrap_or_else(|_| timestamp.to_owned())
}
