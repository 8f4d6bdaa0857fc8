use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Render/parse pattern for stored timestamps: ISO-8601 with a numeric
/// offset, e.g. `2026-08-06T12:30:00+0000`.
pub(crate) const TIMESTAMP_FORMAT: &str = "%FT%T%z";

/// A single registration in the registry. Never mutated after creation;
/// removed only by the bulk admin clear.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Milliseconds since the Unix epoch at save time. Unique by
    /// construction, best effort: two saves within the same millisecond
    /// collide.
    id: i64,

    /// The name provided.
    pub(crate) full_name: String,

    /// The canonical `+212 xxx xxx xxx` phone number. One registration per
    /// whitespace-normalized number.
    pub(crate) phone_number: String,

    /// The email provided, if any. Not validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,

    /// The gender provided.
    pub(crate) gender: String,

    /// The program code provided.
    pub(crate) major: String,

    /// The study year provided, as submitted.
    pub(crate) year: String,

    /// Free-form notes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) notes: Option<String>,

    /// The save instant as an ISO-8601 string. Derived from the same instant
    /// as `id` but stored independently.
    pub(crate) timestamp: String,
}

impl Registration {
    /// Stamps a submitted form into a full record at the given instant. Form
    /// fields pass through unchanged; this layer performs no validation.
    pub fn from_form(form: RegistrationForm, saved_at: OffsetDateTime) -> Self {
        Registration {
            id: (saved_at.unix_timestamp_nanos() / 1_000_000) as i64,
            timestamp: saved_at.format(TIMESTAMP_FORMAT),
            full_name: form.full_name,
            phone_number: form.phone_number,
            email: form.email,
            gender: form.gender,
            major: form.major,
            year: form.year,
            notes: form.notes,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }
}

/// The raw field values of a submission, before validation. Every field
/// defaults so that an incomplete body deserializes and fails validation
/// field by field instead of being rejected wholesale.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(default)]
    pub(crate) full_name: String,

    #[serde(default)]
    pub(crate) phone_number: String,

    #[serde(default)]
    pub(crate) email: Option<String>,

    #[serde(default)]
    pub(crate) gender: String,

    #[serde(default)]
    pub(crate) major: String,

    #[serde(default)]
    pub(crate) year: String,

    #[serde(default)]
    pub(crate) notes: Option<String>,
}
