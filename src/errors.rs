use std::collections::BTreeMap;

use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a submission that failed field validation.
    #[error("invalid registration submission")]
    InvalidRegistration {
        errors: BTreeMap<&'static str, &'static str>,
    },

    /// Represents a submission whose phone number is already registered.
    #[error("this phone number is already registered")]
    AlreadyRegistered,

    /// Represents an I/O error while reading or rewriting the registry file.
    #[error("registry I/O error")]
    Io { source: std::io::Error },

    /// Represents a failure to serialize the registry contents.
    #[error("could not serialize registry contents")]
    Serialization { source: serde_json::Error },

    /// Represents a missing or unrecognized admin access code.
    #[error("invalid access code")]
    InvalidAccessCode,

    /// Represents a destructive request without the typed confirmation word.
    #[error("clearing the registry requires confirm=DELETE")]
    MissingConfirmation,
}

/// Enumerates errors returned by the remote store subsystem.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents an unconfigured or placeholder endpoint URL.
    #[error("Apps Script URL not configured; set BACKEND_APPS_SCRIPT_URL to the deployed web app URL")]
    NotConfigured,

    /// Represents a missing Drive folder identifier.
    #[error("Drive folder ID not configured; set BACKEND_DRIVE_FOLDER_ID")]
    MissingFolder,

    /// Represents an attempt to upload an empty CSV payload.
    #[error("CSV content is empty")]
    EmptyContent,

    /// Represents a failure to serialize the upload request body.
    #[error("could not serialize upload request")]
    Request { source: serde_json::Error },

    /// Represents an unreachable endpoint.
    #[error("network error: could not reach the Apps Script endpoint; check the connection and the configured URL")]
    Unreachable { source: reqwest::Error },

    /// Represents any other transport-level failure.
    #[error("request to the Apps Script endpoint failed")]
    Network { source: reqwest::Error },

    /// Represents a 404 from the endpoint.
    #[error("Apps Script not found (404): check that the URL is correct and the script is deployed")]
    NotFound { body: String },

    /// Represents a 403 from the endpoint.
    #[error("access denied (403): deploy the script with \"Who has access\" set to \"Anyone\"")]
    AccessDenied { body: String },

    /// Represents any other non-success HTTP status.
    #[error("Apps Script returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Represents a 2xx response that is not the expected JSON shape.
    #[error("could not parse the Apps Script response")]
    BadResponse { source: serde_json::Error },

    /// Represents an application-level failure reported by the endpoint.
    #[error("Apps Script reported a failure: {message}")]
    Failed { message: String },
}
