use serde::Serialize;

use crate::registration::Registration;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Count(i64),
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    Register {
        id: i64,
        /// Whether the remote CSV mirror accepted this snapshot. A saved
        /// registration with a failed sync still succeeds.
        synced: bool,
    },
    Registrations {
        count: i64,
        registrations: Vec<Registration>,
    },
}
