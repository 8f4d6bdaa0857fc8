use std::collections::BTreeMap;

use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        let errors = match &self.error {
            BackendError::InvalidRegistration { errors } => Some(errors.clone()),
            _ => None,
        };

        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
            errors,
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,

    /// Per-field messages, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) errors: Option<BTreeMap<&'static str, &'static str>>,
}

/// Names the operation a rejection came from.
#[derive(Clone, Debug, Serialize)]
pub struct Context {
    operation: &'static str,
}

impl Context {
    pub fn register() -> Context {
        Context {
            operation: "register",
        }
    }

    pub fn count() -> Context {
        Context { operation: "count" }
    }

    pub fn majors() -> Context {
        Context { operation: "majors" }
    }

    pub fn list() -> Context {
        Context { operation: "list" }
    }

    pub fn export() -> Context {
        Context { operation: "export" }
    }

    pub fn clear() -> Context {
        Context { operation: "clear" }
    }
}
