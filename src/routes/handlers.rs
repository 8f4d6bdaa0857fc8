use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error};
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::csv;
use crate::environment::{Environment, SafeStore};
use crate::errors::BackendError;
use crate::registration::RegistrationForm;
use crate::registry::Registry;
use crate::store::Store;
use crate::routes::{
    query::ClearQuery,
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::validation::{validate_form, MAJOR_YEARS};

const SERVER_TIMING_HEADER: &str = "server-timing";
const CLEAR_CONFIRMATION: &str = "DELETE";

type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

/// Runs a submission through the whole pipeline: validate, persist,
/// re-serialize the full registry, upload the snapshot. A duplicate phone
/// number stops before any network call; a failed upload is logged and
/// reported as `synced: false` but does not undo the save.
pub async fn register<O: SafeStore + 'static>(
    environment: Environment<O>,
    form: RegistrationForm,
) -> RouteResult {
    use log::o;

    timed! {
        let Environment {
            logger,
            registry,
            store,
            config,
            ..
        } = environment.clone();

        let error_handler = |e: BackendError| Rejection::new(Context::register(), e);

        debug!(logger, "Validating submission...");
        check_form(&form).map_err(error_handler)?;

        debug!(logger, "Saving registration...");
        let registration = registry.save(form).await.map_err(error_handler)?;
        let id = registration.id();
        let logger = Arc::new(logger.new(o!("id" => id)));

        debug!(logger, "Serializing registrations...");
        let registrations = registry.all().await.map_err(error_handler)?;
        let snapshot = csv::generate(&registrations);

        debug!(logger, "Uploading CSV snapshot...");
        let synced = match store.save(config.sync_filename.clone(), snapshot).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    logger,
                    "Failed to upload CSV snapshot";
                    "error" => format!("{}", e)
                );
                false
            }
        };

        debug!(logger, "Sending response...");
        with_status(
            json(&SuccessResponse::Register { id, synced }),
            StatusCode::CREATED,
        )
    }
}

pub async fn count<O: SafeStore>(environment: Environment<O>) -> RouteResult {
    timed! {
        let count = environment
            .registry
            .count()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::count(), e))?;

        json(&SuccessResponse::Count(count))
    }
}

pub async fn majors<O: SafeStore>(_environment: Environment<O>) -> RouteResult {
    timed! {
        json(&*MAJOR_YEARS)
    }
}

pub async fn admin_list<O: SafeStore>(
    environment: Environment<O>,
    code: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list(), e);

        authorize(&environment, code).map_err(error_handler)?;

        let registrations = environment
            .registry
            .all()
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Registrations {
            count: registrations.len() as i64,
            registrations,
        })
    }
}

pub async fn admin_export<O: SafeStore>(
    environment: Environment<O>,
    code: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::export(), e);

        authorize(&environment, code).map_err(error_handler)?;

        let registrations = environment
            .registry
            .all()
            .await
            .map_err(error_handler)?;

        match registrations.len() {
            0 => Box::new(with_status(json(&()), StatusCode::NOT_FOUND)) as Box<dyn Reply>,
            count => {
                debug!(environment.logger, "Exporting registrations as CSV"; "count" => count);

                let snapshot = csv::generate(&registrations);
                let filename = csv::backup_filename(&csv::today());

                Box::new(with_header(
                    with_header(
                        csv::with_bom(&snapshot),
                        "content-type",
                        "text/csv; charset=utf-8",
                    ),
                    "content-disposition",
                    format!("attachment; filename=\"{}\"", filename),
                )) as Box<dyn Reply>
            }
        }
    }
}

pub async fn admin_clear<O: SafeStore>(
    environment: Environment<O>,
    query: ClearQuery,
    code: Option<String>,
) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::clear(), e);

        authorize(&environment, code).map_err(error_handler)?;
        check_confirmation(&query).map_err(error_handler)?;

        let discarded = environment
            .registry
            .count()
            .await
            .map_err(error_handler)?;
        environment
            .registry
            .clear()
            .await
            .map_err(error_handler)?;

        error!(
            environment.logger,
            "Registry wiped by admin";
            "discarded" => discarded
        );

        StatusCode::NO_CONTENT
    }
}

fn check_form(form: &RegistrationForm) -> Result<(), BackendError> {
    let validation = validate_form(form);

    if validation.is_valid {
        Ok(())
    } else {
        Err(BackendError::InvalidRegistration {
            errors: validation.errors,
        })
    }
}

/// Checks the shared access code carried in the `x-access-code` header
/// against the injected gate.
fn authorize<O: SafeStore>(
    environment: &Environment<O>,
    code: Option<String>,
) -> Result<(), BackendError> {
    match code {
        Some(ref code) if environment.gate.verify(code) => Ok(()),
        _ => Err(BackendError::InvalidAccessCode),
    }
}

/// The clear route destroys every record; it requires the typed confirmation
/// word on top of the access code.
fn check_confirmation(query: &ClearQuery) -> Result<(), BackendError> {
    if query.confirm.as_deref() == Some(CLEAR_CONFIRMATION) {
        Ok(())
    } else {
        Err(BackendError::MissingConfirmation)
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
