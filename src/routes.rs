use std::sync::Arc;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The maximum request body size to accept. This should be enforced by
/// the HTTP gateway, so on the Rust side it’s set to an unreasonably
/// large number.
const MAX_CONTENT_LENGTH: u64 = 2 * 1024 * 1024 * 1024;

/// Header carrying the admin access code.
const ACCESS_CODE_HEADER: &str = "x-access-code";

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => format!("{:?}", r.context), "error" => format!("{:?}", e), "status" => format!("{}", status_code_for(e)), "message" => format!("{}", e));
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        InvalidRegistration { .. } | MissingConfirmation => StatusCode::BAD_REQUEST,
        AlreadyRegistered => StatusCode::FORBIDDEN,
        InvalidAccessCode => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, delete as d, get as g, header, path as p, post, query};

    use super::{handlers, query as q, ACCESS_CODE_HEADER, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name<O: Clone + Send + Sync + 'static>(environment: Environment<O>) -> Route {
            let r = environment.config.registrations_path.clone();

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(r));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_register_route => register, rt; end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json());
    route!(make_count_route => count, rt; p("count"), end(), g());
    route!(make_majors_route => majors, rt; p("majors"), end(), g());
    route!(make_admin_list_route => admin_list, rt; p("admin"), end(), g(), header::optional::<String>(ACCESS_CODE_HEADER));
    route!(make_admin_export_route => admin_export, rt; p("admin"), p("csv"), end(), g(), header::optional::<String>(ACCESS_CODE_HEADER));
    route!(make_admin_clear_route => admin_clear, rt; p("admin"), end(), d(), query::<q::ClearQuery>(), header::optional::<String>(ACCESS_CODE_HEADER));
}
