use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use tokio::sync::mpsc;
use warp::Filter;

use log::{info, initialize_logger, o};
use registrations::config::get_variable;
use registrations::environment::{Config, Environment};
use registrations::gate::StaticGate;
use registrations::registry::FileRegistry;
use registrations::routes;
use registrations::store::AppsScriptStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger().new(o!(
        "version" => env!("CARGO_PKG_VERSION"),
        "revision" => option_env!("BACKEND_REVISION"),
        "build_timestamp" => option_env!("BUILD_TIMESTAMP").unwrap_or("")
    ));

    let main_port: u16 = get_variable("BACKEND_PORT")
        .parse()
        .expect("parse BACKEND_PORT as u16");
    let admin_port: u16 = get_variable("BACKEND_ADMIN_PORT")
        .parse()
        .expect("parse BACKEND_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    let store = Arc::new(AppsScriptStore::from_env(logger.clone()));

    let registry = Arc::new(FileRegistry::new(
        get_variable("BACKEND_REGISTRY_PATH"),
        logger.clone(),
    ));

    let gate = Arc::new(StaticGate::from_env());

    let config = Config::new(
        get_variable("BACKEND_REGISTRATIONS_PATH"),
        get_variable("BACKEND_SYNC_FILENAME"),
    );
    let environment = Environment::new(logger.clone(), registry, store, gate, config);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            let termination_sender = termination_sender.clone();
            termination_sender.send(()).await.unwrap();
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            let terminate = terminate.clone();

            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let logger2 = logger.clone();

        let register_route = routes::make_register_route(environment.clone());
        let count_route = routes::make_count_route(environment.clone());
        let majors_route = routes::make_majors_route(environment.clone());

        let routes = register_route
            .or(count_route)
            .or(majors_route)
            .recover(move |r| routes::format_rejection(logger2.clone(), r));

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let logger2 = logger.clone();

        let admin_list_route = routes::make_admin_list_route(environment.clone());
        let admin_export_route = routes::make_admin_export_route(environment.clone());
        let admin_clear_route = routes::make_admin_clear_route(environment.clone());

        let routes = routes::admin::make_healthz_route(environment.clone())
            .or(routes::admin::make_termination_route(
                environment.clone(),
                terminate,
            ))
            .or(admin_list_route)
            .or(admin_export_route)
            .or(admin_clear_route)
            .recover(move |r| routes::format_rejection(logger2.clone(), r));

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
