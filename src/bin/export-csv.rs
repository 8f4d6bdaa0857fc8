use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use dotenv::dotenv;
use structopt::StructOpt;

use log::{debug, initialize_logger, o};
use registrations::config::get_variable;
use registrations::csv;
use registrations::registry::{FileRegistry, Registry};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "export-csv",
    about = "Export the stored registrations as CSV without going through the admin routes"
)]
struct Opt {
    /// Write to this file (with a UTF-8 BOM) instead of standard output
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();
    let logger = Arc::new(initialize_logger().new(o!("helper" => "export-csv")));

    let registry = FileRegistry::new(get_variable("BACKEND_REGISTRY_PATH"), logger.clone());
    let registrations = registry.all().await?;

    debug!(logger, "Read registry"; "count" => registrations.len());

    let snapshot = csv::generate(&registrations);

    match opt.output {
        Some(path) => {
            std::fs::write(&path, csv::with_bom(&snapshot))?;
            debug!(logger, "Wrote export"; "path" => format!("{}", path.display()));
        }
        None => print!("{}", snapshot),
    }

    Ok(())
}
