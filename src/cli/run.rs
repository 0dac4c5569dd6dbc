// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::cli::args::Cli;
use crate::config::Config;
use crate::driver::Driver;
use crate::job::Database;
use crate::loader::LoaderRegistry;
use crate::{error, success, verbose};

/// Run the overlay pipeline end to end: config, registry, database, driver.
pub fn run(cli: &Cli) {
    crate::cli::logging::set_verbose(cli.verbose);

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    verbose!(
        "Visualizing job '{}' outputs for dataset '{}'",
        cli.job_name,
        cli.dataset_name
    );

    let registry = LoaderRegistry::with_defaults();
    let db = Database::new(&config);
    let driver = Driver::new(&db, &registry).with_out_dir(&cli.out_dir);
    if let Err(e) = driver.run(&cli.dataset_name) {
        error!("{e}");
        process::exit(1);
    }

    success!("Annotated frames saved to {}", cli.out_dir);
}
