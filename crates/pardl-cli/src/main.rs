use pardl_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    logging::init();

    // Parse CLI and run the batch.
    if let Err(err) = Cli::run_from_args().await {
        eprintln!("pardl error: {:#}", err);
        std::process::exit(1);
    }
}
