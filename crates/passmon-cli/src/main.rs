use passmon_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; the guard flushes buffered
    // lines when main returns.
    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(_) => {
            logging::init_logging_stderr();
            None
        }
    };

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("passmon error: {:#}", err);
        std::process::exit(1);
    }
}
