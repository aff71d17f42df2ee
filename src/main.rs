mod cli;

use tracing::error;

#[tokio::main]
async fn main() {
    match cli::run() {
        cli::RunOutcome::Exit(code) => std::process::exit(code),
        cli::RunOutcome::Serve(config) => {
            pilotwatch::logging::init(&config.log_level);
            if let Err(err) = pilotwatch::serve(config).await {
                error!(%err, "server stopped");
                std::process::exit(1);
            }
        }
        cli::RunOutcome::Check(config) => {
            pilotwatch::logging::init(&config.log_level);
            std::process::exit(run_check(&config).await);
        }
    }
}

async fn run_check(config: &pilotwatch::config::AppConfig) -> i32 {
    let report = match pilotwatch::check_once(config).await {
        Ok(report) => report,
        Err(err) => {
            error!(%err, "check failed");
            return 1;
        }
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            error!(%err, "failed to render check report");
            1
        }
    }
}
