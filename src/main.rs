use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use cody::config::Configuration;
use cody::discovery::Discovery;

// Usage: cody [CONFIG_FILE]
// Any setting can be overridden through CODY_* environment variables,
// e.g. CODY_PATH=data.csv CODY_MIN_SUPPORT=0.95 cody
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let file = std::env::args().nth(1).map(PathBuf::from);
    let report = Configuration::load(file.as_deref())
        .and_then(Discovery::new)
        .and_then(|discovery| discovery.run());
    match report {
        Ok(report) => {
            for line in report.render() {
                println!("{line}");
            }
            match serde_json::to_string(&report.statistics) {
                Ok(json) => println!("{json}"),
                Err(e) => error!(error=%e, "could not serialize statistics"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error=%e, "discovery failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
