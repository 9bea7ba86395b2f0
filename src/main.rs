use anyhow::Result;
use svn_buildinfo::{cli, log_error, logger};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logger::init() {
        eprintln!("Warning: Failed to initialize logging: {e}");
    }

    let result = cli::main().await;
    if let Err(e) = &result {
        log_error!("svn-buildinfo failed: {:#}", e);
    }
    result
}
