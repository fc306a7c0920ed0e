use log::{error, info};
use std::process::ExitCode;
use tomorrow_etl::{run_extract, run_load, EtlError, ExtractConfig, LoadConfig};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    match run().await {
        Ok(merged) => {
            info!("etl run complete, {merged} rows merged");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log_error_chain(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<u64, EtlError> {
    let extract_config = ExtractConfig::from_env()?;
    let table = run_extract(&extract_config).await?;

    // The load config is only read once extract has succeeded; POSTGRES_URI
    // is not required to take a snapshot.
    let load_config = LoadConfig::from_env()?;
    run_load(&load_config, &table).await
}

fn log_error_chain(err: &EtlError) {
    error!("etl run failed: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        error!("caused by: {cause}");
        source = cause.source();
    }
}
