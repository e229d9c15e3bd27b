use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _guard = table_booking::init_logging();

    match table_booking::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server failed to start: {}", e);
            ExitCode::FAILURE
        }
    }
}
