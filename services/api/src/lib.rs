mod cli;
mod infra;
mod recommend;
mod routes;
mod server;

use bursary_match::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
