use expense_service::config::ExpenseConfig;
use expense_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    dotenvy::dotenv().ok();
    init_tracing("expense-service", "info");

    // Fail fast on missing API keys
    let config = ExpenseConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let app = Application::build(config).await?;
    tracing::info!("Expense service listening on port {}", app.port());

    app.run_until_stopped().await?;
    Ok(())
}
