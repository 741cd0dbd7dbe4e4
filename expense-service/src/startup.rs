//! Application startup and lifecycle management.

use crate::config::ExpenseConfig;
use crate::services::providers::gemini::{GeminiConfig, GeminiReceiptParser};
use crate::services::providers::ReceiptParser;
use crate::services::GsaClient;
use crate::{build_router, AppState};
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration, wiring up the
    /// real Gemini receipt parser.
    pub async fn build(config: ExpenseConfig) -> Result<Self, AppError> {
        let gemini_config = GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.google.receipt_model.clone(),
        };
        let receipt_parser: Arc<dyn ReceiptParser> =
            Arc::new(GeminiReceiptParser::new(gemini_config));

        tracing::info!(
            model = %config.google.receipt_model,
            "Initialized Gemini receipt parser"
        );

        Self::build_with_parser(config, receipt_parser).await
    }

    /// Build the application with an injected receipt parser. Tests use
    /// this to swap in a mock.
    pub async fn build_with_parser(
        config: ExpenseConfig,
        receipt_parser: Arc<dyn ReceiptParser>,
    ) -> Result<Self, AppError> {
        let gsa = GsaClient::new(&config.gsa.base_url, &config.gsa.api_key);
        tracing::info!(
            base_url = %config.gsa.base_url,
            "Initialized GSA per-diem client"
        );

        let state = AppState {
            config: config.clone(),
            receipt_parser,
            gsa,
        };

        // Bind the listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
