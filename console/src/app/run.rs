//! Main application run loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::app::state::AppState;
use crate::blob::BlobStore;
use crate::errors::ConsoleError;
use crate::server::serve::serve;

/// Run the fleet console until `shutdown_signal` resolves
pub async fn run(
    store: Arc<dyn BlobStore>,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ConsoleError> {
    info!("Initializing fleet console...");

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager =
        ShutdownManager::new(shutdown_tx.clone(), options.max_shutdown_delay);

    let app_state = AppState::init(store, &options);

    let mut shutdown_rx = shutdown_tx.subscribe();
    let server_handle = match serve(
        &options.server,
        Arc::new(app_state.server_state()),
        async move {
            let _ = shutdown_rx.recv().await;
        },
    )
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start the console: {}", e);
            shutdown_manager.shutdown().await?;
            return Err(e);
        }
    };
    shutdown_manager.with_server_handle(server_handle)?;

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    max_shutdown_delay: Duration,
    server_handle: Option<JoinHandle<Result<(), ConsoleError>>>,
}

impl ShutdownManager {
    fn new(shutdown_tx: broadcast::Sender<()>, max_shutdown_delay: Duration) -> Self {
        Self {
            shutdown_tx,
            max_shutdown_delay,
            server_handle: None,
        }
    }

    fn with_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), ConsoleError>>,
    ) -> Result<(), ConsoleError> {
        if self.server_handle.is_some() {
            return Err(ConsoleError::ShutdownError(
                "server_handle already set".to_string(),
            ));
        }
        self.server_handle = Some(handle);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), ConsoleError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => Err(ConsoleError::ShutdownError(format!(
                "Shutdown timed out after {:?}",
                self.max_shutdown_delay
            ))),
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), ConsoleError> {
        info!("Shutting down fleet console...");

        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| ConsoleError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
