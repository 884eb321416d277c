use crate::error::ServiceError;
use crate::service::{ApiService, DEFAULT_REQUEST_TIMEOUT};
use crate::shutdown::Shutdown;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub addr: SocketAddr,
    /// Upper bound on handling a single request
    pub request_timeout: Duration,
    /// How long in-flight requests may run after shutdown begins
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_port(8080)
    }
}

impl ServerConfig {
    /// Listen on all interfaces at `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_grace: Duration::from_secs(5),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        if self.shutdown_grace.is_zero() {
            return Err("shutdown_grace must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// A bound HTTP server, ready to run
#[derive(Debug)]
pub struct ApiServer {
    listener: TcpListener,
    service: ApiService,
}

impl ApiServer {
    /// Bind the listen address. Fails fast if the port is unavailable.
    pub async fn bind(config: &ServerConfig, service: ApiService) -> Result<Self, ServiceError> {
        config.validate().map_err(ServiceError::ConfigError)?;

        let listener = TcpListener::bind(config.addr)
            .await
            .map_err(|source| ServiceError::Bind {
                addr: config.addr,
                source,
            })?;

        Ok(Self {
            listener,
            service: service.with_request_timeout(config.request_timeout),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServiceError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` fires, then stop accepting and drain in-flight
    /// requests
    pub async fn run(self, shutdown: Shutdown) -> Result<(), ServiceError> {
        let addr = self.local_addr()?;
        let app = self.service.router();

        info!("API server listening on {}", addr);

        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.triggered().await })
        .await?;

        info!("API server stopped");
        Ok(())
    }
}
