//! Process-scoped shutdown signalling
//!
//! A [`Shutdown`] handle is created in `main`, cloned into every long-lived
//! task, and triggered once when SIGINT/SIGTERM arrives.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{info, warn};

/// Cloneable shutdown handle backed by a watch channel
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Create an untriggered handle
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signal every listener. Idempotent.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            info!("Shutdown initiated");
        }
    }

    /// Whether shutdown has been triggered
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is triggered (immediately if it already was)
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Sleep for `duration`, returning early with `false` if shutdown fires
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.triggered() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for SIGINT or SIGTERM, then trigger `shutdown`
pub async fn wait_for_signal(shutdown: Shutdown) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received"),
        _ = terminate => info!("SIGTERM received"),
    }

    shutdown.trigger();
}

/// Await `task` for at most `grace`, logging how long the drain took
pub async fn drain<T>(name: &str, task: tokio::task::JoinHandle<T>, grace: Duration) -> Option<T> {
    let start = Instant::now();
    match tokio::time::timeout(grace, task).await {
        Ok(Ok(value)) => {
            info!("{} stopped in {:?}", name, start.elapsed());
            Some(value)
        }
        Ok(Err(e)) => {
            warn!("{} task failed during shutdown: {}", name, e);
            None
        }
        Err(_) => {
            warn!("{} did not stop within {:?}", name, grace);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_wakes_listeners() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_triggered());

        let listener = shutdown.clone();
        let handle = tokio::spawn(async move { listener.triggered().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.trigger();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_when_already_stopped() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(100), shutdown.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sleep_is_interrupted() {
        let shutdown = Shutdown::new();
        let sleeper = shutdown.clone();
        let handle = tokio::spawn(async move { sleeper.sleep(Duration::from_secs(30)).await });

        shutdown.trigger();
        let completed = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!completed);
    }

    #[tokio::test]
    async fn test_drain_times_out() {
        let task = tokio::spawn(async { tokio::time::sleep(Duration::from_secs(30)).await });
        assert!(drain("sleeper", task, Duration::from_millis(20)).await.is_none());

        let task = tokio::spawn(async { 7 });
        assert_eq!(drain("quick", task, Duration::from_secs(1)).await, Some(7));
    }
}
