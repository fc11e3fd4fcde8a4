//! Process shutdown: termination signals, fatal panics and the hard-kill timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long a fatal shutdown may take before the process is killed.
pub const HARD_KILL_AFTER: Duration = Duration::from_secs(10);

/// Shared shutdown trigger for the listener.
#[derive(Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    fatal: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether shutdown was caused by a panic; the process then exits with status 1.
    pub fn is_fatal(&self) -> bool {
        self.fatal.load(Ordering::SeqCst)
    }

    fn mark_fatal(&self) {
        self.fatal.store(true, Ordering::SeqCst);
        self.token.cancel();
    }

    /// Treat any panic as fatal: log it, stop accepting connections and arm the hard kill.
    pub fn install_panic_hook(&self) {
        let shutdown = self.clone();
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic| {
            error!(%panic, "fatal panic, shutting down");
            default_hook(panic);
            if !shutdown.is_fatal() {
                shutdown.mark_fatal();
                arm_hard_kill();
            }
        }));
    }

    /// Resolve on SIGINT or SIGTERM (or an earlier cancellation) and cancel the token.
    pub async fn listen_for_signals(self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for SIGINT");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("SIGINT received, shutting down"),
            _ = terminate => info!("SIGTERM received, shutting down"),
            _ = self.token.cancelled() => return,
        }
        self.token.cancel();
    }
}

/// Exit with status 1 if graceful shutdown has not finished in time.
fn arm_hard_kill() {
    std::thread::spawn(|| {
        std::thread::sleep(HARD_KILL_AFTER);
        error!("graceful shutdown stalled, forcing exit");
        std::process::exit(1);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_marks_and_cancels() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_fatal());
        shutdown.mark_fatal();
        assert!(shutdown.is_fatal());
        assert!(shutdown.token().is_cancelled());
    }

    #[tokio::test]
    async fn signal_listener_returns_after_cancellation() {
        let shutdown = Shutdown::new();
        let listener = tokio::spawn(shutdown.clone().listen_for_signals());
        shutdown.token().cancel();
        listener.await.unwrap();
        assert!(!shutdown.is_fatal());
    }
}
