use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Process-wide termination signal.
///
/// Every execution unit waiting after its `metrics` stage observes the same signal,
/// so one trigger stops all running tasks at once. Per-task stops go through
/// [`TaskOrchestrator::stop_task`](crate::TaskOrchestrator::stop_task) instead.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    /// Signal that fires only through [`trigger`](Self::trigger).
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal wired to SIGINT/SIGTERM (ctrl-c elsewhere).
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_os() -> Self {
        let signal = Self::new();
        let token = signal.token.clone();
        tokio::spawn(async move {
            wait_os_signal().await;
            info!("termination signal received; stopping all running tasks");
            token.cancel();
        });
        signal
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }
}

#[cfg(unix)]
async fn wait_os_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(mut sigint), Ok(mut sigterm)) => {
            tokio::select! {
                _ = sigint.recv() => info!("SIGINT received"),
                _ = sigterm.recv() => info!("SIGTERM received"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "cannot install unix signal handlers; falling back to ctrl-c");
            wait_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_os_signal() {
    wait_ctrl_c().await;
}

async fn wait_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; os termination signals are ignored");
        std::future::pending::<()>().await;
    }
}
