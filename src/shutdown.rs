use tokio_util::sync::CancellationToken;
use tracing::info;

/// Install the process signal handler that starts worker drain.
///
/// Returns a `CancellationToken` cancelled on the first termination
/// signal. The orchestrator watches the token: the poller stops pulling,
/// the queue closes, and in-flight jobs run to completion before the
/// process exits.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let drain = token.clone();

    tokio::spawn(async move {
        let signal = termination_signal().await;
        info!(signal, "termination signal received, draining worker");
        drain.cancel();
    });

    token
}

/// Resolve to the name of the first termination signal delivered.
#[cfg(unix)]
async fn termination_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).expect("SIGTERM handler");
    let mut interrupt = signal(SignalKind::interrupt()).expect("SIGINT handler");

    tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        _ = interrupt.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}
