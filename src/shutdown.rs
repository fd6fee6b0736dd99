//! Interrupt handling.
//!
//! The pipeline races Ctrl+C (and SIGTERM on unix). Whichever finishes first
//! decides the outcome; the loser is dropped without being polled again.

use std::future::Future;

/// How a raced piece of work ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Interrupted,
}

/// Runs `work` until it finishes or `interrupt` resolves, whichever comes first.
pub async fn until_interrupted<F, I>(work: F, interrupt: I) -> Outcome<F::Output>
where
    F: Future,
    I: Future<Output = ()>,
{
    tokio::select! {
        biased;
        () = interrupt => Outcome::Interrupted,
        output = work => Outcome::Completed(output),
    }
}

/// Resolves on the first Ctrl+C or SIGTERM.
pub async fn interrupt_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::debug!("Interrupt received, exiting");
}
